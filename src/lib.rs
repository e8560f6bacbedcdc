pub mod app;
pub mod clinic;
pub mod config;
pub mod error;
pub mod registry;
pub mod state;
