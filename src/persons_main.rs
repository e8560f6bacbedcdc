use anyhow::Context;
use clinic_api::registry::persons::Person;
use clinic_api::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    app::init_tracing("clinic_api=debug,persons_api=debug,axum=info,tower_http=info");

    let state = AppState::init().await?;

    if let Err(e) = sqlx::migrate!("./migrations_registry").run(&state.db).await {
        tracing::warn!(error = %e, "migrations folder not found or migration failed; continuing");
    }

    // One-shot insert before the listener starts; any failure here aborts
    // the process without serving.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(person) = seed_person(&args) {
        Person::insert(&state.db, &person)
            .await
            .context("startup person insert")?;
        tracing::info!(id = %person.id, "inserted person from command line");
    }

    let config = state.config.clone();
    let router = app::registry_app(state);
    app::serve(router, &config).await
}

/// A person is seeded only when id, name, and a strictly positive age are
/// all supplied.
fn seed_person(args: &[String]) -> Option<Person> {
    let mut id = None;
    let mut name = None;
    let mut age = None;

    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--id" => id = it.next().cloned(),
            "--name" => name = it.next().cloned(),
            "--age" => age = it.next().and_then(|v| v.parse::<i32>().ok()),
            _ => {}
        }
    }

    match (id, name, age) {
        (Some(id), Some(full_name), Some(age)) if age > 0 => Some(Person { id, full_name, age }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn seeds_when_all_three_arguments_are_present() {
        let person = seed_person(&args(&["--id", "p1", "--name", "Ana", "--age", "34"])).unwrap();
        assert_eq!(person.id, "p1");
        assert_eq!(person.full_name, "Ana");
        assert_eq!(person.age, 34);
    }

    #[test]
    fn skips_when_an_argument_is_missing() {
        assert!(seed_person(&args(&["--id", "p1", "--age", "34"])).is_none());
        assert!(seed_person(&args(&["--name", "Ana", "--age", "34"])).is_none());
        assert!(seed_person(&args(&[])).is_none());
    }

    #[test]
    fn skips_when_age_is_not_strictly_positive() {
        assert!(seed_person(&args(&["--id", "p1", "--name", "Ana", "--age", "0"])).is_none());
        assert!(seed_person(&args(&["--id", "p1", "--name", "Ana", "--age", "-3"])).is_none());
        assert!(seed_person(&args(&["--id", "p1", "--name", "Ana", "--age", "x"])).is_none());
    }
}
