use std::{fs, path::Path};

use sqlx::SqlitePool;

use crate::models::Client;
use crate::repo;
use crate::store;

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Make sure the directory holding a file-backed SQLite database exists
/// before the pool tries to create the file.
pub fn ensure_sqlite_dir(db_url: &str) -> std::io::Result<()> {
    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:"));

    let Some(path) = path else {
        return Ok(());
    };

    let path = path.split('?').next().unwrap_or(path);
    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    let path = path.strip_prefix("file:").unwrap_or(path);
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Seed a couple of demo clients on an empty store so the app has something
/// to show outside the platform.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    if store::get(pool, store::KEY_CLIENTS).await?.is_some() {
        return Ok(());
    }

    log::info!("Seeding demo clients");
    let demo_clients = vec![
        Client {
            tg_id: Some(crate::identity::DEMO_USER_ID),
            username: None,
            name: "Demo User".to_string(),
            phone: "555-0101".to_string(),
            plate_number: "A 777 AA".to_string(),
            visits: 9,
            is_vip: false,
        },
        Client {
            tg_id: None,
            username: None,
            name: "Ivan Ivanov".to_string(),
            phone: "555-0102".to_string(),
            plate_number: "B 555 BB".to_string(),
            visits: 2,
            is_vip: true,
        },
    ];
    repo::write_clients(pool, &demo_clients).await
}

#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_need_no_directory() {
        ensure_sqlite_dir("sqlite::memory:").unwrap();
        ensure_sqlite_dir("postgres://elsewhere").unwrap();
    }

    #[actix_web::test]
    async fn seeding_is_idempotent() {
        let pool = test_pool().await;
        seed_defaults(&pool).await.unwrap();
        let first = repo::get_clients(&pool).await.unwrap();
        seed_defaults(&pool).await.unwrap();
        let second = repo::get_clients(&pool).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }
}
