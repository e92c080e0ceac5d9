use sqlx::SqlitePool;

/// Storage keys for the three logical records.
pub const KEY_BOOKINGS: &str = "washbay_bookings";
pub const KEY_CLIENTS: &str = "washbay_clients";
pub const KEY_SETTINGS: &str = "washbay_settings";

/// Read one JSON record. Absent keys are `None`, not an error.
pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Write one JSON record, replacing whatever was there.
pub async fn set(pool: &SqlitePool, key: &str, value: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO kv_store (key, value) VALUES (?, ?)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value"#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[actix_web::test]
    async fn get_returns_none_for_missing_keys() {
        let pool = db::test_pool().await;
        assert_eq!(get(&pool, "nope").await.unwrap(), None);
    }

    #[actix_web::test]
    async fn set_overwrites_existing_values() {
        let pool = db::test_pool().await;
        set(&pool, "k", "one").await.unwrap();
        set(&pool, "k", "two").await.unwrap();
        assert_eq!(get(&pool, "k").await.unwrap().as_deref(), Some("two"));
    }
}
