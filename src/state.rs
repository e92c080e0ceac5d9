use sqlx::SqlitePool;

use crate::assistant::AssistantConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub assistant: AssistantConfig,
    /// Grants the demo identity admin access, for development off-platform.
    pub dev_admin: bool,
}
