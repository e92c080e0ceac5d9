use actix_web::HttpRequest;
use serde::Deserialize;

/// Identity used when the app runs outside the platform, e.g. in a plain
/// browser during development. Matches one of the seeded demo clients.
pub const DEMO_USER_ID: i64 = 12345;

/// The user tuple the platform hands to the mini-app. The shell forwards it
/// as JSON in the `X-Telegram-User` header.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl PlatformUser {
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID,
            first_name: "Demo User".to_string(),
            last_name: None,
            username: None,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.last_name {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// Resolve the platform user for a request. A missing or unreadable header
/// falls back to the demo identity; it must never fail.
pub fn current_user(req: &HttpRequest) -> PlatformUser {
    platform_user(req).unwrap_or_else(PlatformUser::demo)
}

fn platform_user(req: &HttpRequest) -> Option<PlatformUser> {
    let header = req.headers().get("X-Telegram-User")?;
    let raw = header.to_str().ok()?;
    match serde_json::from_str(raw) {
        Ok(user) => Some(user),
        Err(err) => {
            log::warn!("Unreadable platform user header: {err}");
            None
        }
    }
}
