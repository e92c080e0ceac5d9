use actix_web::{
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    error::ErrorInternalServerError,
    http::header,
    middleware::Next,
    web, Error, HttpMessage, HttpResponse,
};

use crate::identity::{self, DEMO_USER_ID};
use crate::repo;
use crate::state::AppState;

/// The administrator identity behind the current request, inserted by
/// [`admin_guard`].
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub tg_id: i64,
    pub name: String,
}

/// Gate for the `/admin` scope. Settings are re-read on every request, so
/// allow-list edits apply on the next check without a restart.
pub async fn admin_guard<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<BoxBody>, Error>
where
    B: actix_web::body::MessageBody + 'static,
{
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ErrorInternalServerError("missing app state"))?;

    let user = identity::current_user(req.request());
    let settings = repo::get_settings(&state.db)
        .await
        .map_err(ErrorInternalServerError)?;

    let allowed = settings.is_admin(user.id) || (state.dev_admin && user.id == DEMO_USER_ID);
    if !allowed {
        log::info!("Admin access denied for {}", user.id);
        return Ok(req.into_response(forbidden_page()));
    }

    req.extensions_mut().insert(AdminUser {
        tg_id: user.id,
        name: user.display_name(),
    });

    let res = next.call(req).await?;
    Ok(res.map_into_boxed_body())
}

fn forbidden_page() -> HttpResponse {
    let body = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Access denied</title>
    <style>
      body {
        font-family: system-ui, -apple-system, sans-serif;
        background: #0f172a;
        color: #e2e8f0;
        padding: 48px 20px;
      }
      .card {
        max-width: 520px;
        margin: 0 auto;
        background: #1e293b;
        border-radius: 16px;
        padding: 32px;
      }
      a { color: #38bdf8; text-decoration: none; font-weight: 600; }
    </style>
  </head>
  <body>
    <div class="card">
      <h1>Admins only</h1>
      <p>This account is not on the administrator list.</p>
      <p><a href="/">Back to booking</a></p>
    </div>
  </body>
</html>"#;

    HttpResponse::Forbidden()
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .content_type("text/html; charset=utf-8")
        .body(body)
}
