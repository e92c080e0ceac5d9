use actix_web::HttpResponse;
use askama::Template;

/// Render a page template into an HTML response. Render failures are a
/// programming error; they are logged and answered with a bare 500.
pub fn render<T: Template>(template: T) -> HttpResponse {
    let body = match template.render() {
        Ok(body) => body,
        Err(err) => {
            log::error!("Page render failed: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}
