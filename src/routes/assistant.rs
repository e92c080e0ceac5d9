use actix_web::{web, HttpResponse, Result};
use askama::Template;
use serde::Deserialize;

use crate::assistant;
use crate::state::AppState;
use crate::templates::render;

#[derive(Template)]
#[template(path = "assistant.html")]
struct AssistantTemplate {
    message: String,
    reply: String,
    has_reply: bool,
}

#[derive(Deserialize)]
struct AssistantForm {
    message: String,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/assistant")
            .route(web::get().to(show))
            .route(web::post().to(ask)),
    );
}

async fn show() -> Result<HttpResponse> {
    Ok(render(AssistantTemplate {
        message: String::new(),
        reply: String::new(),
        has_reply: false,
    }))
}

async fn ask(state: web::Data<AppState>, form: web::Form<AssistantForm>) -> Result<HttpResponse> {
    let message = form.into_inner().message;
    let reply = if message.trim().is_empty() {
        "Tell me a bit about your car first.".to_string()
    } else {
        assistant::suggest(&state.assistant, &message).await
    };

    Ok(render(AssistantTemplate {
        message,
        reply,
        has_reply: true,
    }))
}
