//! Service-suggestion assistant backed by the Gemini API. Every failure
//! mode degrades to a canned reply; callers never see an error.

use serde::{Deserialize, Serialize};

use crate::models::service_catalog;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

const OFFLINE_REPLY: &str =
    "Sorry, I'm offline right now. Please pick a service from the list.";
const TROUBLE_REPLY: &str =
    "I'm having connection trouble. Please pick a service manually.";
const DEFAULT_REPLY: &str =
    "I didn't quite catch that, but Standard Shine is always a great choice!";

#[derive(Clone)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            log::warn!("GEMINI_API_KEY not set; assistant will answer with a fallback");
        }
        Self { api_key }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Ask for a wash recommendation based on the user's description of their
/// car. Always returns something presentable.
pub async fn suggest(config: &AssistantConfig, user_input: &str) -> String {
    let Some(api_key) = config.api_key.as_deref() else {
        return OFFLINE_REPLY.to_string();
    };

    match request_suggestion(api_key, user_input).await {
        Ok(Some(text)) => text,
        Ok(None) => DEFAULT_REPLY.to_string(),
        Err(err) => {
            log::warn!("Assistant request failed: {err}");
            TROUBLE_REPLY.to_string()
        }
    }
}

async fn request_suggestion(api_key: &str, user_input: &str) -> Result<Option<String>, reqwest::Error> {
    let request = GenerateRequest {
        system_instruction: Content {
            parts: vec![Part {
                text: system_prompt(),
            }],
        },
        contents: vec![Content {
            parts: vec![Part {
                text: user_input.to_string(),
            }],
        }],
    };

    let url = format!("{GEMINI_API_URL}/{GEMINI_MODEL}:generateContent");
    let response = reqwest::Client::new()
        .post(url)
        .header("x-goog-api-key", api_key)
        .json(&request)
        .send()
        .await?
        .error_for_status()?
        .json::<GenerateResponse>()
        .await?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .filter(|text| !text.trim().is_empty());
    Ok(text)
}

fn system_prompt() -> String {
    let services = service_catalog()
        .iter()
        .map(|s| format!("- {} ({} ₽): {}", s.name, s.price, s.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are WashBot, the friendly and knowledgeable assistant of the \
         WashBay car wash. Recommend the best wash package based on the \
         user's description of their car.\n\nOur services:\n{services}\n\n\
         Rules:\n1. Keep answers under 50 words.\n2. Be enthusiastic but \
         professional.\n3. Name the specific service you recommend.\n4. If \
         the user asks about something unrelated, politely steer them back \
         to car washing."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn missing_credential_degrades_to_offline_reply() {
        let config = AssistantConfig { api_key: None };
        assert_eq!(suggest(&config, "my car is muddy").await, OFFLINE_REPLY);
    }

    #[test]
    fn system_prompt_lists_every_service() {
        let prompt = system_prompt();
        for service in service_catalog() {
            assert!(prompt.contains(service.name));
        }
    }

    #[test]
    fn empty_candidates_decode_cleanly() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
