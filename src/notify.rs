//! Telegram-channel announcements for new bookings. Best effort only:
//! missing credentials skip the send, failures are logged and swallowed.

use serde::Serialize;

use crate::models::{Booking, Service};
use crate::settings::Settings;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

fn enabled(settings: &Settings) -> bool {
    !(settings.bot_token.trim().is_empty() || settings.channel_id.trim().is_empty())
}

pub async fn notify_booking_created(
    settings: &Settings,
    booking: &Booking,
    service: &Service,
    client_name: &str,
) {
    if !enabled(settings) {
        return;
    }

    let price = if booking.is_free_wash {
        "free (loyalty)".to_string()
    } else {
        format!("{} ₽", service.price)
    };
    let text = format!(
        "New booking: {} on {} at {}\nClient: {} ({}), plate {}\nPrice: {}",
        service.name,
        booking.date,
        booking.time_slot,
        client_name,
        booking.client_phone,
        booking.plate_number,
        price,
    );

    if let Err(err) = send_message(settings, text).await {
        log::warn!("Channel notification failed: {err}");
    }
}

async fn send_message(settings: &Settings, text: String) -> Result<(), reqwest::Error> {
    let url = format!("{TELEGRAM_API_URL}/bot{}/sendMessage", settings.bot_token);
    let payload = SendMessage {
        chat_id: &settings.channel_id,
        text,
    };
    reqwest::Client::new()
        .post(url)
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_need_both_credentials() {
        let mut settings = Settings::default();
        assert!(!enabled(&settings));
        settings.bot_token = "123:abc".to_string();
        assert!(!enabled(&settings));
        settings.channel_id = "@washbay".to_string();
        assert!(enabled(&settings));
    }
}
