//! Typed access to the three persisted records: bookings, clients and
//! settings. Each record is one JSON document in the key-value store;
//! unreadable documents degrade to empty rather than failing the caller.

use sqlx::SqlitePool;

use crate::identity::PlatformUser;
use crate::models::{Booking, BookingStatus, Client};
use crate::settings::Settings;
use crate::store;

fn decode_list<T: serde::de::DeserializeOwned>(key: &str, raw: Option<String>) -> Vec<T> {
    let Some(data) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(&data) {
        Ok(list) => list,
        Err(err) => {
            log::warn!("Discarding unreadable record {key}: {err}");
            Vec::new()
        }
    }
}

async fn write_list<T: serde::Serialize>(
    pool: &SqlitePool,
    key: &str,
    list: &[T],
) -> Result<(), sqlx::Error> {
    let data = serde_json::to_string(list)
        .map_err(|err| sqlx::Error::Protocol(format!("encode {key}: {err}")))?;
    store::set(pool, key, &data).await
}

// --- bookings ---

pub async fn get_bookings(pool: &SqlitePool) -> Result<Vec<Booking>, sqlx::Error> {
    let raw = store::get(pool, store::KEY_BOOKINGS).await?;
    Ok(decode_list(store::KEY_BOOKINGS, raw))
}

pub async fn save_booking(pool: &SqlitePool, booking: &Booking) -> Result<(), sqlx::Error> {
    let mut bookings = get_bookings(pool).await?;
    bookings.push(booking.clone());
    write_list(pool, store::KEY_BOOKINGS, &bookings).await
}

/// Flip a booking's status. An unknown id is a logged no-op; nothing at this
/// layer stops a transition out of a terminal status.
pub async fn update_booking_status(
    pool: &SqlitePool,
    id: &str,
    status: BookingStatus,
) -> Result<(), sqlx::Error> {
    let mut bookings = get_bookings(pool).await?;
    match bookings.iter_mut().find(|booking| booking.id == id) {
        Some(booking) => {
            booking.status = status;
            write_list(pool, store::KEY_BOOKINGS, &bookings).await
        }
        None => {
            log::warn!("Status update for unknown booking {id}");
            Ok(())
        }
    }
}

/// A client's own bookings, newest first. When both sides carry a platform
/// id the ids decide; the phone snapshot is only a fallback for bookings
/// made without one.
pub async fn user_bookings(pool: &SqlitePool, client: &Client) -> Result<Vec<Booking>, sqlx::Error> {
    let mut bookings: Vec<Booking> = get_bookings(pool)
        .await?
        .into_iter()
        .filter(|booking| match (client.tg_id, booking.tg_id) {
            (Some(own), Some(theirs)) => own == theirs,
            _ => !client.phone.is_empty() && booking.client_phone == client.phone,
        })
        .collect();
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(bookings)
}

// --- clients ---

pub async fn get_clients(pool: &SqlitePool) -> Result<Vec<Client>, sqlx::Error> {
    let raw = store::get(pool, store::KEY_CLIENTS).await?;
    Ok(decode_list(store::KEY_CLIENTS, raw))
}

pub async fn write_clients(pool: &SqlitePool, clients: &[Client]) -> Result<(), sqlx::Error> {
    write_list(pool, store::KEY_CLIENTS, clients).await
}

fn find_slot(clients: &[Client], client: &Client) -> Option<usize> {
    if let Some(tg_id) = client.tg_id {
        if let Some(index) = clients.iter().position(|c| c.tg_id == Some(tg_id)) {
            return Some(index);
        }
    }
    if client.phone.is_empty() {
        return None;
    }
    clients.iter().position(|c| c.phone == client.phone)
}

/// Insert or update a client. Matched by platform id first, phone second;
/// on a match the identity and contact fields are updated while the stored
/// visit count and VIP flag are preserved.
pub async fn save_client(pool: &SqlitePool, client: &Client) -> Result<(), sqlx::Error> {
    let mut clients = get_clients(pool).await?;
    match find_slot(&clients, client) {
        Some(index) => {
            let existing = &mut clients[index];
            existing.tg_id = client.tg_id.or(existing.tg_id);
            existing.username = client.username.clone().or(existing.username.take());
            existing.name = client.name.clone();
            existing.phone = client.phone.clone();
            existing.plate_number = client.plate_number.clone();
        }
        None => clients.push(client.clone()),
    }
    write_clients(pool, &clients).await
}

pub async fn find_client_by_tg_id(
    pool: &SqlitePool,
    tg_id: i64,
) -> Result<Option<Client>, sqlx::Error> {
    let clients = get_clients(pool).await?;
    Ok(clients.into_iter().find(|c| c.tg_id == Some(tg_id)))
}

pub async fn find_client_by_phone(
    pool: &SqlitePool,
    phone: &str,
) -> Result<Option<Client>, sqlx::Error> {
    let clients = get_clients(pool).await?;
    Ok(clients.into_iter().find(|c| c.phone == phone))
}

/// Add one visit to the client's counter and return the updated record.
pub async fn increment_visits(
    pool: &SqlitePool,
    client: &Client,
) -> Result<Option<Client>, sqlx::Error> {
    let mut clients = get_clients(pool).await?;
    let Some(index) = find_slot(&clients, client) else {
        log::warn!("Visit increment for unknown client {}", client.name);
        return Ok(None);
    };
    clients[index].visits += 1;
    let updated = clients[index].clone();
    write_clients(pool, &clients).await?;
    Ok(Some(updated))
}

/// Look up the profile behind a platform identity, registering a fresh one
/// on first sighting.
pub async fn resolve_client(pool: &SqlitePool, user: &PlatformUser) -> Result<Client, sqlx::Error> {
    if let Some(existing) = find_client_by_tg_id(pool, user.id).await? {
        return Ok(existing);
    }

    let client = Client {
        tg_id: Some(user.id),
        username: user.username.clone(),
        name: user.display_name(),
        ..Client::default()
    };
    save_client(pool, &client).await?;
    Ok(client)
}

// --- settings ---

pub async fn get_settings(pool: &SqlitePool) -> Result<Settings, sqlx::Error> {
    let raw = store::get(pool, store::KEY_SETTINGS).await?;
    Ok(Settings::merge_stored(raw.as_deref()))
}

pub async fn save_settings(pool: &SqlitePool, settings: &Settings) -> Result<(), sqlx::Error> {
    let data = serde_json::to_string(settings)
        .map_err(|err| sqlx::Error::Protocol(format!("encode settings: {err}")))?;
    store::set(pool, store::KEY_SETTINGS, &data).await
}
