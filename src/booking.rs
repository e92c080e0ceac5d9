use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::loyalty::{loyalty_status, LOYALTY_THRESHOLD};
use crate::models::{Booking, BookingStatus, Client, Service};
use crate::repo;

/// Contact details as submitted with the booking form; merged into the
/// client's profile before the booking is written.
#[derive(Debug, Clone)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub plate_number: String,
}

#[derive(Debug, Clone)]
pub struct BookingOutcome {
    pub booking: Booking,
    /// The client as stored after the visit increment.
    pub client: Client,
}

/// Create a booking as one logical unit: merge the contact edits into the
/// client record, freeze the free-wash flag from the pre-increment visit
/// count, append the booking, then bump the counter.
///
/// The caller has already shown the slot as available; nothing here checks
/// again, so two submissions racing for the last bay can both land (accepted
/// for a single-store deployment, last write wins). A persistence failure
/// aborts the remaining steps without rolling back the earlier ones.
pub async fn create_booking(
    pool: &SqlitePool,
    client: &Client,
    service: &Service,
    date: NaiveDate,
    time_slot: &str,
    contact: &ContactInfo,
) -> Result<BookingOutcome, sqlx::Error> {
    let mut updated = client.clone();
    updated.name = contact.name.clone();
    updated.phone = contact.phone.clone();
    updated.plate_number = contact.plate_number.clone();
    repo::save_client(pool, &updated).await?;

    // Visit count as stored before this booking decides the free wash.
    let stored = lookup(pool, &updated).await?.unwrap_or_else(|| updated.clone());
    let is_free_wash = loyalty_status(stored.visits, LOYALTY_THRESHOLD).free_on_next_visit;

    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        tg_id: stored.tg_id,
        service_id: service.id.to_string(),
        date,
        time_slot: time_slot.to_string(),
        client_phone: contact.phone.clone(),
        plate_number: contact.plate_number.clone(),
        status: BookingStatus::Pending,
        is_free_wash,
        created_at: Utc::now(),
    };
    repo::save_booking(pool, &booking).await?;

    let client = repo::increment_visits(pool, &stored).await?.unwrap_or(stored);

    Ok(BookingOutcome { booking, client })
}

async fn lookup(pool: &SqlitePool, client: &Client) -> Result<Option<Client>, sqlx::Error> {
    match client.tg_id {
        Some(tg_id) => repo::find_client_by_tg_id(pool, tg_id).await,
        None => repo::find_client_by_phone(pool, &client.phone).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::find_service;

    fn contact() -> ContactInfo {
        ContactInfo {
            name: "Demo User".to_string(),
            phone: "555-0101".to_string(),
            plate_number: "A 777 AA".to_string(),
        }
    }

    async fn seeded_pool() -> SqlitePool {
        let pool = db::test_pool().await;
        db::seed_defaults(&pool).await.unwrap();
        pool
    }

    #[actix_web::test]
    async fn tenth_visit_books_free_and_increments() {
        let pool = seeded_pool().await;
        let client = repo::find_client_by_tg_id(&pool, 12345).await.unwrap().unwrap();
        assert_eq!(client.visits, 9);

        let outcome = create_booking(
            &pool,
            &client,
            find_service("srv_2").unwrap(),
            "2024-06-01".parse().unwrap(),
            "10:00",
            &contact(),
        )
        .await
        .unwrap();

        assert!(outcome.booking.is_free_wash);
        assert_eq!(outcome.booking.status, BookingStatus::Pending);
        assert_eq!(outcome.client.visits, 10);

        let stored = repo::find_client_by_tg_id(&pool, 12345).await.unwrap().unwrap();
        assert_eq!(stored.visits, 10);
        let bookings = repo::get_bookings(&pool).await.unwrap();
        assert_eq!(bookings.len(), 1);
        assert!(bookings[0].is_free_wash);
    }

    #[actix_web::test]
    async fn free_flag_is_frozen_from_pre_increment_count() {
        let pool = seeded_pool().await;
        let client = repo::find_client_by_tg_id(&pool, 12345).await.unwrap().unwrap();

        let first = create_booking(
            &pool,
            &client,
            find_service("srv_1").unwrap(),
            "2024-06-01".parse().unwrap(),
            "09:00",
            &contact(),
        )
        .await
        .unwrap();
        assert!(first.booking.is_free_wash);

        // The very next booking starts a new cycle.
        let second = create_booking(
            &pool,
            &first.client,
            find_service("srv_1").unwrap(),
            "2024-06-01".parse().unwrap(),
            "09:30",
            &contact(),
        )
        .await
        .unwrap();
        assert!(!second.booking.is_free_wash);
        assert_eq!(second.client.visits, 11);

        // The first booking's flag stays as written.
        let bookings = repo::get_bookings(&pool).await.unwrap();
        assert!(bookings.iter().any(|b| b.id == first.booking.id && b.is_free_wash));
    }

    #[actix_web::test]
    async fn contact_edits_land_on_the_profile() {
        let pool = seeded_pool().await;
        let client = repo::find_client_by_tg_id(&pool, 12345).await.unwrap().unwrap();

        let edited = ContactInfo {
            name: "Demo Renamed".to_string(),
            phone: "555-0199".to_string(),
            plate_number: "X 123 YZ".to_string(),
        };
        let outcome = create_booking(
            &pool,
            &client,
            find_service("srv_3").unwrap(),
            "2024-06-02".parse().unwrap(),
            "12:00",
            &edited,
        )
        .await
        .unwrap();

        assert_eq!(outcome.booking.client_phone, "555-0199");
        assert_eq!(outcome.booking.plate_number, "X 123 YZ");
        let stored = repo::find_client_by_tg_id(&pool, 12345).await.unwrap().unwrap();
        assert_eq!(stored.name, "Demo Renamed");
        assert_eq!(stored.phone, "555-0199");
        // Profile history survives the merge.
        assert_eq!(stored.visits, 10);
    }

    #[actix_web::test]
    async fn phone_only_clients_are_matched_by_phone() {
        let pool = seeded_pool().await;
        let client = repo::find_client_by_phone(&pool, "555-0102").await.unwrap().unwrap();
        assert_eq!(client.visits, 2);

        let contact = ContactInfo {
            name: client.name.clone(),
            phone: client.phone.clone(),
            plate_number: client.plate_number.clone(),
        };
        let outcome = create_booking(
            &pool,
            &client,
            find_service("srv_1").unwrap(),
            "2024-06-01".parse().unwrap(),
            "11:00",
            &contact,
        )
        .await
        .unwrap();

        assert!(!outcome.booking.is_free_wash);
        assert_eq!(outcome.client.visits, 3);
        assert!(outcome.client.is_vip);
    }
}
