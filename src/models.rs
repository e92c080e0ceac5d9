use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Pending => "badge-pending",
            Self::Completed => "badge-completed",
            Self::Cancelled => "badge-cancelled",
        }
    }
}

/// A client profile. Keyed primarily by the platform user id, with the phone
/// number as the fallback key; `visits` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Client {
    pub tg_id: Option<i64>,
    pub username: Option<String>,
    pub name: String,
    pub phone: String,
    pub plate_number: String,
    pub visits: u32,
    pub is_vip: bool,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            tg_id: None,
            username: None,
            name: String::new(),
            phone: String::new(),
            plate_number: String::new(),
            visits: 0,
            is_vip: false,
        }
    }
}

/// A booking. Phone and plate are snapshots taken at creation time, and
/// `is_free_wash` is frozen once computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub tg_id: Option<i64>,
    pub service_id: String,
    pub date: NaiveDate,
    pub time_slot: String,
    pub client_phone: String,
    pub plate_number: String,
    pub status: BookingStatus,
    pub is_free_wash: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
pub struct Service {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price: u32,
    pub duration_minutes: u32,
}

const SERVICES: [Service; 4] = [
    Service {
        id: "srv_1",
        name: "Express Wash",
        description: "Quick exterior wash, wheel cleaning and dry.",
        price: 500,
        duration_minutes: 20,
    },
    Service {
        id: "srv_2",
        name: "Standard Shine",
        description: "Exterior wash, interior vacuum, windows and tire dressing.",
        price: 1200,
        duration_minutes: 45,
    },
    Service {
        id: "srv_3",
        name: "Premium Detailing",
        description: "Full detail wash, hand wax, deep interior clean and leather care.",
        price: 3500,
        duration_minutes: 90,
    },
    Service {
        id: "srv_4",
        name: "Ceramic Shield",
        description: "Paint correction and a one-year ceramic coating.",
        price: 15000,
        duration_minutes: 240,
    },
];

pub fn service_catalog() -> &'static [Service] {
    &SERVICES
}

pub fn find_service(id: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|service| service.id == id)
}

pub fn format_price(price: u32) -> String {
    format!("{price} ₽")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_round_trips_known_values() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            let encoded = serde_json::to_string(&status).unwrap();
            let raw = encoded.trim_matches('"');
            assert_eq!(BookingStatus::parse(raw), Some(status));
        }
        assert_eq!(BookingStatus::parse("declined"), None);
    }

    #[test]
    fn catalog_ids_resolve() {
        for service in service_catalog() {
            assert_eq!(find_service(service.id).unwrap().name, service.name);
        }
        assert!(find_service("srv_99").is_none());
    }
}
