use chrono::NaiveDate;

use crate::models::{Booking, BookingStatus};
use crate::settings::Settings;

/// Compute the bookable time slots for one day.
///
/// Candidate start times run from `start_hour` up to (but excluding)
/// `end_hour`, stepping by `slot_duration` minutes; a candidate stays in the
/// result while fewer than `posts_count` of the supplied bookings occupy it.
/// `bookings_on_date` must already be narrowed to the requested date with
/// cancelled bookings removed, see [`active_on_date`].
pub fn compute_slots(settings: &Settings, bookings_on_date: &[&Booking]) -> Vec<String> {
    let start_minutes = settings.start_hour * 60;
    let end_minutes = settings.end_hour * 60;
    let duration = if settings.slot_duration >= 1 {
        settings.slot_duration
    } else {
        30
    };
    let capacity = if settings.posts_count >= 1 {
        settings.posts_count as usize
    } else {
        1
    };

    let mut slots = Vec::new();
    let mut current = start_minutes;
    while current < end_minutes {
        let time = format!("{:02}:{:02}", current / 60, current % 60);
        let occupied = bookings_on_date
            .iter()
            .filter(|booking| booking.time_slot == time)
            .count();
        if occupied < capacity {
            slots.push(time);
        }
        current += duration;
    }
    slots
}

/// The bookings that count toward capacity on a date: everything scheduled
/// for that day that has not been cancelled.
pub fn active_on_date<'a>(bookings: &'a [Booking], date: NaiveDate) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|booking| booking.date == date && booking.status != BookingStatus::Cancelled)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn settings(start: u32, end: u32, duration: u32, posts: u32) -> Settings {
        Settings {
            start_hour: start,
            end_hour: end,
            slot_duration: duration,
            posts_count: posts,
            ..Settings::default()
        }
    }

    fn booking_at(date: &str, time: &str, status: BookingStatus) -> Booking {
        Booking {
            id: format!("bk-{time}"),
            tg_id: None,
            service_id: "srv_1".to_string(),
            date: date.parse().unwrap(),
            time_slot: time.to_string(),
            client_phone: "555-0101".to_string(),
            plate_number: "A 777 AA".to_string(),
            status,
            is_free_wash: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_day_with_no_bookings() {
        let slots = compute_slots(&settings(9, 21, 30, 2), &[]);
        assert_eq!(slots.len(), 24);
        assert_eq!(slots.first().unwrap(), "09:00");
        assert_eq!(slots.last().unwrap(), "20:30");
    }

    #[test]
    fn slots_are_strictly_increasing_and_zero_padded() {
        let slots = compute_slots(&settings(8, 11, 45, 1), &[]);
        assert_eq!(slots, vec!["08:00", "08:45", "09:30", "10:15"]);
        for pair in slots.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn partial_final_step_is_omitted() {
        // 9:00-10:00 with 45-minute slots: 09:45 still starts before the
        // closing bound, nothing after it does.
        let slots = compute_slots(&settings(9, 10, 45, 1), &[]);
        assert_eq!(slots, vec!["09:00", "09:45"]);
    }

    #[test]
    fn inverted_hours_yield_no_slots() {
        assert!(compute_slots(&settings(21, 9, 30, 2), &[]).is_empty());
        assert!(compute_slots(&settings(12, 12, 30, 2), &[]).is_empty());
    }

    #[test]
    fn invalid_duration_and_capacity_fall_back() {
        let slots = compute_slots(&settings(9, 12, 0, 0), &[]);
        assert_eq!(slots.len(), 6);
    }

    #[test]
    fn slot_disappears_at_capacity_and_returns_after_cancellation() {
        let config = settings(9, 21, 30, 2);
        let mut bookings = vec![
            booking_at("2024-06-01", "10:00", BookingStatus::Pending),
            booking_at("2024-06-01", "10:00", BookingStatus::Pending),
        ];

        let date = "2024-06-01".parse().unwrap();
        let active = active_on_date(&bookings, date);
        let slots = compute_slots(&config, &active);
        assert!(!slots.contains(&"10:00".to_string()));
        assert!(slots.contains(&"10:30".to_string()));

        bookings[0].status = BookingStatus::Cancelled;
        let active = active_on_date(&bookings, date);
        let slots = compute_slots(&config, &active);
        assert!(slots.contains(&"10:00".to_string()));
    }

    #[test]
    fn other_dates_do_not_count_toward_capacity() {
        let bookings = vec![
            booking_at("2024-06-01", "10:00", BookingStatus::Pending),
            booking_at("2024-06-02", "10:00", BookingStatus::Pending),
        ];
        let active = active_on_date(&bookings, "2024-06-01".parse().unwrap());
        assert_eq!(active.len(), 1);
    }

    #[test]
    fn repeated_calls_return_identical_output() {
        let config = settings(9, 21, 30, 1);
        let bookings = vec![booking_at("2024-06-01", "09:30", BookingStatus::Pending)];
        let active = active_on_date(&bookings, "2024-06-01".parse().unwrap());
        let first = compute_slots(&config, &active);
        let second = compute_slots(&config, &active);
        assert_eq!(first, second);
    }
}
