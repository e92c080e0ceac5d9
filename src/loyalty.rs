/// Every tenth wash is on the house.
pub const LOYALTY_THRESHOLD: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoyaltyStatus {
    /// Progress through the current cycle, 0-100.
    pub progress_percent: u32,
    /// Washes left until the free one, in `1..=threshold`.
    pub remaining: u32,
    /// Whether the very next visit completes a cycle.
    pub free_on_next_visit: bool,
}

/// Derive loyalty standing from a cumulative visit count. Callers persist
/// the incremented count themselves; the booking's free-wash flag must be
/// taken from the count as it stood *before* that booking's increment.
pub fn loyalty_status(visits: u32, threshold: u32) -> LoyaltyStatus {
    let threshold = threshold.max(1);
    let into_cycle = visits % threshold;
    LoyaltyStatus {
        progress_percent: (into_cycle * 100 / threshold).min(100),
        remaining: threshold - into_cycle,
        free_on_next_visit: (visits + 1) % threshold == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ninth_visit_earns_the_free_wash() {
        let status = loyalty_status(9, LOYALTY_THRESHOLD);
        assert!(status.free_on_next_visit);
        assert_eq!(status.remaining, 1);
        assert_eq!(status.progress_percent, 90);
    }

    #[test]
    fn cycle_resets_on_exact_multiples() {
        let status = loyalty_status(10, LOYALTY_THRESHOLD);
        assert!(!status.free_on_next_visit);
        assert_eq!(status.remaining, 10);
        assert_eq!(status.progress_percent, 0);
    }

    #[test]
    fn fresh_client_has_the_whole_cycle_ahead() {
        let status = loyalty_status(0, LOYALTY_THRESHOLD);
        assert!(!status.free_on_next_visit);
        assert_eq!(status.remaining, 10);
        assert_eq!(status.progress_percent, 0);
    }

    #[test]
    fn remaining_stays_within_cycle_bounds() {
        for visits in 0..35 {
            let status = loyalty_status(visits, LOYALTY_THRESHOLD);
            assert!((1..=LOYALTY_THRESHOLD).contains(&status.remaining));
            assert!(status.progress_percent <= 100);
        }
    }

    #[test]
    fn zero_threshold_is_treated_as_one() {
        let status = loyalty_status(5, 0);
        assert_eq!(status.remaining, 1);
        assert!(status.free_on_next_visit);
    }
}
