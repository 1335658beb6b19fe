use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

/// The contiguous window of `days` dates starting at `start`, inclusive.
/// Non-positive `days` yields an empty window.
pub fn window_dates(start: NaiveDate, days: i64) -> Vec<NaiveDate> {
    if days <= 0 {
        return Vec::new();
    }
    (0..days).map(|offset| start + Duration::days(offset)).collect()
}

/// Dates in the window with no recorded forecast, in window order.
///
/// Walks the window from the first day, skipping any date already in `have`,
/// and stops once `missing` gaps have been collected or the window is
/// exhausted.
pub fn missing_dates(
    start: NaiveDate,
    days: i64,
    have: &HashSet<NaiveDate>,
    missing: usize,
) -> Vec<NaiveDate> {
    let mut gaps = Vec::with_capacity(missing);
    for date in window_dates(start, days) {
        if have.contains(&date) {
            continue;
        }
        gaps.push(date);
        if gaps.len() == missing {
            break;
        }
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn window_covers_exactly_n_consecutive_dates() {
        let dates = window_dates(day(1), 5);
        assert_eq!(dates.len(), 5);
        assert_eq!(dates.first(), Some(&day(1)));
        assert_eq!(dates.last(), Some(&day(5)));
        assert!(dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn non_positive_days_yield_empty_window() {
        assert!(window_dates(day(1), 0).is_empty());
        assert!(window_dates(day(1), -3).is_empty());
    }

    #[test]
    fn missing_dates_skip_recorded_days() {
        let have: HashSet<NaiveDate> = [day(1), day(3)].into_iter().collect();
        let gaps = missing_dates(day(1), 5, &have, 3);
        assert_eq!(gaps, vec![day(2), day(4), day(5)]);
    }

    #[test]
    fn missing_dates_stop_at_requested_count() {
        let have = HashSet::new();
        let gaps = missing_dates(day(1), 10, &have, 4);
        assert_eq!(gaps, vec![day(1), day(2), day(3), day(4)]);
    }

    #[test]
    fn fully_recorded_window_has_no_gaps() {
        let have: HashSet<NaiveDate> = window_dates(day(1), 5).into_iter().collect();
        assert!(missing_dates(day(1), 5, &have, 5).is_empty());
    }
}
