//! Calendar arithmetic helpers that bypass jiff's `Span` machinery.
//!
//! jiff `Span` operations are correct but relatively heavy for the solver's
//! month-granularity grid loops. The helpers here use direct calendar
//! arithmetic for month offsets — no `Span` allocation or normalisation
//! involved. Day-of-month is clamped to the target month's length, so
//! `add_months(Jan 31, 1)` lands on Feb 28/29.

use jiff::civil::Date;

/// Fast leap year check.
#[inline]
pub fn is_leap_year(year: i16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

/// Fast inline days-in-month calculation without creating a `jiff::civil::Date`.
#[inline]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    const DAYS: [i8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[(month - 1) as usize]
    }
}

/// Add a signed number of months to a date, clamping the day to the length
/// of the target month.
#[inline]
pub fn add_months(d: Date, months: i32) -> Date {
    let total = i32::from(d.year()) * 12 + (i32::from(d.month()) - 1) + months;
    let year = total.div_euclid(12) as i16;
    let month = (total.rem_euclid(12) + 1) as i8;
    let day = d.day().min(days_in_month(year, month));
    jiff::civil::date(year, month, day)
}

/// Whole-month offset between two dates, ignoring days (to - from).
///
/// Positive when `to` is in a later calendar month than `from`. This is the
/// offset fed to the postpone transform by the retirement-date grid search.
#[inline]
pub fn months_between(from: Date, to: Date) -> i32 {
    (i32::from(to.year()) - i32::from(from.year())) * 12
        + (i32::from(to.month()) - i32::from(from.month()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    #[test]
    fn test_add_months_basic() {
        assert_eq!(add_months(date(2025, 6, 15), 1), date(2025, 7, 15));
        assert_eq!(add_months(date(2025, 6, 15), 12), date(2026, 6, 15));
        assert_eq!(add_months(date(2025, 11, 15), 2), date(2026, 1, 15));
    }

    #[test]
    fn test_add_months_negative() {
        assert_eq!(add_months(date(2025, 1, 15), -1), date(2024, 12, 15));
        assert_eq!(add_months(date(2025, 6, 15), -24), date(2023, 6, 15));
    }

    #[test]
    fn test_add_months_day_clamping() {
        assert_eq!(add_months(date(2025, 1, 31), 1), date(2025, 2, 28));
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2025, 3, 31), 1), date(2025, 4, 30));
    }

    #[test]
    fn test_months_between() {
        assert_eq!(months_between(date(2025, 6, 1), date(2025, 6, 30)), 0);
        assert_eq!(months_between(date(2025, 6, 15), date(2026, 6, 15)), 12);
        assert_eq!(months_between(date(2025, 6, 15), date(2023, 6, 15)), -24);
        assert_eq!(months_between(date(2025, 12, 1), date(2026, 1, 1)), 1);
    }

    #[test]
    fn test_roundtrip_offsets() {
        let base = date(2030, 6, 30);
        for off in -36..=36 {
            let shifted = add_months(base, off);
            assert_eq!(months_between(base, shifted), off);
        }
    }
}
