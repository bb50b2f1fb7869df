use std::collections::BTreeSet;

use ulid::Ulid;

use crate::model::*;

use super::EngineError;

// ── Availability Algorithm ────────────────────────────────────────

/// First reservation in the group that overlaps `range`, if any.
/// Inclusive overlap on both ends: back-to-back stays conflict.
pub fn find_conflict(calendar: &GroupCalendar, range: &DateRange) -> Option<Ulid> {
    calendar.overlapping(range).next().map(|r| r.booking_id)
}

/// True iff no reservation anywhere in the linkage group overlaps `range`.
pub fn is_free(calendar: &GroupCalendar, range: &DateRange) -> bool {
    find_conflict(calendar, range).is_none()
}

/// Insert a reservation, failing with `Conflict` if the range is taken.
///
/// Check-then-act: callers must hold the group's write lock across the free
/// check and this insert, so a lost race surfaces here and nowhere later.
pub fn reserve(calendar: &mut GroupCalendar, reservation: Reservation) -> Result<(), EngineError> {
    if let Some(holder) = find_conflict(calendar, &reservation.range) {
        return Err(EngineError::Conflict(holder));
    }
    calendar.insert(reservation);
    Ok(())
}

/// Ordered union of days covered by the group's reservations.
/// Every reservation still in the calendar counts, including confirmed stays
/// whose checkout has elapsed but which have not been promoted yet.
pub fn booked_days(calendar: &GroupCalendar) -> Vec<Day> {
    let mut days = BTreeSet::new();
    for r in &calendar.reservations {
        days.extend(r.range.days());
    }
    days.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(check_in: Day, check_out: Day) -> DateRange {
        DateRange::new(check_in, check_out).unwrap()
    }

    fn reservation(check_in: Day, check_out: Day) -> Reservation {
        Reservation {
            booking_id: Ulid::new(),
            property_id: Ulid::new(),
            range: range(check_in, check_out),
        }
    }

    // ── reserve / is_free ────────────────────────────────

    #[test]
    fn disjoint_ranges_both_reserve() {
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(100, 102)).unwrap();
        reserve(&mut cal, reservation(103, 105)).unwrap();
        assert_eq!(cal.reservations.len(), 2);
    }

    #[test]
    fn overlapping_range_is_rejected() {
        let mut cal = GroupCalendar::new();
        let first = reservation(100, 103);
        let holder = first.booking_id;
        reserve(&mut cal, first).unwrap();

        let err = reserve(&mut cal, reservation(102, 105)).unwrap_err();
        assert!(matches!(err, EngineError::Conflict(id) if id == holder));
        assert_eq!(cal.reservations.len(), 1);
    }

    #[test]
    fn checkout_day_checkin_is_rejected() {
        // A stay ending on day 103 still occupies the night into 103, so a
        // new stay starting on 103 conflicts.
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(100, 103)).unwrap();
        assert!(reserve(&mut cal, reservation(103, 105)).is_err());
        assert!(reserve(&mut cal, reservation(104, 106)).is_ok());
    }

    #[test]
    fn is_free_matches_reserve_outcome() {
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(100, 105)).unwrap();
        assert!(!is_free(&cal, &range(104, 108)));
        assert!(is_free(&cal, &range(106, 108)));
    }

    #[test]
    fn contained_and_spanning_ranges_conflict() {
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(100, 110)).unwrap();
        assert!(!is_free(&cal, &range(103, 105))); // inside
        assert!(!is_free(&cal, &range(90, 120))); // spanning
    }

    // ── booked_days ────────────────────────────────────

    #[test]
    fn booked_days_unions_ranges_in_order() {
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(200, 202)).unwrap();
        reserve(&mut cal, reservation(100, 101)).unwrap();
        assert_eq!(booked_days(&cal), vec![100, 101, 200, 201, 202]);
    }

    #[test]
    fn booked_days_deduplicates_adjacent_stays() {
        let mut cal = GroupCalendar::new();
        // Two reservations of different properties in one group may cover
        // the same day.
        cal.insert(reservation(100, 103));
        cal.insert(reservation(102, 105));
        assert_eq!(booked_days(&cal), vec![100, 101, 102, 103, 104, 105]);
    }

    #[test]
    fn booked_days_consistent_with_is_free() {
        let mut cal = GroupCalendar::new();
        reserve(&mut cal, reservation(100, 103)).unwrap();
        reserve(&mut cal, reservation(110, 112)).unwrap();

        let days = booked_days(&cal);
        for day in 95..120 {
            let covered = cal.reservations.iter().any(|r| r.range.contains(day));
            assert_eq!(days.contains(&day), covered, "day {day}");
        }
    }

    #[test]
    fn booked_days_empty_calendar() {
        assert!(booked_days(&GroupCalendar::new()).is_empty());
    }
}
