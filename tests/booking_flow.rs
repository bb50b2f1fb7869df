//! End-to-end booking flows through the public API: linked calendars,
//! tiered pricing, payment, cancellation with cashback clawback.

use std::sync::Arc;

use ulid::Ulid;

use hearth::engine::{Engine, EngineError, InMemoryStore};
use hearth::ledger::{InMemoryLedger, LoyaltyLedger};
use hearth::model::*;

const TODAY: Day = 20_430; // some day in December

fn range(check_in: Day, check_out: Day) -> DateRange {
    DateRange::new(check_in, check_out).unwrap()
}

async fn engine_with(properties: Vec<Property>) -> (Engine, Arc<InMemoryStore>, Arc<InMemoryLedger>) {
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(InMemoryLedger::new());
    for p in properties {
        store.add_property(p);
    }
    let engine = Engine::new(store.clone(), ledger.clone()).await.unwrap();
    (engine, store, ledger)
}

#[tokio::test]
async fn linked_booking_lifecycle_end_to_end() {
    // Property p1 at 200/night, linked to whole-venue p4.
    let p1 = Ulid::new();
    let p4 = Ulid::new();
    let (engine, _store, ledger) = engine_with(vec![
        Property {
            id: p1,
            name: Some("Unit 1".into()),
            nightly_rate: 200,
            max_guests: 4,
            linked: vec![p4],
        },
        Property {
            id: p4,
            name: Some("Whole venue".into()),
            nightly_rate: 700,
            max_guests: 16,
            linked: vec![],
        },
    ])
    .await;

    let guest = Ulid::new();
    ledger.open_account(guest, 1_000);

    // Dec 10–12: two nights, no extras, Bronze.
    let check_in = TODAY + 7;
    let booking = engine
        .create_booking(
            Ulid::new(),
            p1,
            guest,
            range(check_in, check_in + 2),
            2,
            Extras::default(),
            MembershipTier::Bronze,
        )
        .await
        .unwrap();
    assert_eq!(booking.price.total, 400);

    engine.confirm_payment(booking.id).await.unwrap();
    // Debited 400, cashback 40 (10%).
    assert_eq!(ledger.balance(guest).await.unwrap(), 640);
    assert_eq!(ledger.lifetime_cashback(guest), 40);

    // Dec 11–13 on the linked venue collides.
    let rival = Ulid::new();
    ledger.open_account(rival, 5_000);
    let err = engine
        .create_booking(
            Ulid::new(),
            p4,
            rival,
            range(check_in + 1, check_in + 3),
            8,
            Extras::default(),
            MembershipTier::Gold,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unavailable { .. }));

    // Cancel five days before check-in: full refund, cashback clawed back.
    let refund = engine
        .cancel_booking(booking.id, check_in - 5)
        .await
        .unwrap();
    assert_eq!(refund.refund_amount, 400);
    assert_eq!(refund.cashback_deducted, 40);
    assert_eq!(refund.days_until_check_in, 5);
    assert_eq!(ledger.balance(guest).await.unwrap(), 1_000);
    assert_eq!(ledger.lifetime_cashback(guest), 0);

    // The venue's range is bookable again.
    engine
        .create_booking(
            Ulid::new(),
            p4,
            rival,
            range(check_in + 1, check_in + 3),
            8,
            Extras::default(),
            MembershipTier::Gold,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn extra_guest_fee_charged_per_excess_guest() {
    let property_id = Ulid::new();
    let (engine, _store, ledger) = engine_with(vec![Property {
        id: property_id,
        name: None,
        nightly_rate: 150,
        max_guests: 10,
        linked: vec![],
    }])
    .await;

    let guest = Ulid::new();
    ledger.open_account(guest, 2_000);

    // 15 guests, one night at 150: base 150 + 5 * 150 excess = 900.
    let booking = engine
        .create_booking(
            Ulid::new(),
            property_id,
            guest,
            range(TODAY + 10, TODAY + 11),
            15,
            Extras::default(),
            MembershipTier::Bronze,
        )
        .await
        .unwrap();
    assert_eq!(booking.price.extra_guest_fee, 750);
    assert_eq!(booking.price.total, 900);
}

#[tokio::test]
async fn booked_dates_reflect_reservations_for_display() {
    let property_id = Ulid::new();
    let (engine, _store, ledger) = engine_with(vec![Property {
        id: property_id,
        name: None,
        nightly_rate: 100,
        max_guests: 2,
        linked: vec![],
    }])
    .await;

    let guest = Ulid::new();
    ledger.open_account(guest, 1_000);
    engine
        .create_booking(
            Ulid::new(),
            property_id,
            guest,
            range(TODAY + 3, TODAY + 5),
            2,
            Extras::default(),
            MembershipTier::Silver,
        )
        .await
        .unwrap();

    let days = engine.booked_dates(property_id).await.unwrap();
    assert_eq!(days, vec![TODAY + 3, TODAY + 4, TODAY + 5]);
    for day in &days {
        assert!(
            !engine
                .is_free(property_id, &range(*day, day + 1))
                .await
                .unwrap()
        );
    }
}
