use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    AnoteService, CoreError, FixedClock, MemoryStore, ObraService, ObraStore, SummaryService,
};
use obras_domain::{Anote, AnoteInput, ObraInput, RowId, MAX_AMOUNT};

fn clock_at(day: u32, hour: u32) -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 8, day, hour, 0, 0).unwrap())
}

fn amount(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

/// Records an expense on day `day` of August 2024 at 10:00 UTC.
fn record(store: &MemoryStore, obra_id: RowId, day: u32, reason: &str, units: i64) -> Anote {
    let input = AnoteInput::new(reason, amount(units));
    AnoteService::create(store, &clock_at(day, 10), obra_id, input).expect("create anote")
}

#[test]
fn obra_service_creates_and_trims_name() {
    let store = MemoryStore::new();
    let obra = ObraService::create(&store, ObraInput::new("  Casa Rojas ", amount(5000)))
        .expect("create obra");

    assert_eq!(obra.id, 1);
    assert_eq!(obra.name, "Casa Rojas");
    assert_eq!(ObraService::list(&store).unwrap().len(), 1);
}

#[test]
fn obra_service_rejects_blank_name_and_negative_budget() {
    let store = MemoryStore::new();
    let blank = ObraService::create(&store, ObraInput::new("   ", amount(10)));
    assert!(matches!(blank, Err(CoreError::Validation(_))));

    let negative = ObraService::create(&store, ObraInput::new("Muro", amount(-1)));
    assert!(matches!(negative, Err(CoreError::Validation(_))));
    assert!(store.list_obras().unwrap().is_empty());
}

#[test]
fn obra_service_updates_name_and_budget() {
    let store = MemoryStore::new();
    let obra = ObraService::create(&store, ObraInput::new("Losa", amount(100))).unwrap();

    let updated =
        ObraService::update(&store, obra.id, ObraInput::new("Losa 2do piso", amount(250)))
            .expect("update");
    assert_eq!(updated.name, "Losa 2do piso");
    assert_eq!(updated.budget, amount(250));

    let missing = ObraService::update(&store, 42, ObraInput::new("x", amount(1)));
    assert!(matches!(missing, Err(CoreError::ObraNotFound(42))));
}

#[test]
fn deleting_obra_cascades_to_its_anotes() {
    let store = MemoryStore::new();
    let clock = clock_at(5, 9);
    let keep = ObraService::create(&store, ObraInput::new("Keep", amount(10))).unwrap();
    let drop = ObraService::create(&store, ObraInput::new("Drop", amount(10))).unwrap();
    AnoteService::create(&store, &clock, drop.id, AnoteInput::new("a", amount(1))).unwrap();
    AnoteService::create(&store, &clock, drop.id, AnoteInput::new("b", amount(2))).unwrap();
    AnoteService::create(&store, &clock, keep.id, AnoteInput::new("c", amount(3))).unwrap();

    let removed = ObraService::delete(&store, drop.id).expect("delete");
    assert_eq!(removed, 2);

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.obras.len(), 1);
    assert_eq!(snapshot.anotes.len(), 1);
    assert!(snapshot.anotes.iter().all(|a| a.obra_id == keep.id));
    assert!(crate::storage::integrity_warnings(&snapshot).is_empty());
}

#[test]
fn anote_service_stamps_clock_time() {
    let store = MemoryStore::new();
    let clock = clock_at(6, 15);
    let obra = ObraService::create(&store, ObraInput::new("Techo", amount(900))).unwrap();

    let input = AnoteInput::new("Calamina", amount(120));
    let anote = AnoteService::create(&store, &clock, obra.id, input).expect("create anote");
    assert_eq!(anote.timestamp, clock.0);
    assert_eq!(anote.obra_id, obra.id);
}

#[test]
fn anote_service_requires_existing_obra() {
    let store = MemoryStore::new();
    let input = AnoteInput::new("x", amount(1));
    let result = AnoteService::create(&store, &clock_at(6, 9), 7, input);
    assert!(matches!(result, Err(CoreError::ObraNotFound(7))));

    let listed = AnoteService::list_for_obra(&store, 7);
    assert!(matches!(listed, Err(CoreError::ObraNotFound(7))));
}

#[test]
fn anote_update_keeps_timestamp_and_checks_owner() {
    let store = MemoryStore::new();
    let obra = ObraService::create(&store, ObraInput::new("Pozo", amount(300))).unwrap();
    let other = ObraService::create(&store, ObraInput::new("Otro", amount(300))).unwrap();
    let created = record(&store, obra.id, 5, "Bomba", 80);

    let updated = AnoteService::update(
        &store,
        obra.id,
        created.id,
        AnoteInput::new("Bomba sumergible", Decimal::new(8550, 2)),
    )
    .expect("update");
    assert_eq!(updated.timestamp, created.timestamp);
    assert_eq!(updated.amount, Decimal::new(8550, 2));

    let wrong_owner = AnoteService::delete(&store, other.id, created.id);
    assert!(matches!(wrong_owner, Err(CoreError::AnoteNotFound(_))));

    let blank = AnoteInput::new("", amount(1));
    let invalid = AnoteService::update(&store, obra.id, created.id, blank);
    assert!(matches!(invalid, Err(CoreError::Validation(_))));

    AnoteService::delete(&store, obra.id, created.id).expect("delete");
    assert!(store.list_anotes(obra.id).unwrap().is_empty());
}

#[test]
fn summary_service_recomputes_views_from_store() {
    let store = MemoryStore::new();
    let obra = ObraService::create(&store, ObraInput::new("Casa", amount(1000))).unwrap();
    record(&store, obra.id, 1, "Cemento", 100);
    record(&store, obra.id, 2, "Arena", 50);
    record(&store, obra.id, 6, "Fierro", 30);

    let now = Utc.with_ymd_and_hms(2024, 8, 7, 12, 0, 0).unwrap();
    let summary = SummaryService::project_summary(&store, obra.id, &now).expect("summary");

    assert_eq!(summary.totals.spent, amount(180));
    assert_eq!(summary.totals.remaining, amount(820));
    assert_eq!(summary.current_week.len(), 1);
    assert_eq!(summary.current_week_total, amount(30));
    assert_eq!(summary.weeks.len(), 2);
    assert_eq!(summary.weeks[0].total, amount(30));
    assert_eq!(summary.weeks[1].total, amount(150));

    record(&store, obra.id, 7, "Clavos", 5);
    let refreshed = SummaryService::totals(&store, obra.id).unwrap();
    assert_eq!(refreshed.spent, amount(185));
}

#[test]
fn amounts_at_or_above_the_ceiling_are_rejected() {
    let store = MemoryStore::new();
    let clock = clock_at(5, 9);
    let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);

    let budget = ObraService::create(&store, ObraInput::new("Torre", huge));
    assert!(matches!(budget, Err(CoreError::Validation(_))));
    let at_limit = ObraService::create(&store, ObraInput::new("Torre", MAX_AMOUNT));
    assert!(matches!(at_limit, Err(CoreError::Validation(_))));

    let obra = ObraService::create(&store, ObraInput::new("Torre", amount(1000))).unwrap();
    for _ in 0..2 {
        let result = AnoteService::create(&store, &clock, obra.id, AnoteInput::new("Acero", huge));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }
    let largest = MAX_AMOUNT - Decimal::new(1, 2);
    AnoteService::create(&store, &clock, obra.id, AnoteInput::new("Acero", largest))
        .expect("largest accepted amount");
    AnoteService::create(&store, &clock, obra.id, AnoteInput::new("Acero", largest))
        .expect("largest accepted amount");

    let totals = SummaryService::totals(&store, obra.id).expect("totals");
    assert_eq!(totals.spent, largest * Decimal::TWO);
    assert!(totals.is_over_budget());
}
