//! QueryEngine Tests
//!
//! Filter composition, ordering and determinism over the shared corpus.
//!
use chrono::Duration;
use docflow_core::config::MAX_ARCHIVE_MIN_AGE_DAYS;
use docflow_core::{
    Direction, Document, DocumentType, Filter, QueryEngine, QuerySpec, RawQuery, SortField,
    Status, StoreConfig,
};
use docflow_test_utils::{corpus, epoch, make_document, seeded_store};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn ids(rows: &[Document]) -> Vec<String> {
    rows.iter().map(|d| d.id.to_string()).collect()
}

#[test]
fn test_status_and_type_compose_with_and() {
    let snapshot = corpus();
    let spec = QuerySpec::new()
        .with_status(Status::Approved)
        .with_type(DocumentType::Invoice);

    let rows = QueryEngine::query(&snapshot, &spec);
    let expected: Vec<String> = snapshot
        .iter()
        .filter(|d| d.status == Status::Approved && d.doc_type == DocumentType::Invoice)
        .map(|d| d.id.to_string())
        .collect();

    assert_eq!(ids(&rows), expected);
    assert_eq!(ids(&rows), vec!["d02", "d08"]);
}

#[test]
fn test_department_queue_view() {
    let (store, _clock) = seeded_store();
    let spec = QuerySpec::new()
        .with_department("finance")
        .with_sort(SortField::SubmittedAt, Direction::Asc);

    let rows = QueryEngine::query(&store.list(), &spec);
    assert_eq!(ids(&rows), vec!["d12", "d11", "d08", "d03", "d02"]);
}

#[test]
fn test_identical_timestamps_sort_by_id_regardless_of_insertion() {
    let a = make_document("b-2", DocumentType::Report, "IT", Status::Pending, 3);
    let b = make_document("a-1", DocumentType::Report, "IT", Status::Pending, 3);
    let c = make_document("c-3", DocumentType::Report, "IT", Status::Pending, 3);

    let forward = vec![a.clone(), b.clone(), c.clone()];
    let backward = vec![c, b, a];
    let spec = QuerySpec::new();

    assert_eq!(ids(&QueryEngine::query(&forward, &spec)), vec!["a-1", "b-2", "c-3"]);
    assert_eq!(ids(&QueryEngine::query(&backward, &spec)), vec!["a-1", "b-2", "c-3"]);
}

#[test]
fn test_archive_view_selects_old_finalized() {
    let mut snapshot = corpus();
    snapshot.push(make_document(
        "arch-1",
        DocumentType::Report,
        "Finance",
        Status::Approved,
        24 * 90,
    ));
    snapshot.push(make_document(
        "arch-2",
        DocumentType::Policy,
        "IT",
        Status::Escalated,
        24 * 180,
    ));

    let spec = QuerySpec::new().archived(epoch(), Duration::days(30));
    assert_eq!(ids(&QueryEngine::query(&snapshot, &spec)), vec!["arch-1"]);
}

#[test]
fn test_archive_age_from_config_never_panics() {
    assert!(StoreConfig::from_toml_str("archive_min_age_days = 4294967295").is_err());

    let widest = StoreConfig::new().with_archive_min_age_days(MAX_ARCHIVE_MIN_AGE_DAYS);
    widest.validate().unwrap();
    let spec = QuerySpec::new().archived(epoch(), widest.archive_min_age());
    assert!(QueryEngine::query(&corpus(), &spec).is_empty());

    let spec = QuerySpec::new().archived(epoch(), Duration::days(i64::from(u32::MAX)));
    assert_eq!(QueryEngine::count(&corpus(), &spec), 0);
}

#[test]
fn test_query_does_not_touch_snapshot() {
    let snapshot = corpus();
    let before = snapshot.clone();
    let _ = QueryEngine::query(
        &snapshot,
        &QuerySpec::new().with_sort(SortField::Name, Direction::Asc),
    );
    assert_eq!(snapshot, before);
}

#[test]
fn test_unknown_status_widens_to_all() {
    let raw = RawQuery {
        status: Some("archived".to_string()),
        ..RawQuery::default()
    };
    let spec = QuerySpec::from_raw(&raw);
    assert_eq!(spec.status, Filter::All);
    assert_eq!(QueryEngine::count(&corpus(), &spec), corpus().len());
    assert!(raw.validate_strict().is_err());
}

fn any_spec() -> impl Strategy<Value = QuerySpec> {
    let status = prop_oneof![
        Just(Filter::All),
        proptest::sample::select(Status::ALL.to_vec()).prop_map(Filter::Only),
    ];
    let doc_type = prop_oneof![
        Just(Filter::All),
        proptest::sample::select(DocumentType::ALL.to_vec()).prop_map(Filter::Only),
    ];
    let field = proptest::sample::select(vec![
        SortField::SubmittedAt,
        SortField::LastUpdated,
        SortField::Priority,
        SortField::Name,
    ]);
    let direction = prop_oneof![Just(Direction::Asc), Just(Direction::Desc)];
    let text = proptest::option::of("[a-z]{0,3}");

    (status, doc_type, field, direction, text).prop_map(|(status, doc_type, field, direction, text)| {
        let mut spec = QuerySpec::new().with_sort(field, direction);
        spec.status = status;
        spec.doc_type = doc_type;
        spec.text_search = text;
        spec
    })
}

proptest! {
    #[test]
    fn prop_query_is_idempotent_and_order_independent(
        spec in any_spec(),
        shuffle in Just(corpus()).prop_shuffle(),
    ) {
        let snapshot = corpus();
        let first = QueryEngine::query(&snapshot, &spec);
        let second = QueryEngine::query(&snapshot, &spec);
        let shuffled = QueryEngine::query(&shuffle, &spec);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &shuffled);
        prop_assert_eq!(first.len(), QueryEngine::count(&snapshot, &spec));
    }

    #[test]
    fn prop_results_satisfy_every_filter(spec in any_spec()) {
        for doc in QueryEngine::query(&corpus(), &spec) {
            if let Filter::Only(s) = spec.status {
                prop_assert_eq!(doc.status, s);
            }
            if let Filter::Only(t) = spec.doc_type {
                prop_assert_eq!(doc.doc_type, t);
            }
        }
    }
}
