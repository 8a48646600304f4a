// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::fixtures::{config, engine};
use crate::config::MAX_INDICES;
use crate::error::{FlashError, RegistrationError};
use crate::index::registry::IndexRegistry;
use crate::index::{Index, IndexId};

fn registration(err: FlashError) -> RegistrationError {
    match err {
        FlashError::Registration(e) => e,
        other => panic!("expected a registration error, got {:?}", other),
    }
}

#[test]
fn test_ids_are_sequential() {
    let mut engine = engine();

    assert_eq!(engine.register(1, 2).unwrap(), IndexId(0));
    assert_eq!(engine.register(3, 4).unwrap(), IndexId(1));
    assert_eq!(engine.register(5, 8).unwrap(), IndexId(2));
    assert_eq!(engine.index_count(), 3);

    let ids: Vec<IndexId> = engine.indices().map(|idx| idx.id).collect();
    assert_eq!(ids, vec![IndexId(0), IndexId(1), IndexId(2)]);
}

#[test]
fn test_layout_of_new_index() {
    let mut engine = engine();
    let id = engine.register(1, 3).unwrap();
    let index = engine.index(id).unwrap();

    assert_eq!(index.index_page, 1);
    assert_eq!(index.start_page, 2);
    assert_eq!(index.end_page, 3);
    assert_eq!(index.min_index_address, 32);
    assert_eq!(index.max_index_address, 64);
    assert_eq!(index.min_data_address, 64);
    assert_eq!(index.max_data_address, 128);
    assert_eq!(index.head, 64);
    assert_eq!(index.tail, 64);
    assert_eq!(index.data_page_count(), 2);
    assert_eq!(index.data_len(), 64);
}

#[test]
fn test_overlap_is_rejected_both_ways() {
    let mut engine = engine();
    engine.register(4, 6).unwrap();

    // Shares the lower boundary page.
    let err = registration(engine.register(2, 4).unwrap_err());
    assert_eq!(err, RegistrationError::Overlap { start: 2, end: 4, existing: IndexId(0) });

    // Shares the upper boundary page.
    let err = registration(engine.register(6, 9).unwrap_err());
    assert_eq!(err, RegistrationError::Overlap { start: 6, end: 9, existing: IndexId(0) });

    // Adjacent ranges are fine.
    engine.register(2, 3).unwrap();
    engine.register(7, 8).unwrap();
}

#[test]
fn test_containing_range_is_rejected() {
    let mut engine = engine();
    engine.register(3, 4).unwrap();

    let err = registration(engine.register(1, 6).unwrap_err());
    assert_eq!(err, RegistrationError::Overlap { start: 1, end: 6, existing: IndexId(0) });

    let mut engine = super::fixtures::engine();
    engine.register(1, 6).unwrap();
    assert!(engine.register(3, 4).is_err());
}

#[test]
fn test_range_shape_errors() {
    let mut engine = engine();

    let err = registration(engine.register(5, 4).unwrap_err());
    assert_eq!(err, RegistrationError::InvertedRange { start: 5, end: 4 });

    let err = registration(engine.register(5, 5).unwrap_err());
    assert_eq!(err, RegistrationError::TooFewPages { start: 5, end: 5 });

    assert_eq!(engine.index_count(), 0);
}

#[test]
fn test_range_must_be_inside_region() {
    let mut engine = engine();
    let end = config().end_page();

    let err = registration(engine.register(0, 2).unwrap_err());
    assert_eq!(
        err,
        RegistrationError::PagesOutOfRange { start: 0, end: 2, region_start: 1, region_end: end }
    );

    let err = registration(engine.register(1, end + 1).unwrap_err());
    assert!(matches!(err, RegistrationError::PagesOutOfRange { .. }));

    // The last user page itself may be used.
    engine.register(end - 1, end).unwrap();
}

#[test]
fn test_registry_capacity() {
    let mut engine = engine();
    for i in 0..MAX_INDICES as u8 {
        engine.register(1 + i * 2, 2 + i * 2).unwrap();
    }

    let err = registration(engine.register(20, 22).unwrap_err());
    assert_eq!(err, RegistrationError::RegistryFull(MAX_INDICES));
    assert_eq!(engine.index_count(), MAX_INDICES);
}

#[test]
fn test_failed_registration_does_not_consume_id() {
    let mut engine = engine();
    engine.register(1, 2).unwrap();
    assert!(engine.register(2, 3).is_err());

    assert_eq!(engine.register(3, 4).unwrap(), IndexId(1));
}

#[test]
fn test_unknown_index() {
    let mut engine = engine();
    engine.register(1, 2).unwrap();

    assert_eq!(engine.index(IndexId(1)), Err(FlashError::UnknownIndex(IndexId(1))));
    assert_eq!(engine.head(IndexId(7)), Err(FlashError::UnknownIndex(IndexId(7))));
}

#[test]
fn test_registry_standalone() {
    let cfg = config();
    let mut registry = IndexRegistry::new();
    assert!(registry.is_empty());

    let id = registry.register(&cfg, 10, 12).unwrap();
    assert_eq!(registry.get(id).unwrap(), &Index::new(id, 10, 12, cfg.page_size));
    assert!(!registry.is_full());

    registry.get_mut(id).unwrap().head += 8;
    assert_eq!(registry.get(id).unwrap().head, 11 * 32 + 8);

    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.register(&cfg, 10, 12).unwrap(), IndexId(0));
}

#[test]
fn test_wrap_folds_into_data_window() {
    let index = Index::new(IndexId(0), 1, 3, 32);

    assert_eq!(index.wrap(96), 96);
    assert_eq!(index.wrap(128), 64);
    assert_eq!(index.wrap(136), 72);
}
