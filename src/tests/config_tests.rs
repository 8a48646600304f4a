// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use super::fixtures::config;
use crate::config::{CommitMode, Endianness, FlashConfig};
use crate::error::FlashError;

#[test]
fn test_default_config_is_valid() {
    let cfg = FlashConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.end_page(), 99);
    assert_eq!(cfg.commit_mode, CommitMode::Strict);
    assert_eq!(cfg.byte_order, Endianness::Little);
}

#[test]
fn test_region_bounds() {
    let cfg = config();
    assert_eq!(cfg.end_page(), 31);
    assert_eq!(cfg.min_address(), 32);
    assert_eq!(cfg.max_address(), 1024);
    assert_eq!(cfg.page_address(3), 96);
}

#[test]
fn test_validate_rejects_bad_geometry() {
    let cases = [
        FlashConfig { word_size: 0, ..config() },
        FlashConfig { page_size: 0, ..config() },
        FlashConfig { page_size: 36, ..config() },
        FlashConfig { page_count: 0, ..config() },
        FlashConfig { start_page: 250, page_count: 10, ..config() },
        // A 9-byte journal slot cannot live in a 6-byte page.
        FlashConfig { word_size: 3, page_size: 6, ..config() },
        FlashConfig { page_size: 32768, start_page: 200, page_count: 50, base_address: u32::MAX - 10, ..config() },
    ];

    for cfg in cases {
        match cfg.validate() {
            Err(FlashError::InvalidConfig(_)) => (),
            other => panic!("expected InvalidConfig for {:?}, got {:?}", cfg, other),
        }
    }
}

#[test]
fn test_last_page_may_be_255() {
    let cfg = FlashConfig { start_page: 250, page_count: 6, ..config() };
    cfg.validate().unwrap();
    assert_eq!(cfg.end_page(), 255);
}

#[cfg(feature = "serde")]
#[test]
fn test_config_from_json_fills_defaults() {
    let json = r#"{"word_size":8,"page_size":32,"page_count":31,"start_page":1,"byte_order":"big"}"#;
    let cfg: FlashConfig = serde_json::from_str(json).unwrap();

    assert_eq!(cfg.byte_order, Endianness::Big);
    assert_eq!(cfg.base_address, 0);
    assert_eq!(cfg.commit_mode, CommitMode::Strict);
    cfg.validate().unwrap();
}
