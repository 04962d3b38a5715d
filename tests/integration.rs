//! Integration tests for the user-agent decoder.

use std::io::Write;
use std::sync::Arc;
use std::thread;

use serde_json::json;
use tempfile::NamedTempFile;

use ua_decoder::{Decoder, DecoderConfig, DecoderError, Record};

const RULES: &str = r#"
user_agent_parsers:
  - regex: '(iPhone|iPad|iPod).*Version/(\d+)\.(\d+)(?:\.(\d+))?.* Safari'
    family_replacement: 'Mobile Safari'
  - regex: '(Firefox)/(\d+)\.(\d+)(?:\.(\d+))?'
  - regex: 'Chrome/(\d+)\.(\d+)\.(\d+)'
    family_replacement: 'Chrome'
    v1_replacement: '$1'
    v2_replacement: '$2'
    v3_replacement: '$3'
os_parsers:
  - regex: '(iPhone OS) (\d+)_(\d+)(?:_(\d+))?'
    os_replacement: 'iOS'
  - regex: '(Windows NT) (\d+)\.(\d+)'
    os_replacement: 'Windows'
device_parsers:
  - regex: '(iPhone)'
  - regex: '(iPad)'
"#;

const IPHONE_UA: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 9_1 like Mac OS X) \
     AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13B143 Safari/601.1";

fn rules_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp rule file");
    file.write_all(RULES.as_bytes()).expect("write rules");
    file.flush().expect("flush rules");
    file
}

/// The temp file must outlive the decoder's construction, so it is
/// returned alongside.
fn decoder(cache_size: usize) -> (Decoder, NamedTempFile) {
    let file = rules_file();
    let decoder = Decoder::new(
        DecoderConfig::new()
            .source_field("user_agent")
            .rules_path(file.path())
            .cache_size(cache_size)
            .build(),
    )
    .expect("construct decoder");
    (decoder, file)
}

fn ua_record(raw: &str) -> Record {
    let mut record = Record::new();
    record.insert("user_agent", json!(raw));
    record
}

#[test]
fn test_iphone_classification() {
    let (decoder, _rules) = decoder(128);

    let mut record = ua_record(IPHONE_UA);
    decoder.decode(&mut record);

    assert_eq!(record.get_str("ua_name"), Some("Mobile Safari"));
    assert_eq!(record.get_str("ua_major"), Some("9"));
    assert_eq!(record.get_str("ua_minor"), Some("0"));
    assert_eq!(record.get_str("ua_os_name"), Some("iOS"));
    assert_eq!(record.get_str("ua_os"), Some("iOS 9.1"));
    assert_eq!(record.get_str("ua_os_major"), Some("9"));
    assert_eq!(record.get_str("ua_os_minor"), Some("1"));
    assert_eq!(record.get_str("ua_device"), Some("iPhone"));

    // Empty sub-fields are suppressed.
    assert!(!record.contains("ua_patch"));
    assert!(!record.contains("ua_os_patch"));
    assert!(!record.contains("ua_os_patch_minor"));
}

#[test]
fn test_cached_and_uncached_results_match() {
    let (cached, _r1) = decoder(128);
    let (uncached, _r2) = decoder(0);

    let mut with_cache = ua_record(IPHONE_UA);
    cached.decode(&mut with_cache);
    // Decode again so the cached decoder answers from the cache.
    let mut with_cache_hit = ua_record(IPHONE_UA);
    cached.decode(&mut with_cache_hit);

    let mut without_cache = ua_record(IPHONE_UA);
    uncached.decode(&mut without_cache);

    assert_eq!(with_cache, without_cache);
    assert_eq!(with_cache, with_cache_hit);
}

#[test]
fn test_cache_transparency_and_counters() {
    let (decoder, _rules) = decoder(128);

    let (first, hit) = decoder.resolve(IPHONE_UA);
    assert!(!hit);
    let (second, hit) = decoder.resolve(IPHONE_UA);
    assert!(hit);
    assert_eq!(first, second);

    let report = decoder.report();
    assert_eq!(report.process_message_count, 2);
    assert_eq!(report.process_cache_hit, 1);
    assert_eq!(report.process_cache_miss, 1);
    assert_eq!(report.process_cache_hit_ratio, 50.0);
    assert_eq!(report.process_cache_size, 1);
    assert_eq!(report.process_cache_max_size, 128);
}

#[test]
fn test_counter_conservation() {
    let (decoder, _rules) = decoder(8);

    let count = 40;
    for i in 0..count {
        // Repeats every 10 keys so the sequence mixes hits and misses.
        decoder.resolve(&format!("Mozilla/5.0 Firefox/{}.0", i % 10));
    }

    let report = decoder.report();
    assert_eq!(report.process_message_count, count);
    assert_eq!(report.process_cache_hit + report.process_cache_miss, count);
}

#[test]
fn test_capacity_invariant() {
    let (decoder, _rules) = decoder(8);

    for i in 0..50 {
        decoder.resolve(&format!("Mozilla/5.0 Firefox/{}.0", i));
        assert!(decoder.report().process_cache_size <= 8);
    }

    let report = decoder.report();
    assert_eq!(report.process_cache_size, 8);
    assert_eq!(report.process_cache_eviction, 42);
}

#[test]
fn test_two_tier_eviction_scenario() {
    let (decoder, _rules) = decoder(2);

    for key in ["agent A", "agent B", "agent C", "agent A"] {
        decoder.resolve(key);
        assert!(decoder.report().process_cache_size <= 2);
    }

    // All four resolves missed: C evicted the oldest once-seen entry (A),
    // and re-resolving A evicted B.
    let report = decoder.report();
    assert_eq!(report.process_message_count, 4);
    assert_eq!(report.process_cache_miss, 4);
    assert!(report.process_cache_eviction >= 1);
}

#[test]
fn test_reused_entry_survives_one_off_burst() {
    let (decoder, _rules) = decoder(2);

    // Resolve twice to promote out of the once-seen queue.
    decoder.resolve("agent hot");
    let (_, hit) = decoder.resolve("agent hot");
    assert!(hit);

    for i in 0..5 {
        decoder.resolve(&format!("agent noise {}", i));
    }

    let (_, hit) = decoder.resolve("agent hot");
    assert!(hit, "promoted entry was flushed by one-off keys");
}

#[test]
fn test_pass_through_missing_field() {
    let (decoder, _rules) = decoder(128);

    let mut record = Record::new();
    record.insert("message", json!("no user agent here"));
    let original = record.clone();

    decoder.decode(&mut record);
    assert_eq!(record, original);

    // Idempotent: a second pass is also a no-op.
    decoder.decode(&mut record);
    assert_eq!(record, original);

    assert_eq!(decoder.report().process_message_count, 0);
}

#[test]
fn test_pass_through_non_string_field() {
    let (decoder, _rules) = decoder(128);

    let mut record = Record::new();
    record.insert("user_agent", json!(42));
    let original = record.clone();

    decoder.decode(&mut record);
    assert_eq!(record, original);
    assert_eq!(decoder.report().process_message_count, 0);
}

#[test]
fn test_empty_string_is_a_valid_input() {
    let (decoder, _rules) = decoder(128);

    let mut record = ua_record("");
    decoder.decode(&mut record);

    // Classifies to an all-empty result: no fields attached.
    assert_eq!(record.len(), 1);

    // But it is a real cache entry.
    let (_, hit) = decoder.resolve("");
    assert!(hit);
    assert_eq!(decoder.report().process_message_count, 2);
}

#[test]
fn test_empty_subfields_are_suppressed() {
    let (decoder, _rules) = decoder(128);

    // Firefox on an unknown OS and device.
    let mut record = ua_record("Mozilla/5.0 (X11) Firefox/102.0");
    decoder.decode(&mut record);

    assert_eq!(record.get_str("ua_name"), Some("Firefox"));
    assert!(!record.contains("ua_device"));
    assert!(!record.contains("ua_os_name"));
    assert!(!record.contains("ua_os"));
}

#[test]
fn test_existing_field_is_preserved() {
    let (decoder, _rules) = decoder(128);

    let mut record = ua_record(IPHONE_UA);
    record.insert("ua_name", json!("preset"));

    decoder.decode(&mut record);

    // The conflicting attach is absorbed; everything else lands.
    assert_eq!(record.get_str("ua_name"), Some("preset"));
    assert_eq!(record.get_str("ua_device"), Some("iPhone"));
}

#[test]
fn test_concurrent_decoding() {
    let (decoder, _rules) = decoder(32);
    let decoder = Arc::new(decoder);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let decoder = Arc::clone(&decoder);
            thread::spawn(move || {
                for i in 0..250 {
                    let raw = format!("Mozilla/5.0 Firefox/{}.0", (t * 250 + i) % 50);
                    let mut record = ua_record(&raw);
                    decoder.decode(&mut record);
                    assert_eq!(record.get_str("ua_name"), Some("Firefox"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    let report = decoder.report();
    assert_eq!(report.process_message_count, 2000);
    assert_eq!(report.process_cache_hit + report.process_cache_miss, 2000);
    assert!(report.process_cache_size <= 32);
}

#[test]
fn test_startup_failures() {
    // Empty source field.
    let err = Decoder::new(DecoderConfig::new().build()).unwrap_err();
    assert!(matches!(err, DecoderError::Config(_)));

    // Missing rule file.
    let err = Decoder::new(
        DecoderConfig::new()
            .source_field("user_agent")
            .rules_path("/nonexistent/regexes.yaml")
            .build(),
    )
    .unwrap_err();
    assert!(matches!(err, DecoderError::Init(_)));

    // Malformed rule file.
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"user_agent_parsers: {not: a list}").unwrap();
    file.flush().unwrap();
    let err = Decoder::new(
        DecoderConfig::new()
            .source_field("user_agent")
            .rules_path(file.path())
            .build(),
    )
    .unwrap_err();
    assert!(matches!(err, DecoderError::Init(_)));
}

#[test]
fn test_report_uses_exported_metric_names() {
    let (decoder, _rules) = decoder(4);
    decoder.resolve(IPHONE_UA);

    let json = serde_json::to_value(decoder.report()).unwrap();
    assert_eq!(json["ProcessMessageCount"], 1);
    assert_eq!(json["ProcessCacheHit"], 0);
    assert_eq!(json["ProcessCacheMiss"], 1);
    assert_eq!(json["ProcessCacheHitRatio"], 0.0);
    assert_eq!(json["ProcessCacheSize"], 1);
    assert_eq!(json["ProcessCacheMaxSize"], 4);
}

mod properties {
    use std::sync::Arc;

    use proptest::prelude::*;

    use ua_decoder::{Cache, Classifier, DecoderStats, Resolver};

    const RULES: &str = r#"
user_agent_parsers:
  - regex: '(Firefox)/(\d+)\.(\d+)'
"#;

    fn resolver(cache_size: usize) -> Resolver {
        let classifier = Arc::new(Classifier::from_yaml(RULES).unwrap());
        let stats = Arc::new(DecoderStats::new());
        let cache = if cache_size > 0 {
            Some(Cache::new(cache_size, Arc::clone(&stats)))
        } else {
            None
        };
        Resolver::new(classifier, cache, stats)
    }

    proptest! {
        #[test]
        fn capacity_never_exceeded(
            capacity in 1usize..32,
            keys in prop::collection::vec(0u16..64, 1..200),
        ) {
            let resolver = resolver(capacity);
            for key in keys {
                resolver.resolve(&format!("agent {}", key));
                prop_assert!(resolver.cache().unwrap().len() <= capacity);
            }
        }

        #[test]
        fn counters_always_conserve(
            capacity in 0usize..16,
            keys in prop::collection::vec(0u16..32, 0..100),
        ) {
            let resolver = resolver(capacity);
            let total = keys.len() as u64;
            for key in keys {
                resolver.resolve(&format!("agent {}", key));
            }
            let stats = resolver.stats();
            prop_assert_eq!(stats.messages(), total);
            prop_assert_eq!(stats.hits() + stats.misses(), total);
        }

        #[test]
        fn resolving_is_deterministic(key in "[ -~]{0,80}") {
            let resolver = resolver(0);
            let (first, _) = resolver.resolve(&key);
            let (second, _) = resolver.resolve(&key);
            prop_assert_eq!(first, second);
        }
    }
}
