//! Decoder orchestration: configuration, resolve, field projection.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::Cache;
use crate::classification::Classification;
use crate::classifier::Classifier;
use crate::config::DecoderConfig;
use crate::error::{DecoderError, DecoderResult};
use crate::record::Record;
use crate::resolver::Resolver;
use crate::stats::Report;

/// Decodes the configured source field of each record into `ua_*` fields.
///
/// Constructed once at startup; `decode` may then be called concurrently
/// from any number of worker threads. There is no per-record failure
/// mode: a record the decoder cannot handle passes through unchanged.
///
/// ```no_run
/// use ua_decoder::{Decoder, DecoderConfig, Record};
/// use serde_json::json;
///
/// let decoder = Decoder::new(
///     DecoderConfig::new()
///         .source_field("user_agent")
///         .rules_path("regexes.yaml")
///         .cache_size(10_000)
///         .build(),
/// )?;
///
/// let mut record = Record::new();
/// record.insert("user_agent", json!("Mozilla/5.0 Firefox/102.0"));
/// decoder.decode(&mut record);
/// # Ok::<(), ua_decoder::DecoderError>(())
/// ```
#[derive(Debug)]
pub struct Decoder {
    source_field: String,
    resolver: Resolver,
    cache: Option<Cache>,
}

impl Decoder {
    /// Validate the configuration and construct the decoder.
    ///
    /// Fails with a configuration error when `source_field` is empty, and
    /// with an initialization error when the rule file cannot be loaded.
    /// Both are fatal startup conditions, never retried.
    pub fn new(config: DecoderConfig) -> DecoderResult<Self> {
        if config.source_field.is_empty() {
            return Err(DecoderError::Config(
                "`source_field` must be specified".to_string(),
            ));
        }

        let rules_path = config.resolved_rules_path();
        let classifier = Arc::new(Classifier::from_file(&rules_path)?);

        let stats = Arc::new(crate::stats::DecoderStats::new());
        let cache = if config.cache_size > 0 {
            Some(Cache::new(config.cache_size, Arc::clone(&stats)))
        } else {
            None
        };

        info!(
            rules = %rules_path.display(),
            source_field = %config.source_field,
            cache_size = config.cache_size,
            "decoder initialized"
        );

        Ok(Self {
            source_field: config.source_field,
            resolver: Resolver::new(classifier, cache.clone(), stats),
            cache,
        })
    }

    /// Decode one record in place.
    ///
    /// When the source field is absent or not a string the record passes
    /// through untouched and no counter moves. Field-attachment conflicts
    /// are logged and ignored; this call never fails.
    pub fn decode(&self, record: &mut Record) {
        let raw = match record.get_str(&self.source_field) {
            Some(value) => value.to_string(),
            None => return,
        };

        let (classification, _) = self.resolver.resolve(&raw);
        self.project(&classification, record);
    }

    /// Resolve a raw user-agent string directly.
    pub fn resolve(&self, raw: &str) -> (Classification, bool) {
        self.resolver.resolve(raw)
    }

    /// Point-in-time metrics snapshot.
    ///
    /// Touches only the atomic counters and a short-lived read of the
    /// cache occupancy; concurrent `decode` calls are not held up.
    pub fn report(&self) -> Report {
        let (size, capacity) = match &self.cache {
            Some(cache) => (cache.len() as u64, cache.capacity() as u64),
            None => (0, 0),
        };
        self.resolver.stats().report(size, capacity)
    }

    /// Name of the configured source field.
    pub fn source_field(&self) -> &str {
        &self.source_field
    }

    /// Attach the non-empty attributes of a classification to the record.
    fn project(&self, c: &Classification, record: &mut Record) {
        self.attach(record, "ua_name", &c.browser_family);
        self.attach(record, "ua_major", &c.browser_major);
        self.attach(record, "ua_minor", &c.browser_minor);
        self.attach(record, "ua_patch", &c.browser_patch);

        if !c.os_family.is_empty() {
            self.attach(record, "ua_os_name", &c.os_family);

            // Combined human-readable OS field, e.g. "iOS 9.1".
            let long_version = c.os_version_string();
            if !long_version.is_empty() {
                let combined = format!("{} {}", c.os_family, long_version);
                self.attach(record, "ua_os", &combined);
            }
        }
        self.attach(record, "ua_os_major", &c.os_major);
        self.attach(record, "ua_os_minor", &c.os_minor);
        self.attach(record, "ua_os_patch", &c.os_patch);
        self.attach(record, "ua_os_patch_minor", &c.os_patch_minor);

        self.attach(record, "ua_device", &c.device_family);
    }

    fn attach(&self, record: &mut Record, name: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        if let Err(err) = record.attach_str(name, value) {
            debug!(field = name, %err, "skipping field attach");
        }
    }
}
