//! # UA Decoder
//!
//! A fast, thread-safe user-agent decoder for record-processing pipelines.
//!
//! Raw user-agent strings are classified into browser, operating-system
//! and device attributes by an ordered set of regex rules, and the results
//! are memoized in a bounded, scan-resistant two-queue cache so that the
//! classifier only runs on strings the pipeline has not seen recently.
//!
//! ## Features
//!
//! - **Thread-safe**: one decoder serves any number of worker threads
//! - **Bounded memory**: two-queue eviction keeps frequently-reused
//!   entries resident through bursts of one-off strings
//! - **Observable**: atomic hit/miss/eviction counters and a
//!   point-in-time metrics report
//! - **Forgiving**: records the decoder cannot handle pass through
//!   unchanged; only startup can fail
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use ua_decoder::{Cache, Classifier, DecoderStats, Resolver};
//!
//! let classifier = Arc::new(Classifier::from_yaml(
//!     r#"
//! user_agent_parsers:
//!   - regex: '(Firefox)/(\d+)\.(\d+)'
//! "#,
//! ).unwrap());
//!
//! let stats = Arc::new(DecoderStats::new());
//! let cache = Cache::new(10_000, Arc::clone(&stats));
//! let resolver = Resolver::new(classifier, Some(cache), stats);
//!
//! let (classification, hit) = resolver.resolve("Mozilla/5.0 Firefox/102.0");
//! assert!(!hit);
//! assert_eq!(classification.browser_family, "Firefox");
//!
//! let (_, hit) = resolver.resolve("Mozilla/5.0 Firefox/102.0");
//! assert!(hit);
//! ```
//!
//! For per-record use, construct a [`Decoder`] from a [`DecoderConfig`]
//! pointing at a rule file; it reads the configured source field from each
//! [`Record`] and attaches the `ua_*` output fields.

pub mod cache;
pub mod classification;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod error;
pub mod record;
pub mod resolver;
pub mod stats;

pub use cache::Cache;
pub use classification::Classification;
pub use classifier::Classifier;
pub use config::DecoderConfig;
pub use decoder::Decoder;
pub use error::{DecoderError, DecoderResult};
pub use record::Record;
pub use resolver::Resolver;
pub use stats::{DecoderStats, Report};

// Internal module - not part of public API
pub(crate) mod storage;
