//! # inikit
//!
//! An INI-style configuration document model with change tracking, bundled
//! with a bounded in-memory cache and a couple of small concurrency
//! primitives.
//!
//! ## Features
//!
//! - **Faithful documents**: comments, blank lines, and declaration order
//!   survive a parse/serialize round trip
//! - **Change tracking**: one shared counter records every mutation in the
//!   document tree
//! - **Typed access**: settings convert to integers, floats, booleans, and
//!   arrays thereof, with digit group separators tolerated on read
//! - **Bounded cache**: capacity plus retention floor, least-recent or
//!   least-used eviction, single-flight pruning with an optional background
//!   timer
//! - **Statistics**: cache hits, misses, evictions, and more
//!
//! ## Quick Start
//!
//! ```rust
//! use inikit::Document;
//!
//! let mut doc = Document::parse("[Core]\nVolume = 0.5 # out of 1.0\n")?;
//!
//! let core = doc.get_mut("Core").unwrap();
//! assert_eq!(core.get("Volume").unwrap().as_float()?, 0.5);
//!
//! core.get_or_set("Threads", 4)?;
//! assert_eq!(doc.changes(), 2);
//!
//! assert_eq!(
//!     doc.to_string(),
//!     "[Core]\nVolume = 0.5 # out of 1.0\nThreads = 4\n"
//! );
//! # Ok::<(), inikit::Error>(())
//! ```
//!
//! ## Caching
//!
//! The cache is safe to share across threads; cloning a [`Cache`] creates a
//! new handle to the same storage:
//!
//! ```rust
//! use inikit::{Cache, CacheConfig, EvictStrategy};
//!
//! let config = CacheConfig::new()
//!     .with_capacity(1000)
//!     .with_retention(100)
//!     .with_evict_strategy(EvictStrategy::LeastRecent);
//! let cache: Cache<String, String> = Cache::new(config);
//!
//! cache.insert("user:123".to_string(), "Alice".to_string());
//! assert_eq!(cache.get("user:123"), Some("Alice".to_string()));
//!
//! cache.prune();
//! println!("hit rate: {:.1}%", cache.stats().hit_rate);
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod ring;
pub mod scan;
pub mod section;
pub mod setting;
pub mod stats;
pub mod sync;

pub use cache::Cache;
pub use config::{CacheConfig, EvictStrategy, StoreStrategy, MIN_PRUNE_INTERVAL};
pub use document::Document;
pub use error::{Error, Result};
pub use ring::RingBuffer;
pub use section::Section;
pub use setting::{Setting, SettingKind, ToValue};
pub use stats::{CacheStats, StatsSnapshot};
pub use sync::{AtomicFlag, FlagGuard};

pub(crate) mod entry;
pub(crate) mod storage;
pub(crate) mod track;
