//! Vellum cache layer.
//!
//! A read-through cache over a remote key-value store:
//!
//! - **Keys** (`keys`): deterministic derivation from query shape
//! - **Service** (`service`): JSON get/set with graceful degradation
//! - **Invalidation** (`invalidation`): mutation → purge plan
//!
//! ## Configuration
//!
//! Behavior is controlled via the `[cache]` section of `vellum.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_medium_secs = 300
//! # ... see config.rs for all options
//! ```

mod config;
mod invalidation;
mod keys;
mod service;

pub use config::{CacheConfig, Ttl};
pub use invalidation::{Invalidator, MutationEvent, PurgePlan};
pub use keys::{CacheKey, KeyPrefix, normalize_category};
pub use service::CacheService;
