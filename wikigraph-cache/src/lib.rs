//! Cache layer between the entity registry and the transport.
//!
//! Requests are keyed by their absolute URL and answered from a
//! [`CachePolicy`] before any network fetch happens.
//!
//! # Policies
//!
//! - [`NullCachePolicy`] caches nothing. It is the default: callers who want
//!   caching opt in.
//! - [`MemoryCachePolicy`] is a bounded least-recently-used cache.
//! - [`ProxyCachePolicy`] adapts any byte-oriented [`ExternalCache`]
//!   (memcached-style `get`/`set`/`delete` with TTLs), namespacing keys with a
//!   digest and giving property documents their own lifespan.
//!
//! # Thread Safety
//!
//! Policies mutate through `&mut self` and carry no locks. Sharing one policy
//! between sessions goes through [`SharedCachePolicy`], which is
//! single-threaded. A proxy policy is exactly as thread-safe as its backend.
//!
//! # Example
//!
//! ```ignore
//! let backend = LmdbExternalCache::new("/var/cache/wikigraph", 256)?;
//! let policy = ProxyCachePolicy::new(backend, 3600)
//!     .with_property_timeout(86_400)
//!     .with_namespace("wd_");
//! ```

pub mod lmdb_backend;
pub mod memory;
pub mod memory_backend;
pub mod policy;
pub mod proxy;
pub mod traits;

pub use lmdb_backend::LmdbExternalCache;
pub use memory::MemoryCachePolicy;
pub use memory_backend::MemoryExternalCache;
pub use policy::{CacheKey, CachePolicy, CacheValue, NullCachePolicy, SharedCachePolicy};
pub use proxy::ProxyCachePolicy;
pub use traits::{CacheStats, ExternalCache};
