//! wikigraph Test Utilities
//!
//! Shared test infrastructure for the wikigraph workspace:
//! - [`FixtureTransport`]: an offline stand-in for the remote service
//! - [`RecordingExternalCache`]: an external cache that logs every call
//! - [`fixtures`]: entity and media documents used across tests
//! - [`generators`]: proptest strategies for ids and claims

pub mod fixtures;
pub mod generators;
pub mod recording_cache;
pub mod transport;

pub use recording_cache::{CacheOp, RecordingExternalCache};
pub use transport::FixtureTransport;

// Re-export the types most tests need
pub use wikigraph_cache::{
    CacheKey, CachePolicy, MemoryCachePolicy, NullCachePolicy, ProxyCachePolicy,
    SharedCachePolicy,
};
pub use wikigraph_client::{Client, DecodedValue, Decoder, Entity, File};
pub use wikigraph_core::{EntityId, EntityState, EntityType, GraphError, Rank};

/// A client over the full fixture set, with default settings.
pub fn fixture_client(transport: &std::rc::Rc<FixtureTransport>) -> Client {
    Client::builder()
        .transport(std::rc::Rc::clone(transport))
        .build()
        .expect("fixture client builds")
}
