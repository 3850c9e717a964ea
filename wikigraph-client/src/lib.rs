//! wikigraph Client
//!
//! A lazy, identity-mapped view of a Wikibase entity graph:
//!
//! - [`Client`] is the session. It hands out one [`Entity`] per id while the
//!   entity is referenced, answers requests through a cache policy, and
//!   decodes claim values.
//! - [`Entity`] loads its data document on first access and follows
//!   redirects to canonical ids.
//! - [`Decoder`] turns raw datavalues into [`DecodedValue`]s through a
//!   handler table that callers can extend.
//!
//! ```ignore
//! use wikigraph_client::Client;
//!
//! let client = Client::builder().build()?;
//! let beatles = client.get("Q1299", true)?;
//! println!("{}", beatles.label()?);
//! let inception = client.entity("P571");
//! for value in beatles.getlist(&inception)? {
//!     println!("{value:?}");
//! }
//! ```

pub mod client;
pub mod commons_media;
pub mod datavalue;
pub mod entity;
pub mod globe_coordinate;
pub mod quantity;
pub mod telemetry;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use commons_media::File;
pub use datavalue::{DecodedValue, Decoder, Handler, GREGORIAN_CALENDAR};
pub use entity::Entity;
pub use globe_coordinate::GlobeCoordinate;
pub use quantity::Quantity;
pub use telemetry::init_tracing;
pub use transport::{HttpTransport, Transport, TransportResponse};
