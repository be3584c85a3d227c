//! Structured places API client: text search and place details, normalized
//! into the shared business record types.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
