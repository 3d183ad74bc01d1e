#![forbid(unsafe_code)]
//! External place source adapter.
//!
//! The engine consumes the [`PlaceSource`] trait only; the concrete HTTP
//! client is injected at construction (no lazily-initialized global). The
//! fake implementation lives here too so downstream crates can test against
//! the same seam.

use async_trait::async_trait;
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceCandidate};
use std::fmt::{Display, Formatter};

mod fake;
mod http;

pub use fake::FakePlaceSource;
pub use http::{HttpPlaceSource, HttpPlaceSourceConfig};

pub const CRATE_NAME: &str = "curbmap-provider";

/// Provider failure taxonomy. A missing place is not an error; lookups
/// return `Option` / empty vectors instead.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProviderError {
    /// The bounded call deadline elapsed.
    Timeout,
    /// Non-success HTTP status from the provider edge.
    Status(u16),
    /// The provider answered 200 but flagged the request as failed.
    Upstream(String),
    /// Connection-level failure before any response.
    Transport(String),
    /// The response body did not match the provider contract.
    Decode(String),
}

impl ProviderError {
    /// Whether the enclosing operation may be retried by the caller. Decode
    /// failures are contract bugs and retrying will not help.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Status(_) | Self::Upstream(_) | Self::Transport(_) => true,
            Self::Decode(_) => false,
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => f.write_str("provider call timed out"),
            Self::Status(code) => write!(f, "provider returned status {code}"),
            Self::Upstream(status) => write!(f, "provider rejected the request: {status}"),
            Self::Transport(msg) => write!(f, "provider transport failure: {msg}"),
            Self::Decode(msg) => write!(f, "provider response malformed: {msg}"),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Lookup/search calls against the external places provider. Every call
/// carries the adapter's bounded timeout; a timeout or provider error fails
/// the whole call with a retryable classification and persists nothing.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    /// Resolves one external id. `None` when the provider does not know it.
    async fn get_details(
        &self,
        external_id: &ExternalPlaceId,
    ) -> ProviderResult<Option<PlaceCandidate>>;

    /// Candidates around a point, possibly empty.
    async fn search_nearby(
        &self,
        center: GeoPoint,
        radius_meters: u32,
        place_type: Option<&str>,
        keyword: Option<&str>,
    ) -> ProviderResult<Vec<PlaceCandidate>>;

    /// Free-text search, possibly empty. Implementations append the fixed
    /// region keyword to the query before calling the provider.
    async fn search_by_text(
        &self,
        query: &str,
        near: Option<GeoPoint>,
        radius_meters: Option<u32>,
    ) -> ProviderResult<Vec<PlaceCandidate>>;
}
