// SPDX-License-Identifier: Apache-2.0

//! Maps engine errors onto API errors. NotFound and provider failures keep a
//! stable kind tag and a human-readable message; every storage-layer failure
//! collapses to the generic internal error so raw store text never reaches a
//! client.

use crate::errors::ApiError;
use curbmap_provider::ProviderError;
use curbmap_query::{ListingError, ReconcileError, StatsError};

pub fn map_stats_error(err: &StatsError) -> ApiError {
    match err {
        StatsError::NotFound(id) => ApiError::not_found(format!("place {id} not found")),
        _ => ApiError::internal(),
    }
}

pub fn map_listing_error(err: &ListingError) -> ApiError {
    match err {
        // Parameters are validated before the engine runs; a bad window here
        // is a server bug, not client input.
        ListingError::InvalidWindow(_) | ListingError::Store(_) | _ => ApiError::internal(),
    }
}

pub fn map_reconcile_error(err: &ReconcileError) -> ApiError {
    match err {
        ReconcileError::Store(_) | ReconcileError::Unresolved(_) | _ => ApiError::internal(),
    }
}

pub fn map_provider_error(err: &ProviderError) -> ApiError {
    ApiError::provider_unavailable(err.to_string(), err.is_retryable())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ApiErrorCode;
    use curbmap_model::PlaceId;
    use curbmap_query::StoreError;

    #[test]
    fn missing_place_keeps_its_kind_tag_and_message() {
        let api = map_stats_error(&StatsError::NotFound(PlaceId(9)));
        assert_eq!(api.code, ApiErrorCode::NotFound);
        assert!(api.message.contains('9'));
    }

    #[test]
    fn store_text_never_leaks() {
        let store = StoreError("UNIQUE constraint failed: places.external_id".to_string());
        for api in [
            map_stats_error(&StatsError::Store(store.clone())),
            map_listing_error(&ListingError::Store(store.clone())),
            map_reconcile_error(&ReconcileError::Store(store)),
        ] {
            assert_eq!(api.code, ApiErrorCode::Internal);
            assert_eq!(api.message, "internal error");
        }
    }

    #[test]
    fn provider_failures_carry_the_retryable_flag() {
        let api = map_provider_error(&ProviderError::Timeout);
        assert_eq!(api.code, ApiErrorCode::ProviderUnavailable);
        assert_eq!(api.details["retryable"], true);

        let api = map_provider_error(&ProviderError::Decode("bad json".to_string()));
        assert_eq!(api.details["retryable"], false);
    }
}
