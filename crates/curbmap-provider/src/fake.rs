// SPDX-License-Identifier: Apache-2.0

use crate::{PlaceSource, ProviderError, ProviderResult};
use async_trait::async_trait;
use curbmap_model::{ExternalPlaceId, GeoPoint, PlaceCandidate};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory provider for tests: seeded candidates, per-method call
/// counters, optional forced failure and latency injection.
#[derive(Default)]
pub struct FakePlaceSource {
    pub details: Mutex<HashMap<ExternalPlaceId, PlaceCandidate>>,
    pub search_results: Mutex<Vec<PlaceCandidate>>,
    pub fail_next: Mutex<Option<ProviderError>>,
    pub details_calls: AtomicU64,
    pub nearby_calls: AtomicU64,
    pub text_calls: AtomicU64,
    pub latency: Option<Duration>,
}

impl FakePlaceSource {
    pub async fn seed_detail(&self, candidate: PlaceCandidate) {
        self.details
            .lock()
            .await
            .insert(candidate.external_id.clone(), candidate);
    }

    pub async fn seed_search(&self, candidates: Vec<PlaceCandidate>) {
        *self.search_results.lock().await = candidates;
    }

    pub async fn fail_next_call(&self, error: ProviderError) {
        *self.fail_next.lock().await = Some(error);
    }

    async fn maybe_fail(&self) -> ProviderResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.fail_next.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlaceSource for FakePlaceSource {
    async fn get_details(
        &self,
        external_id: &ExternalPlaceId,
    ) -> ProviderResult<Option<PlaceCandidate>> {
        self.details_calls.fetch_add(1, Ordering::Relaxed);
        self.maybe_fail().await?;
        Ok(self.details.lock().await.get(external_id).cloned())
    }

    async fn search_nearby(
        &self,
        _center: GeoPoint,
        _radius_meters: u32,
        _place_type: Option<&str>,
        _keyword: Option<&str>,
    ) -> ProviderResult<Vec<PlaceCandidate>> {
        self.nearby_calls.fetch_add(1, Ordering::Relaxed);
        self.maybe_fail().await?;
        Ok(self.search_results.lock().await.clone())
    }

    async fn search_by_text(
        &self,
        _query: &str,
        _near: Option<GeoPoint>,
        _radius_meters: Option<u32>,
    ) -> ProviderResult<Vec<PlaceCandidate>> {
        self.text_calls.fetch_add(1, Ordering::Relaxed);
        self.maybe_fail().await?;
        Ok(self.search_results.lock().await.clone())
    }
}
