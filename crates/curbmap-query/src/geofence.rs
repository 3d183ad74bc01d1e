// SPDX-License-Identifier: Apache-2.0

use curbmap_model::{GeoPoint, PlaceCandidate};

/// Fixed bounding region, inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// Restricts provider candidates to the target region: the bounding-box test
/// is mandatory, the address-token test is permissive. Candidates with no
/// formatted address at all are not discarded on that basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Geofence {
    bounds: BoundingBox,
    region_token: String,
}

impl Geofence {
    #[must_use]
    pub fn new(bounds: BoundingBox, region_token: impl Into<String>) -> Self {
        Self {
            bounds,
            region_token: region_token.into().to_lowercase(),
        }
    }

    #[must_use]
    pub fn admits(&self, candidate: &PlaceCandidate) -> bool {
        if !self.bounds.contains(candidate.location) {
            return false;
        }
        match candidate.formatted_address.as_deref() {
            Some(address) => address.to_lowercase().contains(&self.region_token),
            None => true,
        }
    }

    #[must_use]
    pub fn filter(&self, candidates: Vec<PlaceCandidate>) -> Vec<PlaceCandidate> {
        candidates.into_iter().filter(|c| self.admits(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curbmap_model::ExternalPlaceId;

    const BOX: BoundingBox = BoundingBox {
        north: -23.40,
        south: -23.70,
        east: -46.40,
        west: -46.80,
    };

    fn candidate(lat: f64, lng: f64, address: Option<&str>) -> PlaceCandidate {
        let mut c = PlaceCandidate::bare(
            ExternalPlaceId::parse("ext-1").expect("id"),
            "Spot",
            GeoPoint::new(lat, lng).expect("point"),
        );
        c.formatted_address = address.map(str::to_string);
        c
    }

    #[test]
    fn points_exactly_on_every_bound_are_included() {
        let fence = Geofence::new(BOX, "meervale");
        for (lat, lng) in [
            (BOX.north, -46.60),
            (BOX.south, -46.60),
            (-23.55, BOX.east),
            (-23.55, BOX.west),
        ] {
            assert!(fence.admits(&candidate(lat, lng, None)), "({lat}, {lng})");
        }
    }

    #[test]
    fn points_one_thousandth_beyond_any_bound_are_excluded() {
        let fence = Geofence::new(BOX, "meervale");
        for (lat, lng) in [
            (BOX.north + 0.001, -46.60),
            (BOX.south - 0.001, -46.60),
            (-23.55, BOX.east + 0.001),
            (-23.55, BOX.west - 0.001),
        ] {
            assert!(!fence.admits(&candidate(lat, lng, None)), "({lat}, {lng})");
        }
    }

    #[test]
    fn address_token_match_is_case_insensitive() {
        let fence = Geofence::new(BOX, "Meervale");
        assert!(fence.admits(&candidate(-23.55, -46.60, Some("1 Dock Rd, MEERVALE"))));
        assert!(!fence.admits(&candidate(-23.55, -46.60, Some("1 Dock Rd, Elsewhere"))));
    }

    #[test]
    fn missing_address_passes_when_inside_the_box() {
        let fence = Geofence::new(BOX, "meervale");
        assert!(fence.admits(&candidate(-23.55, -46.60, None)));
        // Still subject to the box test.
        assert!(!fence.admits(&candidate(0.0, 0.0, None)));
    }

    #[test]
    fn filter_keeps_input_order() {
        let fence = Geofence::new(BOX, "meervale");
        let kept = fence.filter(vec![
            candidate(-23.50, -46.60, None),
            candidate(10.0, 10.0, None),
            candidate(-23.60, -46.50, None),
        ]);
        assert_eq!(kept.len(), 2);
        assert!(kept[0].location.lat > kept[1].location.lat);
    }
}
