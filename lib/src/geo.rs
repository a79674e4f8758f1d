//! Geodesic helpers: haversine distance, landmarks and the Metro Vancouver
//! bounding box.
//!
//! Distances are great-circle kilometers on a sphere of radius
//! [`EARTH_RADIUS_KM`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance in kilometers between two points.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // clamp guards against h drifting above 1.0 for antipodal points
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// The three reference areas a listing can be closest to.
///
/// Declaration order is the tie-break priority used by
/// [`LandmarkDistances::nearest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Area {
    #[serde(rename = "SFU")]
    Sfu,
    #[serde(rename = "UBC")]
    Ubc,
    #[serde(rename = "Downtown")]
    Downtown,
}

impl Area {
    /// All areas in tie-break priority order.
    pub const ALL: [Area; 3] = [Area::Sfu, Area::Ubc, Area::Downtown];

    pub fn as_str(&self) -> &'static str {
        match self {
            Area::Sfu => "SFU",
            Area::Ubc => "UBC",
            Area::Downtown => "Downtown",
        }
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distances from one listing to each landmark, in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkDistances {
    pub sfu: f64,
    pub ubc: f64,
    pub downtown: f64,
}

impl LandmarkDistances {
    pub fn get(&self, area: Area) -> f64 {
        match area {
            Area::Sfu => self.sfu,
            Area::Ubc => self.ubc,
            Area::Downtown => self.downtown,
        }
    }

    /// Closest area; an exact tie goes to the area listed first in [`Area::ALL`].
    pub fn nearest(&self) -> Area {
        let mut best = Area::ALL[0];
        for area in &Area::ALL[1..] {
            if self.get(*area) < self.get(best) {
                best = *area;
            }
        }
        best
    }

    /// Distance to the nearest area.
    pub fn min(&self) -> f64 {
        self.get(self.nearest())
    }
}

/// The fixed reference points: SFU Burnaby, UBC Vancouver and Downtown
/// Vancouver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSet {
    pub sfu: Coordinates,
    pub ubc: Coordinates,
    pub downtown: Coordinates,
}

impl Default for LandmarkSet {
    fn default() -> Self {
        Self {
            sfu: Coordinates::new(49.2775, -122.9146),
            ubc: Coordinates::new(49.2606, -123.2460),
            downtown: Coordinates::new(49.2859, -123.1207),
        }
    }
}

impl LandmarkSet {
    pub fn get(&self, area: Area) -> Coordinates {
        match area {
            Area::Sfu => self.sfu,
            Area::Ubc => self.ubc,
            Area::Downtown => self.downtown,
        }
    }

    /// Distances from `point` to every landmark, rounded to `decimals`.
    pub fn distances(&self, point: Coordinates, decimals: u32) -> LandmarkDistances {
        LandmarkDistances {
            sfu: round_to(haversine_km(point, self.sfu), decimals),
            ubc: round_to(haversine_km(point, self.ubc), decimals),
            downtown: round_to(haversine_km(point, self.downtown), decimals),
        }
    }
}

/// Rectangular region used to reject coordinates outside Metro Vancouver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lat: 49.00,
            max_lat: 49.45,
            min_lon: -123.35,
            max_lon: -122.45,
        }
    }
}

impl BoundingBox {
    /// Inclusive containment check.
    pub fn contains(&self, point: Coordinates) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}

/// Distance from `point` to the closest of `stations`, or `None` when the
/// list is empty.
pub fn nearest_station_km(point: Coordinates, stations: &[Coordinates]) -> Option<f64> {
    stations
        .iter()
        .map(|s| haversine_km(point, *s))
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SFU_NEIGHBOUR: Coordinates = Coordinates::new(49.2781, -122.9199);

    #[test]
    fn test_distance_to_self_is_zero() {
        let p = Coordinates::new(49.25, -123.1);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Coordinates::new(49.2606, -123.2460);
        let b = Coordinates::new(49.2775, -122.9146);
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_triangle_inequality() {
        let sets = LandmarkSet::default();
        let points = [sets.sfu, sets.ubc, sets.downtown, SFU_NEIGHBOUR];
        for a in points {
            for b in points {
                for c in points {
                    let direct = haversine_km(a, c);
                    let via = haversine_km(a, b) + haversine_km(b, c);
                    assert!(direct <= via + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // UBC to SFU is roughly 24 km as the crow flies
        let set = LandmarkSet::default();
        let d = haversine_km(set.ubc, set.sfu);
        assert!(d > 23.0 && d < 25.0, "got {}", d);
    }

    #[test]
    fn test_nearest_area_near_sfu() {
        let set = LandmarkSet::default();
        let d = set.distances(SFU_NEIGHBOUR, 3);
        assert_eq!(d.nearest(), Area::Sfu);
        assert!(d.sfu < 1.0);
    }

    #[test]
    fn test_nearest_tie_prefers_priority_order() {
        let d = LandmarkDistances {
            sfu: 5.0,
            ubc: 5.0,
            downtown: 5.0,
        };
        assert_eq!(d.nearest(), Area::Sfu);

        let d = LandmarkDistances {
            sfu: 6.0,
            ubc: 2.0,
            downtown: 2.0,
        };
        assert_eq!(d.nearest(), Area::Ubc);
    }

    #[test]
    fn test_min_matches_nearest() {
        let d = LandmarkDistances {
            sfu: 9.0,
            ubc: 7.5,
            downtown: 3.25,
        };
        assert_eq!(d.nearest(), Area::Downtown);
        assert_eq!(d.min(), 3.25);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(0.0004, 3), 0.0);
    }

    #[test]
    fn test_bounding_box_contains_landmarks() {
        let bbox = BoundingBox::default();
        let set = LandmarkSet::default();
        for area in Area::ALL {
            assert!(bbox.contains(set.get(area)));
        }
        // Seattle
        assert!(!bbox.contains(Coordinates::new(47.6062, -122.3321)));
    }

    #[test]
    fn test_nearest_station() {
        let stations = [Coordinates::new(49.0, -123.0), Coordinates::new(49.2781, -122.9199)];
        let d = nearest_station_km(SFU_NEIGHBOUR, &stations).unwrap();
        assert_eq!(d, 0.0);
        assert!(nearest_station_km(SFU_NEIGHBOUR, &[]).is_none());
    }

    #[test]
    fn test_area_serializes_to_display_name() {
        let json = serde_json::to_string(&Area::Downtown).unwrap();
        assert_eq!(json, "\"Downtown\"");
        let back: Area = serde_json::from_str("\"SFU\"").unwrap();
        assert_eq!(back, Area::Sfu);
    }
}
