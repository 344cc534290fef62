//! Great-circle distance and the distance-to-points scoring table.
//!
//! A player's guess for a step is scored by how far it lands from the step's
//! location. Scoring is a total function: every input distance maps to
//! exactly one tier, and points never increase as the distance grows.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::FieldError;

/// Mean Earth radius used by the Haversine formula, in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Validated WGS84 coordinate in decimal degrees.
///
/// # Examples
/// ```
/// use snaptrack::domain::geo::GeoPoint;
///
/// let lyon = GeoPoint::new(45.764, 4.8357).expect("valid coordinate");
/// assert_eq!(lyon.lat(), 45.764);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Validate latitude and longitude bounds.
    pub fn new(lat: f64, lng: f64) -> Result<Self, FieldError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(FieldError::OutOfRange {
                field: "lat",
                min: -90.0,
                max: 90.0,
            });
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(FieldError::OutOfRange {
                field: "lng",
                min: -180.0,
                max: 180.0,
            });
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

#[derive(Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawPoint> for GeoPoint {
    type Error = FieldError;

    fn try_from(value: RawPoint) -> Result<Self, Self::Error> {
        Self::new(value.lat, value.lng)
    }
}

impl From<GeoPoint> for RawPoint {
    fn from(value: GeoPoint) -> Self {
        Self {
            lat: value.lat,
            lng: value.lng,
        }
    }
}

/// Great-circle distance between two points in metres.
pub fn haversine_distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + from.lat.to_radians().cos() * to.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    // Clamp guards against rounding pushing `a` just past 1 for antipodes.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_METERS * c
}

/// Discrete score bucket for a guess distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTier {
    /// Short label shown to players.
    pub level: &'static str,
    /// Points awarded.
    pub points: u32,
    /// Player-facing explanation.
    pub description: &'static str,
}

const fn tier(level: &'static str, points: u32, description: &'static str) -> ScoreTier {
    ScoreTier {
        level,
        points,
        description,
    }
}

/// Inclusive upper bounds in metres, nearest first.
const TIERS: [(f64, ScoreTier); 7] = [
    (20.0, tier("Parfait", 100, "Tu es exactement au bon endroit !")),
    (50.0, tier("Excellent", 80, "Tu es tout proche du lieu")),
    (100.0, tier("Très précis", 60, "Tu es très près du lieu")),
    (500.0, tier("Proche", 40, "Tu es dans les environs")),
    (1_000.0, tier("Correct", 25, "Tu es dans le secteur, mais un peu loin")),
    (5_000.0, tier("Loin", 10, "Tu es encore loin du lieu")),
    (10_000.0, tier("Très loin", 5, "Tu es vraiment trop loin")),
];

/// Tier for anything beyond the last bound.
pub const OUT_OF_RANGE: ScoreTier = tier("Hors zone", 0, "Tu es trop loin du lieu...");

/// Largest distance that still earns points.
pub const MAX_SCORING_DISTANCE_METERS: f64 = 10_000.0;

/// Map a distance to the first tier whose bound is at least that distance.
///
/// Negative input is treated as zero metres; NaN is out of range.
///
/// # Examples
/// ```
/// use snaptrack::domain::geo::score_for_distance;
///
/// assert_eq!(score_for_distance(0.0).points, 100);
/// assert_eq!(score_for_distance(750.0).points, 25);
/// assert_eq!(score_for_distance(10_000.5).points, 0);
/// ```
pub fn score_for_distance(distance_meters: f64) -> ScoreTier {
    if distance_meters.is_nan() {
        return OUT_OF_RANGE;
    }
    let distance = distance_meters.max(0.0);
    TIERS
        .iter()
        .find(|(bound, _)| distance <= *bound)
        .map_or(OUT_OF_RANGE, |(_, tier)| *tier)
}

/// Human-readable distance: whole metres below 1 km, kilometres with two
/// decimals otherwise.
pub fn format_distance(distance_meters: f64) -> String {
    if distance_meters < 1_000.0 {
        format!("{:.0} m", distance_meters.round())
    } else {
        format!("{:.2} km", distance_meters / 1_000.0)
    }
}

/// Outcome of scoring a guess against a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessEvaluation {
    /// Distance between guess and target in metres.
    pub distance_meters: f64,
    /// Awarded tier.
    pub tier: ScoreTier,
}

/// Measure a guess against its target and score it.
pub fn evaluate_guess(target: GeoPoint, guess: GeoPoint) -> GuessEvaluation {
    let distance_meters = haversine_distance(target, guess);
    GuessEvaluation {
        distance_meters,
        tier: score_for_distance(distance_meters),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).expect("valid test point")
    }

    #[rstest]
    fn zero_distance_scores_maximum() {
        let here = point(48.8566, 2.3522);
        let evaluation = evaluate_guess(here, here);
        assert_eq!(evaluation.distance_meters, 0.0);
        assert_eq!(evaluation.tier.points, 100);
    }

    #[rstest]
    #[case(20.0, 100)]
    #[case(20.01, 80)]
    #[case(50.0, 80)]
    #[case(100.0, 60)]
    #[case(500.0, 40)]
    #[case(1_000.0, 25)]
    #[case(5_000.0, 10)]
    #[case(10_000.0, 5)]
    #[case(10_000.001, 0)]
    #[case(-3.0, 100)]
    #[case(f64::INFINITY, 0)]
    #[case(f64::NAN, 0)]
    fn tier_boundaries_are_inclusive(#[case] distance: f64, #[case] points: u32) {
        assert_eq!(score_for_distance(distance).points, points);
    }

    #[rstest]
    fn beyond_last_bound_is_out_of_range() {
        for distance in [10_000.5, 42_000.0, 1.0e7] {
            assert_eq!(score_for_distance(distance), OUT_OF_RANGE);
        }
    }

    #[rstest]
    fn points_never_increase_with_distance() {
        let mut previous = u32::MAX;
        let mut distance = 0.0;
        while distance <= 12_000.0 {
            let points = score_for_distance(distance).points;
            assert!(points <= previous, "{points} > {previous} at {distance} m");
            previous = points;
            distance += 2.5;
        }
    }

    #[rstest]
    fn paris_to_london_is_roughly_344_km() {
        let distance = haversine_distance(point(48.8566, 2.3522), point(51.5074, -0.1278));
        assert!((distance - 343_556.0).abs() < 1_000.0, "got {distance}");
    }

    #[rstest]
    fn antipodes_are_half_the_circumference() {
        let distance = haversine_distance(point(0.0, 0.0), point(0.0, 180.0));
        let expected = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((distance - expected).abs() < 1.0);
    }

    #[rstest]
    #[case(0.0, "0 m")]
    #[case(12.4, "12 m")]
    #[case(999.4, "999 m")]
    #[case(1_000.0, "1.00 km")]
    #[case(12_345.0, "12.35 km")]
    fn formats_distances(#[case] distance: f64, #[case] expected: &str) {
        assert_eq!(format_distance(distance), expected);
    }

    #[rstest]
    #[case(90.1, 0.0, "lat")]
    #[case(-90.1, 0.0, "lat")]
    #[case(0.0, 180.5, "lng")]
    #[case(f64::NAN, 0.0, "lat")]
    fn rejects_out_of_range_coordinates(#[case] lat: f64, #[case] lng: f64, #[case] field: &str) {
        let error = GeoPoint::new(lat, lng).expect_err("invalid point");
        assert_eq!(error.field(), field);
    }

    #[rstest]
    fn deserialising_validates_bounds() {
        let ok: GeoPoint = serde_json::from_str(r#"{"lat":1.0,"lng":2.0}"#).expect("valid");
        assert_eq!(ok, point(1.0, 2.0));
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat":100.0,"lng":2.0}"#).is_err());
    }
}
