//! "Near me" queries.
//!
//! A search circle is approximated by a latitude/longitude rectangle using
//! 111 km per degree of latitude and `111 km * cos(lat)` per degree of
//! longitude. The rectangle contains the whole circle at moderate latitudes
//! and lets in some extra points near its corners; it gets unreliable close
//! to the poles. Results are not sorted by distance.

use crate::services::visibility;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tokapu_common::{AppError, AppResult, ProximityConfig};
use tokapu_db::{entities::artwork, repositories::ArtworkRepository};

/// Kilometres per degree of latitude.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Stored coordinate precision.
const COORD_SCALE: u32 = 8;

/// Axis-aligned coordinate rectangle with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub min_lat: Decimal,
    pub max_lat: Decimal,
    pub min_lng: Decimal,
    pub max_lng: Decimal,
}

impl BoundingBox {
    /// Rectangle around `(lat, lng)` that covers a circle of `radius_km`.
    ///
    /// Bounds are rounded outwards to the stored precision and clamped to
    /// valid coordinates.
    pub fn around(lat: f64, lng: f64, radius_km: f64) -> AppResult<Self> {
        validate_point(lat, lng)?;
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(AppError::Validation(
                "Radius must be a positive number".to_string(),
            ));
        }

        let lat_delta = radius_km / KM_PER_DEGREE;
        let lng_delta = radius_km / (KM_PER_DEGREE * lat.to_radians().cos());

        Ok(Self {
            min_lat: floor(lat - lat_delta, -90.0)?,
            max_lat: ceil(lat + lat_delta, 90.0)?,
            min_lng: floor(lng - lng_delta, -180.0)?,
            max_lng: ceil(lng + lng_delta, 180.0)?,
        })
    }

    /// Whether a point lies inside the rectangle, edges included.
    #[must_use]
    pub fn contains(&self, lat: Decimal, lng: Decimal) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

fn validate_point(lat: f64, lng: f64) -> AppResult<()> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::Validation(format!(
            "Latitude must be between -90 and 90, got {lat}"
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::Validation(format!(
            "Longitude must be between -180 and 180, got {lng}"
        )));
    }
    Ok(())
}

fn to_decimal(value: f64) -> AppResult<Decimal> {
    Decimal::try_from(value)
        .map_err(|_| AppError::Validation(format!("Coordinate out of range: {value}")))
}

fn floor(value: f64, limit: f64) -> AppResult<Decimal> {
    Ok(to_decimal(value.max(limit))?
        .round_dp_with_strategy(COORD_SCALE, RoundingStrategy::ToNegativeInfinity))
}

fn ceil(value: f64, limit: f64) -> AppResult<Decimal> {
    Ok(to_decimal(value.min(limit))?
        .round_dp_with_strategy(COORD_SCALE, RoundingStrategy::ToPositiveInfinity))
}

/// Convert a validated coordinate to the stored precision.
pub fn coordinate(value: f64) -> AppResult<Decimal> {
    Ok(to_decimal(value)?.round_dp(COORD_SCALE))
}

/// Check a latitude/longitude pair.
pub fn check_coordinates(lat: f64, lng: f64) -> AppResult<()> {
    validate_point(lat, lng)
}

/// Finds approved artworks around a point.
#[derive(Clone)]
pub struct ProximityFilter {
    artwork_repo: ArtworkRepository,
    config: ProximityConfig,
}

impl ProximityFilter {
    /// Create a new proximity filter.
    #[must_use]
    pub const fn new(artwork_repo: ArtworkRepository, config: ProximityConfig) -> Self {
        Self {
            artwork_repo,
            config,
        }
    }

    /// Publicly visible artworks inside the rectangle around `(lat, lng)`.
    ///
    /// `radius_km` falls back to the configured default and may not exceed
    /// the configured maximum.
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: Option<f64>,
    ) -> AppResult<Vec<artwork::Model>> {
        let radius_km = radius_km.unwrap_or(self.config.default_radius_km);
        if radius_km > self.config.max_radius_km {
            return Err(AppError::Validation(format!(
                "Radius may not exceed {} km",
                self.config.max_radius_km
            )));
        }

        let bounds = BoundingBox::around(lat, lng, radius_km)?;
        tracing::debug!(lat, lng, radius_km, ?bounds, "Searching nearby artworks");

        let found = self
            .artwork_repo
            .find_in_box(bounds.min_lat, bounds.max_lat, bounds.min_lng, bounds.max_lng)
            .await?;
        Ok(visibility::filter_visible(found, None))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::counter::tests::create_test_artwork;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Point reached by travelling `distance_km` from `(lat, lng)` along
    /// `bearing_deg` on a sphere.
    fn destination(lat: f64, lng: f64, bearing_deg: f64, distance_km: f64) -> (f64, f64) {
        let d = distance_km / EARTH_RADIUS_KM;
        let (lat1, lng1, brg) = (lat.to_radians(), lng.to_radians(), bearing_deg.to_radians());
        let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * brg.cos()).asin();
        let lng2 = lng1
            + (brg.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
        (lat2.to_degrees(), lng2.to_degrees())
    }

    fn dec(v: f64) -> Decimal {
        Decimal::try_from(v).unwrap()
    }

    #[test]
    fn test_box_dimensions() {
        let b = BoundingBox::around(0.0, 0.0, 111.0).unwrap();
        assert_eq!(b.min_lat, Decimal::from(-1));
        assert_eq!(b.max_lat, Decimal::from(1));
        assert_eq!(b.min_lng, Decimal::from(-1));
        assert_eq!(b.max_lng, Decimal::from(1));
    }

    #[test]
    fn test_longitude_widens_away_from_equator() {
        let b = BoundingBox::around(60.0, 10.0, 11.1).unwrap();
        let lat_span = b.max_lat - b.min_lat;
        let lng_span = b.max_lng - b.min_lng;
        // cos(60 deg) = 0.5
        assert!(lng_span > lat_span * Decimal::from(2) - dec(1e-7));
        assert!(lng_span < lat_span * Decimal::from(2) + dec(1e-7));
    }

    #[test]
    fn test_bounds_use_stored_precision() {
        let b = BoundingBox::around(-33.4489, -70.6693, 5.0).unwrap();
        for v in [b.min_lat, b.max_lat, b.min_lng, b.max_lng] {
            assert!(v.scale() <= 8);
        }
    }

    #[test]
    fn test_no_false_negatives_inside_radius() {
        let centers = [(-33.4489, -70.6693), (0.0, 0.0), (48.8566, 2.3522), (51.5, -0.12)];
        for (lat, lng) in centers {
            for radius in [0.5, 5.0, 25.0, 100.0] {
                let b = BoundingBox::around(lat, lng, radius).unwrap();
                for step in 0..36 {
                    let (plat, plng) = destination(lat, lng, f64::from(step) * 10.0, radius * 0.95);
                    assert!(
                        b.contains(dec(plat), dec(plng)),
                        "({plat}, {plng}) at {radius} km from ({lat}, {lng}) fell outside {b:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_excludes_points_far_outside() {
        let b = BoundingBox::around(-33.4489, -70.6693, 5.0).unwrap();
        for step in 0..8 {
            let (plat, plng) = destination(-33.4489, -70.6693, f64::from(step) * 45.0, 20.0);
            assert!(!b.contains(dec(plat), dec(plng)));
        }
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            BoundingBox::around(91.0, 0.0, 1.0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            BoundingBox::around(0.0, -181.0, 1.0),
            Err(AppError::Validation(_))
        ));
        for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                BoundingBox::around(0.0, 0.0, radius),
                Err(AppError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_clamped_near_pole() {
        let b = BoundingBox::around(89.99, 179.0, 50.0).unwrap();
        assert_eq!(b.max_lat, Decimal::from(90));
        assert_eq!(b.max_lng, Decimal::from(180));
        assert_eq!(b.min_lng, Decimal::from(-180));
    }

    #[tokio::test]
    async fn test_nearby_rejects_large_radius() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let filter = ProximityFilter::new(ArtworkRepository::new(db), ProximityConfig::default());

        let result = filter.nearby(0.0, 0.0, Some(500.0)).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_nearby_uses_default_radius() {
        let art = create_test_artwork("art1", "owner");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[art]])
                .into_connection(),
        );
        let filter = ProximityFilter::new(ArtworkRepository::new(db), ProximityConfig::default());

        let found = filter.nearby(-33.45, -70.66, None).await.unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn test_nearby_leaves_out_inactive_artwork() {
        let mut inactive = create_test_artwork("art1", "owner");
        inactive.is_active = false;
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[inactive]])
                .into_connection(),
        );
        let filter =
            ProximityFilter::new(ArtworkRepository::new(db.clone()), ProximityConfig::default());

        let found = filter.nearby(-33.45, -70.66, None).await.unwrap();
        assert!(found.is_empty());

        drop(filter);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("is_active\\\" = $"));
    }
}
