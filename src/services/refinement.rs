use crate::models::{is_plausible_address, StopPoint};
use crate::services::providers::Directions;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceSource {
    /// First leg of a real driving route from the origin
    Routed,
    /// Walker distance plus the straight line to the resolved city
    Tactical,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedDistance {
    pub km: f64,
    pub source: DistanceSource,
}

/// Replaces the walker's path distance with a routed distance from the
/// origin to the stop's resolved city.
#[derive(Clone)]
pub struct DistanceRefiner {
    directions: Arc<dyn Directions>,
}

impl DistanceRefiner {
    pub fn new(directions: Arc<dyn Directions>) -> Self {
        Self { directions }
    }

    /// `None` when the stop has no resolved city yet
    pub async fn refine(&self, origin: &str, stop: &StopPoint) -> Option<RefinedDistance> {
        let city = stop.city_coords?;

        if is_plausible_address(origin) {
            match self.directions.routed_distance_m(origin, &city).await {
                Ok(meters) => {
                    debug!(
                        day = stop.day_index,
                        "Routed distance to {}: {:.1}km",
                        stop.label(),
                        meters / 1000.0
                    );
                    return Some(RefinedDistance {
                        km: meters / 1000.0,
                        source: DistanceSource::Routed,
                    });
                }
                Err(e) => {
                    warn!(
                        day = stop.day_index,
                        "Routed distance to {} failed, using tactical estimate: {}",
                        stop.label(),
                        e
                    );
                }
            }
        } else {
            debug!(origin, "Origin is not routable, using tactical estimate");
        }

        Some(RefinedDistance {
            km: stop.distance_from_origin_km + stop.location().distance_to(&city),
            source: DistanceSource::Tactical,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::GeoPoint;
    use crate::services::providers::{DirectionsRequest, DirectionsRoute};
    use async_trait::async_trait;

    struct FixedDirections(Option<f64>);

    #[async_trait]
    impl Directions for FixedDirections {
        async fn route(&self, _request: &DirectionsRequest) -> Result<DirectionsRoute> {
            Err(AppError::NoRoute("unused".to_string()))
        }

        async fn routed_distance_m(&self, _origin: &str, _destination: &GeoPoint) -> Result<f64> {
            self.0
                .ok_or_else(|| AppError::MapsApi("UNKNOWN_ERROR".to_string()))
        }
    }

    fn resolved_stop() -> StopPoint {
        let mut stop = StopPoint::new(GeoPoint::new(41.0, -4.0).unwrap(), 1, 250.0, 250.0);
        stop.city_coords = Some(GeoPoint::new(41.1, -4.0).unwrap());
        stop
    }

    #[tokio::test]
    async fn test_routed_distance() {
        let refiner = DistanceRefiner::new(Arc::new(FixedDirections(Some(262_400.0))));
        let refined = refiner.refine("Madrid, Spain", &resolved_stop()).await.unwrap();
        assert_eq!(refined.source, DistanceSource::Routed);
        assert!((refined.km - 262.4).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_tactical() {
        let refiner = DistanceRefiner::new(Arc::new(FixedDirections(None)));
        let refined = refiner.refine("Madrid, Spain", &resolved_stop()).await.unwrap();
        assert_eq!(refined.source, DistanceSource::Tactical);
        // 0.1 degree of latitude is about 11.1 km
        assert!((refined.km - 261.12).abs() < 0.05);
    }

    #[tokio::test]
    async fn test_invalid_origin_skips_remote_call() {
        let refiner = DistanceRefiner::new(Arc::new(FixedDirections(Some(1.0))));
        let refined = refiner.refine("Madrid", &resolved_stop()).await.unwrap();
        assert_eq!(refined.source, DistanceSource::Tactical);
    }

    #[tokio::test]
    async fn test_unresolved_stop_is_not_refined() {
        let refiner = DistanceRefiner::new(Arc::new(FixedDirections(Some(1.0))));
        let stop = StopPoint::new(GeoPoint::new(41.0, -4.0).unwrap(), 1, 250.0, 250.0);
        assert!(refiner.refine("Madrid, Spain", &stop).await.is_none());
    }
}
