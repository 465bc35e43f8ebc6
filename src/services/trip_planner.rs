use crate::config::PlannerConfig;
use crate::error::{AppError, Result};
use crate::models::{DynamicDay, ItineraryRequest, PlanRequest, PlanResponse, StopPoint};
use crate::services::base_plan::build_base_plan;
use crate::services::itinerary::assemble_itinerary;
use crate::services::providers::{Directions, DirectionsRequest};
use crate::services::refinement::DistanceRefiner;
use crate::services::resolver::PlaceResolver;
use crate::services::segmentation::{search_radius_m, segment_hybrid, segment_path};
use crate::services::stop_board::StopBoard;
use crate::services::supersede::Superseder;
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Whether routed distances are part of the returned plan or filled in on
/// the board afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementMode {
    Await,
    Detached,
}

pub struct TripPlanner {
    directions: Arc<dyn Directions>,
    resolver: Arc<PlaceResolver>,
    refiner: DistanceRefiner,
    config: PlannerConfig,
}

impl TripPlanner {
    pub fn new(
        directions: Arc<dyn Directions>,
        resolver: Arc<PlaceResolver>,
        config: PlannerConfig,
    ) -> Self {
        Self {
            refiner: DistanceRefiner::new(directions.clone()),
            directions,
            resolver,
            config,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans a trip on its own board
    pub async fn plan_once(&self, request: &PlanRequest) -> Result<PlanResponse> {
        let board = Arc::new(StopBoard::new());
        self.plan(request, &board, RefinementMode::Await).await
    }

    /// Full pipeline: route, base plan, segmentation, per-stop resolution
    /// and itinerary assembly. Fails with [`AppError::Superseded`] when a
    /// newer run replaced the board's stops before this one finished.
    #[tracing::instrument(
        skip(self, request, board),
        fields(origin = %request.origin, destination = %request.destination)
    )]
    pub async fn plan(
        &self,
        request: &PlanRequest,
        board: &Arc<StopBoard>,
        mode: RefinementMode,
    ) -> Result<PlanResponse> {
        request.validate().map_err(AppError::InvalidRequest)?;

        let waypoints = request.waypoints.as_slice();
        let route = self
            .directions
            .route(&DirectionsRequest {
                origin: request.origin.clone(),
                destination: request.destination.clone(),
                waypoints: waypoints.to_vec(),
            })
            .await?;
        let path = route.path();
        if path.len() < 2 {
            return Err(AppError::NoRoute(format!(
                "{} -> {} has no drivable geometry",
                request.origin, request.destination
            )));
        }

        let base_plan = build_base_plan(
            &route,
            &request.origin,
            &request.destination,
            waypoints,
            request.max_km_per_day,
        );
        let segmentation = if waypoints.is_empty() {
            segment_path(&path, request.max_km_per_day)
        } else {
            segment_hybrid(&base_plan, &path, waypoints)
        };
        let radius_m = search_radius_m(request.max_km_per_day, &self.config);

        let generation = board.begin(segmentation.stops.clone()).await;
        tracing::info!(
            generation,
            stops = segmentation.stops.len(),
            radius_m,
            "Resolving {} stops over {:.1}km",
            segmentation.stops.len(),
            segmentation.total_distance_km
        );

        let tasks = segmentation
            .stops
            .into_iter()
            .enumerate()
            .map(|(index, stop)| {
                self.resolve_stop(board, generation, index, stop, radius_m, request, mode)
            });
        join_all(tasks).await;

        let (current, stops) = board.snapshot().await;
        if current != generation {
            tracing::info!(generation, current, "Plan superseded before completion");
            return Err(AppError::Superseded);
        }

        let days = assemble_itinerary(
            &stops,
            &base_plan,
            &request.extra_days,
            &request.origin,
            request.start_date,
        );

        Ok(PlanResponse {
            id: Uuid::new_v4(),
            generation,
            search_radius_m: radius_m,
            total_distance_km: segmentation.total_distance_km,
            base_plan,
            stops,
            days,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn resolve_stop(
        &self,
        board: &Arc<StopBoard>,
        generation: u64,
        index: usize,
        mut stop: StopPoint,
        radius_m: f64,
        request: &PlanRequest,
        mode: RefinementMode,
    ) {
        let resolution = self
            .resolver
            .resolve(&stop, radius_m, request.waypoints.as_slice())
            .await;
        resolution.apply_to(&mut stop);

        let written = board
            .update(generation, index, |slot| *slot = stop.clone())
            .await;
        if !written || stop.city_coords.is_none() {
            return;
        }

        let refiner = self.refiner.clone();
        let origin = request.origin.clone();
        let board = board.clone();
        let refine = async move {
            if !board.is_current(generation) {
                tracing::debug!(generation, index, "Skipping refinement for superseded stops");
                return;
            }
            if let Some(refined) = refiner.refine(&origin, &stop).await {
                board
                    .update(generation, index, |slot| {
                        slot.routed_distance_from_origin_km = Some(refined.km)
                    })
                    .await;
            }
        };

        match mode {
            RefinementMode::Await => refine.await,
            RefinementMode::Detached => {
                tokio::spawn(refine);
            }
        }
    }

    /// Rebuilds the calendar from an earlier plan without any remote call.
    /// An implausible origin or an out-of-range stop leaves the itinerary empty.
    pub fn reassemble(&self, request: &ItineraryRequest) -> Vec<DynamicDay> {
        if let Err(e) = request.validate() {
            tracing::debug!(origin = %request.origin, "Skipping itinerary: {}", e);
            return Vec::new();
        }
        assemble_itinerary(
            &request.stops,
            &request.base_plan,
            &request.extra_days,
            &request.origin,
            request.start_date,
        )
    }
}

/// A user's editing session: one board, and every new submission supersedes
/// the previous recomputation after the debounce delay.
pub struct PlanSession {
    planner: Arc<TripPlanner>,
    board: Arc<StopBoard>,
    superseder: Superseder,
}

impl PlanSession {
    pub fn new(planner: Arc<TripPlanner>) -> Self {
        let delay = planner.config().debounce();
        Self {
            planner,
            board: Arc::new(StopBoard::new()),
            superseder: Superseder::new(delay),
        }
    }

    pub fn board(&self) -> &Arc<StopBoard> {
        &self.board
    }

    pub async fn submit(&self, request: PlanRequest) -> JoinHandle<Result<PlanResponse>> {
        let planner = self.planner.clone();
        let board = self.board.clone();
        self.superseder
            .submit(async move {
                planner
                    .plan(&request, &board, RefinementMode::Detached)
                    .await
            })
            .await
    }
}
