use roadtrip::cache::FileStore;
use roadtrip::models::{DayType, ItineraryRequest, ManualWaypoints};
use roadtrip::services::stop_board::StopBoard;
use roadtrip::services::trip_planner::{PlanSession, RefinementMode};
use roadtrip::AppError;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{memory_cache, plan_request, planner, FakeMaps};

#[tokio::test]
async fn test_900km_at_300km_per_day() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = planner(&maps, memory_cache());

    let plan = planner.plan_once(&plan_request(300.0)).await.unwrap();

    assert_eq!(plan.stops.len(), 2);
    assert_eq!(plan.base_plan.len(), 3);
    assert_eq!(plan.days.len(), 3);
    assert!((plan.total_distance_km - 900.0).abs() < 0.01);
    assert_eq!(plan.search_radius_m, 24_000.0);

    let last = plan.days.last().unwrap();
    assert_eq!(last.day_number, 3);
    assert_eq!(last.to, "Santander, Spain");
    assert_eq!(plan.days[0].from, "Málaga, Spain");
    assert!(plan.days.iter().all(|d| d.day_type == DayType::Driving));

    for stop in &plan.stops {
        assert_eq!(stop.city_name.as_deref(), Some(common::town_name(&stop.location()).as_str()));
        assert_eq!(stop.alternatives.len(), 2);
        assert!(!stop.is_manual_waypoint);
        assert!(stop.routed_distance_from_origin_km.is_some());
    }
    assert_eq!(plan.days[0].to, plan.stops[0].label());
    assert_eq!(plan.days[1].from, plan.stops[0].label());
}

#[tokio::test]
async fn test_short_trip_is_one_day() {
    let maps = Arc::new(FakeMaps::new(180.0));
    let planner = planner(&maps, memory_cache());

    let plan = planner.plan_once(&plan_request(300.0)).await.unwrap();

    assert!(plan.stops.is_empty());
    assert_eq!(plan.days.len(), 1);
    assert_eq!(plan.days[0].to, "Santander, Spain");
    assert_eq!(maps.remote_calls(), 0);
}

#[tokio::test]
async fn test_repeated_plan_is_served_from_cache() {
    let maps = Arc::new(FakeMaps::new(1200.0));
    let cache = memory_cache();
    let planner = planner(&maps, cache.clone());

    let first = planner.plan_once(&plan_request(400.0)).await.unwrap();
    let calls = maps.remote_calls();
    assert!(calls > 0);

    let second = planner.plan_once(&plan_request(400.0)).await.unwrap();

    assert_eq!(maps.remote_calls(), calls);
    assert_eq!(first.stops, second.stops);
    assert_eq!(first.days, second.days);
    assert!(cache.get_stats().await.hits > 0);
}

#[tokio::test]
async fn test_cache_survives_restart_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("geocoding.json");

    let first_maps = Arc::new(FakeMaps::new(900.0));
    planner(&first_maps, common::cache_over(Arc::new(FileStore::new(&path))))
        .plan_once(&plan_request(300.0))
        .await
        .unwrap();
    assert!(first_maps.remote_calls() > 0);

    let second_maps = Arc::new(FakeMaps::new(900.0));
    let plan = planner(&second_maps, common::cache_over(Arc::new(FileStore::new(&path))))
        .plan_once(&plan_request(300.0))
        .await
        .unwrap();

    assert_eq!(second_maps.remote_calls(), 0);
    assert_eq!(plan.stops.len(), 2);
    assert!(plan.stops.iter().all(|s| s.city_name.is_some()));
}

#[tokio::test]
async fn test_place_search_failure_falls_back_to_reverse_geocode() {
    let maps = Arc::new(FakeMaps::new(900.0));
    maps.fail_places.store(true, Ordering::SeqCst);
    let planner = planner(&maps, memory_cache());

    let plan = planner.plan_once(&plan_request(300.0)).await.unwrap();

    for stop in &plan.stops {
        let name = stop.city_name.as_deref().unwrap();
        assert!(name.starts_with("Reverse "), "unexpected name {}", name);
        assert!(stop.alternatives.is_empty());
    }
    assert!(maps.geocode_calls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_total_lookup_failure_labels_stops_by_day() {
    let maps = Arc::new(FakeMaps::new(900.0));
    maps.fail_places.store(true, Ordering::SeqCst);
    maps.fail_geocode.store(true, Ordering::SeqCst);
    let planner = planner(&maps, memory_cache());

    let plan = planner.plan_once(&plan_request(300.0)).await.unwrap();

    assert_eq!(plan.days.len(), 3);
    assert_eq!(plan.days[0].to, "Day 1");
    assert_eq!(plan.days[1].from, "Day 1");
    assert_eq!(plan.days[1].to, "Day 2");
    assert!(plan.stops.iter().all(|s| s.routed_distance_from_origin_km.is_none()));
}

#[tokio::test]
async fn test_routed_distance_failure_uses_tactical_estimate() {
    let maps = Arc::new(FakeMaps::new(900.0));
    maps.fail_routed.store(true, Ordering::SeqCst);
    let planner = planner(&maps, memory_cache());

    let plan = planner.plan_once(&plan_request(300.0)).await.unwrap();

    for stop in &plan.stops {
        // the fake resolves each stop onto its own location
        let routed = stop.routed_distance_from_origin_km.unwrap();
        assert!((routed - stop.distance_from_origin_km).abs() < 1e-6);
    }
}

#[tokio::test]
async fn test_manual_waypoint_stop() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = planner(&maps, memory_cache());
    let mut request = plan_request(300.0);
    request.waypoints = ManualWaypoints::from_iter(["Córdoba, Spain"]);

    let plan = planner.plan_once(&request).await.unwrap();

    // leg 1: cut + Córdoba, leg 2: cut + Santander
    assert_eq!(plan.base_plan.len(), 4);
    assert_eq!(plan.base_plan[1].to, "Córdoba, Spain");
    assert_eq!(plan.stops.len(), 3);

    let manual = &plan.stops[1];
    assert!(manual.is_manual_waypoint);
    assert!(manual.alternatives.is_empty());
    assert_eq!(Some(manual.location()), plan.base_plan[1].to_coords);

    assert!(!plan.stops[0].is_manual_waypoint);
    assert!(!plan.stops[0].alternatives.is_empty());
    assert!(plan.days[1].is_manual_waypoint);
    assert_eq!(plan.days.len(), 4);
}

#[tokio::test]
async fn test_extra_days_extend_the_trip() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = planner(&maps, memory_cache());
    let mut request = plan_request(300.0);
    request.extra_days = [("Santander, Spain", 1)].into_iter().collect();

    let plan = planner.plan_once(&request).await.unwrap();
    assert_eq!(plan.days.len(), 4);
    assert_eq!(plan.days[3].day_type, DayType::Stay);

    let stay_city = plan.stops[1].label();
    let mut extra = request.extra_days.clone();
    extra.increment(stay_city.clone());
    extra.increment(stay_city.clone());

    let days = planner.reassemble(&ItineraryRequest {
        origin: request.origin.clone(),
        start_date: request.start_date,
        base_plan: plan.base_plan.clone(),
        stops: plan.stops.clone(),
        extra_days: extra,
    });

    assert_eq!(days.len(), 6);
    assert_eq!(days[2].day_type, DayType::Stay);
    assert_eq!(days[2].city_name, stay_city);
    assert_eq!(days[4].to, "Santander, Spain");
    for pair in days.windows(2) {
        assert_eq!(pair[1].day_number, pair[0].day_number + 1);
    }
}

#[tokio::test]
async fn test_invalid_request_makes_no_remote_call() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = planner(&maps, memory_cache());

    let mut request = plan_request(300.0);
    request.origin = "Madrid".to_string();
    assert!(matches!(
        planner.plan_once(&request).await,
        Err(AppError::InvalidRequest(_))
    ));

    let request = plan_request(20.0);
    assert!(matches!(
        planner.plan_once(&request).await,
        Err(AppError::InvalidRequest(_))
    ));

    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_route_is_surfaced() {
    let maps = Arc::new(FakeMaps::new(900.0));
    maps.fail_route.store(true, Ordering::SeqCst);
    let planner = planner(&maps, memory_cache());

    let result = planner.plan_once(&plan_request(300.0)).await;
    assert!(matches!(result, Err(AppError::NoRoute(_))));
}

#[tokio::test]
async fn test_stale_run_is_dropped() {
    let maps = Arc::new(FakeMaps::new(900.0).with_place_delay(Duration::from_millis(150)));
    let planner = Arc::new(planner(&maps, memory_cache()));
    let board = Arc::new(StopBoard::new());

    let stale = {
        let planner = planner.clone();
        let board = board.clone();
        tokio::spawn(async move {
            planner
                .plan(&plan_request(300.0), &board, RefinementMode::Await)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    let fresh = board.begin(Vec::new()).await;

    let result = stale.await.unwrap();
    assert!(matches!(result, Err(AppError::Superseded)));

    let (generation, stops) = board.snapshot().await;
    assert_eq!(generation, fresh);
    assert!(stops.is_empty());
}

#[tokio::test]
async fn test_background_refinement_skipped_once_superseded() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = planner(&maps, memory_cache());
    let board = Arc::new(StopBoard::new());

    let plan = planner
        .plan(&plan_request(300.0), &board, RefinementMode::Detached)
        .await
        .unwrap();
    assert_eq!(plan.stops.len(), 2);
    board.begin(Vec::new()).await;

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(maps.routed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_session_supersedes_previous_submission() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = Arc::new(planner(&maps, memory_cache()));
    let session = PlanSession::new(planner);

    let first = session.submit(plan_request(300.0)).await;
    let second = session.submit(plan_request(450.0)).await;

    assert!(first.await.unwrap_err().is_cancelled());
    let plan = second.await.unwrap().unwrap();

    assert_eq!(plan.stops.len(), 1);
    assert_eq!(maps.directions_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_refines_distances_in_background() {
    let maps = Arc::new(FakeMaps::new(900.0));
    let planner = Arc::new(planner(&maps, memory_cache()));
    let session = PlanSession::new(planner);

    let plan = session
        .submit(plan_request(300.0))
        .await
        .await
        .unwrap()
        .unwrap();
    assert_eq!(plan.stops.len(), 2);

    let mut refined = Vec::new();
    for _ in 0..50 {
        let (_, stops) = session.board().snapshot().await;
        if stops.iter().all(|s| s.routed_distance_from_origin_km.is_some()) {
            refined = stops;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(refined.len(), 2);
    for stop in refined {
        let routed = stop.routed_distance_from_origin_km.unwrap();
        assert!(routed > stop.distance_from_origin_km);
    }
}
