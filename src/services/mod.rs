pub mod base_plan;
pub mod geometry;
pub mod google_maps;
pub mod itinerary;
pub mod providers;
pub mod refinement;
pub mod resolver;
pub mod segmentation;
pub mod stop_board;
pub mod supersede;
pub mod trip_planner;
pub mod waypoints;
