pub mod distance;
pub mod geo_point;
pub mod place;
pub mod trip;

pub use distance::{DistanceKm, DistanceMeters};
pub use geo_point::GeoPoint;
pub use place::{AddressComponent, GeocodeResult, PlaceResult, PlaceType};
pub use trip::{
    is_plausible_address, Alternative, BaseDayPlan, DayType, DynamicDay, ExtraDaysMap,
    ItineraryRequest, ItineraryResponse, ManualWaypoints, PlanRequest, PlanResponse, StopPoint,
};
