//! Calendar assembly.
//!
//! A pure function of the resolved stops, the base plan, the requested stay
//! days, the origin name and the start date. Day numbers and dates come from a
//! single counter, so they increase by exactly one per emitted day whatever
//! mix of driving and stay days is produced.

use crate::models::{BaseDayPlan, DayType, DynamicDay, ExtraDaysMap, GeoPoint, StopPoint};
use time::{Date, Duration};

struct Calendar {
    days: Vec<DynamicDay>,
    day_number: u32,
    date: Date,
}

impl Calendar {
    fn new(start_date: Date) -> Self {
        Calendar {
            days: Vec::new(),
            day_number: 1,
            date: start_date,
        }
    }

    fn push(
        &mut self,
        day_type: DayType,
        from: &str,
        to: &str,
        distance_km: f64,
        is_manual_waypoint: bool,
        coords: Option<GeoPoint>,
    ) {
        self.days.push(DynamicDay {
            day_number: self.day_number,
            date: self.date,
            day_type,
            from: from.to_string(),
            to: to.to_string(),
            distance_km,
            city_name: to.to_string(),
            is_manual_waypoint,
            coords,
        });
        self.day_number += 1;
        self.date = self.date.saturating_add(Duration::DAY);
    }

    fn drive(&mut self, from: &str, to: &str, km: f64, manual: bool, coords: Option<GeoPoint>) {
        self.push(DayType::Driving, from, to, km, manual, coords);
    }

    /// Stay days requested for `city`, spent in place
    fn stay(
        &mut self,
        city: &str,
        extra_days: &ExtraDaysMap,
        manual: bool,
        coords: Option<GeoPoint>,
    ) {
        for _ in 0..extra_days.get(city) {
            self.push(DayType::Stay, city, city, 0.0, manual, coords);
        }
    }
}

pub fn assemble_itinerary(
    stops: &[StopPoint],
    base_plan: &[BaseDayPlan],
    extra_days: &ExtraDaysMap,
    origin: &str,
    start_date: Date,
) -> Vec<DynamicDay> {
    let mut calendar = Calendar::new(start_date);

    if stops.is_empty() {
        for day in base_plan {
            calendar.drive(&day.from, &day.to, day.distance_km, false, day.to_coords);
            calendar.stay(&day.to, extra_days, false, day.to_coords);
        }
        return calendar.days;
    }

    let mut previous = origin.to_string();
    for stop in stops {
        let city = stop.label();
        let distance_km = base_plan
            .iter()
            .find(|day| day.day_index == stop.day_index)
            .map(|day| day.distance_km)
            .unwrap_or(stop.segment_distance_km);
        let coords = stop.city_coords.or(Some(stop.location()));

        calendar.drive(&previous, &city, distance_km, stop.is_manual_waypoint, coords);
        calendar.stay(&city, extra_days, stop.is_manual_waypoint, coords);
        previous = city;
    }

    if let Some(last) = base_plan.last() {
        calendar.drive(&previous, &last.to, last.distance_km, false, last.to_coords);
        calendar.stay(&last.to, extra_days, false, last.to_coords);
    }

    calendar.days
}
