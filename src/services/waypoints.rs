//! Matching resolved city names against user-declared overnight stops.
//!
//! Both sides are reduced to their first comma-delimited segment, trimmed and
//! lower-cased; two names match when either contains the other. Containment
//! is loose ("Villanueva" matches both "Villanueva de la Serena" and
//! "Villanueva del Fresno"), so [`match_manual`] prefers an exact normalized
//! match and reports when several waypoints match by containment only.

/// `"  Madrid, Spain "` -> `"madrid"`
pub fn normalize_place(name: &str) -> String {
    name.split(',').next().unwrap_or_default().trim().to_lowercase()
}

fn names_match(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaypointMatch {
    None,
    /// Exactly one waypoint matched, or an exact normalized match decided
    Unique(usize),
    /// Several waypoints matched by containment only
    Ambiguous(Vec<usize>),
}

impl WaypointMatch {
    pub fn is_manual(&self) -> bool {
        !matches!(self, WaypointMatch::None)
    }
}

pub fn match_manual<S: AsRef<str>>(city_name: &str, waypoints: &[S]) -> WaypointMatch {
    let city = normalize_place(city_name);
    if city.is_empty() {
        return WaypointMatch::None;
    }

    let normalized: Vec<String> = waypoints
        .iter()
        .map(|w| normalize_place(w.as_ref()))
        .collect();

    if let Some(exact) = normalized.iter().position(|w| *w == city) {
        return WaypointMatch::Unique(exact);
    }

    let matches: Vec<usize> = normalized
        .iter()
        .enumerate()
        .filter(|(_, w)| names_match(&city, w))
        .map(|(i, _)| i)
        .collect();

    match matches.len() {
        0 => WaypointMatch::None,
        1 => WaypointMatch::Unique(matches[0]),
        _ => {
            tracing::warn!(
                city = %city_name,
                candidates = ?matches,
                "Ambiguous manual waypoint match for '{}'",
                city_name
            );
            WaypointMatch::Ambiguous(matches)
        }
    }
}

/// True when `city_name` corresponds to any manual waypoint
pub fn is_manual<S: AsRef<str>>(city_name: &str, waypoints: &[S]) -> bool {
    match_manual(city_name, waypoints).is_manual()
}
