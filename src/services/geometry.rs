use crate::models::{DistanceMeters, GeoPoint};

/// Great-circle length of a path, summed edge by edge
pub fn path_length(path: &[GeoPoint]) -> DistanceMeters {
    path.windows(2)
        .map(|w| DistanceMeters(w[0].distance_m(&w[1])))
        .fold(DistanceMeters::default(), |acc, d| acc + d)
}

/// Index and value of the path vertex closest to `target`.
/// Ties keep the earliest vertex.
pub fn nearest_vertex(path: &[GeoPoint], target: &GeoPoint) -> Option<(usize, GeoPoint)> {
    let mut best: Option<(usize, f64)> = None;

    for (i, vertex) in path.iter().enumerate() {
        let d = vertex.distance_m(target);
        match best {
            Some((_, best_d)) if best_d <= d => {}
            _ => best = Some((i, d)),
        }
    }

    best.map(|(i, _)| (i, path[i]))
}

/// Concatenates leg paths, dropping the duplicated vertex where a leg
/// starts exactly where the previous one ended.
pub fn join_paths<'a, I>(paths: I) -> Vec<GeoPoint>
where
    I: IntoIterator<Item = &'a [GeoPoint]>,
{
    let mut joined: Vec<GeoPoint> = Vec::new();
    for path in paths {
        let skip = match (joined.last(), path.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        joined.extend_from_slice(&path[skip.min(path.len())..]);
    }
    joined
}
