//! Closed-form ray tracing through a constant-velocity layered model.
//!
//! With horizontal slowness `p = sin(theta) / v_source`, a ray crossing a layer
//! of thickness `dz` and velocity `v` advances `dz * p * v / sqrt(1 - (p * v)^2)`
//! horizontally in `dz / (v * sqrt(1 - (p * v)^2))` seconds one way.
//! Distances are unsigned; callers carry the side of the swath.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::processing::svp::{LayeredModel, SoundVelocityProfile};

/// How far a point-mode ray is traced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RayLimit {
    /// One-way travel time, seconds.
    TravelTime(f64),
    /// Absolute depth, metres.
    Depth(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RayStatus {
    Complete,
    /// The ray could not enter `layer` because `p * v >= 1` there.
    PostCritical { layer: usize },
}

impl RayStatus {
    pub fn is_terminated(&self) -> bool {
        matches!(self, RayStatus::PostCritical { .. })
    }
}

/// End point of a point-mode trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayPoint {
    pub distance: f64,
    /// Absolute depth including any static shift.
    pub depth: f64,
    /// One-way travel time actually consumed, seconds.
    pub travel_time: f64,
    pub status: RayStatus,
    /// Negative when the source sat above the profile's shallowest knot.
    pub static_shift: f64,
}

/// Precomputed distance and two-way time at every layer boundary for one angle.
#[derive(Debug, Clone, PartialEq)]
pub struct RayTable {
    slowness: f64,
    depths: Vec<f64>,
    distances: Vec<f64>,
    times: Vec<f64>,
    velocities: Vec<f64>,
    terminated_at: Option<usize>,
}

/// Lookup result from a ray table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableHit {
    pub distance: f64,
    pub depth: f64,
    pub status: RayStatus,
}

impl RayTable {
    pub fn build(model: &LayeredModel, angle_deg: f64) -> Self {
        let boundaries = model.boundaries();
        let velocities = model.velocities();
        let slowness = angle_deg.abs().to_radians().sin() / velocities[0];

        let mut depths = vec![boundaries[0]];
        let mut distances = vec![0.0];
        let mut times = vec![0.0];
        let mut terminated_at = None;

        for layer in 0..boundaries.len() - 1 {
            let pv = slowness * velocities[layer];
            if pv >= 1.0 {
                terminated_at = Some(layer);
                break;
            }
            let cos_term = (1.0 - pv * pv).sqrt();
            let path = (boundaries[layer + 1] - boundaries[layer]) / cos_term;
            depths.push(boundaries[layer + 1]);
            distances.push(distances[layer] + path * pv);
            times.push(times[layer] + 2.0 * path / velocities[layer]);
        }

        Self {
            slowness,
            depths,
            distances,
            times,
            velocities: velocities.to_vec(),
            terminated_at,
        }
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    /// Boundary rows as `(depth, distance, two_way_time)`.
    pub fn rows(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.depths
            .iter()
            .zip(&self.distances)
            .zip(&self.times)
            .map(|((&depth, &distance), &time)| (depth, distance, time))
    }

    /// Position reached after `two_way_time` seconds.
    pub fn lookup(&self, two_way_time: f64) -> TableHit {
        let last = self.times.len() - 1;
        let row = self
            .times
            .partition_point(|&time| time <= two_way_time)
            .saturating_sub(1);

        if row == last {
            if let Some(layer) = self.terminated_at {
                return TableHit {
                    distance: self.distances[last],
                    depth: self.depths[last],
                    status: RayStatus::PostCritical { layer },
                };
            }
        }

        let velocity = self.velocities[row.min(self.velocities.len() - 1)];
        let pv = self.slowness * velocity;
        let cos_term = (1.0 - pv * pv).sqrt();
        let one_way = 0.5 * (two_way_time - self.times[row]).max(0.0);
        let dz = one_way * velocity * cos_term;
        TableHit {
            distance: self.distances[row] + dz * pv / cos_term,
            depth: self.depths[row] + dz,
            status: RayStatus::Complete,
        }
    }
}

/// Forward ray tracer owning its model and a per-angle table cache.
#[derive(Debug, Clone)]
pub struct Raytracer {
    model: LayeredModel,
    tables: BTreeMap<i64, RayTable>,
}

impl Raytracer {
    pub fn new(model: LayeredModel) -> Self {
        Self {
            model,
            tables: BTreeMap::new(),
        }
    }

    pub fn from_profile(profile: &SoundVelocityProfile) -> Self {
        Self::new(profile.layered_model())
    }

    pub fn model(&self) -> &LayeredModel {
        &self.model
    }

    /// Table for `angle_deg`, built on first use and cached to the micro-degree.
    pub fn table(&mut self, angle_deg: f64) -> &RayTable {
        let key = (angle_deg * 1.0e6).round() as i64;
        let model = &self.model;
        self.tables
            .entry(key)
            .or_insert_with(|| RayTable::build(model, angle_deg))
    }

    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    /// Traces one ray from `source_depth` at `angle_deg` from vertical.
    ///
    /// A source above the model top starts at the top and the static shift is
    /// added back to the returned depth.
    pub fn trace(&self, angle_deg: f64, limit: RayLimit, source_depth: f64) -> RayPoint {
        let top = self.model.top();
        let static_shift = if source_depth < top {
            source_depth - top
        } else {
            0.0
        };
        let start = source_depth - static_shift;
        let velocities = self.model.velocities();
        let mut layer = self.model.layer_index(start).unwrap_or(0);
        let slowness = angle_deg.abs().to_radians().sin() / velocities[layer];

        let mut depth = start;
        let mut distance = 0.0;
        let mut time = 0.0;
        let mut status = RayStatus::Complete;

        loop {
            let velocity = velocities[layer];
            let pv = slowness * velocity;
            if pv >= 1.0 {
                status = RayStatus::PostCritical { layer };
                break;
            }
            let cos_term = (1.0 - pv * pv).sqrt();
            let bottom = self.model.bottom_of(layer);

            let stop_dz = match limit {
                RayLimit::TravelTime(end_time) => {
                    let remaining = (end_time - time).max(0.0);
                    let crossing = (bottom - depth) / (velocity * cos_term);
                    (crossing >= remaining).then(|| remaining * velocity * cos_term)
                }
                RayLimit::Depth(target) => (target <= bottom).then(|| (target - depth).max(0.0)),
            };

            let dz = stop_dz.unwrap_or(bottom - depth);
            depth += dz;
            distance += dz * pv / cos_term;
            time += dz / (velocity * cos_term);

            if stop_dz.is_some() {
                break;
            }
            depth = bottom;
            layer += 1;
        }

        RayPoint {
            distance,
            depth: depth + static_shift,
            travel_time: time,
            status,
            static_shift,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::svp::MAX_MODEL_DEPTH;

    fn layered() -> Raytracer {
        let profile = SoundVelocityProfile::from_knots(&[
            (0.0, 1500.0),
            (100.0, 1490.0),
            (400.0, 1480.0),
            (1000.0, 1520.0),
            (MAX_MODEL_DEPTH, 1540.0),
        ])
        .unwrap();
        Raytracer::from_profile(&profile)
    }

    #[test]
    fn half_space_matches_straight_ray() {
        let raytracer = Raytracer::from_profile(&SoundVelocityProfile::half_space(1500.0).unwrap());
        let time = 0.5;
        for step in 1..90 {
            let angle = step as f64;
            let ray = raytracer.trace(angle, RayLimit::TravelTime(time), 0.0);
            let theta = angle.to_radians();
            assert!((ray.distance - 1500.0 * time * theta.sin()).abs() < 1e-6);
            assert!((ray.depth - 1500.0 * time * theta.cos()).abs() < 1e-6);
            assert!((ray.travel_time - time).abs() < 1e-9);
            assert_eq!(ray.status, RayStatus::Complete);
        }
    }

    #[test]
    fn depth_limit_reaches_target_depth() {
        let raytracer = layered();
        let ray = raytracer.trace(35.0, RayLimit::Depth(650.0), 0.0);
        assert!((ray.depth - 650.0).abs() < 1e-9);
        let by_time = raytracer.trace(35.0, RayLimit::TravelTime(ray.travel_time), 0.0);
        assert!((by_time.distance - ray.distance).abs() < 1e-6);
        assert!((by_time.depth - 650.0).abs() < 1e-6);
    }

    #[test]
    fn source_above_profile_applies_static_shift() {
        let profile = SoundVelocityProfile::from_knots(&[(5.0, 1500.0), (MAX_MODEL_DEPTH, 1500.0)]).unwrap();
        let raytracer = Raytracer::from_profile(&profile);
        let ray = raytracer.trace(0.0, RayLimit::TravelTime(0.1), 2.0);
        assert!((ray.static_shift + 3.0).abs() < 1e-12);
        assert!((ray.depth - (2.0 + 150.0)).abs() < 1e-9);
    }

    #[test]
    fn post_critical_ray_terminates_at_boundary() {
        let profile = SoundVelocityProfile::from_knots(&[
            (0.0, 1500.0),
            (100.0, 1500.0),
            (101.0, 3000.0),
            (MAX_MODEL_DEPTH, 3000.0),
        ])
        .unwrap();
        let raytracer = Raytracer::from_profile(&profile);
        let ray = raytracer.trace(60.0, RayLimit::TravelTime(2.0), 0.0);
        assert!(ray.status.is_terminated());
        assert!(ray.travel_time < 2.0);
        assert!(ray.depth <= 101.0 + 1e-9);
    }

    #[test]
    fn table_lookup_agrees_with_point_mode() {
        let mut raytracer = layered();
        let point = raytracer.trace(40.0, RayLimit::TravelTime(0.6), 0.0);
        let hit = raytracer.table(40.0).lookup(1.2);
        assert!((hit.distance - point.distance).abs() < 1e-6);
        assert!((hit.depth - point.depth).abs() < 1e-6);
        assert_eq!(hit.status, RayStatus::Complete);
    }

    #[test]
    fn table_covers_every_boundary_and_is_cached() {
        let mut raytracer = layered();
        let rows = raytracer.table(20.0).len();
        assert_eq!(rows, raytracer.model().boundaries().len());
        raytracer.table(20.0);
        raytracer.table(-20.0);
        assert_eq!(raytracer.cached_tables(), 2);
        let (depth, _, time) = raytracer.table(20.0).rows().last().unwrap();
        assert_eq!(depth, MAX_MODEL_DEPTH);
        assert!(time > 0.0);
    }
}
