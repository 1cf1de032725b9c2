#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn point selection backed by the host's raycast and navigation queries.
//!
//! Candidates are sampled uniformly in a horizontal disk, dropped onto the
//! ground with a short downward raycast and snapped onto the navigable
//! surface. The selector always produces a position: when every attempt
//! fails it falls back to the anchor itself, or to a point in front of the
//! target.

use dread_core::{SpawnAnchor, Vec3, WorldQuery};
use rand::{seq::SliceRandom, Rng};
use rand_distr::{Distribution, UnitDisc};

/// Number of candidates tried before falling back.
pub const DEFAULT_ATTEMPTS: u32 = 10;
/// Height above the candidate the ground probe starts at.
pub const PROBE_HEIGHT: f32 = 2.0;
/// Length of the downward ground probe.
pub const PROBE_DISTANCE: f32 = 4.0;
/// Largest distance a ground hit may be moved to reach the navigable surface.
pub const SNAP_TOLERANCE: f32 = 2.0;
/// Radius searched around the target when no anchor is involved.
pub const TARGET_SEARCH_RADIUS: f32 = 20.0;
/// Distance in front of the target used when every attempt failed.
pub const FALLBACK_DISTANCE: f32 = 10.0;
/// Direction the fallback offset points along.
pub const FORWARD: Vec3 = Vec3::Z;

/// Area a spawn position is searched in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SearchRegion<'a> {
    /// Disk of the anchor's spawn radius centred on the anchor.
    Anchor(&'a SpawnAnchor),
    /// Disk of [`TARGET_SEARCH_RADIUS`] centred on the target.
    AroundTarget,
}

impl SearchRegion<'_> {
    fn centre(&self, target: Vec3) -> Vec3 {
        match self {
            Self::Anchor(anchor) => anchor.position,
            Self::AroundTarget => target,
        }
    }

    fn radius(&self) -> f32 {
        match self {
            Self::Anchor(anchor) => anchor.spawn_radius,
            Self::AroundTarget => TARGET_SEARCH_RADIUS,
        }
    }

    fn fallback(&self, target: Vec3) -> Vec3 {
        match self {
            Self::Anchor(anchor) => anchor.position,
            Self::AroundTarget => target + FORWARD * FALLBACK_DISTANCE,
        }
    }
}

/// Samples a point uniformly in the horizontal disk of `radius` around `centre`.
#[must_use]
pub fn sample_disk<R: Rng + ?Sized>(centre: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    let [x, z]: [f32; 2] = UnitDisc.sample(rng);
    centre + Vec3::new(x, 0.0, z) * radius.max(0.0)
}

/// Finds a navigable position inside `region`, trying up to `attempts`
/// candidates before falling back.
pub fn find_valid_position<Q, R>(
    query: &Q,
    region: SearchRegion<'_>,
    target: Vec3,
    attempts: u32,
    rng: &mut R,
) -> Vec3
where
    Q: WorldQuery + ?Sized,
    R: Rng + ?Sized,
{
    let centre = region.centre(target);
    let radius = region.radius();

    for _ in 0..attempts {
        let candidate = sample_disk(centre, radius, rng);
        let origin = candidate + Vec3::Y * PROBE_HEIGHT;
        let Some(hit) = query.raycast(origin, Vec3::NEG_Y, PROBE_DISTANCE) else {
            continue;
        };
        if let Some(position) = query.snap_to_navigable(hit.point, SNAP_TOLERANCE) {
            return position;
        }
    }

    region.fallback(target)
}

/// Anchors that are active and whose distance to `target` lies within their
/// band, in catalog order.
#[must_use]
pub fn eligible_anchors(anchors: &[SpawnAnchor], target: Vec3) -> Vec<&SpawnAnchor> {
    anchors
        .iter()
        .filter(|anchor| anchor.admits(target))
        .collect()
}

/// Picks one of the eligible anchors uniformly.
pub fn choose_anchor<'a, R: Rng + ?Sized>(
    eligible: &[&'a SpawnAnchor],
    rng: &mut R,
) -> Option<&'a SpawnAnchor> {
    eligible.choose(rng).copied()
}
