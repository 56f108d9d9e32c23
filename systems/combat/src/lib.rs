#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Combat collision queries run after movement each tick.
//!
//! Every test operates on axis-aligned boxes and, because the arena wraps,
//! additionally considers ghost placements of one box near the opposite
//! edge: two entities straddling a seam are adjacent in wrapped space even
//! though their raw coordinates are far apart. The queries are pure; the
//! orchestrator turns positive results into lifecycle mutations and
//! [`quiver_arena_core::CombatEvent`] values.

use quiver_arena_core::{Aabb, ActorId};
use quiver_arena_system_projectile::Arrow;
use quiver_arena_world::wrap::Torus;

/// Minimum downward speed before a falling actor can stomp.
///
/// Falling is not enough; the attacker has to be falling fast.
pub const STOMP_MIN_FALL_SPEED: f32 = 180.0;

/// Thickness of the feet and head strips tested by [`stomp`].
pub const STOMP_STRIP: f32 = 4.0;

/// Center-distance within which an embedded arrow can be collected.
pub const PICKUP_RADIUS: f32 = 16.0;

/// Read-only view of one actor captured for combat queries.
///
/// The orchestrator builds these from its live actors so the queries stay
/// independent of the concrete actor types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorView {
    /// Identity of the actor.
    pub id: ActorId,
    /// Current bounding box.
    pub bounds: Aabb,
    /// Current vertical velocity (positive is down).
    pub vy: f32,
    /// Whether the actor is currently dead.
    pub dead: bool,
    /// Arrows currently carried.
    pub arrows: u32,
    /// Quiver capacity.
    pub max_arrows: u32,
}

/// Wrap-aware overlap test between two boxes.
///
/// Tests the raw boxes first, then up to eight ghost placements of `a`
/// whenever it sits near a seam.
#[must_use]
pub fn overlaps_wrapped(a: &Aabb, b: &Aabb, torus: Torus) -> bool {
    if a.overlaps(b) {
        return true;
    }
    torus
        .ghost_offsets(a.x, a.y, a.width, a.height)
        .any(|(dx, dy)| a.translated(dx, dy).overlaps(b))
}

/// Whether a flying arrow strikes the given actor.
///
/// The arrow's owner and dead actors are immune regardless of overlap.
#[must_use]
pub fn arrow_hits_actor(arrow: &Arrow, target: &ActorView, torus: Torus) -> bool {
    if !arrow.is_flying() || target.dead || arrow.owner() == target.id {
        return false;
    }
    overlaps_wrapped(&arrow.bounds(), &target.bounds, torus)
}

/// Whether `attacker` stomps `target` this tick.
///
/// Requires the attacker to be falling faster than
/// [`STOMP_MIN_FALL_SPEED`]; the test then intersects a thin feet strip of
/// the attacker with a thin head strip of the target.
#[must_use]
pub fn stomp(attacker: &ActorView, target: &ActorView, torus: Torus) -> bool {
    if attacker.id == target.id || attacker.dead || target.dead {
        return false;
    }
    if attacker.vy <= STOMP_MIN_FALL_SPEED {
        return false;
    }

    let feet = Aabb::new(
        attacker.bounds.x,
        attacker.bounds.y + attacker.bounds.height - STOMP_STRIP,
        attacker.bounds.width,
        STOMP_STRIP,
    );
    let head = Aabb::new(target.bounds.x, target.bounds.y, target.bounds.width, STOMP_STRIP);
    overlaps_wrapped(&feet, &head, torus)
}

/// Whether the actor collects the given embedded arrow this tick.
///
/// Squared-distance comparison; no square root in this per-tick path. An
/// actor with a full quiver collects nothing.
#[must_use]
pub fn arrow_pickup(arrow: &Arrow, actor: &ActorView, torus: Torus) -> bool {
    if !arrow.active || !arrow.embedded || actor.dead {
        return false;
    }
    if actor.arrows >= actor.max_arrows {
        return false;
    }

    let d2 = torus.distance_squared(arrow.center(), actor.bounds.center());
    d2 <= PICKUP_RADIUS * PICKUP_RADIUS
}

#[cfg(test)]
mod tests {
    use super::{
        arrow_hits_actor, arrow_pickup, overlaps_wrapped, stomp, ActorView, STOMP_MIN_FALL_SPEED,
    };
    use quiver_arena_core::{Aabb, ActorId, ArrowId};
    use quiver_arena_world::wrap::Torus;
    use quiver_arena_system_projectile::Arrow;

    const TORUS: Torus = Torus::new(640.0, 480.0, true, true);

    fn actor(id: u32, x: f32, y: f32) -> ActorView {
        ActorView {
            id: ActorId::new(id),
            bounds: Aabb::new(x, y, 12.0, 16.0),
            vy: 0.0,
            dead: false,
            arrows: 0,
            max_arrows: 5,
        }
    }

    fn flying_arrow(owner: u32, x: f32, y: f32) -> Arrow {
        Arrow::new(ArrowId::new(0), ActorId::new(owner), x, y, 240.0, 0.0)
    }

    fn embedded_arrow(owner: u32, x: f32, y: f32) -> Arrow {
        let mut arrow = flying_arrow(owner, x, y);
        arrow.embedded = true;
        arrow.vx = 0.0;
        arrow.vy = 0.0;
        arrow
    }

    #[test]
    fn wrapped_overlap_spans_the_seam() {
        let near_right = Aabb::new(636.0, 100.0, 12.0, 16.0);
        let near_left = Aabb::new(2.0, 100.0, 12.0, 16.0);
        assert!(!near_right.overlaps(&near_left));
        assert!(overlaps_wrapped(&near_right, &near_left, TORUS));
        assert!(overlaps_wrapped(&near_left, &near_right, TORUS));

        let far = Aabb::new(300.0, 100.0, 12.0, 16.0);
        assert!(!overlaps_wrapped(&near_right, &far, TORUS));
    }

    #[test]
    fn arrow_never_hits_its_owner() {
        let owner = actor(1, 100.0, 100.0);
        let arrow = flying_arrow(1, 102.0, 105.0);
        assert!(arrow.bounds().overlaps(&owner.bounds));
        assert!(!arrow_hits_actor(&arrow, &owner, TORUS));

        let other = actor(2, 100.0, 100.0);
        assert!(arrow_hits_actor(&arrow, &other, TORUS));
    }

    #[test]
    fn arrow_ignores_dead_and_embedded_targets() {
        let mut target = actor(2, 100.0, 100.0);
        target.dead = true;
        let arrow = flying_arrow(1, 102.0, 105.0);
        assert!(!arrow_hits_actor(&arrow, &target, TORUS));

        let target = actor(2, 100.0, 100.0);
        let stuck = embedded_arrow(1, 102.0, 105.0);
        assert!(!arrow_hits_actor(&stuck, &target, TORUS));
    }

    #[test]
    fn arrow_hits_across_the_seam() {
        let target = actor(2, 1.0, 100.0);
        let arrow = flying_arrow(1, 637.0, 104.0);
        assert!(arrow_hits_actor(&arrow, &target, TORUS));
    }

    #[test]
    fn stomp_requires_fast_fall_and_aligned_strips() {
        let mut attacker = actor(1, 100.0, 86.0);
        let target = actor(2, 100.0, 100.0);

        // Feet at 86 + 16 = 102 overlap the head strip 100..104 only when
        // the attacker is falling fast.
        attacker.vy = STOMP_MIN_FALL_SPEED + 40.0;
        assert!(stomp(&attacker, &target, TORUS));

        attacker.vy = STOMP_MIN_FALL_SPEED - 40.0;
        assert!(!stomp(&attacker, &target, TORUS));

        // Fast fall but feet well above the head strip.
        attacker.vy = STOMP_MIN_FALL_SPEED + 40.0;
        attacker.bounds.y = 60.0;
        assert!(!stomp(&attacker, &target, TORUS));
    }

    #[test]
    fn stomp_never_self_targets() {
        let mut attacker = actor(1, 100.0, 86.0);
        attacker.vy = 400.0;
        assert!(!stomp(&attacker, &attacker, TORUS));
    }

    #[test]
    fn pickup_requires_embedded_arrow_and_quiver_room() {
        let mut collector = actor(1, 100.0, 100.0);
        let stuck = embedded_arrow(2, 104.0, 106.0);
        assert!(arrow_pickup(&stuck, &collector, TORUS));

        // Same spot but still flying: not collectible.
        let flying = flying_arrow(2, 104.0, 106.0);
        assert!(!arrow_pickup(&flying, &collector, TORUS));

        // Full quiver collects nothing.
        collector.arrows = collector.max_arrows;
        assert!(!arrow_pickup(&stuck, &collector, TORUS));
    }

    #[test]
    fn pickup_respects_the_radius() {
        let collector = actor(1, 100.0, 100.0);
        // Actor center (106, 108); arrow center 40 px away.
        let far = embedded_arrow(2, 142.0, 107.0);
        assert!(!arrow_pickup(&far, &collector, TORUS));
    }

    #[test]
    fn pickup_reaches_across_the_seam() {
        let collector = actor(1, 2.0, 100.0);
        // Centered at (635, 108): 13 px from the collector center (8, 108)
        // through the seam.
        let stuck = embedded_arrow(2, 631.0, 107.0);
        assert!(arrow_pickup(&stuck, &collector, TORUS));
    }
}
