#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step integrator and one-axis-at-a-time collision resolver.
//!
//! [`step`] advances one body by one tick in a fixed order: pre-movement
//! ground probe, wall-flag clear, coyote/stability timers, gravity,
//! integration, wrap, X-axis resolve, Y-axis resolve, authoritative ground
//! recompute, friction, bottom-row override. The order is load-bearing;
//! rearranging it reintroduces the landing-bounce and corner-jitter bugs the
//! resolver exists to avoid. Input helpers ([`apply_horizontal_movement`],
//! [`apply_jump`], [`apply_wall_slide`]) run before [`step`] each tick and
//! read the contact flags the previous step produced.

pub mod body;
pub mod tuning;

pub use body::{Body, TouchingWall};

use quiver_arena_world::World;

/// Replaces invalid frame deltas with the fixed step.
///
/// Non-finite, non-positive, and implausibly large (> 100 ms) deltas all
/// collapse to [`tuning::STEP`]; the simulation never rejects a tick.
#[must_use]
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 && dt <= tuning::MAX_DT {
        dt
    } else {
        tuning::STEP
    }
}

/// Advances one body by one fixed step against the world.
pub fn step(body: &mut Body, dt: f32, world: &World) {
    let dt = sanitize_dt(dt);
    if !body.vx.is_finite() {
        body.vx = 0.0;
    }
    if !body.vy.is_finite() {
        body.vy = 0.0;
    }
    let before = *body;

    // 1. Pre-movement ground state. `was_on_ground` carries the previous
    //    tick's pre-movement probe so the leave-ground transition is visible
    //    exactly once.
    let probe_pre = ground_probe(body, world);
    let left_ground = body.was_on_ground && !probe_pre;
    body.was_on_ground = probe_pre;
    body.on_ground = probe_pre;

    // 2.
    body.touching_wall = TouchingWall::default();

    // 3. Grace timers.
    if left_ground {
        body.coyote_time = tuning::COYOTE_TIME;
    } else {
        body.coyote_time = (body.coyote_time - dt).max(0.0);
    }
    body.jump_cooldown = (body.jump_cooldown - dt).max(0.0);
    body.jump_lock_time = (body.jump_lock_time - dt).max(0.0);
    if body.on_ground {
        body.ground_stable_time += dt;
    } else {
        body.ground_stable_time = 0.0;
    }
    if body.jump_lock_time <= 0.0 {
        body.just_landed = false;
    }

    // 4. Gravity only while airborne; grounded downward velocity dies at once.
    if body.on_ground {
        if body.vy > 0.0 {
            body.vy = 0.0;
        }
    } else {
        body.vy = (body.vy + tuning::GRAVITY * dt).min(tuning::MAX_FALL_SPEED);
    }

    // 5. Integrate, then 6. wrap.
    body.x += body.vx * dt;
    body.y += body.vy * dt;
    let (wx, wy) = world.torus().wrap(body.x, body.y);
    body.x = wx;
    body.y = wy;

    // 7. Resolve X before Y, always.
    resolve_axis_x(body, world);
    let mut landed = resolve_axis_y(body, world);

    // 8. Authoritative ground state. A falling foot inside probe reach
    //    settles flush on the supporting row; an ascending body is never
    //    grounded.
    if body.vy >= 0.0 && ground_probe(body, world) {
        if !body.on_ground {
            let tile = world.tile_size();
            let foot = body.y + body.height;
            let row_top = ((foot + tuning::GROUND_PROBE_TOLERANCE) / tile).floor() * tile;
            if row_top >= foot {
                body.y = row_top - body.height;
            }
            landed = true;
        }
        body.on_ground = true;
    } else {
        body.on_ground = false;
    }

    probe_wall_contact(body, world);

    if landed {
        body.jump_buffer = 0.0;
        body.jump_cooldown = tuning::JUMP_COOLDOWN;
        body.jump_lock_time = tuning::JUMP_LOCK;
        body.just_landed = true;
        body.ground_stable_time = dt;
    }

    // 9. Friction and drag.
    if body.on_ground {
        body.vx *= 1.0 - tuning::GROUND_FRICTION;
        if body.vx.abs() < tuning::SLEEP_EPS {
            body.vx = 0.0;
        }
        if body.vy > 0.0 {
            body.vy = 0.0;
        }
    } else {
        body.vx *= 1.0 - tuning::AIR_DRAG;
    }
    if body.vy.abs() < tuning::SLEEP_EPS {
        body.vy = 0.0;
    }

    // 10. The lowest tile row is always walkable, even mid-fall.
    let foot_row = ((body.y + body.height) / world.tile_size()).floor() as i64;
    body.on_bottom_wall = foot_row >= i64::from(world.rows()) - 1;
    if body.on_bottom_wall {
        body.on_ground = true;
    }

    if !body.is_finite() {
        log::warn!("physics step produced a non-finite body; previous state restored");
        *body = before;
    }
}

/// Steers horizontal velocity toward `target_vx`.
///
/// A wall on the side being steered into arrests the motion outright; there
/// is no creeping against walls. Acceleration drops to 60 % in the air, and
/// releasing the stick decelerates at 90 % of [`tuning::MOVE_ACC`] on the
/// ground and 30 % airborne.
pub fn apply_horizontal_movement(body: &mut Body, target_vx: f32, dt: f32, in_air: bool) {
    let dt = sanitize_dt(dt);
    let target_vx = if target_vx.is_finite() {
        target_vx.clamp(-tuning::MAX_VEL_X, tuning::MAX_VEL_X)
    } else {
        0.0
    };

    if (target_vx < 0.0 && body.touching_wall.left)
        || (target_vx > 0.0 && body.touching_wall.right)
    {
        body.vx = 0.0;
        return;
    }

    let rate = if target_vx != 0.0 {
        if in_air {
            tuning::MOVE_ACC * tuning::AIR_ACCEL_SCALE
        } else {
            tuning::MOVE_ACC
        }
    } else if in_air {
        tuning::MOVE_ACC * tuning::AIR_DECEL_SCALE
    } else {
        tuning::MOVE_ACC * tuning::GROUND_DECEL_SCALE
    };

    body.vx = approach(body.vx, target_vx, rate * dt).clamp(-tuning::MAX_VEL_X, tuning::MAX_VEL_X);
}

/// Maintains the jump buffer and executes a jump when every gate opens.
///
/// A jump fires iff the buffer is armed, cooldown and lock have expired, the
/// body is not already ascending fast, and one of: stably grounded (≥ 1 tick,
/// not in the just-landed window), coyote grace remaining, or touching a wall
/// while airborne (a wall-jump, which also kicks away from the wall).
/// Returns whether a jump executed.
pub fn apply_jump(body: &mut Body, jump_pressed: bool, dt: f32) -> bool {
    let dt = sanitize_dt(dt);
    if jump_pressed {
        body.jump_buffer = tuning::JUMP_BUFFER;
    } else {
        body.jump_buffer = (body.jump_buffer - dt).max(0.0);
    }

    if body.jump_buffer <= 0.0
        || body.jump_cooldown > 0.0
        || body.jump_lock_time > 0.0
        || body.vy < tuning::JUMP_RISE_GATE
    {
        return false;
    }

    let grounded = body.on_ground && body.ground_stable_time >= tuning::STEP && !body.just_landed;
    let coyote = body.coyote_time > 0.0;
    let wall = !body.on_ground && body.touching_wall.any();
    if !(grounded || coyote || wall) {
        return false;
    }

    body.vy = tuning::JUMP_VEL;
    body.jump_buffer = 0.0;
    body.coyote_time = 0.0;
    body.jump_cooldown = tuning::JUMP_COOLDOWN;
    body.jump_lock_time = tuning::JUMP_LOCK;
    if wall && !grounded && !coyote {
        let kick = tuning::MAX_VEL_X * tuning::WALL_JUMP_KICK_SCALE;
        body.vx = if body.touching_wall.left { kick } else { -kick };
    }
    true
}

/// Caps fall speed while pressing into a touched wall.
pub fn apply_wall_slide(body: &mut Body, hold_left: bool, hold_right: bool) {
    if body.on_ground || body.vy <= 0.0 {
        return;
    }

    let pressing =
        (body.touching_wall.left && hold_left) || (body.touching_wall.right && hold_right);
    if pressing && body.vy > tuning::WALL_SLIDE_MAX {
        body.vy = tuning::WALL_SLIDE_MAX;
    }
}

fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}

/// Checks solidity directly beneath the foot row within the probe tolerance.
fn ground_probe(body: &Body, world: &World) -> bool {
    let tile = world.tile_size();
    let probe_y = body.y + body.height + tuning::GROUND_PROBE_TOLERANCE;
    let ty = (probe_y / tile).floor() as i64;
    let mut tx = (body.x / tile).floor() as i64;
    while (tx as f32) * tile < body.x + body.width {
        if world.is_solid(tx, ty) {
            return true;
        }
        tx += 1;
    }
    false
}

fn resolve_axis_x(body: &mut Body, world: &World) {
    let (left_overlap, right_overlap) = scan_overlaps(body, world, Axis::X);
    if left_overlap <= tuning::PENETRATION_SLOP && right_overlap <= tuning::PENETRATION_SLOP {
        return;
    }

    if left_overlap >= right_overlap {
        body.x += left_overlap;
        if body.vx < 0.0 {
            body.vx = 0.0;
        }
    } else {
        body.x -= right_overlap;
        if body.vx > 0.0 {
            body.vx = 0.0;
        }
    }
}

/// Resolves vertical penetration; returns whether a downward resolve landed
/// the body this tick.
fn resolve_axis_y(body: &mut Body, world: &World) -> bool {
    let (top_overlap, bottom_overlap) = scan_overlaps(body, world, Axis::Y);
    if top_overlap <= tuning::PENETRATION_SLOP && bottom_overlap <= tuning::PENETRATION_SLOP {
        return false;
    }

    if bottom_overlap >= top_overlap {
        body.y -= bottom_overlap;
        if body.vy > 0.0 {
            body.vy = 0.0;
        }
        let landed = !body.on_ground;
        body.on_ground = true;
        landed
    } else {
        body.y += top_overlap;
        if body.vy < 0.0 {
            body.vy = 0.0;
        }
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Maximum push-out distances against solid neighbors on each side of the
/// given axis. A tile only counts when it overlaps the box by more than the
/// slop on the perpendicular axis, so sub-pixel wall contact never produces
/// vertical pushes and vice versa.
fn scan_overlaps(body: &Body, world: &World, axis: Axis) -> (f32, f32) {
    let tile = world.tile_size();
    let mut low = 0.0f32;
    let mut high = 0.0f32;

    let (first_tx, first_ty) = world.tile_of(body.x, body.y);
    let mut ty = first_ty;
    while (ty as f32) * tile < body.y + body.height {
        let mut tx = first_tx;
        while (tx as f32) * tile < body.x + body.width {
            if world.is_solid(tx, ty) {
                let tile_x = tx as f32 * tile;
                let tile_y = ty as f32 * tile;
                let overlap_x = (body.x + body.width).min(tile_x + tile) - body.x.max(tile_x);
                let overlap_y = (body.y + body.height).min(tile_y + tile) - body.y.max(tile_y);

                match axis {
                    Axis::X if overlap_y > tuning::PENETRATION_SLOP => {
                        let tile_center = tile_x + tile * 0.5;
                        let box_center = body.x + body.width * 0.5;
                        if tile_center <= box_center {
                            low = low.max(tile_x + tile - body.x);
                        } else {
                            high = high.max(body.x + body.width - tile_x);
                        }
                    }
                    Axis::Y if overlap_x > tuning::PENETRATION_SLOP => {
                        let tile_center = tile_y + tile * 0.5;
                        let box_center = body.y + body.height * 0.5;
                        if tile_center <= box_center {
                            low = low.max(tile_y + tile - body.y);
                        } else {
                            high = high.max(body.y + body.height - tile_y);
                        }
                    }
                    _ => {}
                }
            }
            tx += 1;
        }
        ty += 1;
    }

    (low, high)
}

/// Marks wall contact through thin probe strips beside each vertical edge.
///
/// The strips are inset from the top and bottom so floor and ceiling rows do
/// not read as walls, and they wrap across seams through the solidity
/// oracle.
fn probe_wall_contact(body: &mut Body, world: &World) {
    const VERTICAL_INSET: f32 = 2.0;
    let strip_y = body.y + VERTICAL_INSET;
    let strip_h = (body.height - 2.0 * VERTICAL_INSET).max(1.0);

    if world.collides(
        body.x - tuning::WALL_TOUCH_EPS,
        strip_y,
        tuning::WALL_TOUCH_EPS,
        strip_h,
    ) {
        body.touching_wall.left = true;
    }
    if world.collides(body.x + body.width, strip_y, tuning::WALL_TOUCH_EPS, strip_h) {
        body.touching_wall.right = true;
    }
}

#[cfg(test)]
mod tests {
    use super::{
        apply_horizontal_movement, apply_jump, apply_wall_slide, sanitize_dt, step, tuning, Body,
    };
    use quiver_arena_world::World;

    const TILE: f32 = 16.0;

    fn open_floor() -> World {
        World::from_ascii_with_wrap(
            "........\n\
             ........\n\
             ........\n\
             ########",
            TILE,
            false,
            false,
        )
        .expect("test world parses")
    }

    fn walled_floor() -> World {
        World::from_ascii_with_wrap(
            "......#.\n\
             ......#.\n\
             ########",
            TILE,
            false,
            false,
        )
        .expect("test world parses")
    }

    fn settled_body(world: &World) -> Body {
        let mut body = Body::new(8.0, 20.0, 12.0, 14.0);
        for _ in 0..60 {
            step(&mut body, tuning::STEP, world);
        }
        assert!(body.on_ground, "body should settle onto the floor");
        body
    }

    /// Deepest penetration into any solid tile, counting only tiles with
    /// meaningful cross-axis overlap, mirroring the resolver's contract.
    fn max_penetration(body: &Body, world: &World) -> f32 {
        let mut deepest = 0.0f32;
        let (first_tx, first_ty) = world.tile_of(body.x, body.y);
        let mut ty = first_ty;
        while (ty as f32) * TILE < body.y + body.height {
            let mut tx = first_tx;
            while (tx as f32) * TILE < body.x + body.width {
                if world.is_solid(tx, ty) {
                    let tile_x = tx as f32 * TILE;
                    let tile_y = ty as f32 * TILE;
                    let ox = (body.x + body.width).min(tile_x + TILE) - body.x.max(tile_x);
                    let oy = (body.y + body.height).min(tile_y + TILE) - body.y.max(tile_y);
                    deepest = deepest.max(ox.min(oy));
                }
                tx += 1;
            }
            ty += 1;
        }
        deepest
    }

    #[test]
    fn fall_lands_flush_without_bounce() {
        let world = open_floor();
        let mut body = Body::new(8.0, 10.0, 12.0, 14.0);
        body.vy = 300.0;

        let mut landed_tick = None;
        for tick in 0..120 {
            step(&mut body, tuning::STEP, &world);
            assert!(body.vy >= 0.0, "body bounced on tick {tick}");
            if body.on_ground {
                landed_tick = Some(tick);
                break;
            }
        }

        let _ = landed_tick.expect("body never landed");
        assert_eq!(body.vy, 0.0);
        let foot = body.y + body.height;
        assert!(
            (foot - 48.0).abs() <= tuning::PENETRATION_SLOP,
            "foot rests at {foot}, expected flush with 48"
        );
    }

    #[test]
    fn fall_duration_matches_gravity() {
        let world = open_floor();
        let start_y = 0.0;
        let mut body = Body::new(8.0, start_y, 12.0, 14.0);

        // Independent recurrence: the body lands on the first tick its
        // post-integration foot reaches probe range of the floor top.
        let mut vy = 0.0f32;
        let mut foot = start_y + 14.0;
        let mut expected_ticks = 0u32;
        loop {
            expected_ticks += 1;
            vy = (vy + tuning::GRAVITY * tuning::STEP).min(tuning::MAX_FALL_SPEED);
            foot += vy * tuning::STEP;
            if foot + tuning::GROUND_PROBE_TOLERANCE >= 48.0 {
                break;
            }
        }

        let mut actual_ticks = 0u32;
        while !body.on_ground {
            step(&mut body, tuning::STEP, &world);
            actual_ticks += 1;
            assert!(actual_ticks < 600, "body never landed");
        }

        assert_eq!(actual_ticks, expected_ticks);
        let rest = body.y + body.height;
        assert!((rest - 48.0).abs() <= tuning::PENETRATION_SLOP);
    }

    #[test]
    fn resolution_never_leaves_deep_penetration() {
        let world = walled_floor();
        let mut body = Body::new(40.0, 4.0, 12.0, 14.0);
        body.vx = 800.0;
        body.vy = 600.0;

        for _ in 0..240 {
            step(&mut body, tuning::STEP, &world);
            let depth = max_penetration(&body, &world);
            assert!(
                depth <= tuning::PENETRATION_SLOP + 1e-3,
                "penetration {depth} exceeds slop"
            );
            body.vx = 800.0;
        }
    }

    #[test]
    fn grounded_jump_executes_once_stable() {
        let world = open_floor();
        let mut body = settled_body(&world);
        for _ in 0..4 {
            step(&mut body, tuning::STEP, &world);
        }

        assert!(apply_jump(&mut body, true, tuning::STEP));
        assert_eq!(body.vy, tuning::JUMP_VEL);
        assert_eq!(body.jump_buffer, 0.0);
        assert_eq!(body.coyote_time, 0.0);
    }

    #[test]
    fn landing_cooldown_suppresses_instant_rejump() {
        let world = open_floor();
        let mut body = settled_body(&world);
        for _ in 0..4 {
            step(&mut body, tuning::STEP, &world);
        }

        assert!(apply_jump(&mut body, true, tuning::STEP));
        step(&mut body, tuning::STEP, &world);
        // Ascending and within cooldown: a held press must not re-fire.
        assert!(!apply_jump(&mut body, true, tuning::STEP));
    }

    fn platform_world() -> World {
        World::from_ascii(
            "........\n\
             ........\n\
             ####....\n\
             ........\n\
             ........\n\
             ........",
            TILE,
        )
        .expect("test world parses")
    }

    fn settled_on_platform() -> (World, Body) {
        let world = platform_world();
        let mut body = Body::new(8.0, 10.0, 12.0, 14.0);
        for _ in 0..60 {
            step(&mut body, tuning::STEP, &world);
        }
        assert!(body.on_ground, "body should settle onto the platform");
        (world, body)
    }

    #[test]
    fn coyote_grace_allows_jump_after_walkoff() {
        let (world, mut body) = settled_on_platform();

        // Move past the platform's right edge; the next step sees the
        // leave-ground transition and arms the coyote window.
        body.x = 70.0;
        step(&mut body, tuning::STEP, &world);
        assert!(!body.on_ground);
        assert!(body.coyote_time > 0.0);
        assert!(apply_jump(&mut body, true, tuning::STEP));
        assert_eq!(body.vy, tuning::JUMP_VEL);
    }

    #[test]
    fn expired_coyote_rejects_press() {
        let (world, mut body) = settled_on_platform();
        body.x = 70.0;
        step(&mut body, tuning::STEP, &world);
        assert!(body.coyote_time > 0.0);

        // 200 ms of falling, well past the coyote window.
        for _ in 0..24 {
            step(&mut body, tuning::STEP, &world);
        }
        assert_eq!(body.coyote_time, 0.0);
        assert!(!apply_jump(&mut body, true, tuning::STEP));
    }

    #[test]
    fn wall_contact_is_marked_and_arrests_motion() {
        let world = walled_floor();
        let mut body = Body::new(83.5, 18.0, 12.0, 14.0);
        step(&mut body, tuning::STEP, &world);

        assert!(body.touching_wall.right);
        assert!(!body.touching_wall.left);

        body.vx = 120.0;
        apply_horizontal_movement(&mut body, tuning::MAX_VEL_X, tuning::STEP, false);
        assert_eq!(body.vx, 0.0);

        // Steering away from the wall is unaffected.
        apply_horizontal_movement(&mut body, -tuning::MAX_VEL_X, tuning::STEP, false);
        assert!(body.vx < 0.0);
    }

    #[test]
    fn wall_jump_kicks_away_from_wall() {
        let mut body = Body::new(0.0, 0.0, 12.0, 14.0);
        body.on_ground = false;
        body.touching_wall.right = true;
        body.vy = 60.0;

        assert!(apply_jump(&mut body, true, tuning::STEP));
        assert_eq!(body.vy, tuning::JUMP_VEL);
        assert_eq!(
            body.vx,
            -tuning::MAX_VEL_X * tuning::WALL_JUMP_KICK_SCALE
        );
    }

    #[test]
    fn ascending_fast_blocks_wall_jump() {
        let mut body = Body::new(0.0, 0.0, 12.0, 14.0);
        body.on_ground = false;
        body.touching_wall.left = true;
        body.vy = -400.0;

        assert!(!apply_jump(&mut body, true, tuning::STEP));
    }

    #[test]
    fn wall_slide_caps_fall_speed() {
        let mut body = Body::new(0.0, 0.0, 12.0, 14.0);
        body.on_ground = false;
        body.touching_wall.left = true;
        body.vy = 400.0;

        apply_wall_slide(&mut body, false, false);
        assert_eq!(body.vy, 400.0);

        apply_wall_slide(&mut body, true, false);
        assert_eq!(body.vy, tuning::WALL_SLIDE_MAX);
    }

    #[test]
    fn bottom_row_is_always_walkable() {
        let world = World::from_ascii_with_wrap(
            "........\n\
             ........",
            TILE,
            false,
            false,
        )
        .expect("test world parses");
        let mut body = Body::new(8.0, 10.0, 12.0, 14.0);
        body.vy = 200.0;
        step(&mut body, tuning::STEP, &world);

        assert!(body.on_bottom_wall);
        assert!(body.on_ground);
    }

    #[test]
    fn invalid_dt_collapses_to_fixed_step() {
        assert_eq!(sanitize_dt(f32::NAN), tuning::STEP);
        assert_eq!(sanitize_dt(-0.5), tuning::STEP);
        assert_eq!(sanitize_dt(0.0), tuning::STEP);
        assert_eq!(sanitize_dt(0.5), tuning::STEP);
        assert_eq!(sanitize_dt(0.008), 0.008);

        let world = open_floor();
        let mut with_nan = Body::new(8.0, 10.0, 12.0, 14.0);
        let mut with_step = with_nan;
        step(&mut with_nan, f32::NAN, &world);
        step(&mut with_step, tuning::STEP, &world);
        assert_eq!(with_nan, with_step);
    }

    #[test]
    fn non_finite_velocity_is_scrubbed() {
        let world = open_floor();
        let mut body = settled_body(&world);
        body.vx = f32::NAN;
        step(&mut body, tuning::STEP, &world);
        assert!(body.is_finite());
    }
}
