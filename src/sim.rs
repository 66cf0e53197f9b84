//! Update-phase state for the demo scene.
//!
//! Everything that changes per frame outside of GPU resources lives here as
//! plain data: the lamp and model oscillators, the adjustable light colour,
//! edge-triggered spawn keys and the PRNG used for spawn positions. The frame
//! loop feeds held-key state and the elapsed time into [`SceneState::update`]
//! and applies the returned [`FrameChanges`] to the GPU-side scene, so all of
//! the update logic can be exercised without a graphics context.

use cgmath::Vector3;

/// Bounded back-and-forth movement along a single axis.
///
/// The value advances `rate * dt` in the current direction each frame. The
/// direction check runs after the move with strict comparisons: dropping below
/// `-bound` turns the movement forward, exceeding `+bound` turns it backward.
/// A zero `dt` moves nothing and never flips the direction.
#[derive(Clone, Debug)]
pub struct Oscillator {
    pub value: f32,
    bound: f32,
    rate: f32,
    forward: bool,
}

impl Oscillator {
    pub fn new(start: f32, bound: f32, rate: f32) -> Self {
        Self {
            value: start,
            bound,
            rate,
            forward: true,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        if self.forward {
            self.value += self.rate * dt;
        } else {
            self.value -= self.rate * dt;
        }
        if self.value < -self.bound {
            self.forward = true;
        } else if self.value > self.bound {
            self.forward = false;
        }
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }
}

/// RGB light colour with all channels clamped to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightColor(pub [f32; 3]);

impl LightColor {
    pub fn white() -> Self {
        Self([1.0, 1.0, 1.0])
    }

    /// Raise every channel by `dt`, saturating at 1.
    pub fn brighten(&mut self, dt: f32) {
        for channel in self.0.iter_mut() {
            *channel = (*channel + dt).min(1.0);
        }
    }

    /// Lower every channel by `dt`, saturating at 0.
    pub fn dim(&mut self, dt: f32) {
        for channel in self.0.iter_mut() {
            *channel = (*channel - dt).max(0.0);
        }
    }
}

/// Fires once per not-pressed-to-pressed transition.
///
/// Holding a key keeps `fire` returning false until the key is released and
/// pressed again, so a single key-down spawns a single object no matter how
/// many frames it spans.
#[derive(Clone, Debug, Default)]
pub struct EdgeTrigger {
    was_pressed: bool,
}

impl EdgeTrigger {
    pub fn fire(&mut self, pressed: bool) -> bool {
        let fired = pressed && !self.was_pressed;
        self.was_pressed = pressed;
        fired
    }
}

/// Deterministic xorshift32 PRNG for spawn positions.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: u32,
}

impl SeededRandom {
    /// A seed of 0 is mapped to 1 to avoid the degenerate all-zero sequence.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Random integer in `0..max`.
    pub fn next_int(&mut self, max: u32) -> u32 {
        ((self.next_u32() as u64 * max as u64) >> 32) as u32
    }
}

/// Random position on the `[-10, 10]` integer lattice, matching the original
/// demo's `% 21 - 10` draw per axis.
pub fn spawn_position(rng: &mut SeededRandom) -> Vector3<f32> {
    let mut axis = || rng.next_int(21) as f32 - 10.0;
    Vector3::new(axis(), axis(), axis())
}

/// Keys that the update phase samples as held/not-held each frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeldKeys {
    pub brighten: bool,
    pub dim: bool,
    pub spawn_cube: bool,
    pub spawn_model: bool,
}

/// Spawn requests produced by one update step.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameChanges {
    pub spawned_cube: Option<Vector3<f32>>,
    pub spawned_model: Option<Vector3<f32>>,
}

/// Lamp travel axis bound and speed (world units, units per second).
pub const LAMP_BOUND: f32 = 10.0;
pub const LAMP_RATE: f32 = 5.0;
/// Primary model travel bound and speed.
pub const MODEL_BOUND: f32 = 5.0;
pub const MODEL_RATE: f32 = 5.0;

/// All mutable scene state outside of the camera and GPU resources.
#[derive(Clone, Debug)]
pub struct SceneState {
    /// Lamp wanders along Z, starting from its scene position.
    pub lamp_z: Oscillator,
    /// The primary model wanders along X.
    pub model_x: Oscillator,
    pub light_color: LightColor,
    pub keys: HeldKeys,
    /// Accumulated rotation angle (radians) shared by all textured cubes.
    pub spin: f32,
    cube_trigger: EdgeTrigger,
    model_trigger: EdgeTrigger,
    rng: SeededRandom,
}

impl SceneState {
    pub fn new(seed: u32) -> Self {
        Self {
            lamp_z: Oscillator::new(2.0, LAMP_BOUND, LAMP_RATE),
            model_x: Oscillator::new(0.0, MODEL_BOUND, MODEL_RATE),
            light_color: LightColor::white(),
            keys: HeldKeys::default(),
            spin: 0.0,
            cube_trigger: EdgeTrigger::default(),
            model_trigger: EdgeTrigger::default(),
            rng: SeededRandom::new(seed),
        }
    }

    /// Run one update step: light colour adjustment, spawn edge triggers and
    /// the lamp/model oscillation. Returns the spawn requests for this frame.
    pub fn update(&mut self, dt: f32) -> FrameChanges {
        if self.keys.brighten {
            self.light_color.brighten(dt);
        }
        if self.keys.dim {
            self.light_color.dim(dt);
        }

        let mut changes = FrameChanges::default();
        if self.cube_trigger.fire(self.keys.spawn_cube) {
            changes.spawned_cube = Some(spawn_position(&mut self.rng));
        }
        if self.model_trigger.fire(self.keys.spawn_model) {
            changes.spawned_model = Some(spawn_position(&mut self.rng));
        }

        self.lamp_z.advance(dt);
        self.model_x.advance(dt);
        self.spin += dt;

        changes
    }

    /// The lamp cube's world position for this frame.
    pub fn lamp_position(&self) -> Vector3<f32> {
        Vector3::new(1.0, 1.0, self.lamp_z.value)
    }

    /// The primary model's world position for this frame.
    pub fn model_position(&self) -> Vector3<f32> {
        Vector3::new(self.model_x.value, 1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oscillator_moves_forward_then_flips_at_upper_bound() {
        let mut osc = Oscillator::new(0.0, 10.0, 5.0);
        let mut last = osc.value;
        while osc.is_forward() {
            osc.advance(0.1);
            assert!(osc.value > last, "forward travel must be monotone");
            last = osc.value;
        }
        // The flip happened on the step that crossed +10.
        assert!(osc.value > 10.0);
        osc.advance(0.1);
        assert!(osc.value < last, "backward travel must decrease");
    }

    #[test]
    fn oscillator_flips_back_at_lower_bound() {
        let mut osc = Oscillator::new(0.0, 10.0, 5.0);
        // Drive it past the upper bound so it turns around.
        for _ in 0..50 {
            osc.advance(0.1);
        }
        assert!(!osc.is_forward());
        while !osc.is_forward() {
            osc.advance(0.1);
        }
        assert!(osc.value < -10.0);
    }

    #[test]
    fn oscillator_within_bound_keeps_direction() {
        let mut osc = Oscillator::new(0.0, 10.0, 5.0);
        osc.advance(0.1);
        assert!(osc.is_forward());
        assert!((osc.value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let mut osc = Oscillator::new(9.99, 10.0, 5.0);
        osc.advance(0.0);
        assert_eq!(osc.value, 9.99);
        assert!(osc.is_forward());

        let mut state = SceneState::new(7);
        let lamp = state.lamp_position();
        let model = state.model_position();
        state.update(0.0);
        assert_eq!(state.lamp_position(), lamp);
        assert_eq!(state.model_position(), model);
        assert!(state.lamp_z.is_forward());
        assert!(state.model_x.is_forward());
    }

    #[test]
    fn light_color_clamps_to_unit_range() {
        let mut color = LightColor::white();
        for _ in 0..100 {
            color.brighten(0.13);
        }
        assert_eq!(color.0, [1.0, 1.0, 1.0]);
        for _ in 0..100 {
            color.dim(0.13);
        }
        assert_eq!(color.0, [0.0, 0.0, 0.0]);
        color.brighten(0.25);
        assert_eq!(color.0, [0.25, 0.25, 0.25]);
    }

    #[test]
    fn edge_trigger_fires_once_per_press() {
        let mut trigger = EdgeTrigger::default();
        assert!(trigger.fire(true));
        for _ in 0..20 {
            assert!(!trigger.fire(true), "held key must not re-fire");
        }
        assert!(!trigger.fire(false));
        assert!(trigger.fire(true));
    }

    #[test]
    fn held_spawn_key_spawns_exactly_one_cube() {
        let mut state = SceneState::new(3);
        state.keys.spawn_cube = true;
        let spawned: usize = (0..30)
            .map(|_| state.update(0.016))
            .filter(|changes| changes.spawned_cube.is_some())
            .count();
        assert_eq!(spawned, 1);
    }

    #[test]
    fn spawn_positions_stay_in_bounds() {
        let mut rng = SeededRandom::new(42);
        for _ in 0..1000 {
            let pos = spawn_position(&mut rng);
            for axis in [pos.x, pos.y, pos.z] {
                assert!((-10.0..=10.0).contains(&axis), "out of bounds: {}", axis);
            }
        }
    }

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = SeededRandom::new(12345);
        let mut b = SeededRandom::new(12345);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        let mut c = SeededRandom::new(54321);
        assert_ne!(a.next_u32(), c.next_u32());
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = SeededRandom::new(0);
        assert_ne!(rng.next_u32(), 0);
    }

    #[test]
    fn update_advances_lamp_and_model() {
        let mut state = SceneState::new(1);
        state.update(0.5);
        assert!((state.lamp_position().z - 4.5).abs() < 1e-6);
        assert!((state.model_position().x - 2.5).abs() < 1e-6);
        assert!((state.spin - 0.5).abs() < 1e-6);
    }
}
