//! Scripted runs of the simulation state, no GPU required.

use cubelight::sim::{HeldKeys, SceneState};

const DT: f32 = 1.0 / 60.0;

#[test]
fn lamp_oscillates_between_bounds_forever() {
    let mut state = SceneState::new(99);
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    // 60 simulated seconds covers several full round trips at rate 5.
    for _ in 0..3600 {
        state.update(DT);
        let z = state.lamp_position().z;
        min = min.min(z);
        max = max.max(z);
        // One step of overshoot past a bound is the most that can accumulate.
        assert!(z.abs() <= 10.0 + 5.0 * DT + 1e-4);
    }
    assert!(min < -9.5, "lamp never reached the lower bound: {}", min);
    assert!(max > 9.5, "lamp never reached the upper bound: {}", max);
    // The lamp stays on its track.
    let lamp = state.lamp_position();
    assert_eq!((lamp.x, lamp.y), (1.0, 1.0));
}

#[test]
fn model_oscillates_on_x_at_fixed_height() {
    let mut state = SceneState::new(7);
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for _ in 0..1800 {
        state.update(DT);
        let pos = state.model_position();
        assert_eq!((pos.y, pos.z), (1.0, 0.0));
        min = min.min(pos.x);
        max = max.max(pos.x);
    }
    assert!(min < -4.5 && max > 4.5);
}

#[test]
fn tapping_the_spawn_keys_spawns_per_press() {
    let mut state = SceneState::new(1234);

    let mut cubes = 0;
    let mut models = 0;
    // Press both keys for three frames, release for three, five times over.
    for press in 0..5 {
        let _ = press;
        for frame in 0..6 {
            state.keys = HeldKeys {
                spawn_cube: frame < 3,
                spawn_model: frame < 3,
                ..HeldKeys::default()
            };
            let changes = state.update(DT);
            if let Some(pos) = changes.spawned_cube {
                cubes += 1;
                for axis in [pos.x, pos.y, pos.z] {
                    assert!((-10.0..=10.0).contains(&axis));
                    assert_eq!(axis, axis.round(), "spawn positions sit on the lattice");
                }
            }
            if changes.spawned_model.is_some() {
                models += 1;
            }
        }
    }
    assert_eq!(cubes, 5);
    assert_eq!(models, 5);
}

#[test]
fn light_colour_responds_to_held_keys_and_clamps() {
    let mut state = SceneState::new(5);

    // Already white, brightening holds at full.
    state.keys.brighten = true;
    for _ in 0..60 {
        state.update(DT);
    }
    assert_eq!(state.light_color.0, [1.0, 1.0, 1.0]);

    // Two seconds of dimming hits the floor.
    state.keys = HeldKeys {
        dim: true,
        ..HeldKeys::default()
    };
    for _ in 0..150 {
        state.update(DT);
    }
    assert_eq!(state.light_color.0, [0.0, 0.0, 0.0]);

    // Half a second of brightening recovers half-range channels.
    state.keys = HeldKeys {
        brighten: true,
        ..HeldKeys::default()
    };
    for _ in 0..30 {
        state.update(DT);
    }
    let [r, g, b] = state.light_color.0;
    assert!((r - 0.5).abs() < 1e-3);
    assert_eq!(r, g);
    assert_eq!(g, b);

    // No keys held, the colour stays put.
    state.keys = HeldKeys::default();
    let before = state.light_color;
    for _ in 0..60 {
        state.update(DT);
    }
    assert_eq!(state.light_color, before);
}

#[test]
fn same_seed_replays_the_same_spawns() {
    let script = |seed: u32| {
        let mut state = SceneState::new(seed);
        let mut spawns = Vec::new();
        for frame in 0..120 {
            state.keys.spawn_cube = frame % 10 < 2;
            let changes = state.update(DT);
            if let Some(pos) = changes.spawned_cube {
                spawns.push((pos.x, pos.y, pos.z));
            }
        }
        spawns
    };
    assert_eq!(script(42), script(42));
    assert_ne!(script(42), script(43));
}
