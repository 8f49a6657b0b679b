// Integration tests (native) for the `fish-frenzy` crate.
// These tests avoid wasm-specific functionality and exercise pure Rust logic so
// they can run under `cargo test` on the host.

use fish_frenzy::constants::*;
use fish_frenzy::score::{LEADERBOARD_LIMIT, NewScore, USERNAME_MAX_LEN};
use fish_frenzy::{StepOutcome, World};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn enemy_radius_bounds_are_ordered() {
    assert!(ENEMY_MIN_RADIUS < INITIAL_PLAYER_RADIUS);
    assert!(INITIAL_PLAYER_RADIUS < ENEMY_MAX_RADIUS);
    // spawns start inside the despawn margin or they'd vanish immediately
    assert!(SPAWN_OFFSET < DESPAWN_MARGIN);
}

#[test]
fn palette_entries_are_hex_colors() {
    for c in ENEMY_COLORS.iter().chain(std::iter::once(&PLAYER_COLOR)) {
        assert_eq!(c.len(), 7, "bad color {c}");
        assert!(c.starts_with('#'));
        assert!(c[1..].chars().all(|ch| ch.is_ascii_hexdigit()), "bad color {c}");
    }
}

#[test]
fn leaderboard_limits() {
    assert_eq!(LEADERBOARD_LIMIT, 10);
    assert_eq!(USERNAME_MAX_LEN, 15);
    assert!(is_valid("nemo"));
    assert!(!is_valid(""));
    assert!(!is_valid("this-name-is-way-too-long"));
}

fn is_valid(name: &str) -> bool {
    fish_frenzy::is_valid_username(name)
}

#[test]
fn validated_score_is_normalized() {
    let ok = NewScore::new(" gill ", 12).validated().unwrap();
    assert_eq!(ok, NewScore::new("gill", 12));
}

// A whole session driven through the public API: the player sits still in the
// middle until something big enough reaches it.
#[test]
fn idle_session_ends_with_reported_score() {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut world = World::new(0.0);
    let mut t = 0.0;
    let outcome = loop {
        let outcome = world.step(t, &mut rng);
        assert!(world.enemies.len() <= MAX_ENEMIES);
        if outcome != StepOutcome::Running || t > 3_600_000.0 {
            break outcome;
        }
        t += 16.0;
    };
    if let StepOutcome::Eaten { final_score } = outcome {
        assert_eq!(final_score, world.score);
        assert!(world.is_over());
        assert_eq!(world.step(t + 16.0, &mut rng), StepOutcome::Over);
    }
}
