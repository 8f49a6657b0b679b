//! Pure fish-tank simulation. No browser APIs here so every rule can be
//! exercised natively with a seeded RNG.

use rand::Rng;

use crate::constants::*;

/// Per-frame displacement of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

/// A circular game object: the player or an enemy fish.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
    pub velocity: Velocity,
}

impl Entity {
    fn player() -> Self {
        Self {
            id: 0,
            x: CANVAS_WIDTH / 2.0,
            y: CANVAS_HEIGHT / 2.0,
            radius: INITIAL_PLAYER_RADIUS,
            color: PLAYER_COLOR,
            velocity: Velocity::default(),
        }
    }

    pub fn distance_to(&self, other: &Entity) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn touches(&self, other: &Entity) -> bool {
        self.distance_to(other) < self.radius + other.radius
    }

    fn in_play_area(&self) -> bool {
        self.x > -DESPAWN_MARGIN
            && self.x < CANVAS_WIDTH + DESPAWN_MARGIN
            && self.y > -DESPAWN_MARGIN
            && self.y < CANVAS_HEIGHT + DESPAWN_MARGIN
    }
}

/// Result of advancing the world by one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    /// The player touched a fish at least its own size this frame.
    Eaten { final_score: u32 },
    /// The session had already ended before this step.
    Over,
}

pub struct World {
    pub player: Entity,
    pub enemies: Vec<Entity>,
    pub pointer: (f64, f64),
    pub score: u32,
    last_spawn_ms: f64,
    next_id: u32,
    over: bool,
}

impl World {
    pub fn new(now_ms: f64) -> Self {
        Self {
            player: Entity::player(),
            enemies: Vec::new(),
            pointer: (CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0),
            score: 0,
            last_spawn_ms: now_ms,
            next_id: 1,
            over: false,
        }
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn set_pointer(&mut self, x: f64, y: f64) {
        self.pointer = (x, y);
    }

    /// Move the pointer target by a keyboard / on-screen control delta.
    pub fn nudge_pointer(&mut self, dx: f64, dy: f64) {
        self.pointer.0 = (self.pointer.0 + dx).clamp(0.0, CANVAS_WIDTH);
        self.pointer.1 = (self.pointer.1 + dy).clamp(0.0, CANVAS_HEIGHT);
    }

    /// Create an enemy just outside a random edge, heading inward. Its size is
    /// relative to the current player size so difficulty follows growth.
    pub fn spawn_enemy<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let horizontal = rng.gen_bool(0.5);
        let side: f64 = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };

        let (x, y, dx, dy) = if horizontal {
            let x = if side < 0.0 { -SPAWN_OFFSET } else { CANVAS_WIDTH + SPAWN_OFFSET };
            let y = rng.gen_range(0.0..CANVAS_HEIGHT);
            let dx = rng.gen_range(1.0..3.0) * -side;
            let dy = rng.gen_range(-1.0..1.0);
            (x, y, dx, dy)
        } else {
            let x = rng.gen_range(0.0..CANVAS_WIDTH);
            let y = if side < 0.0 { -SPAWN_OFFSET } else { CANVAS_HEIGHT + SPAWN_OFFSET };
            let dx = rng.gen_range(-1.0..1.0);
            let dy = rng.gen_range(1.0..3.0) * -side;
            (x, y, dx, dy)
        };

        let multiplier = if rng.gen_bool(SMALLER_ENEMY_CHANCE) {
            SMALLER_ENEMY_MULTIPLIER
        } else {
            LARGER_ENEMY_MULTIPLIER
        };
        let radius = (self.player.radius * multiplier * rng.gen_range(0.5..1.5))
            .clamp(ENEMY_MIN_RADIUS, ENEMY_MAX_RADIUS);
        let color = ENEMY_COLORS[rng.gen_range(0..ENEMY_COLORS.len())];

        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.enemies.push(Entity {
            id,
            x,
            y,
            radius,
            color,
            velocity: Velocity { dx, dy },
        });
    }

    /// Advance one animation frame. `now_ms` is the frame timestamp handed to
    /// the refresh callback.
    pub fn step<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> StepOutcome {
        if self.over {
            return StepOutcome::Over;
        }

        if now_ms - self.last_spawn_ms > SPAWN_INTERVAL_MS && self.enemies.len() < MAX_ENEMIES {
            self.spawn_enemy(rng);
            self.last_spawn_ms = now_ms;
        }

        self.move_player();

        for enemy in &mut self.enemies {
            enemy.x += enemy.velocity.dx;
            enemy.y += enemy.velocity.dy;
        }
        self.enemies.retain(Entity::in_play_area);

        self.resolve_collisions()
    }

    fn move_player(&mut self) {
        let p = &mut self.player;
        p.x += (self.pointer.0 - p.x) * PLAYER_EASING;
        p.y += (self.pointer.1 - p.y) * PLAYER_EASING;
        p.x = p.x.clamp(p.radius, (CANVAS_WIDTH - p.radius).max(p.radius));
        p.y = p.y.clamp(p.radius, (CANVAS_HEIGHT - p.radius).max(p.radius));
    }

    fn resolve_collisions(&mut self) -> StepOutcome {
        // Walk backwards so removals don't shift unvisited indices.
        for i in (0..self.enemies.len()).rev() {
            if !self.player.touches(&self.enemies[i]) {
                continue;
            }
            if self.player.radius > self.enemies[i].radius {
                let eaten = self.enemies.remove(i);
                self.player.radius += eaten.radius.sqrt() * GROWTH_FACTOR;
                self.score = self.score.saturating_add(eaten.radius.floor() as u32);
            } else {
                self.over = true;
                return StepOutcome::Eaten { final_score: self.score };
            }
        }
        StepOutcome::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn enemy_at(id: u32, x: f64, y: f64, radius: f64) -> Entity {
        Entity {
            id,
            x,
            y,
            radius,
            color: ENEMY_COLORS[0],
            velocity: Velocity::default(),
        }
    }

    #[test]
    fn new_world_centres_player() {
        let w = World::new(0.0);
        assert_eq!(w.player.x, CANVAS_WIDTH / 2.0);
        assert_eq!(w.player.y, CANVAS_HEIGHT / 2.0);
        assert_eq!(w.player.radius, INITIAL_PLAYER_RADIUS);
        assert!(w.enemies.is_empty());
        assert_eq!(w.score, 0);
    }

    #[test]
    fn player_eases_toward_pointer() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut w = World::new(0.0);
        w.set_pointer(700.0, 400.0);
        w.step(1.0, &mut rng);
        // 600 + (700 - 600) * 0.08
        assert!((w.player.x - 608.0).abs() < 1e-9);
        assert!((w.player.y - 400.0).abs() < 1e-9);
    }

    #[test]
    fn player_stays_inside_canvas() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut w = World::new(0.0);
        w.set_pointer(-5000.0, 9000.0);
        for frame in 0..500 {
            w.step(frame as f64, &mut rng);
            let r = w.player.radius;
            assert!(w.player.x >= r && w.player.x <= CANVAS_WIDTH - r);
            assert!(w.player.y >= r && w.player.y <= CANVAS_HEIGHT - r);
        }
    }

    #[test]
    fn nudge_is_clamped_to_canvas() {
        let mut w = World::new(0.0);
        w.nudge_pointer(-10_000.0, 10_000.0);
        assert_eq!(w.pointer, (0.0, CANVAS_HEIGHT));
    }

    #[test]
    fn spawn_waits_for_interval() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut w = World::new(0.0);
        w.step(SPAWN_INTERVAL_MS, &mut rng);
        assert!(w.enemies.is_empty());
        w.step(SPAWN_INTERVAL_MS + 1.0, &mut rng);
        assert_eq!(w.enemies.len(), 1);
    }

    #[test]
    fn spawned_enemies_start_off_edge_heading_inward() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut w = World::new(0.0);
        for _ in 0..200 {
            w.spawn_enemy(&mut rng);
        }
        for e in &w.enemies {
            assert!((ENEMY_MIN_RADIUS..=ENEMY_MAX_RADIUS).contains(&e.radius));
            if e.x < 0.0 {
                assert_eq!(e.x, -SPAWN_OFFSET);
                assert!(e.velocity.dx >= 1.0);
            } else if e.x > CANVAS_WIDTH {
                assert_eq!(e.x, CANVAS_WIDTH + SPAWN_OFFSET);
                assert!(e.velocity.dx <= -1.0);
            } else if e.y < 0.0 {
                assert_eq!(e.y, -SPAWN_OFFSET);
                assert!(e.velocity.dy >= 1.0);
            } else {
                assert_eq!(e.y, CANVAS_HEIGHT + SPAWN_OFFSET);
                assert!(e.velocity.dy <= -1.0);
            }
        }
    }

    #[test]
    fn spawn_radius_is_clamped_for_huge_player() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut w = World::new(0.0);
        w.player.radius = 500.0;
        for _ in 0..50 {
            w.spawn_enemy(&mut rng);
        }
        assert!(w.enemies.iter().all(|e| e.radius <= ENEMY_MAX_RADIUS));
    }

    #[test]
    fn enemy_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut w = World::new(0.0);
        for _ in 0..10 {
            w.spawn_enemy(&mut rng);
        }
        let mut ids: Vec<u32> = w.enemies.iter().map(|e| e.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 10);
        assert!(!ids.contains(&w.player.id));
    }

    #[test]
    fn never_more_than_max_enemies() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut w = World::new(0.0);
        // A tiny player eats nothing, so enemies only pile up.
        w.player.radius = 1.0;
        for frame in 0..60 {
            if w.step(frame as f64 * 1001.0, &mut rng) != StepOutcome::Running {
                break;
            }
            assert!(w.enemies.len() <= MAX_ENEMIES);
        }
    }

    #[test]
    fn enemies_move_linearly_and_leave() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut w = World::new(0.0);
        let mut e = enemy_at(1, CANVAS_WIDTH + DESPAWN_MARGIN - 1.5, 50.0, 5.0);
        e.velocity = Velocity { dx: 1.0, dy: 0.5 };
        w.enemies.push(e);
        w.step(1.0, &mut rng);
        assert_eq!(w.enemies[0].x, CANVAS_WIDTH + DESPAWN_MARGIN - 0.5);
        assert_eq!(w.enemies[0].y, 50.5);
        w.step(2.0, &mut rng);
        assert!(w.enemies.is_empty());
    }

    #[test]
    fn eating_smaller_fish_grows_and_scores() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut w = World::new(0.0);
        let (px, py) = (w.player.x, w.player.y);
        w.enemies.push(enemy_at(1, px + 5.0, py, 9.0));
        let outcome = w.step(1.0, &mut rng);
        assert_eq!(outcome, StepOutcome::Running);
        assert!(w.enemies.is_empty());
        assert!((w.player.radius - (INITIAL_PLAYER_RADIUS + 3.0 * GROWTH_FACTOR)).abs() < 1e-9);
        assert_eq!(w.score, 9);
    }

    #[test]
    fn score_uses_floored_radius() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut w = World::new(0.0);
        let (px, py) = (w.player.x, w.player.y);
        w.enemies.push(enemy_at(1, px, py, 7.9));
        w.step(1.0, &mut rng);
        assert_eq!(w.score, 7);
    }

    #[test]
    fn bigger_fish_ends_session() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut w = World::new(0.0);
        w.score = 42;
        let (px, py) = (w.player.x, w.player.y);
        w.enemies.push(enemy_at(1, px + 10.0, py, 30.0));
        assert_eq!(w.step(1.0, &mut rng), StepOutcome::Eaten { final_score: 42 });
        assert!(w.is_over());
        assert_eq!(w.step(2.0, &mut rng), StepOutcome::Over);
    }

    #[test]
    fn equal_sized_fish_ends_session() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut w = World::new(0.0);
        let (px, py) = (w.player.x, w.player.y);
        w.enemies.push(enemy_at(1, px, py + 20.0, INITIAL_PLAYER_RADIUS));
        assert!(matches!(w.step(1.0, &mut rng), StepOutcome::Eaten { .. }));
    }

    #[test]
    fn near_miss_is_not_a_collision() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut w = World::new(0.0);
        let (px, py) = (w.player.x, w.player.y);
        // exactly touching edges: distance == r1 + r2 is not contact
        w.enemies.push(enemy_at(1, px + INITIAL_PLAYER_RADIUS + 40.0, py, 40.0));
        assert_eq!(w.step(1.0, &mut rng), StepOutcome::Running);
        assert_eq!(w.enemies.len(), 1);
    }

    #[test]
    fn player_radius_never_shrinks() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut w = World::new(0.0);
            let mut last = w.player.radius;
            let mut t = 0.0;
            while t < 120_000.0 {
                // wander so the player actually meets fish
                let angle: f64 = t / 2_000.0;
                w.set_pointer(
                    CANVAS_WIDTH / 2.0 + angle.cos() * 400.0,
                    CANVAS_HEIGHT / 2.0 + angle.sin() * 300.0,
                );
                let outcome = w.step(t, &mut rng);
                assert!(w.player.radius >= last);
                last = w.player.radius;
                if outcome != StepOutcome::Running {
                    break;
                }
                t += 16.0;
            }
        }
    }
}
