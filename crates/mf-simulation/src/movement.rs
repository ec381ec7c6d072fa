//! Axis-separated rectangle collision for the player and hunters.

use mf_core::{Entity, EntityId, Rect};
use rand::Rng;
use rand::rngs::StdRng;

/// Player side length.
pub const PLAYER_SIZE: f32 = 32.0;
/// Player base speed (units per tick).
pub const PLAYER_SPEED: f32 = 5.0;
/// Hunter side length.
pub const HUNTER_SIZE: f32 = 40.0;
/// Hunter base speed (units per tick).
pub const HUNTER_SPEED: f32 = 2.0;

const HUNTER_HEADINGS: [(i8, i8); 5] = [(1, 0), (-1, 0), (0, 1), (0, -1), (0, 0)];

/// Movement axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Directional keys held this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    /// Move left.
    pub left: bool,
    /// Move right.
    pub right: bool,
    /// Move up.
    pub up: bool,
    /// Move down.
    pub down: bool,
}

impl MoveInput {
    /// Unit direction per axis, opposing keys cancel.
    pub fn direction(&self) -> (f32, f32) {
        let axis = |neg: bool, pos: bool| f32::from(i8::from(pos) - i8::from(neg));
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// Push `rect` along one axis out of every obstacle it overlaps.
///
/// The leading edge is clamped to the obstacle's near edge, chosen by the
/// sign of `velocity`. Returns `true` if any obstacle was hit.
pub fn resolve_axis<'a>(
    rect: &mut Rect,
    axis: Axis,
    velocity: f32,
    obstacles: impl IntoIterator<Item = &'a Rect>,
) -> bool {
    let mut hit = false;
    for obstacle in obstacles {
        if !rect.intersects(obstacle) {
            continue;
        }
        hit = true;
        match axis {
            Axis::X if velocity > 0.0 => rect.x = obstacle.x - rect.w,
            Axis::X if velocity < 0.0 => rect.x = obstacle.right(),
            Axis::Y if velocity > 0.0 => rect.y = obstacle.y - rect.h,
            Axis::Y if velocity < 0.0 => rect.y = obstacle.bottom(),
            _ => {}
        }
    }
    hit
}

/// Move by `(dx, dy)`, x first, resolving each axis against `walls`.
/// Returns whether each axis collided.
pub fn move_and_collide(rect: &mut Rect, dx: f32, dy: f32, walls: &[Entity]) -> (bool, bool) {
    rect.x += dx;
    let hit_x = resolve_axis(rect, Axis::X, dx, walls.iter().map(|w| &w.rect));
    rect.y += dy;
    let hit_y = resolve_axis(rect, Axis::Y, dy, walls.iter().map(|w| &w.rect));
    (hit_x, hit_y)
}

/// A change in the walking state, used to start or stop footsteps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stride {
    /// The player started moving.
    Started,
    /// The player stopped.
    Stopped,
}

/// The player avatar.
#[derive(Debug, Clone)]
pub struct Player {
    /// World bounds.
    pub rect: Rect,
    /// Spawn point, restored when caught.
    pub start: (f32, f32),
    /// Speed in units per tick. Code fragments scale this.
    pub speed: f32,
    /// Displacement requested this tick.
    pub velocity: (f32, f32),
    /// Consecutive ticks without movement input.
    pub idle_ticks: u32,
    walking: bool,
}

impl Player {
    /// A player standing at `(x, y)`.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            rect: Rect::new(x, y, PLAYER_SIZE, PLAYER_SIZE),
            start: (x, y),
            speed: PLAYER_SPEED,
            velocity: (0.0, 0.0),
            idle_ticks: 0,
            walking: false,
        }
    }

    /// Apply one tick of input and move against `walls`.
    pub fn step(&mut self, input: MoveInput, walls: &[Entity]) -> Option<Stride> {
        let (ux, uy) = input.direction();
        self.velocity = (ux * self.speed, uy * self.speed);
        move_and_collide(&mut self.rect, self.velocity.0, self.velocity.1, walls);

        let moving = self.is_moving();
        if moving {
            self.idle_ticks = 0;
        } else {
            self.idle_ticks = self.idle_ticks.saturating_add(1);
        }

        match (moving, self.walking) {
            (true, false) => {
                self.walking = true;
                Some(Stride::Started)
            }
            (false, true) => {
                self.walking = false;
                Some(Stride::Stopped)
            }
            _ => None,
        }
    }

    /// Whether input requested movement this tick.
    pub fn is_moving(&self) -> bool {
        self.velocity != (0.0, 0.0)
    }

    /// Whether the footstep loop is playing.
    pub fn is_walking(&self) -> bool {
        self.walking
    }

    /// Force the walking state off. Returns `true` if it was on.
    pub fn stop_walking(&mut self) -> bool {
        std::mem::replace(&mut self.walking, false)
    }

    /// Teleport back to the spawn point.
    pub fn reset_to_start(&mut self) {
        self.rect.x = self.start.0;
        self.rect.y = self.start.1;
    }
}

/// A roaming Warden hunter.
#[derive(Debug, Clone)]
pub struct Hunter {
    /// Scene-unique id.
    pub id: EntityId,
    /// World bounds.
    pub rect: Rect,
    /// Speed in units per tick. Code fragments scale this.
    pub speed: f32,
    direction: (i8, i8),
    next_turn_at: u64,
    pulse: f32,
}

impl Hunter {
    /// Spawn a hunter at `(x, y)` heading in a random cardinal direction.
    pub fn new(id: EntityId, x: f32, y: f32, rng: &mut StdRng) -> Self {
        Self {
            id,
            rect: Rect::new(x, y, HUNTER_SIZE, HUNTER_SIZE),
            speed: HUNTER_SPEED,
            direction: HUNTER_HEADINGS[rng.random_range(0..4)],
            next_turn_at: 0,
            pulse: 0.0,
        }
    }

    /// Current heading.
    pub fn direction(&self) -> (i8, i8) {
        self.direction
    }

    /// Draw alpha for the pulsing body.
    pub fn alpha(&self) -> u8 {
        (128.0 + self.pulse.sin() * 127.0).clamp(0.0, 255.0) as u8
    }

    /// Wander for one tick. The heading is re-rolled every 1-3 s and
    /// reversed on any wall hit.
    pub fn update(&mut self, now: u64, walls: &[Entity], rng: &mut StdRng) {
        self.pulse += 0.1;
        if now >= self.next_turn_at {
            self.direction = HUNTER_HEADINGS[rng.random_range(0..HUNTER_HEADINGS.len())];
            self.next_turn_at = now + rng.random_range(1000..=3000);
        }

        let dx = f32::from(self.direction.0) * self.speed;
        let dy = f32::from(self.direction.1) * self.speed;
        let (hit_x, hit_y) = move_and_collide(&mut self.rect, dx, dy, walls);
        if hit_x || hit_y {
            self.direction = (-self.direction.0, -self.direction.1);
        }
    }
}
