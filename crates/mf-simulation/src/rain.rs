use rand::Rng;
use rand::rngs::StdRng;

/// Number of particles in the digital rain.
pub const RAIN_DROPS: usize = 250;

const GLYPHS: &[char] = &['0', '1', '7', '#', '/', '\\', '|', ':', '.', '+'];

/// One falling glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainDrop {
    /// Horizontal position (screen space).
    pub x: f32,
    /// Vertical position (screen space).
    pub y: f32,
    /// Fall speed per tick.
    pub speed: f32,
    /// Glyph drawn.
    pub glyph: char,
}

/// Background field of falling glyphs.
#[derive(Debug, Clone)]
pub struct RainField {
    drops: Vec<RainDrop>,
    width: f32,
    height: f32,
}

impl RainField {
    /// Scatter [`RAIN_DROPS`] particles over a `width` by `height` area.
    pub fn new(width: f32, height: f32, rng: &mut StdRng) -> Self {
        let drops = (0..RAIN_DROPS)
            .map(|_| Self::spawn(width, rng.random_range(0.0..height.max(1.0)), rng))
            .collect();
        Self {
            drops,
            width,
            height,
        }
    }

    fn spawn(width: f32, y: f32, rng: &mut StdRng) -> RainDrop {
        RainDrop {
            x: rng.random_range(0.0..width.max(1.0)),
            y,
            speed: rng.random_range(2.0..6.0),
            glyph: GLYPHS[rng.random_range(0..GLYPHS.len())],
        }
    }

    /// Advance every drop; drops leaving the bottom respawn at the top.
    pub fn update(&mut self, rng: &mut StdRng) {
        for drop in &mut self.drops {
            drop.y += drop.speed;
            if drop.y > self.height {
                *drop = Self::spawn(self.width, rng.random_range(-50.0..0.0), rng);
            }
        }
    }

    /// The particles.
    pub fn drops(&self) -> &[RainDrop] {
        &self.drops
    }
}
