/// Configuration for a scene and its director.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for deterministic runs. Each chapter derives its own stream.
    pub seed: u64,
    /// Simulation ticks per second.
    pub tick_rate: u32,
    /// Viewport width in world units.
    pub view_width: f32,
    /// Viewport height in world units.
    pub view_height: f32,
    /// Base delay between director events (ms).
    pub warden_cooldown_ms: u64,
    /// Uniform jitter applied to every director delay (± ms).
    pub warden_jitter_ms: u64,
    /// Lowest cooldown backlash can shrink the director to (ms).
    pub backlash_cooldown_floor_ms: u64,
    /// Amount backlash removes from the cooldown (ms).
    pub backlash_cooldown_step_ms: u64,
    /// Chance per firing of a jumpscare once unlocked.
    pub jumpscare_chance: f64,
    /// Chance per firing of the personalized threat once unlocked.
    pub personal_threat_chance: f64,
    /// Interaction reach: added to an entity's width and height.
    pub interact_margin: f32,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Name used by the personalized threat. `None` reads the environment.
    pub username: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: 60,
            view_width: 1280.0,
            view_height: 720.0,
            warden_cooldown_ms: 12_000,
            warden_jitter_ms: 4_000,
            backlash_cooldown_floor_ms: 4_000,
            backlash_cooldown_step_ms: 4_000,
            jumpscare_chance: 0.05,
            personal_threat_chance: 0.02,
            interact_margin: 20.0,
            max_events: 512,
            username: None,
        }
    }
}

impl SimConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the tick rate.
    pub fn with_tick_rate(mut self, rate: u32) -> Self {
        self.tick_rate = rate;
        self
    }

    /// Set the director's base cooldown and jitter.
    pub fn with_warden_timing(mut self, cooldown_ms: u64, jitter_ms: u64) -> Self {
        self.warden_cooldown_ms = cooldown_ms;
        self.warden_jitter_ms = jitter_ms.min(cooldown_ms);
        self
    }

    /// Set the chances of the two special director branches.
    pub fn with_special_chances(mut self, jumpscare: f64, personal_threat: f64) -> Self {
        self.jumpscare_chance = jumpscare.clamp(0.0, 1.0);
        self.personal_threat_chance = personal_threat.clamp(0.0, 1.0);
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Fix the username instead of reading the environment.
    pub fn with_username(mut self, name: Option<String>) -> Self {
        self.username = name;
        self
    }

    /// The username for the personalized threat, if one can be found.
    pub fn resolve_username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .filter(|name| !name.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = SimConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.tick_rate, 60);
        assert_eq!(config.warden_cooldown_ms, 12_000);
        assert_eq!(config.warden_jitter_ms, 4_000);
        assert!((config.interact_margin - 20.0).abs() < f32::EPSILON);
    }

    #[test]
    fn config_builder_chain() {
        let config = SimConfig::default()
            .with_seed(123)
            .with_warden_timing(1_000, 5_000)
            .with_special_chances(2.0, -1.0)
            .with_max_events(8);
        assert_eq!(config.seed, 123);
        assert_eq!(config.warden_jitter_ms, 1_000);
        assert!((config.jumpscare_chance - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.personal_threat_chance, 0.0);
        assert_eq!(config.max_events, 8);
    }

    #[test]
    fn explicit_username_wins() {
        let config = SimConfig::default().with_username(Some("ada".into()));
        assert_eq!(config.resolve_username().as_deref(), Some("ada"));
        let blank = SimConfig::default().with_username(Some("  ".into()));
        assert_ne!(blank.resolve_username().as_deref(), Some("  "));
    }
}
