// Configuration module for reading Snake.toml
// Every threshold and weight used by the decision cascade lives here

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub appearance: AppearanceConfig,
    pub legality: LegalityConfig,
    pub space: SpaceConfig,
    pub predation: PredationConfig,
    pub foraging: ForagingConfig,
    pub anti_trap: AntiTrapConfig,
    pub policy: PolicyConfig,
    pub debug: DebugConfig,
}

/// Values returned from GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub version: String,
}

/// Legality filter options
#[derive(Debug, Deserialize, Clone)]
pub struct LegalityConfig {
    /// When true an opponent's tail stays blocked if that opponent has food next to its head
    pub respect_opponent_feeding: bool,
}

/// Space profiler options
#[derive(Debug, Deserialize, Clone)]
pub struct SpaceConfig {
    /// Value reported for every direction when the board cannot be profiled
    pub fallback_space: u32,
}

/// Predation (hunting) constants
#[derive(Debug, Deserialize, Clone)]
pub struct PredationConfig {
    pub min_health: i32,
    pub min_length: usize,
    pub vulnerable_health: i32,
    pub max_pursuit_distance: i32,
    pub size_weight: f64,
    pub health_divisor: f64,
    pub ambush_health: i32,
    pub ambush_food_distance: i32,
    pub ambush_bonus: f64,
    pub hungry_prediction_health: i32,
    pub close_range_distance: i32,
    pub close_range_min_space: u32,
    pub default_min_space: u32,
    pub head_to_head_length_margin: usize,
    pub head_to_head_min_space: u32,
}

/// Foraging (food seeking) constants
#[derive(Debug, Deserialize, Clone)]
pub struct ForagingConfig {
    pub emergency_health: i32,
    pub emergency_margin: i32,
    pub safe_space_cap: u32,
    pub space_penalty_weight: f64,
    pub advantage_weight: f64,
    pub health_bonus_threshold: i32,
    pub health_bonus_factor: f64,
}

/// Anti-self-trapping constants
#[derive(Debug, Deserialize, Clone)]
pub struct AntiTrapConfig {
    pub escape_min_length: usize,
    pub escape_route_weight: u32,
    pub escape_spread: u32,
    pub min_space_cap: u32,
    pub min_space_divisor: u32,
}

/// Decision cascade gates and fallback movement patterns
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    pub predation_min_length: usize,
    pub anti_trap_min_length: usize,
    pub forage_health_below: i32,
    pub forage_length_below: usize,
    pub long_pattern_length: usize,
    pub pattern_min_space: u32,
    pub continue_min_space: u32,
    pub spiral_pattern: Vec<Direction>,
    pub perimeter_pattern: Vec<Direction>,
}

impl PolicyConfig {
    /// Movement pattern used for a snake of the given length
    pub fn pattern_for(&self, length: usize) -> &[Direction] {
        if length > self.long_pattern_length {
            &self.perimeter_pattern
        } else {
            &self.spiral_pattern
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Write every decision to the JSONL turn log
    pub enabled: bool,
    /// Emit legality and space maps plus the rendered board at info level
    pub verbose: bool,
    pub log_file_path: String,
}

impl DebugConfig {
    /// Verbose diagnostics are on when configured or when BATTLESNAKE_VERBOSE is set
    pub fn verbose_enabled(&self) -> bool {
        self.verbose
            || std::env::var("BATTLESNAKE_VERBOSE")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false)
    }
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Rejects values the cascade cannot work with
    fn validate(&self) -> Result<(), String> {
        if self.policy.spiral_pattern.is_empty() || self.policy.perimeter_pattern.is_empty() {
            return Err("Movement patterns must not be empty".to_string());
        }
        if self.anti_trap.min_space_divisor == 0 {
            return Err("anti_trap.min_space_divisor must be positive".to_string());
        }
        if self.predation.health_divisor == 0.0 {
            return Err("predation.health_divisor must be non-zero".to_string());
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        use Direction::{Down, Left, Right, Up};

        Config {
            appearance: AppearanceConfig {
                author: "cascade".to_string(),
                color: "#D2042D".to_string(),
                head: "silly".to_string(),
                tail: "bolt".to_string(),
                version: "1.0.0".to_string(),
            },
            legality: LegalityConfig {
                respect_opponent_feeding: false,
            },
            space: SpaceConfig { fallback_space: 1 },
            predation: PredationConfig {
                min_health: 20,
                min_length: 5,
                vulnerable_health: 30,
                max_pursuit_distance: 8,
                size_weight: 2.0,
                health_divisor: 10.0,
                ambush_health: 40,
                ambush_food_distance: 3,
                ambush_bonus: 5.0,
                hungry_prediction_health: 30,
                close_range_distance: 2,
                close_range_min_space: 2,
                default_min_space: 3,
                head_to_head_length_margin: 2,
                head_to_head_min_space: 1,
            },
            foraging: ForagingConfig {
                emergency_health: 20,
                emergency_margin: 10,
                safe_space_cap: 10,
                space_penalty_weight: 20.0,
                advantage_weight: 5.0,
                health_bonus_threshold: 50,
                health_bonus_factor: 0.5,
            },
            anti_trap: AntiTrapConfig {
                escape_min_length: 8,
                escape_route_weight: 2,
                escape_spread: 5,
                min_space_cap: 5,
                min_space_divisor: 3,
            },
            policy: PolicyConfig {
                predation_min_length: 5,
                anti_trap_min_length: 4,
                forage_health_below: 70,
                forage_length_below: 15,
                long_pattern_length: 15,
                pattern_min_space: 5,
                continue_min_space: 3,
                spiral_pattern: vec![Right, Down, Left, Left, Up, Up, Right, Right, Right],
                perimeter_pattern: vec![
                    Right, Right, Right, Down, Down, Down, Left, Left, Left, Up, Up, Up,
                ],
            },
            debug: DebugConfig {
                enabled: false,
                verbose: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Snake.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_hardcoded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.predation.min_health, 20);
        assert_eq!(config.policy.spiral_pattern.len(), 9);
        assert_eq!(config.policy.perimeter_pattern.len(), 12);
    }

    #[test]
    fn test_pattern_selection_by_length() {
        let config = Config::default_hardcoded();
        assert_eq!(config.policy.pattern_for(15).len(), 9);
        assert_eq!(config.policy.pattern_for(16).len(), 12);
    }

    #[test]
    fn test_snake_toml_can_be_parsed() {
        // This test ensures Snake.toml is valid and can be parsed
        let result = Config::from_file("Snake.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Snake.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Snake.toml").expect("Snake.toml should be parseable");
        let hardcoded = Config::default_hardcoded();

        assert_eq!(
            file_config.legality.respect_opponent_feeding,
            hardcoded.legality.respect_opponent_feeding
        );
        assert_eq!(file_config.space.fallback_space, hardcoded.space.fallback_space);

        // Predation
        assert_eq!(file_config.predation.min_health, hardcoded.predation.min_health);
        assert_eq!(file_config.predation.min_length, hardcoded.predation.min_length);
        assert_eq!(
            file_config.predation.max_pursuit_distance,
            hardcoded.predation.max_pursuit_distance
        );
        assert_eq!(file_config.predation.ambush_health, hardcoded.predation.ambush_health);
        assert_eq!(
            file_config.predation.head_to_head_length_margin,
            hardcoded.predation.head_to_head_length_margin
        );

        // Foraging
        assert_eq!(
            file_config.foraging.emergency_health,
            hardcoded.foraging.emergency_health
        );
        assert_eq!(file_config.foraging.safe_space_cap, hardcoded.foraging.safe_space_cap);
        assert_eq!(
            file_config.foraging.space_penalty_weight,
            hardcoded.foraging.space_penalty_weight
        );

        // Anti-trap
        assert_eq!(
            file_config.anti_trap.escape_min_length,
            hardcoded.anti_trap.escape_min_length
        );
        assert_eq!(file_config.anti_trap.escape_spread, hardcoded.anti_trap.escape_spread);

        // Policy
        assert_eq!(file_config.policy.spiral_pattern, hardcoded.policy.spiral_pattern);
        assert_eq!(
            file_config.policy.perimeter_pattern,
            hardcoded.policy.perimeter_pattern
        );
        assert_eq!(
            file_config.policy.pattern_min_space,
            hardcoded.policy.pattern_min_space
        );
    }

    #[test]
    fn test_load_or_default_works() {
        let config = Config::load_or_default();
        assert_eq!(config.predation.vulnerable_health, 30);
    }

    #[test]
    fn test_missing_file_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_pattern_is_rejected() {
        let mut config = Config::default_hardcoded();
        config.policy.spiral_pattern.clear();
        assert!(config.validate().is_err());
    }
}
