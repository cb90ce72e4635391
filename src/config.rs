use crate::types::Config;
use anyhow::{Context, Result};
use std::fs;

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents).context("Invalid config YAML")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Hand;

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config = Config::from_yaml(
            "tracking:\n  shooting_hand: left\nshot:\n  cooldown_s: 3.0\n",
        )
        .unwrap();

        assert_eq!(config.tracking.shooting_hand, Hand::Left);
        assert_eq!(config.tracking.pose_history_capacity, 120);
        assert_eq!(config.shot.cooldown_s, 3.0);
        assert_eq!(config.shot.min_trajectory_points, 10);
        assert_eq!(config.performance.latency_target_ms, 500.0);
        assert!(config.detectors.timeout_ms.is_none());
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = Config::from_yaml(include_str!("../config.yaml")).unwrap();
        assert_eq!(config.tracking.ball_history_capacity, 90);
        assert_eq!(config.shot.three_point_distance, 0.7);
        assert!(!config.coaching.enabled);
    }
}
