use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::Validate;
use crate::game::{CoordinateRemap, HandoffPolicy};
use crate::registry::Geometry;

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct GameConfig {
    /// Ticks per second while this instance owns the snake.
    pub speed: u32,
    pub frame_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
    pub handoff: HandoffConfig,
    /// Instances spawned by `window_snake simulate`.
    #[serde(default)]
    pub instances: Vec<GeometryConfig>,
    /// Session directory shared by `window_snake join` processes.
    #[serde(default)]
    pub store_dir: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub struct HandoffConfig {
    pub remap: CoordinateRemap,
    pub wrap_when_alone: bool,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct GeometryConfig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub geometry: Geometry,
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.speed.max(1)))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl From<HandoffConfig> for HandoffPolicy {
    fn from(config: HandoffConfig) -> Self {
        Self {
            remap: config.remap,
            wrap_when_alone: config.wrap_when_alone,
        }
    }
}

impl Validate for GameConfig {
    fn validate(&self) -> Result<(), String> {
        if !(1..=60).contains(&self.speed) {
            return Err("Speed must be between 1 and 60 ticks per second".to_string());
        }
        if !(1..=1000).contains(&self.frame_interval_ms) {
            return Err("Frame interval must be between 1ms and 1000ms".to_string());
        }
        if !(100..=1000).contains(&self.heartbeat_interval_ms) {
            return Err("Heartbeat interval must be between 100ms and 1000ms".to_string());
        }
        for instance in &self.instances {
            instance.validate()?;
        }
        Ok(())
    }
}

impl Validate for GeometryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.geometry.width <= 0 || self.geometry.height <= 0 {
            return Err(format!(
                "Instance {} must have a positive width and height",
                self.id.as_deref().unwrap_or("<unnamed>")
            ));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            speed: 10,
            frame_interval_ms: 16,
            heartbeat_interval_ms: 100,
            handoff: HandoffConfig {
                remap: CoordinateRemap::Translate,
                wrap_when_alone: false,
            },
            instances: vec![
                GeometryConfig {
                    id: Some("left".to_string()),
                    geometry: Geometry::new(0, 0, 500, 500),
                },
                GeometryConfig {
                    id: Some("right".to_string()),
                    geometry: Geometry::new(520, 0, 500, 500),
                },
            ],
            store_dir: None,
        }
    }
}
