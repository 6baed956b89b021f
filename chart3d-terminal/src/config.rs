/// Settings for the terminal viewer
use chart3d_core::Color;
use std::time::Duration;

/// Overrides the chart box colour, e.g. `#404040ff`.
pub const ENV_BOX_COLOR: &str = "CHART3D_BOX_COLOR";
/// Overrides the target frame rate.
pub const ENV_FRAME_RATE: &str = "CHART3D_FPS";

#[derive(Debug, Clone, PartialEq)]
pub struct TerminalConfig {
    /// Target frames per second.
    pub frame_rate: u32,
    /// Radians turned per key press.
    pub rotation_step: f64,
    /// Radians turned about x and y per frame while auto-rotating.
    pub auto_rotate_speed: (f64, f64),
    pub auto_rotate: bool,
    /// Height of a terminal cell relative to its width.
    pub cell_aspect: f64,
    pub chart_box_color: Option<Color>,
}

impl TerminalConfig {
    /// Defaults, with overrides read from the environment. Unparsable
    /// values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_BOX_COLOR) {
            match raw.trim().parse::<Color>() {
                Ok(color) => config.chart_box_color = Some(color),
                Err(err) => log::warn!("ignoring {}: {}", ENV_BOX_COLOR, err),
            }
        }
        if let Some(raw) = lookup(ENV_FRAME_RATE) {
            match raw.trim().parse::<u32>() {
                Ok(rate) if rate > 0 => config.frame_rate = rate,
                _ => log::warn!("ignoring {}: {:?} is not a positive integer", ENV_FRAME_RATE, raw),
            }
        }
        config
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.frame_rate.max(1)))
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            rotation_step: 0.1,
            auto_rotate_speed: (0.0, 0.01),
            auto_rotate: true,
            cell_aspect: 2.0,
            chart_box_color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_time() {
        assert_eq!(TerminalConfig::default().frame_time(), Duration::from_millis(33));
        let config = TerminalConfig {
            frame_rate: 0,
            ..TerminalConfig::default()
        };
        assert_eq!(config.frame_time(), Duration::from_millis(1000));
    }

    #[test]
    fn test_environment_overrides() {
        let config = TerminalConfig::from_lookup(|key| match key {
            ENV_BOX_COLOR => Some("#202020".to_string()),
            ENV_FRAME_RATE => Some("60".to_string()),
            _ => None,
        });
        assert_eq!(config.chart_box_color, Some(Color::rgb(0x20, 0x20, 0x20)));
        assert_eq!(config.frame_rate, 60);
    }

    #[test]
    fn test_bad_overrides_keep_defaults() {
        let config = TerminalConfig::from_lookup(|key| match key {
            ENV_BOX_COLOR => Some("grey".to_string()),
            ENV_FRAME_RATE => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config, TerminalConfig::default());
    }
}
