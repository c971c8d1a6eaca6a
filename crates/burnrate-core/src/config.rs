//! Burn rate engine configuration
//!
//! Loads engine tuning from TOML. The default configuration is embedded at
//! compile time; a user file can override it at
//! `~/.local/share/burnrate/config/engine.toml` (Linux) or via an explicit path.
//!
//! Every file is layered over the defaults, so a user file only needs the
//! keys it changes:
//!
//! ```toml
//! [decay]
//! responsive_half_life = 3.0
//!
//! [windows]
//! max = 60
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::SpendingGroup;

/// Default configuration embedded at compile time
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Half-life endpoints for the intensity dial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayConfig {
    /// Half-life in days at intensity 0
    pub gentle_half_life: f64,
    /// Half-life in days at intensity 1
    pub responsive_half_life: f64,
}

/// Lookback window range, in days
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowConfig {
    pub min: i64,
    pub max: i64,
    /// Window reported as the current reference rate
    pub reference: i64,
}

/// Curve shape analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeConfig {
    pub flat_threshold: f64,
    pub flat_consecutive: usize,
    pub min_visible: i64,
    pub trend_points: usize,
    pub trend_slope: f64,
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnRateConfig {
    pub decay: DecayConfig,
    pub windows: WindowConfig,
    pub shape: ShapeConfig,
    /// Intensity used when neither the request nor the settings table supply one
    pub default_intensity: f64,
    /// Weight given to the observed rate when a target is nudged
    pub smoothing: f64,
    pub food_target: f64,
    pub discretionary_target: f64,
}

impl Default for BurnRateConfig {
    fn default() -> Self {
        Self {
            decay: DecayConfig {
                gentle_half_life: 20.0,
                responsive_half_life: 4.0,
            },
            windows: WindowConfig {
                min: 5,
                max: 45,
                reference: 14,
            },
            shape: ShapeConfig {
                flat_threshold: 0.5,
                flat_consecutive: 3,
                min_visible: 12,
                trend_points: 5,
                trend_slope: 1.0,
            },
            default_intensity: 0.5,
            smoothing: 0.2,
            food_target: 25.0,
            discretionary_target: 35.0,
        }
    }
}

impl BurnRateConfig {
    /// Load configuration from the default locations
    pub fn load() -> Result<Self> {
        Self::load_with_override(None)
    }

    /// Load configuration, preferring an explicit path when it exists
    pub fn load_with_override(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) if path.exists() => read_config(path)?,
            Some(path) => {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = parse_config(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Initial daily target for a group (zero for groups without one)
    pub fn default_target(&self, group: SpendingGroup) -> f64 {
        match group {
            SpendingGroup::Food => self.food_target,
            SpendingGroup::Discretionary => self.discretionary_target,
            SpendingGroup::Explosion => 0.0,
        }
    }

    /// Reject parameter combinations the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let d = &self.decay;
        if !d.responsive_half_life.is_finite() || d.responsive_half_life <= 0.0 {
            return Err(Error::Config(
                "decay.responsive_half_life must be a positive number".into(),
            ));
        }
        if !d.gentle_half_life.is_finite() || d.gentle_half_life <= d.responsive_half_life {
            return Err(Error::Config(
                "decay.gentle_half_life must exceed decay.responsive_half_life".into(),
            ));
        }

        let w = &self.windows;
        if w.min < 1 || w.max < w.min {
            return Err(Error::Config(format!(
                "invalid window range {}..={}",
                w.min, w.max
            )));
        }
        if w.reference < w.min || w.reference > w.max {
            return Err(Error::Config(format!(
                "windows.reference {} is outside {}..={}",
                w.reference, w.min, w.max
            )));
        }

        if !self.shape.flat_threshold.is_finite() || self.shape.flat_threshold <= 0.0 {
            return Err(Error::Config(
                "shape.flat_threshold must be a positive number".into(),
            ));
        }
        if !self.shape.trend_slope.is_finite() || self.shape.trend_slope < 0.0 {
            return Err(Error::Config(
                "shape.trend_slope must be a non-negative number".into(),
            ));
        }
        if self.shape.flat_consecutive < 2 {
            return Err(Error::Config(
                "shape.flat_consecutive must be at least 2".into(),
            ));
        }
        if self.shape.trend_points < 2 {
            return Err(Error::Config("shape.trend_points must be at least 2".into()));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(Error::Config("targets.smoothing must be in (0, 1]".into()));
        }
        if !(0.0..=1.0).contains(&self.default_intensity) {
            return Err(Error::Config("intensity.default must be in [0, 1]".into()));
        }
        for (key, target) in [
            ("targets.food", self.food_target),
            ("targets.discretionary", self.discretionary_target),
        ] {
            if !target.is_finite() || target < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number",
                    key
                )));
            }
        }

        Ok(())
    }
}

/// Get the default user config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("burnrate").join("config").join("engine.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!(path = %path.display(), "Loading engine config");
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    decay: Option<RawDecay>,
    windows: Option<RawWindows>,
    shape: Option<RawShape>,
    intensity: Option<RawIntensity>,
    targets: Option<RawTargets>,
}

#[derive(Debug, Deserialize)]
struct RawDecay {
    gentle_half_life: Option<f64>,
    responsive_half_life: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawWindows {
    min: Option<i64>,
    max: Option<i64>,
    reference: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawShape {
    flat_threshold: Option<f64>,
    flat_consecutive: Option<usize>,
    min_visible: Option<i64>,
    trend_points: Option<usize>,
    trend_slope: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawIntensity {
    default: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTargets {
    smoothing: Option<f64>,
    food: Option<f64>,
    discretionary: Option<f64>,
}

/// Parse config from TOML content, layered over the built-in defaults
pub fn parse_config(content: &str) -> Result<BurnRateConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = BurnRateConfig::default();

    if let Some(decay) = raw.decay {
        if let Some(v) = decay.gentle_half_life {
            config.decay.gentle_half_life = v;
        }
        if let Some(v) = decay.responsive_half_life {
            config.decay.responsive_half_life = v;
        }
    }

    if let Some(windows) = raw.windows {
        if let Some(v) = windows.min {
            config.windows.min = v;
        }
        if let Some(v) = windows.max {
            config.windows.max = v;
        }
        if let Some(v) = windows.reference {
            config.windows.reference = v;
        }
    }

    if let Some(shape) = raw.shape {
        if let Some(v) = shape.flat_threshold {
            config.shape.flat_threshold = v;
        }
        if let Some(v) = shape.flat_consecutive {
            config.shape.flat_consecutive = v;
        }
        if let Some(v) = shape.min_visible {
            config.shape.min_visible = v;
        }
        if let Some(v) = shape.trend_points {
            config.shape.trend_points = v;
        }
        if let Some(v) = shape.trend_slope {
            config.shape.trend_slope = v;
        }
    }

    if let Some(v) = raw.intensity.and_then(|i| i.default) {
        config.default_intensity = v;
    }

    if let Some(targets) = raw.targets {
        if let Some(v) = targets.smoothing {
            config.smoothing = v;
        }
        if let Some(v) = targets.food {
            config.food_target = v;
        }
        if let Some(v) = targets.discretionary {
            config.discretionary_target = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, BurnRateConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("[windows]\nmax = 60\n").unwrap();
        assert_eq!(config.windows.max, 60);
        assert_eq!(config.windows.min, 5);
        assert_eq!(config.decay.gentle_half_life, 20.0);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            parse_config("[windows\nmax = "),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_half_lives() {
        let mut config = BurnRateConfig::default();
        config.decay.gentle_half_life = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reference_outside_range() {
        let mut config = BurnRateConfig::default();
        config.windows.reference = 90;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_values() {
        for toml in [
            "[decay]\nresponsive_half_life = nan\n",
            "[decay]\ngentle_half_life = inf\n",
            "[shape]\nflat_threshold = nan\n",
            "[shape]\ntrend_slope = nan\n",
            "[targets]\nsmoothing = nan\n",
            "[targets]\nfood = inf\n",
            "[targets]\ndiscretionary = -5.0\n",
            "[intensity]\ndefault = nan\n",
        ] {
            let config = parse_config(toml).unwrap();
            assert!(
                matches!(config.validate(), Err(Error::Config(_))),
                "accepted {:?}",
                toml
            );
        }
    }

    #[test]
    fn test_load_with_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[intensity]\ndefault = 0.8").unwrap();

        let config = BurnRateConfig::load_with_override(Some(file.path())).unwrap();
        assert_eq!(config.default_intensity, 0.8);
    }

    #[test]
    fn test_load_with_missing_override() {
        let result = BurnRateConfig::load_with_override(Some(Path::new("/nonexistent/engine.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_default_target_per_group() {
        let config = BurnRateConfig::default();
        assert_eq!(config.default_target(SpendingGroup::Food), 25.0);
        assert_eq!(config.default_target(SpendingGroup::Explosion), 0.0);
    }
}
