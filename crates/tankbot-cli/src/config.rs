//! Robot configuration – reads/writes `~/.tankbot/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tankbot_hal::{CaptureSettings, ExposureProfile};
use tankbot_runtime::{ControlConfig, DriveScales, GuidanceConfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Accepted control loop periods, in milliseconds.
pub const PERIOD_MS_RANGE: std::ops::RangeInclusive<u64> = 1..=1000;
/// Accepted camera frame rates.
pub const CAMERA_FPS_RANGE: std::ops::RangeInclusive<u32> = 1..=240;

/// Persisted robot tuning stored in `~/.tankbot/config.toml`.
///
/// Every field has a default, so a partial file only overrides what it
/// names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Control loop period in milliseconds.
    pub period_ms: u64,
    /// Intake roller speed while the arm is down.
    pub intake_speed: f64,
    pub drive_nominal: f64,
    pub drive_slow: f64,
    pub drive_boost: f64,
    pub belt_nominal: f64,
    pub belt_boost: f64,
    pub trigger_threshold: f64,
    /// Initial value of the dashboard's `InverseEnabled` flag.
    pub inversion_enabled: bool,

    pub frame_width: u32,
    pub frame_height: u32,
    pub camera_fps: u32,
    pub white_balance: u32,
    pub targeting_exposure: u32,
    pub targeting_brightness: u32,
    pub driver_exposure: u32,
    pub driver_brightness: u32,
    /// Start with the camera in the dark targeting exposure.
    pub targeting: bool,
}

impl Default for Config {
    fn default() -> Self {
        let control = ControlConfig::default();
        let guidance = GuidanceConfig::default();
        Self {
            period_ms: 50,
            intake_speed: control.intake_speed,
            drive_nominal: control.drive.nominal,
            drive_slow: control.drive.slow,
            drive_boost: control.drive.boost,
            belt_nominal: control.belt_nominal,
            belt_boost: control.belt_boost,
            trigger_threshold: control.trigger_threshold,
            inversion_enabled: control.inversion_enabled,
            frame_width: guidance.capture.width,
            frame_height: guidance.capture.height,
            camera_fps: guidance.capture.fps,
            white_balance: guidance.capture.white_balance,
            targeting_exposure: guidance.targeting_profile.exposure,
            targeting_brightness: guidance.targeting_profile.brightness,
            driver_exposure: guidance.driver_profile.exposure,
            driver_brightness: guidance.driver_profile.brightness,
            targeting: true,
        }
    }
}

impl Config {
    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !PERIOD_MS_RANGE.contains(&self.period_ms) {
            return Err(ConfigError::Invalid {
                field: "period_ms",
                reason: format!(
                    "{} is outside {}..={}",
                    self.period_ms,
                    PERIOD_MS_RANGE.start(),
                    PERIOD_MS_RANGE.end()
                ),
            });
        }
        if !CAMERA_FPS_RANGE.contains(&self.camera_fps) {
            return Err(ConfigError::Invalid {
                field: "camera_fps",
                reason: format!(
                    "{} is outside {}..={}",
                    self.camera_fps,
                    CAMERA_FPS_RANGE.start(),
                    CAMERA_FPS_RANGE.end()
                ),
            });
        }
        let unit = [
            ("intake_speed", self.intake_speed),
            ("drive_nominal", self.drive_nominal),
            ("drive_slow", self.drive_slow),
            ("drive_boost", self.drive_boost),
            ("belt_nominal", self.belt_nominal),
            ("belt_boost", self.belt_boost),
            ("trigger_threshold", self.trigger_threshold),
        ];
        for (field, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(ConfigError::Invalid {
                field: "frame_width/frame_height",
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Control loop period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Time between simulated camera frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.camera_fps.clamp(
            *CAMERA_FPS_RANGE.start(),
            *CAMERA_FPS_RANGE.end(),
        )))
    }

    /// Tuning for [`ControlLoop`][tankbot_runtime::ControlLoop].
    pub fn control(&self) -> ControlConfig {
        ControlConfig {
            intake_speed: self.intake_speed,
            drive: DriveScales {
                nominal: self.drive_nominal,
                slow: self.drive_slow,
                boost: self.drive_boost,
            },
            belt_nominal: self.belt_nominal,
            belt_boost: self.belt_boost,
            trigger_threshold: self.trigger_threshold,
            inversion_enabled: self.inversion_enabled,
        }
    }

    /// Camera settings for [`Guidance`][tankbot_runtime::Guidance].
    pub fn guidance(&self) -> GuidanceConfig {
        GuidanceConfig {
            capture: CaptureSettings {
                width: self.frame_width,
                height: self.frame_height,
                fps: self.camera_fps,
                white_balance: self.white_balance,
            },
            targeting_profile: ExposureProfile {
                exposure: self.targeting_exposure,
                brightness: self.targeting_brightness,
            },
            driver_profile: ExposureProfile {
                exposure: self.driver_exposure,
                brightness: self.driver_brightness,
            },
        }
    }
}

/// Return the path to `~/.tankbot/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".tankbot").join("config.toml")
}

/// Load the config from disk and apply `TANKBOT_*` overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, ConfigError> {
    let Some(mut cfg) = load_from(&config_path())? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(Some(cfg))
}

pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = toml::from_str(&raw)?;
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Apply `TANKBOT_*` environment variable overrides to `cfg`.  Values that
/// do not parse are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `TANKBOT_PERIOD_MS` | `period_ms` |
/// | `TANKBOT_INTAKE_SPEED` | `intake_speed` |
/// | `TANKBOT_INVERSION_ENABLED` | `inversion_enabled` |
/// | `TANKBOT_TARGETING` | `targeting` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("TANKBOT_PERIOD_MS")
        && let Ok(ms) = v.trim().parse::<u64>()
    {
        cfg.period_ms = ms;
    }
    if let Ok(v) = std::env::var("TANKBOT_INTAKE_SPEED")
        && let Ok(speed) = v.trim().parse::<f64>()
    {
        cfg.intake_speed = speed;
    }
    if let Ok(v) = std::env::var("TANKBOT_INVERSION_ENABLED")
        && let Some(flag) = parse_flag(&v)
    {
        cfg.inversion_enabled = flag;
    }
    if let Ok(v) = std::env::var("TANKBOT_TARGETING")
        && let Some(flag) = parse_flag(&v)
    {
        cfg.targeting = flag;
    }
}

/// Defaults plus `TANKBOT_*` overrides, for when no usable config file
/// exists.
pub fn defaults_with_env() -> Result<Config, ConfigError> {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Save the config to disk, creating `~/.tankbot/` if necessary.
pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    save_to(cfg, &config_path())
}

pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(write_err)?;
        }
    }
    let raw = toml::to_string_pretty(cfg)?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(write_err)?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(write_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_runtime_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.control(), ControlConfig::default());
        assert_eq!(cfg.guidance(), GuidanceConfig::default());
        assert_eq!(cfg.period(), Duration::from_millis(50));
        assert!(cfg.targeting);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_path_points_to_tankbot_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".tankbot"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn roundtrip_modified_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config {
            period_ms: 20,
            drive_slow: 0.4,
            camera_fps: 30,
            targeting: false,
            ..Config::default()
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.period_ms, 20);
        assert!((loaded.drive_slow - 0.4).abs() < f64::EPSILON);
        assert_eq!(loaded.guidance().capture.fps, 30);
        assert!(!loaded.targeting);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "belt_boost = 0.8\n").expect("write");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert!((loaded.belt_boost - 0.8).abs() < f64::EPSILON);
        assert!((loaded.belt_nominal - 0.65).abs() < f64::EPSILON);
        assert_eq!(loaded.frame_width, 160);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "period_ms = \"fast\"\n").expect("write");
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn out_of_range_value_is_rejected() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "drive_boost = 1.5\n").expect("write");
        match load_from(&path) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, "drive_boost"),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        let cfg = Config {
            period_ms: 0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid { field: "period_ms", .. })
        ));
    }

    #[test]
    fn oversized_rates_are_rejected() {
        let fast_camera = Config {
            camera_fps: 2_000_000_000,
            ..Config::default()
        };
        assert!(matches!(
            fast_camera.validate(),
            Err(ConfigError::Invalid { field: "camera_fps", .. })
        ));
        assert!(fast_camera.frame_interval() > Duration::ZERO);

        let slow_loop = Config {
            period_ms: 60_000,
            ..Config::default()
        };
        assert!(matches!(
            slow_loop.validate(),
            Err(ConfigError::Invalid { field: "period_ms", .. })
        ));

        let edge = Config {
            period_ms: 1000,
            camera_fps: 240,
            ..Config::default()
        };
        assert!(edge.validate().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600);
        let dir_mode = std::fs::metadata(path.parent().unwrap())
            .expect("dir metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(dir_mode, 0o700);
    }

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" 1 "), Some(true));
        assert_eq!(parse_flag("OFF"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    // All TANKBOT_* variables are exercised in one test; the file-based tests
    // go through `load_from`, which never reads the environment.
    #[test]
    fn apply_env_overrides_reads_tankbot_vars() {
        // SAFETY: the only test in this crate that touches these variables.
        unsafe {
            std::env::set_var("TANKBOT_PERIOD_MS", "10");
            std::env::set_var("TANKBOT_INTAKE_SPEED", "0.75");
            std::env::set_var("TANKBOT_INVERSION_ENABLED", "true");
            std::env::set_var("TANKBOT_TARGETING", "not-a-flag");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.period_ms, 10);
        assert!((cfg.intake_speed - 0.75).abs() < f64::EPSILON);
        assert!(cfg.inversion_enabled);
        assert!(cfg.targeting);

        // The no-file fallback honours the same overrides.
        let fallback = defaults_with_env().expect("valid overrides");
        assert_eq!(fallback, cfg);

        unsafe { std::env::set_var("TANKBOT_PERIOD_MS", "0") };
        assert!(matches!(
            defaults_with_env(),
            Err(ConfigError::Invalid { field: "period_ms", .. })
        ));
        unsafe {
            std::env::remove_var("TANKBOT_PERIOD_MS");
            std::env::remove_var("TANKBOT_INTAKE_SPEED");
            std::env::remove_var("TANKBOT_INVERSION_ENABLED");
            std::env::remove_var("TANKBOT_TARGETING");
        }
    }
}
