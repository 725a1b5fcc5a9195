//! Configuration loading and typed config structures for the editor.
//!
//! The canonical configuration lives in `starmap-config.yaml` at the project
//! root. Every field has a default, so an empty file (or no file at all)
//! yields a working configuration.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are inconsistent.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What is wrong.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditorConfig {
    /// Where the galaxy store lives.
    #[serde(default)]
    pub store: StoreConfig,

    /// Poll and autosave timing.
    #[serde(default)]
    pub sync: SyncConfig,

    /// The simulated calendar.
    #[serde(default)]
    pub calendar: CalendarConfig,

    /// Pointer tolerances and zoom limits.
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EditorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `STARMAP_API_BASE` overrides `store.base_url`
    /// - `STARMAP_POLL_INTERVAL_MS` overrides `sync.poll_interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, applying environment
    /// overrides and validating the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml maps an empty document to unit, not to an empty map.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `STARMAP_*` environment overrides. Unparseable numeric
    /// overrides are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("STARMAP_API_BASE") {
            self.store.base_url = val;
        }
        if let Some(ms) = std::env::var("STARMAP_POLL_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.sync.poll_interval_ms = ms;
        }
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_owned(),
            })
        };
        if self.sync.poll_interval_ms == 0 {
            return invalid("sync.poll_interval_ms must be positive");
        }
        if self.calendar.min_year > self.calendar.max_year {
            return invalid("calendar.min_year exceeds calendar.max_year");
        }
        let vp = &self.viewport;
        if !(vp.galaxy_min_zoom > 0.0 && vp.galaxy_min_zoom <= vp.max_zoom) {
            return invalid("viewport.galaxy_min_zoom must be in (0, max_zoom]");
        }
        if !(vp.system_min_zoom > 0.0 && vp.system_min_zoom <= vp.max_zoom) {
            return invalid("viewport.system_min_zoom must be in (0, max_zoom]");
        }
        if vp.pick_tolerance_px < 0.0 || vp.body_tolerance_px < 0.0 {
            return invalid("viewport tolerances must not be negative");
        }
        Ok(())
    }
}

/// Galaxy store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the galaxy API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout. `0` leaves the HTTP client's default in place.
    #[serde(default)]
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: 0,
        }
    }
}

/// Background poll and autosave timing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SyncConfig {
    /// Interval between background polls of the store.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Quiet period after the last edit to a star before it is persisted.
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,

    /// Quiet period before the division registry is persisted.
    #[serde(default)]
    pub registry_debounce_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            autosave_debounce_ms: default_autosave_debounce_ms(),
            registry_debounce_ms: 0,
        }
    }
}

/// Bounds of the simulated calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CalendarConfig {
    /// Earliest selectable year.
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Latest selectable year.
    #[serde(default = "default_max_year")]
    pub max_year: i32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            max_year: default_max_year(),
        }
    }
}

/// Pointer tolerances, zoom limits and layout buffers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewportConfig {
    /// Screen-space radius for star and lane picks.
    #[serde(default = "default_pick_tolerance_px")]
    pub pick_tolerance_px: f64,

    /// Screen-space radius for body picks in the system view.
    #[serde(default = "default_body_tolerance_px")]
    pub body_tolerance_px: f64,

    /// Smallest zoom in the galaxy view.
    #[serde(default = "default_galaxy_min_zoom")]
    pub galaxy_min_zoom: f64,

    /// Smallest zoom in the system view.
    #[serde(default = "default_system_min_zoom")]
    pub system_min_zoom: f64,

    /// Largest zoom in either view.
    #[serde(default = "default_max_zoom")]
    pub max_zoom: f64,

    /// Zoom change per wheel delta unit.
    #[serde(default = "default_wheel_sensitivity")]
    pub wheel_sensitivity: f64,

    /// World-space margin around the stars when fitting the view.
    #[serde(default = "default_display_buffer")]
    pub display_buffer: f64,

    /// World-space margin around the stars bounding the tessellation.
    #[serde(default = "default_voronoi_buffer")]
    pub voronoi_buffer: f64,

    /// Margin added when a new star grows the galaxy bounds.
    #[serde(default = "default_bounds_growth_buffer")]
    pub bounds_growth_buffer: u32,

    /// Pointer travel (`|dx| + |dy|`) above which a press is a drag.
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            pick_tolerance_px: default_pick_tolerance_px(),
            body_tolerance_px: default_body_tolerance_px(),
            galaxy_min_zoom: default_galaxy_min_zoom(),
            system_min_zoom: default_system_min_zoom(),
            max_zoom: default_max_zoom(),
            wheel_sensitivity: default_wheel_sensitivity(),
            display_buffer: default_display_buffer(),
            voronoi_buffer: default_voronoi_buffer(),
            bounds_growth_buffer: default_bounds_growth_buffer(),
            drag_threshold_px: default_drag_threshold_px(),
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_owned()
}

const fn default_poll_interval_ms() -> u64 {
    100
}

const fn default_autosave_debounce_ms() -> u64 {
    1000
}

const fn default_min_year() -> i32 {
    2000
}

const fn default_max_year() -> i32 {
    2399
}

const fn default_pick_tolerance_px() -> f64 {
    12.0
}

const fn default_body_tolerance_px() -> f64 {
    20.0
}

const fn default_galaxy_min_zoom() -> f64 {
    0.25
}

const fn default_system_min_zoom() -> f64 {
    0.1
}

const fn default_max_zoom() -> f64 {
    6.0
}

const fn default_wheel_sensitivity() -> f64 {
    0.001
}

const fn default_display_buffer() -> f64 {
    50.0
}

const fn default_voronoi_buffer() -> f64 {
    100.0
}

const fn default_bounds_growth_buffer() -> u32 {
    100
}

const fn default_drag_threshold_px() -> f64 {
    2.0
}

fn default_log_level() -> String {
    "info".to_owned()
}
