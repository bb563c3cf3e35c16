use crate::codec::CodecConfig;
use crate::defaults;
use crate::error::{Result, VoxlpcError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub analysis: AnalysisConfig,
    pub buffer: BufferConfig,
}

/// Input signal framing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub window_size: usize,
}

/// Voicing, pitch and LPC parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub order: usize,
    pub voicing_threshold: f32,
    pub min_pitch_hz: u32,
    pub max_pitch_hz: u32,
    pub noise_seed: u64,
}

/// Capture-to-analysis ring buffer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BufferConfig {
    pub capacity: usize,
    pub read_timeout_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: defaults::SAMPLE_RATE,
            window_size: defaults::WINDOW_SIZE,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            order: defaults::N_COEFFS,
            voicing_threshold: defaults::F_THRESHOLD,
            min_pitch_hz: defaults::MIN_PITCH_HZ,
            max_pitch_hz: defaults::MAX_PITCH_HZ,
            noise_seed: defaults::NOISE_SEED,
        }
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: defaults::RING_CAPACITY,
            read_timeout_ms: defaults::READ_TIMEOUT_MS,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file, or defaults if the file doesn't exist
    ///
    /// Invalid TOML and other I/O failures are returned as errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(VoxlpcError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file not found, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - VOXLPC_SAMPLE_RATE → audio.sample_rate
    /// - VOXLPC_WINDOW_SIZE → audio.window_size
    /// - VOXLPC_ORDER → analysis.order
    ///
    /// Empty or unparseable values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(sample_rate) = env_number("VOXLPC_SAMPLE_RATE") {
            self.audio.sample_rate = sample_rate;
        }

        if let Some(window_size) = env_number("VOXLPC_WINDOW_SIZE") {
            self.audio.window_size = window_size;
        }

        if let Some(order) = env_number("VOXLPC_ORDER") {
            self.analysis.order = order;
        }

        self
    }

    /// Rejects values no component can run with.
    pub fn validate(&self) -> Result<()> {
        if self.audio.sample_rate == 0 {
            return Err(invalid("audio.sample_rate", "must be positive"));
        }
        if self.audio.window_size == 0 {
            return Err(invalid("audio.window_size", "must be positive"));
        }
        if self.buffer.capacity == 0 {
            return Err(invalid("buffer.capacity", "must be positive"));
        }
        if !self.analysis.voicing_threshold.is_finite() || self.analysis.voicing_threshold <= 0.0 {
            return Err(invalid("analysis.voicing_threshold", "must be a positive number"));
        }
        if self.analysis.min_pitch_hz == 0 || self.analysis.max_pitch_hz == 0 {
            return Err(invalid("analysis.min_pitch_hz", "pitch bounds must be positive"));
        }
        if self.analysis.min_pitch_hz > self.analysis.max_pitch_hz {
            return Err(invalid(
                "analysis.min_pitch_hz",
                &format!(
                    "{} exceeds max_pitch_hz {}",
                    self.analysis.min_pitch_hz, self.analysis.max_pitch_hz
                ),
            ));
        }
        Ok(())
    }

    /// Parameters for [`LpcPipeline`](crate::codec::LpcPipeline).
    pub fn codec_config(&self) -> CodecConfig {
        CodecConfig {
            sample_rate: self.audio.sample_rate,
            window_size: self.audio.window_size,
            order: self.analysis.order,
            voicing_threshold: self.analysis.voicing_threshold,
            min_pitch_hz: self.analysis.min_pitch_hz,
            max_pitch_hz: self.analysis.max_pitch_hz,
            noise_seed: self.analysis.noise_seed,
        }
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxlpc/config.toml on Linux
    #[cfg(feature = "cli")]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxlpc")
            .join("config.toml")
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        return None;
    }
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "ignoring unparseable environment override");
            None
        }
    }
}

fn invalid(key: &str, message: &str) -> VoxlpcError {
    VoxlpcError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to serialize tests that modify environment variables
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    // SAFETY: These helpers are only used in tests with ENV_LOCK held,
    // ensuring no concurrent access to environment variables.
    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    fn clear_voxlpc_env() {
        remove_env("VOXLPC_SAMPLE_RATE");
        remove_env("VOXLPC_WINDOW_SIZE");
        remove_env("VOXLPC_ORDER");
    }

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_default_config_has_correct_values() {
        let config = Config::default();

        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.audio.window_size, 256);

        assert_eq!(config.analysis.order, 64);
        assert_eq!(config.analysis.voicing_threshold, 0.014);
        assert_eq!(config.analysis.min_pitch_hz, 50);
        assert_eq!(config.analysis.max_pitch_hz, 300);
        assert_eq!(config.analysis.noise_seed, 0x5eed);

        assert_eq!(config.buffer.capacity, 32);
        assert_eq!(config.buffer.read_timeout_ms, 1000);
    }

    #[test]
    fn test_load_from_toml_file() {
        let file = write_config(
            r#"
            [audio]
            sample_rate = 16000
            window_size = 512

            [analysis]
            order = 12
            voicing_threshold = 0.02
            min_pitch_hz = 60
            max_pitch_hz = 400
            noise_seed = 7

            [buffer]
            capacity = 8
            read_timeout_ms = 250
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.audio.window_size, 512);
        assert_eq!(config.analysis.order, 12);
        assert_eq!(config.analysis.voicing_threshold, 0.02);
        assert_eq!(config.analysis.min_pitch_hz, 60);
        assert_eq!(config.analysis.max_pitch_hz, 400);
        assert_eq!(config.analysis.noise_seed, 7);
        assert_eq!(config.buffer.capacity, 8);
        assert_eq!(config.buffer.read_timeout_ms, 250);
    }

    #[test]
    fn test_load_partial_config_uses_defaults() {
        let file = write_config(
            r#"
            [analysis]
            order = 10
            "#,
        );

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.analysis.order, 10);
        assert_eq!(config.analysis.max_pitch_hz, 300);
        assert_eq!(config.audio, AudioConfig::default());
        assert_eq!(config.buffer, BufferConfig::default());
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = Config::default();
        config.analysis.order = 16;
        config.buffer.capacity = 4;

        let text = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let file = write_config("[audio\nsample_rate = ");
        let result = Config::load(file.path());
        assert!(matches!(result, Err(VoxlpcError::Config(_))));
    }

    #[test]
    fn test_load_or_default_returns_default_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_returns_error_on_invalid_toml() {
        let file = write_config("buffer = [");
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn test_env_override_sample_rate() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_voxlpc_env();
        set_env("VOXLPC_SAMPLE_RATE", "44100");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.audio.window_size, 256);

        clear_voxlpc_env();
    }

    #[test]
    fn test_env_override_all() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_voxlpc_env();
        set_env("VOXLPC_SAMPLE_RATE", "8000");
        set_env("VOXLPC_WINDOW_SIZE", "160");
        set_env("VOXLPC_ORDER", "10");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.audio.sample_rate, 8000);
        assert_eq!(config.audio.window_size, 160);
        assert_eq!(config.analysis.order, 10);

        clear_voxlpc_env();
    }

    #[test]
    fn test_env_override_empty_or_invalid_ignored() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_voxlpc_env();
        set_env("VOXLPC_SAMPLE_RATE", "");
        set_env("VOXLPC_ORDER", "many");

        let config = Config::default().with_env_overrides();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.analysis.order, 64);

        clear_voxlpc_env();
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = Config::default();
        config.buffer.capacity = 0;
        match config.validate() {
            Err(VoxlpcError::ConfigInvalidValue { key, .. }) => assert_eq!(key, "buffer.capacity"),
            other => panic!("Expected invalid capacity, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.audio.window_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_pitch_range() {
        let mut config = Config::default();
        config.analysis.min_pitch_hz = 400;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_codec_config_mirrors_sections() {
        let mut config = Config::default();
        config.analysis.order = 20;
        config.audio.window_size = 128;

        let codec = config.codec_config();
        assert_eq!(codec.order, 20);
        assert_eq!(codec.window_size, 128);
        assert_eq!(codec.sample_rate, 22050);
        assert_eq!(codec.noise_seed, 0x5eed);
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_default_path_is_xdg_compliant() {
        let path = Config::default_path();
        assert!(path.ends_with("voxlpc/config.toml"));
    }
}
