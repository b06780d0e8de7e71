//! Value compression settings
//!
//! Only the descriptor lives here; the engine performs the actual
//! compression. Compressed values carry a small header, so payloads smaller
//! than the header plus one byte can never shrink.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::{FormatError, ValidationError};
use crate::wire::WireCompressionConfig;

/// Size of the header prepended to compressed values
pub const HEADER_SIZE: usize = 5;
/// Smallest allowed compression threshold; must match the engine's minimum
pub const MIN_COMPRESSED_SIZE: usize = HEADER_SIZE + 1;
pub const DEFAULT_MIN_COMPRESSION_SIZE: usize = 64;

/// zstd levels, including the negative fast levels
const ZSTD_MIN_LEVEL: i32 = -131072;
const ZSTD_MAX_LEVEL: i32 = 22;
/// lz4: negative is acceleration, 1..=12 is high compression mode
const LZ4_MIN_LEVEL: i32 = -128;
const LZ4_MAX_LEVEL: i32 = 12;

/// Compression algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionBackend {
    #[default]
    Zstd,
    Lz4,
}

impl CompressionBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionBackend::Zstd => "zstd",
            CompressionBackend::Lz4 => "lz4",
        }
    }

    pub fn default_level(&self) -> Option<i32> {
        match self {
            CompressionBackend::Zstd => Some(3),
            CompressionBackend::Lz4 => Some(0),
        }
    }

    /// Accepted compression levels, inclusive
    pub fn level_range(&self) -> (i32, i32) {
        match self {
            CompressionBackend::Zstd => (ZSTD_MIN_LEVEL, ZSTD_MAX_LEVEL),
            CompressionBackend::Lz4 => (LZ4_MIN_LEVEL, LZ4_MAX_LEVEL),
        }
    }
}

impl fmt::Display for CompressionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionBackend {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "zstd" => Ok(CompressionBackend::Zstd),
            "lz4" => Ok(CompressionBackend::Lz4),
            _ => Err(FormatError::UnsupportedBackend(s.to_string())),
        }
    }
}

/// Compression configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionConfiguration {
    pub enabled: bool,
    pub backend: CompressionBackend,
    pub compression_level: Option<i32>,
    pub min_compression_size: usize,
}

impl CompressionConfiguration {
    /// Enabled compression with the backend's default level
    pub fn new(backend: CompressionBackend) -> Self {
        Self {
            enabled: true,
            backend,
            compression_level: backend.default_level(),
            min_compression_size: DEFAULT_MIN_COMPRESSION_SIZE,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            backend: CompressionBackend::Zstd,
            compression_level: None,
            min_compression_size: DEFAULT_MIN_COMPRESSION_SIZE,
        }
    }

    pub fn with_compression_level(mut self, level: Option<i32>) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_min_compression_size(mut self, size: usize) -> Self {
        self.min_compression_size = size;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_compression_size < MIN_COMPRESSED_SIZE {
            return Err(ValidationError::CompressionThreshold {
                backend: self.backend.as_str(),
                size: self.min_compression_size,
                minimum: MIN_COMPRESSED_SIZE,
            });
        }
        if u32::try_from(self.min_compression_size).is_err() {
            return Err(ValidationError::CompressionThresholdTooLarge {
                backend: self.backend.as_str(),
                size: self.min_compression_size,
            });
        }
        if let Some(level) = self.compression_level {
            let (min, max) = self.backend.level_range();
            if !(min..=max).contains(&level) {
                return Err(ValidationError::CompressionLevel {
                    backend: self.backend.as_str(),
                    level,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    /// Whether a value of `data_size` bytes would be compressed
    pub fn should_compress(&self, data_size: usize) -> bool {
        self.enabled && data_size >= self.min_compression_size
    }

    pub(crate) fn to_wire(&self) -> Result<WireCompressionConfig, ValidationError> {
        self.validate()?;
        let min_compression_size = u32::try_from(self.min_compression_size).map_err(|_| {
            ValidationError::CompressionThresholdTooLarge {
                backend: self.backend.as_str(),
                size: self.min_compression_size,
            }
        })?;
        Ok(WireCompressionConfig {
            enabled: self.enabled,
            backend: self.backend,
            compression_level: self.compression_level,
            min_compression_size,
        })
    }
}

impl Default for CompressionConfiguration {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompressionConfiguration::new(CompressionBackend::Zstd);
        assert!(config.enabled);
        assert_eq!(config.compression_level, Some(3));
        assert_eq!(config.min_compression_size, 64);

        let lz4 = CompressionConfiguration::new(CompressionBackend::Lz4);
        assert_eq!(lz4.compression_level, Some(0));

        let disabled = CompressionConfiguration::default();
        assert!(!disabled.enabled);
        assert_eq!(disabled.compression_level, None);
    }

    #[test]
    fn test_threshold_floor() {
        assert_eq!(MIN_COMPRESSED_SIZE, 6);

        let below = CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_min_compression_size(MIN_COMPRESSED_SIZE - 1);
        let err = below.validate().unwrap_err();
        assert!(err.to_string().contains("min_compression_size"));

        let zero = CompressionConfiguration::new(CompressionBackend::Lz4).with_min_compression_size(0);
        assert!(zero.validate().is_err());

        let at_floor = CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_min_compression_size(MIN_COMPRESSED_SIZE);
        assert!(at_floor.validate().is_ok());

        let above = CompressionConfiguration::new(CompressionBackend::Zstd).with_min_compression_size(1024);
        assert!(above.validate().is_ok());
    }

    #[test]
    fn test_zstd_level_range() {
        for level in [ZSTD_MIN_LEVEL, -5, 1, 3, ZSTD_MAX_LEVEL] {
            let config = CompressionConfiguration::new(CompressionBackend::Zstd)
                .with_compression_level(Some(level));
            assert!(config.validate().is_ok(), "level {} should be accepted", level);
        }

        let err = CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_compression_level(Some(999))
            .to_wire()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::CompressionLevel {
                backend: "zstd",
                level: 999,
                min: ZSTD_MIN_LEVEL,
                max: ZSTD_MAX_LEVEL,
            }
        );
        assert!(CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_compression_level(Some(ZSTD_MIN_LEVEL - 1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_lz4_level_range() {
        for level in [LZ4_MIN_LEVEL, -1, 0, 9, LZ4_MAX_LEVEL] {
            let config = CompressionConfiguration::new(CompressionBackend::Lz4)
                .with_compression_level(Some(level));
            assert!(config.validate().is_ok(), "level {} should be accepted", level);
        }

        let err = CompressionConfiguration::new(CompressionBackend::Lz4)
            .with_compression_level(Some(500))
            .to_wire()
            .unwrap_err();
        assert!(matches!(err, ValidationError::CompressionLevel { level: 500, max: 12, .. }));
        assert!(err.to_string().contains("out of valid range -128..=12"));

        assert!(CompressionConfiguration::new(CompressionBackend::Lz4)
            .with_compression_level(Some(13))
            .validate()
            .is_err());
        // unset level defers to the engine
        assert!(CompressionConfiguration::new(CompressionBackend::Lz4)
            .with_compression_level(None)
            .validate()
            .is_ok());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_threshold_above_u32_rejected() {
        let size = u32::MAX as usize + 10;
        let err = CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_min_compression_size(size)
            .to_wire()
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::CompressionThresholdTooLarge { backend: "zstd", size }
        );

        let wire = CompressionConfiguration::new(CompressionBackend::Zstd)
            .with_min_compression_size(u32::MAX as usize)
            .to_wire()
            .unwrap();
        assert_eq!(wire.min_compression_size, u32::MAX);
    }

    #[test]
    fn test_should_compress() {
        let config = CompressionConfiguration::new(CompressionBackend::Zstd).with_min_compression_size(100);
        assert!(!config.should_compress(99));
        assert!(config.should_compress(100));
        assert!(!CompressionConfiguration::disabled().should_compress(10_000));
    }

    #[test]
    fn test_backend_parse() {
        assert_eq!("ZSTD".parse::<CompressionBackend>().unwrap(), CompressionBackend::Zstd);
        assert_eq!("lz4".parse::<CompressionBackend>().unwrap(), CompressionBackend::Lz4);
        assert_eq!(
            "gzip".parse::<CompressionBackend>(),
            Err(FormatError::UnsupportedBackend("gzip".to_string()))
        );
    }

    #[test]
    fn test_to_wire() {
        let wire = CompressionConfiguration::new(CompressionBackend::Lz4)
            .with_compression_level(Some(5))
            .with_min_compression_size(128)
            .to_wire()
            .unwrap();
        assert!(wire.enabled);
        assert_eq!(wire.backend, CompressionBackend::Lz4);
        assert_eq!(wire.compression_level, Some(5));
        assert_eq!(wire.min_compression_size, 128);
    }
}
