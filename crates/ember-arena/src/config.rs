//! Arena configuration parameters.

use crate::error::ArenaError;

/// Configuration for the bump arena.
///
/// Controls segment sizing and the total segment budget. Validated by
/// [`Arena::new`](crate::Arena::new); all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of each regular arena segment in bytes.
    ///
    /// Default: 65_536 (64 KiB). Must be a power of two and at least
    /// [`ArenaConfig::MIN_SEGMENT_BYTES`]. Requests larger than one segment
    /// are served from a dedicated segment sized to fit.
    pub segment_bytes: usize,

    /// Maximum number of segments the arena may hold, dedicated segments
    /// included.
    ///
    /// Default: 64, i.e. 4 MiB of regular segments at the default size.
    pub max_segments: u16,
}

impl ArenaConfig {
    /// Default segment size: 64 KiB.
    pub const DEFAULT_SEGMENT_BYTES: usize = 64 * 1024;

    /// Default maximum segment count.
    pub const DEFAULT_MAX_SEGMENTS: u16 = 64;

    /// Smallest accepted segment size.
    pub const MIN_SEGMENT_BYTES: usize = 256;

    /// Create a config with the given segment size and the default budget.
    pub fn new(segment_bytes: usize) -> Self {
        Self {
            segment_bytes,
            max_segments: Self::DEFAULT_MAX_SEGMENTS,
        }
    }

    /// Set the segment budget.
    pub fn with_max_segments(mut self, max_segments: u16) -> Self {
        self.max_segments = max_segments;
        self
    }

    /// Check the documented constraints on every field.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if !self.segment_bytes.is_power_of_two() || self.segment_bytes < Self::MIN_SEGMENT_BYTES
        {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "segment_bytes must be a power of two and >= {} (got {})",
                    Self::MIN_SEGMENT_BYTES,
                    self.segment_bytes,
                ),
            });
        }
        if self.max_segments == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_segments must be >= 1 (got 0)".into(),
            });
        }
        Ok(())
    }

    /// Total bytes available in regular segments when the budget is full.
    pub fn budget_bytes(&self) -> usize {
        self.segment_bytes
            .saturating_mul(self.max_segments as usize)
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEGMENT_BYTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = ArenaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.segment_bytes, 64 * 1024);
        assert_eq!(config.budget_bytes(), 64 * 1024 * 64);
    }

    #[test]
    fn rejects_non_power_of_two_segment() {
        let config = ArenaConfig::new(1000);
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn rejects_tiny_segment() {
        assert!(ArenaConfig::new(128).validate().is_err());
        assert!(ArenaConfig::new(256).validate().is_ok());
    }

    #[test]
    fn rejects_zero_segment_budget() {
        let config = ArenaConfig::default().with_max_segments(0);
        assert!(config.validate().is_err());
    }
}
