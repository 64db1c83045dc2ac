pub const DEFAULT_READ_INTERVAL_MS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorConfig {
    /// Minimum time between two samples. Zero samples on every poll.
    pub read_interval_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            read_interval_ms: DEFAULT_READ_INTERVAL_MS,
        }
    }
}

impl SensorConfig {
    pub fn with_read_interval(read_interval_ms: u32) -> Self {
        Self { read_interval_ms }
    }
}
