//! Light sensor node: a TSL2561 behind an interval-gated, non-blocking
//! polling wrapper.

pub mod clock;
pub mod config;
pub mod light_sensor;
pub mod tsl2561;

pub use clock::{Clock, EmbassyClock};
pub use config::SensorConfig;
pub use light_sensor::{LightDriver, PollingLightSensor, SetupError};
pub use tsl2561::Tsl2561;
