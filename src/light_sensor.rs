//! Interval-gated sampling of an ambient light sensor.
//!
//! [`PollingLightSensor`] never waits on the clock: the caller drives it by
//! calling [`PollingLightSensor::poll`] from its own main loop, next to any
//! other cooperative components.

use core::fmt;

use log::{debug, trace, warn};

use crate::clock::{elapsed_ms, Clock};
use crate::config::SensorConfig;
use crate::tsl2561::{Channel, Gain, IntegrationTime};

/// Highest sensitivity, for indoor light levels.
const GAIN: Gain = Gain::Sixteen;
/// Longest integration window.
const INTEGRATION_TIME: IntegrationTime = IntegrationTime::_402ms;
const CHANNEL: Channel = Channel::Visible;

/// What the polling sensor needs from a TSL2561-class driver.
pub trait LightDriver {
    type Error: fmt::Debug;

    /// Establishes communication with the device.
    fn begin(&mut self) -> Result<(), Self::Error>;
    fn set_gain(&mut self, gain: Gain) -> Result<(), Self::Error>;
    fn set_timing(&mut self, integration_time: IntegrationTime) -> Result<(), Self::Error>;
    fn get_luminosity(&mut self, channel: Channel) -> Result<u16, Self::Error>;
}

impl<T: LightDriver + ?Sized> LightDriver for &mut T {
    type Error = T::Error;

    fn begin(&mut self) -> Result<(), Self::Error> {
        (**self).begin()
    }

    fn set_gain(&mut self, gain: Gain) -> Result<(), Self::Error> {
        (**self).set_gain(gain)
    }

    fn set_timing(&mut self, integration_time: IntegrationTime) -> Result<(), Self::Error> {
        (**self).set_timing(integration_time)
    }

    fn get_luminosity(&mut self, channel: Channel) -> Result<u16, Self::Error> {
        (**self).get_luminosity(channel)
    }
}

#[derive(Debug)]
pub enum SetupError<E> {
    /// The driver could not talk to the sensor.
    NotFound(E),
    /// The sensor answered but rejected the gain or timing write.
    Configure(E),
}

impl<E: fmt::Debug> fmt::Display for SetupError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetupError::NotFound(e) => write!(f, "light sensor not found: {e:?}"),
            SetupError::Configure(e) => write!(f, "could not configure light sensor: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for SetupError<E> {}

pub struct PollingLightSensor<D, C> {
    driver: D,
    clock: C,
    config: SensorConfig,
    last_sample_time: u32,
    last_lux: u16,
}

impl<D, C> PollingLightSensor<D, C>
where
    D: LightDriver,
    C: Clock,
{
    /// Samples the visible channel at most once per `read_interval_ms`.
    pub fn new(driver: D, clock: C, read_interval_ms: u32) -> Self {
        Self::with_config(driver, clock, SensorConfig::with_read_interval(read_interval_ms))
    }

    /// The first interval is counted from construction.
    pub fn with_config(driver: D, clock: C, config: SensorConfig) -> Self {
        let last_sample_time = clock.now_ms();
        Self {
            driver,
            clock,
            config,
            last_sample_time,
            last_lux: 0,
        }
    }

    /// Starts the driver and programs gain and integration time. Returns
    /// `false` if the sensor could not be reached or configured; retrying is
    /// up to the caller.
    pub fn setup(&mut self) -> bool {
        self.try_setup().is_ok()
    }

    pub fn try_setup(&mut self) -> Result<(), SetupError<D::Error>> {
        self.driver.begin().map_err(SetupError::NotFound)?;
        self.driver.set_gain(GAIN).map_err(SetupError::Configure)?;
        self.driver.set_timing(INTEGRATION_TIME).map_err(SetupError::Configure)?;
        debug!("Light sensor ready: gain {GAIN:?}, integration {INTEGRATION_TIME:?}");
        Ok(())
    }

    /// Takes a sample if the read interval has passed since the last one.
    /// Returns whether [`get_lux`](Self::get_lux) now holds a new value.
    ///
    /// Must be called repeatedly. Returns immediately when no sample is due.
    pub fn poll(&mut self) -> bool {
        let now = self.clock.now_ms();
        if elapsed_ms(now, self.last_sample_time) < self.config.read_interval_ms {
            return false;
        }

        self.last_sample_time = now;
        match self.driver.get_luminosity(CHANNEL) {
            Ok(lux) => {
                trace!("Light sample at {now}ms: {lux}");
                self.last_lux = lux;
                true
            }
            Err(e) => {
                warn!("Light sensor read failed, keeping {}: {e:?}", self.last_lux);
                false
            }
        }
    }

    /// Most recent sample, 0 before the first one.
    pub fn get_lux(&self) -> u16 {
        self.last_lux
    }

    pub fn last_sample_time(&self) -> u32 {
        self.last_sample_time
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn release(self) -> D {
        self.driver
    }
}
