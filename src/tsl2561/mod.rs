use core::fmt;

mod device_impl;

/// Errors reported by the TSL2561 driver
#[derive(Debug)]
pub enum Error<E> {
    /// I²C bus error
    I2C(E),
    /// The ID register did not report a TSL2561 part number.
    UnknownDevice(u8),
}
impl<E> From<E> for Error<E> {
    fn from(other: E) -> Self {
        Error::I2C(other)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::I2C(e) => write!(f, "i2c error: {e:?}"),
            Error::UnknownDevice(id) => write!(f, "unexpected device id 0x{id:02X}"),
        }
    }
}

/// Address with the ADDR pin floating
pub const ADDRESS_FLOAT: u8 = 0x39;
/// Address with the ADDR pin tied to ground
pub const ADDRESS_LOW: u8 = 0x29;
/// Address with the ADDR pin tied to VDD
pub const ADDRESS_HIGH: u8 = 0x49;

/// TSL2561 device driver.
///
/// Readings block on `D` for the configured integration time.
#[derive(Debug)]
pub struct Tsl2561<I2C, D> {
    /// The concrete I²C device implementation.
    i2c: I2C,
    delay: D,
    address: u8,
    gain: Gain,
    integration_time: IntegrationTime,
}

/// Integration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTime {
    /// 13.7 ms
    _13ms,
    /// 101 ms
    _101ms,
    /// 402 ms (default)
    _402ms,
}

impl IntegrationTime {
    /// How long to wait after power-up before both channels hold a
    /// complete conversion.
    pub fn as_ms(&self) -> u32 {
        match self {
            IntegrationTime::_13ms => 14,
            IntegrationTime::_101ms => 102,
            IntegrationTime::_402ms => 403,
        }
    }

    fn bits(&self) -> u8 {
        match self {
            IntegrationTime::_13ms => 0x00,
            IntegrationTime::_101ms => 0x01,
            IntegrationTime::_402ms => 0x02,
        }
    }
}

/// Gain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gain {
    /// 1× (for bright light)
    One,
    /// 16× (for dim light, default)
    Sixteen,
}

impl Gain {
    fn bits(&self) -> u8 {
        match self {
            Gain::One => 0x00,
            Gain::Sixteen => 0x10,
        }
    }
}

/// Which photodiode reading to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Channel 0, visible and infrared
    FullSpectrum,
    /// Channel 1, infrared only
    Infrared,
    /// Full spectrum minus infrared
    Visible,
}
