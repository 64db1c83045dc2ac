use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::light_sensor::LightDriver;
use crate::tsl2561::{Channel, Error, Gain, IntegrationTime, Tsl2561, ADDRESS_FLOAT};

const COMMAND_BIT: u8 = 0x80;
const WORD_BIT: u8 = 0x20;

const POWER_ON: u8 = 0x03;
const POWER_OFF: u8 = 0x00;

struct Register;
impl Register {
    const CONTROL: u8 = 0x00;
    const TIMING: u8 = 0x01;
    const ID: u8 = 0x0A;
    const DATA0_LOW: u8 = 0x0C;
    const DATA1_LOW: u8 = 0x0E;
}

impl<I2C, D> Tsl2561<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, ADDRESS_FLOAT)
    }

    pub fn with_address(i2c: I2C, delay: D, address: u8) -> Self {
        Tsl2561 {
            i2c,
            delay,
            address,
            gain: Gain::Sixteen,
            integration_time: IntegrationTime::_402ms,
        }
    }

    pub fn destroy(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    pub fn gain(&self) -> Gain {
        self.gain
    }

    pub fn integration_time(&self) -> IntegrationTime {
        self.integration_time
    }

    /// Checks that a TSL2561 answers on the bus, writes the cached timing
    /// and leaves the device powered down.
    pub fn begin(&mut self) -> Result<(), Error<I2C::Error>> {
        let id = self.read_u8(Register::ID)?;
        // Upper nibble is the part number: 0x1 for the CS package, 0x5 for T/FN/CL.
        if !matches!(id >> 4, 0x1 | 0x5) {
            return Err(Error::UnknownDevice(id));
        }
        log::debug!("TSL2561 found at 0x{:02X}, id 0x{id:02X}", self.address);
        self.write_u8(Register::TIMING, self.timing_bits())?;
        self.disable()
    }

    pub fn enable(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_u8(Register::CONTROL, POWER_ON)
    }

    pub fn disable(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_u8(Register::CONTROL, POWER_OFF)
    }

    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<I2C::Error>> {
        self.gain = gain;
        self.write_timing()
    }

    pub fn set_integration_time(
        &mut self,
        integration_time: IntegrationTime,
    ) -> Result<(), Error<I2C::Error>> {
        self.integration_time = integration_time;
        self.write_timing()
    }

    /// Powers the device up, waits one integration cycle and returns
    /// `(full spectrum, infrared)` raw counts.
    pub fn read_full_luminosity(&mut self) -> Result<(u16, u16), Error<I2C::Error>> {
        self.enable()?;
        self.delay.delay_ms(self.integration_time.as_ms());
        let full = self.read_u16(Register::DATA0_LOW);
        let ir = self.read_u16(Register::DATA1_LOW);
        // Power down even when a read failed so the part does not stay on.
        self.disable()?;
        Ok((full?, ir?))
    }

    pub fn read_luminosity(&mut self, channel: Channel) -> Result<u16, Error<I2C::Error>> {
        let (full, ir) = self.read_full_luminosity()?;
        Ok(match channel {
            Channel::FullSpectrum => full,
            Channel::Infrared => ir,
            Channel::Visible => full.saturating_sub(ir),
        })
    }

    fn timing_bits(&self) -> u8 {
        self.integration_time.bits() | self.gain.bits()
    }

    fn write_timing(&mut self) -> Result<(), Error<I2C::Error>> {
        self.enable()?;
        self.write_u8(Register::TIMING, self.timing_bits())?;
        self.disable()
    }

    fn write_u8(&mut self, register: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(self.address, &[COMMAND_BIT | register, value])
            .map_err(Error::I2C)
    }

    fn read_u8(&mut self, register: u8) -> Result<u8, Error<I2C::Error>> {
        let mut data = [0; 1];
        self.i2c
            .write_read(self.address, &[COMMAND_BIT | register], &mut data)
            .map_err(Error::I2C)
            .and(Ok(data[0]))
    }

    fn read_u16(&mut self, register: u8) -> Result<u16, Error<I2C::Error>> {
        let mut data = [0; 2];
        self.i2c
            .write_read(self.address, &[COMMAND_BIT | WORD_BIT | register], &mut data)
            .map_err(Error::I2C)
            .and(Ok(u16::from_le_bytes(data)))
    }
}

impl<I2C, D> LightDriver for Tsl2561<I2C, D>
where
    I2C: I2c<SevenBitAddress>,
    D: DelayNs,
{
    type Error = Error<I2C::Error>;

    fn begin(&mut self) -> Result<(), Self::Error> {
        Tsl2561::begin(self)
    }

    fn set_gain(&mut self, gain: Gain) -> Result<(), Self::Error> {
        Tsl2561::set_gain(self, gain)
    }

    fn set_timing(&mut self, integration_time: IntegrationTime) -> Result<(), Self::Error> {
        self.set_integration_time(integration_time)
    }

    fn get_luminosity(&mut self, channel: Channel) -> Result<u16, Self::Error> {
        self.read_luminosity(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct BusError;

    impl embedded_hal::i2c::Error for BusError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    /// Register file of a TSL2561 that records every write.
    #[derive(Default)]
    struct FakeBus {
        id: u8,
        data0: u16,
        data1: u16,
        writes: Vec<(u8, Vec<u8>)>,
        fail_reads: bool,
    }

    impl ErrorType for FakeBus {
        type Error = BusError;
    }

    impl I2c for FakeBus {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut command = 0;
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        command = bytes[0];
                        self.writes.push((address, bytes.to_vec()));
                    }
                    Operation::Read(buffer) => {
                        if self.fail_reads {
                            return Err(BusError);
                        }
                        let value = match command & 0x0F {
                            0x0A => u16::from(self.id),
                            0x0C => self.data0,
                            0x0E => self.data1,
                            _ => 0,
                        };
                        let bytes = value.to_le_bytes();
                        buffer.copy_from_slice(&bytes[..buffer.len()]);
                    }
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeDelay {
        total_ns: u64,
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn register_writes(bus: &FakeBus) -> Vec<[u8; 2]> {
        bus.writes
            .iter()
            .filter(|(_, bytes)| bytes.len() == 2)
            .map(|(_, bytes)| [bytes[0], bytes[1]])
            .collect()
    }

    #[test]
    fn begin_accepts_tsl2561_ids() {
        for id in [0x10, 0x50, 0x5A] {
            let bus = FakeBus {
                id,
                ..Default::default()
            };
            let mut dev = Tsl2561::new(bus, FakeDelay::default());
            assert!(dev.begin().is_ok(), "id 0x{id:02X}");
            let (bus, _) = dev.destroy();
            assert_eq!(
                register_writes(&bus),
                vec![[0x81, 0x12], [0x80, POWER_OFF]],
                "timing then power off"
            );
        }
    }

    #[test]
    fn begin_rejects_other_parts() {
        let bus = FakeBus {
            id: 0x30,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        assert!(matches!(dev.begin(), Err(Error::UnknownDevice(0x30))));
        let (bus, _) = dev.destroy();
        assert!(register_writes(&bus).is_empty());
    }

    #[test]
    fn begin_reports_bus_errors() {
        let bus = FakeBus {
            fail_reads: true,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        assert!(matches!(dev.begin(), Err(Error::I2C(BusError))));
    }

    #[test]
    fn gain_and_timing_share_the_timing_register() {
        let mut dev = Tsl2561::with_address(FakeBus::default(), FakeDelay::default(), 0x29);
        dev.set_gain(Gain::One).unwrap();
        dev.set_integration_time(IntegrationTime::_101ms).unwrap();
        assert_eq!(dev.gain(), Gain::One);
        assert_eq!(dev.integration_time(), IntegrationTime::_101ms);

        let (bus, _) = dev.destroy();
        assert!(bus.writes.iter().all(|(addr, _)| *addr == 0x29));
        assert_eq!(
            register_writes(&bus),
            vec![
                [0x80, POWER_ON],
                [0x81, 0x02],
                [0x80, POWER_OFF],
                [0x80, POWER_ON],
                [0x81, 0x01],
                [0x80, POWER_OFF],
            ]
        );
    }

    #[test]
    fn luminosity_channels() {
        let bus = FakeBus {
            data0: 1200,
            data1: 300,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        assert_eq!(dev.read_luminosity(Channel::FullSpectrum).unwrap(), 1200);
        assert_eq!(dev.read_luminosity(Channel::Infrared).unwrap(), 300);
        assert_eq!(dev.read_luminosity(Channel::Visible).unwrap(), 900);
    }

    #[test]
    fn visible_saturates_when_ir_exceeds_full() {
        let bus = FakeBus {
            data0: 10,
            data1: 40,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        assert_eq!(dev.read_luminosity(Channel::Visible).unwrap(), 0);
    }

    #[test]
    fn read_waits_for_integration_and_powers_down() {
        let bus = FakeBus {
            data0: 5,
            data1: 1,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        dev.read_full_luminosity().unwrap();

        let (bus, delay) = dev.destroy();
        assert_eq!(delay.total_ns, 403 * 1_000_000);
        let writes = register_writes(&bus);
        assert_eq!(writes.first(), Some(&[0x80, POWER_ON]));
        assert_eq!(writes.last(), Some(&[0x80, POWER_OFF]));
        // word reads carry the word bit
        assert!(bus.writes.iter().any(|(_, bytes)| bytes.as_slice() == [0xAC]));
    }

    #[test]
    fn failed_read_still_powers_down() {
        let bus = FakeBus {
            fail_reads: true,
            ..Default::default()
        };
        let mut dev = Tsl2561::new(bus, FakeDelay::default());
        assert!(dev.read_full_luminosity().is_err());
        let (bus, _) = dev.destroy();
        assert_eq!(register_writes(&bus).last(), Some(&[0x80, POWER_OFF]));
    }
}
