use core::time::Duration;

use embedded_hal::delay::DelayNs;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::units::KiloHertz;
use log::{error, info};

use lux_slave::{EmbassyClock, PollingLightSensor, SensorConfig, Tsl2561};

const SETUP_RETRY_MS: u32 = 1_000;
const LOOP_YIELD_MS: u32 = 10;

fn main() -> anyhow::Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::set_max_level(log::LevelFilter::Info);
    info!("lux-slave {} starting", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let config = SensorConfig::default();

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6,
        peripherals.pins.gpio5,
        &create_i2c_config(),
    )?;
    let mut sensor =
        PollingLightSensor::with_config(Tsl2561::new(i2c, FreeRtos), EmbassyClock, config);

    while let Err(e) = sensor.try_setup() {
        error!("{e}, retrying in {SETUP_RETRY_MS}ms");
        FreeRtos.delay_ms(SETUP_RETRY_MS);
    }
    info!("Light sensor configured");

    loop {
        if sensor.poll() {
            info!("lux: {}", sensor.get_lux());
        }
        FreeRtos.delay_ms(LOOP_YIELD_MS);
    }
}

fn create_i2c_config() -> I2cConfig {
    I2cConfig::new()
        .baudrate(KiloHertz::from(100).into())
        .timeout(Duration::from_millis(100).into())
}
