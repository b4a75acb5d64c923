//! Automatic sensitivity control example
//!
//! This example demonstrates how to:
//! - Raise MTreg in dim light and lower it near saturation
//! - Correct the lux reading for a non-default sensitivity

#[cfg(target_os = "linux")]
use bh1750::{
    raw_to_lux, sensitivity_correction, Address, Bh1750, Config, Mode, DEFAULT_SENSITIVITY,
    SENSITIVITY_MAX, SENSITIVITY_MIN,
};
#[cfg(target_os = "linux")]
use embedded_hal::{delay::DelayNs, i2c::I2c};
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
const SATURATION_THRESHOLD: u16 = (u16::MAX / 10) * 9;
#[cfg(target_os = "linux")]
const LOW_LIGHT_THRESHOLD: u16 = 100;

#[cfg(target_os = "linux")]
struct AutoSensitivity {
    current: u8,
}

#[cfg(target_os = "linux")]
impl AutoSensitivity {
    fn new() -> Self {
        Self {
            current: DEFAULT_SENSITIVITY,
        }
    }

    // Measurement time grows linearly with MTreg
    fn wait_time_ms(&self, mode: Mode) -> u32 {
        (mode.max_measurement_time_ms() * u32::from(self.current))
            .div_ceil(u32::from(DEFAULT_SENSITIVITY))
    }

    fn update<I, D>(
        &mut self,
        sensor: &mut Bh1750<I, D>,
        raw: u16,
    ) -> Result<bool, Box<dyn std::error::Error>>
    where
        I: I2c,
        I::Error: 'static,
    {
        let next = if raw > SATURATION_THRESHOLD {
            (self.current / 2).max(SENSITIVITY_MIN)
        } else if raw < LOW_LIGHT_THRESHOLD {
            self.current.saturating_mul(2).min(SENSITIVITY_MAX)
        } else {
            self.current
        };

        if next == self.current {
            return Ok(false);
        }

        println!("Sensitivity {} -> {} (raw {})", self.current, next, raw);
        sensor.set_sensitivity(next)?;
        self.current = next;
        Ok(true)
    }
}

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut delay = Delay;

    let config = Config {
        address: Address::Low,
        mode: Mode::OneTimeHighRes,
    };
    let mut sensor = Bh1750::with_config(i2c, config);
    sensor.init()?;

    let mut control = AutoSensitivity::new();

    loop {
        sensor.start_measurement()?;
        delay.delay_ms(control.wait_time_ms(sensor.mode()));
        let raw = sensor.read_raw()?;

        let lux = raw_to_lux(raw) * sensitivity_correction(control.current);
        println!("MTreg {:3}: raw {:5} -> {:.2} lux", control.current, raw, lux);

        control.update(&mut sensor, raw)?;
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
    println!("Please adapt the I2C initialization for your platform.");
}
