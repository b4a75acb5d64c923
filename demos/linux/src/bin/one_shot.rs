//! One-shot measurement example
//!
//! The sensor powers itself down after every one-shot measurement, so each
//! reading is started explicitly and the driver waits for it to complete.

#[cfg(target_os = "linux")]
use bh1750::{Address, Bh1750, Config, Mode};
#[cfg(target_os = "linux")]
use embedded_hal::delay::DelayNs;
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;

    let config = Config {
        address: Address::Low,
        mode: Mode::OneTimeHighRes,
    };
    let mut sensor = Bh1750::new_with_delay(i2c, Delay, config);
    sensor.init()?;

    let mut idle = Delay;
    for _ in 0..10 {
        let lux = sensor.measure()?;
        println!("One-shot measurement: {:.2} lux", lux);
        idle.delay_ms(1000);
    }

    sensor.power_down()?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
    println!("Please adapt the I2C initialization for your platform.");
}
