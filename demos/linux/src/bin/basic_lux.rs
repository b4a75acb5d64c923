//! Basic continuous lux reading example
//!
//! This example demonstrates how to:
//! - Initialize the BH1750 sensor
//! - Select a continuous measurement mode
//! - Read lux values in a loop

#[cfg(target_os = "linux")]
use bh1750::{Address, Bh1750, Mode};
#[cfg(target_os = "linux")]
use embedded_hal::delay::DelayNs;

// This example uses linux-embedded-hal for demonstration
// Replace with your platform's I2C implementation
#[cfg(target_os = "linux")]
use linux_embedded_hal::{Delay, I2cdev};

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut delay = Delay;

    let mut sensor = Bh1750::new(i2c, Address::Low);

    println!("Initializing BH1750 sensor...");
    sensor.init()?;

    sensor.set_mode(Mode::ContinuousHighRes2);
    println!("Mode: {:?}. Press Ctrl+C to exit\n", sensor.mode());

    loop {
        delay.delay_ms(sensor.mode().max_measurement_time_ms());

        match sensor.read_measurement() {
            Ok(lux) => println!("Ambient light: {:.2} lux", lux),
            Err(e) => println!("Read failed: {}", e),
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
    println!("Please adapt the I2C initialization for your platform.");
}
