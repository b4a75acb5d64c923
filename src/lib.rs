//! # BH1750 Ambient Light Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the ROHM BH1750 (BH1750FVI) digital ambient
//! light sensor, built using the [`embedded-hal`] traits for I2C communication.
//!
//! The BH1750 provides:
//! - A 16-bit illuminance reading, 1 to 65535 counts
//! - Three resolutions (0.5 lx, 1 lx, 4 lx), each continuous or one-shot
//! - A programmable measurement-time register (MTreg, 31 to 254) trading range for sensitivity
//! - Two I2C addresses, selected by the ADDR terminal
//!
//! ## Features
//!
//! - **Blocking API** on top of [`embedded_hal::i2c::I2c`]
//! - **Async/await support** with feature gating (optional)
//! - **Sensitivity control** with range checking
//! - **Lux conversion** from the raw 16-bit count
//! - **Power management** (power on, power down, reset)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bh1750::{Address, Bh1750, Mode};
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! let mut sensor = Bh1750::new(i2c, Address::Low);
//!
//! // Probe, program default sensitivity, power on and reset
//! sensor.init().unwrap();
//!
//! // Pick a resolution; nothing is sent until the next read
//! sensor.set_mode(Mode::ContinuousHighRes2);
//!
//! // let lux = sensor.read_measurement().unwrap();
//! // println!("Ambient light: {:.2} lux", lux);
//! # }
//! ```
//!
//! ## Sensitivity and lux
//!
//! [`Bh1750::read_measurement`] always divides the raw count by [`LX_CONSTANT`], which is only
//! exact at the default sensitivity of 69. After programming another MTreg value with
//! [`Bh1750::set_sensitivity`], multiply the result by [`sensitivity_correction`] to get
//! absolute lux.
//!
//! ## Async Usage
//!
//! Enable the `async` feature to use async/await patterns:
//!
//! ```toml
//! [dependencies]
//! bh1750 = { version = "0.1", features = ["async"] }
//! ```
//!
//! ```rust,ignore
//! # #[cfg(feature = "async")]
//! # async fn example() {
//! use bh1750::{Address, Bh1750};
//!
//! let i2c = /* your async I2C implementation */;
//! let mut sensor = Bh1750::new(i2c, Address::Low);
//!
//! sensor.init_async().await.unwrap();
//! let lux = sensor.read_measurement_async().await.unwrap();
//! println!("Ambient light: {:.2} lux", lux);
//! # }
//! ```
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![no_std]
#![deny(missing_docs)]

use embedded_hal::i2c::I2c;

#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

pub mod ll;

use ll::{DeviceInterface, DeviceInterfaceError};
pub use ll::{
    raw_to_lux, sensitivity_correction, DEFAULT_SENSITIVITY, LX_CONSTANT, SENSITIVITY_MAX,
    SENSITIVITY_MIN, TIMEOUT_MS,
};

/// I2C address selection, following the level of the ADDR terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Address {
    /// ADDR tied to VCC
    High = ll::ADDR_HIGH,
    /// ADDR tied to GND
    #[default]
    Low = ll::ADDR_LOW,
}

impl Address {
    /// Address in the datasheet's 8-bit form (0xB8 / 0x46)
    pub const fn wire_address(self) -> u8 {
        self as u8
    }

    /// 7-bit address as passed to [`embedded_hal::i2c::I2c`] (0x5C / 0x23)
    pub const fn bus_address(self) -> u8 {
        (self as u8) >> 1
    }
}

/// Measurement mode. The discriminant is the instruction byte sent to the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    /// Continuous, 1 lx resolution, typically 120ms
    #[default]
    ContinuousHighRes = ll::CONT_H_RES_MODE,
    /// Continuous, 0.5 lx resolution, typically 120ms
    ContinuousHighRes2 = ll::CONT_H_RES_MODE_2,
    /// Continuous, 4 lx resolution, typically 16ms
    ContinuousLowRes = ll::CONT_L_RES_MODE,
    /// One-shot, 1 lx resolution, powers down afterwards
    OneTimeHighRes = ll::ONE_TIME_H_MODE,
    /// One-shot, 0.5 lx resolution, powers down afterwards
    OneTimeHighRes2 = ll::ONE_TIME_H_MODE_2,
    /// One-shot, 4 lx resolution, powers down afterwards
    OneTimeLowRes = ll::ONE_TIME_L_MODE,
}

impl Mode {
    /// Instruction byte for this mode
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// True for the modes after which the sensor powers itself down
    pub const fn is_one_shot(self) -> bool {
        matches!(
            self,
            Self::OneTimeHighRes | Self::OneTimeHighRes2 | Self::OneTimeLowRes
        )
    }

    /// Resolution in lux per count at default sensitivity
    pub const fn resolution_lx(self) -> f32 {
        match self {
            Self::ContinuousHighRes | Self::OneTimeHighRes => 1.0,
            Self::ContinuousHighRes2 | Self::OneTimeHighRes2 => 0.5,
            Self::ContinuousLowRes | Self::OneTimeLowRes => 4.0,
        }
    }

    /// Typical measurement time at default sensitivity
    pub const fn measurement_time_ms(self) -> u32 {
        match self {
            Self::ContinuousLowRes | Self::OneTimeLowRes => 16,
            _ => 120,
        }
    }

    /// Maximum measurement time at default sensitivity
    pub const fn max_measurement_time_ms(self) -> u32 {
        match self {
            Self::ContinuousLowRes | Self::OneTimeLowRes => 24,
            _ => 180,
        }
    }
}

/// Driver configuration applied at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Config {
    /// Level of the ADDR terminal
    pub address: Address,
    /// Initial measurement mode
    pub mode: Mode,
}

/// All possible errors in this crate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
    /// The device did not acknowledge its address during initialization
    DeviceNotReady,
    /// Sensitivity outside 31..=254, nothing was written
    SensitivityOutOfRange(u8),
}

impl<E> From<DeviceInterfaceError<E>> for Error<E> {
    fn from(err: DeviceInterfaceError<E>) -> Self {
        match err {
            DeviceInterfaceError::I2c(e) => Error::I2c(e),
        }
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            Error::DeviceNotReady => f.write_str("BH1750 did not respond on the bus"),
            Error::SensitivityOutOfRange(s) => write!(
                f,
                "sensitivity {} outside {}..={}",
                s, SENSITIVITY_MIN, SENSITIVITY_MAX
            ),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

/// High-level BH1750 driver
pub struct Bh1750<I2C, Delay = ()> {
    interface: DeviceInterface<I2C>,
    delay: Delay,
    address: Address,
    mode: Mode,
    // Device state tracking
    sensitivity: Option<u8>,
    last_lux: Option<f32>,
}

impl<I2C> Bh1750<I2C, ()> {
    /// Create a new BH1750 driver instance without delay support
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self::with_config(
            i2c,
            Config {
                address,
                ..Config::default()
            },
        )
    }

    /// Create a new BH1750 driver instance from a [`Config`]
    pub fn with_config(i2c: I2C, config: Config) -> Self {
        Bh1750::new_with_delay(i2c, (), config)
    }
}

impl<I2C, Delay> Bh1750<I2C, Delay> {
    /// Create a new BH1750 driver instance with delay support, needed by [`Bh1750::measure`]
    pub fn new_with_delay(i2c: I2C, delay: Delay, config: Config) -> Self {
        Self {
            interface: DeviceInterface {
                i2c,
                address: config.address.bus_address(),
            },
            delay,
            address: config.address,
            mode: config.mode,
            sensitivity: None,
            last_lux: None,
        }
    }

    /// Select the device address. Takes effect on the next bus transaction.
    pub fn set_address(&mut self, address: Address) {
        self.address = address;
        self.interface.address = address.bus_address();
    }

    /// Current address selection
    pub fn address(&self) -> Address {
        self.address
    }

    /// Select the measurement mode.
    ///
    /// No bus traffic happens here. The next [`Bh1750::read_measurement`] writes the mode as its
    /// register pointer, which starts a one-shot measurement or keeps continuous sampling going.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Current measurement mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last successfully programmed sensitivity, `None` before the first one
    pub fn sensitivity(&self) -> Option<u8> {
        self.sensitivity
    }

    /// Lux from the last read, `None` if there was none or it failed
    pub fn last_lux(&self) -> Option<f32> {
        self.last_lux
    }

    /// Destroy the driver and return the I2C interface
    pub fn destroy(self) -> I2C {
        self.interface.i2c
    }

    // Maximum measurement time scaled by the programmed sensitivity
    fn wait_time_ms(&self) -> u32 {
        let sensitivity = self.sensitivity.unwrap_or(DEFAULT_SENSITIVITY);
        (self.mode.max_measurement_time_ms() * u32::from(sensitivity))
            .div_ceil(u32::from(DEFAULT_SENSITIVITY))
    }
}

impl<I2C, E, Delay> Bh1750<I2C, Delay>
where
    I2C: I2c<Error = E>,
{
    /// Initialize the sensor.
    ///
    /// Probes the device, programs the default sensitivity, powers it on and resets the data
    /// register, in that order. Stops at the first failure.
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.interface
            .probe()
            .map_err(|_| Error::DeviceNotReady)?;

        self.set_sensitivity(DEFAULT_SENSITIVITY)?;

        // Reset is ignored while powered down
        self.power_on()?;
        self.reset()
    }

    /// Program the measurement-time register (MTreg).
    ///
    /// Both instruction bytes go out in one transaction, high byte first.
    pub fn set_sensitivity(&mut self, sensitivity: u8) -> Result<(), Error<E>> {
        if !ll::sensitivity_in_range(sensitivity) {
            return Err(Error::SensitivityOutOfRange(sensitivity));
        }
        self.interface
            .send_command(&ll::encode_sensitivity(sensitivity))?;
        self.sensitivity = Some(sensitivity);
        Ok(())
    }

    /// Wake the sensor
    pub fn power_on(&mut self) -> Result<(), Error<E>> {
        self.send_command(ll::POWER_ON)
    }

    /// Put the sensor into its low-power state
    pub fn power_down(&mut self) -> Result<(), Error<E>> {
        self.send_command(ll::POWER_DOWN)
    }

    /// Clear the data register. Only valid while powered on.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        self.send_command(ll::RESET)
    }

    /// Send the current mode opcode on its own, arming a one-shot or starting continuous sampling
    pub fn start_measurement(&mut self) -> Result<(), Error<E>> {
        self.send_command(self.mode.opcode())
    }

    /// Read the raw 16-bit count, using the current mode as register pointer
    pub fn read_raw(&mut self) -> Result<u16, Error<E>> {
        let data = self.interface.read_data(self.mode.opcode())?;
        Ok(u16::from_be_bytes(data))
    }

    /// Read the illuminance in lux.
    ///
    /// On failure the stored [`Bh1750::last_lux`] is cleared.
    pub fn read_measurement(&mut self) -> Result<f32, Error<E>> {
        match self.read_raw() {
            Ok(raw) => {
                let lux = raw_to_lux(raw);
                self.last_lux = Some(lux);
                Ok(lux)
            }
            Err(e) => {
                self.last_lux = None;
                Err(e)
            }
        }
    }

    /// Start a measurement, wait for it to complete and read it
    pub fn measure(&mut self) -> Result<f32, Error<E>>
    where
        Delay: embedded_hal::delay::DelayNs,
    {
        self.start_measurement()?;
        let wait_time_ms = self.wait_time_ms();
        self.delay.delay_ms(wait_time_ms);
        self.read_measurement()
    }

    // Helper method for single-opcode instructions
    fn send_command(&mut self, opcode: u8) -> Result<(), Error<E>> {
        self.interface.send_command(&[opcode]).map_err(Error::from)
    }
}

#[cfg(feature = "async")]
impl<I2C, E, Delay> Bh1750<I2C, Delay>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Initialize the sensor (async version)
    pub async fn init_async(&mut self) -> Result<(), Error<E>> {
        self.interface
            .probe_async()
            .await
            .map_err(|_| Error::DeviceNotReady)?;

        self.set_sensitivity_async(DEFAULT_SENSITIVITY).await?;

        // Reset is ignored while powered down
        self.power_on_async().await?;
        self.reset_async().await
    }

    /// Program the measurement-time register (async version)
    pub async fn set_sensitivity_async(&mut self, sensitivity: u8) -> Result<(), Error<E>> {
        if !ll::sensitivity_in_range(sensitivity) {
            return Err(Error::SensitivityOutOfRange(sensitivity));
        }
        self.interface
            .send_command_async(&ll::encode_sensitivity(sensitivity))
            .await?;
        self.sensitivity = Some(sensitivity);
        Ok(())
    }

    /// Wake the sensor (async version)
    pub async fn power_on_async(&mut self) -> Result<(), Error<E>> {
        self.send_command_async(ll::POWER_ON).await
    }

    /// Put the sensor into its low-power state (async version)
    pub async fn power_down_async(&mut self) -> Result<(), Error<E>> {
        self.send_command_async(ll::POWER_DOWN).await
    }

    /// Clear the data register (async version)
    pub async fn reset_async(&mut self) -> Result<(), Error<E>> {
        self.send_command_async(ll::RESET).await
    }

    /// Send the current mode opcode on its own (async version)
    pub async fn start_measurement_async(&mut self) -> Result<(), Error<E>> {
        self.send_command_async(self.mode.opcode()).await
    }

    /// Read the raw 16-bit count (async version)
    pub async fn read_raw_async(&mut self) -> Result<u16, Error<E>> {
        let data = self.interface.read_data_async(self.mode.opcode()).await?;
        Ok(u16::from_be_bytes(data))
    }

    /// Read the illuminance in lux (async version)
    pub async fn read_measurement_async(&mut self) -> Result<f32, Error<E>> {
        match self.read_raw_async().await {
            Ok(raw) => {
                let lux = raw_to_lux(raw);
                self.last_lux = Some(lux);
                Ok(lux)
            }
            Err(e) => {
                self.last_lux = None;
                Err(e)
            }
        }
    }

    /// Start a measurement, wait for it to complete and read it (async version)
    pub async fn measure_async(&mut self) -> Result<f32, Error<E>>
    where
        Delay: embedded_hal_async::delay::DelayNs,
    {
        self.start_measurement_async().await?;
        let wait_time_ms = self.wait_time_ms();
        self.delay.delay_ms(wait_time_ms).await;
        self.read_measurement_async().await
    }

    async fn send_command_async(&mut self, opcode: u8) -> Result<(), Error<E>> {
        self.interface
            .send_command_async(&[opcode])
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    extern crate std;
    use std::vec;

    const ADDR: u8 = 0x23;

    fn init_expectations() -> [I2cTransaction; 4] {
        [
            I2cTransaction::write(ADDR, vec![]),
            I2cTransaction::write(ADDR, vec![0x42, 0x65]),
            I2cTransaction::write(ADDR, vec![ll::POWER_ON]),
            I2cTransaction::write(ADDR, vec![ll::RESET]),
        ]
    }

    #[test]
    fn test_device_creation() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let sensor = Bh1750::new(i2c, Address::Low);
        assert_eq!(sensor.address(), Address::Low);
        assert_eq!(sensor.mode(), Mode::ContinuousHighRes);
        assert_eq!(sensor.last_lux(), None);
        assert_eq!(sensor.sensitivity(), None);
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_addresses() {
        assert_eq!(Address::High.wire_address(), 0xB8);
        assert_eq!(Address::Low.wire_address(), 0x46);
        assert_eq!(Address::High.bus_address(), 0x5C);
        assert_eq!(Address::Low.bus_address(), 0x23);
    }

    #[test]
    fn test_init_sequence() {
        let expectations = init_expectations();
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.init().unwrap();
        assert_eq!(sensor.sensitivity(), Some(DEFAULT_SENSITIVITY));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_probe_failure_stops_sequence() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![]).with_error(ErrorKind::Other)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.init(), Err(Error::DeviceNotReady));
        assert_eq!(sensor.sensitivity(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_power_on_failure() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![]),
            I2cTransaction::write(ADDR, vec![0x42, 0x65]),
            I2cTransaction::write(ADDR, vec![ll::POWER_ON]).with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.init(), Err(Error::I2c(ErrorKind::Other)));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_sensitivity_failure_stops_sequence() {
        // No power-on or reset may follow
        let expectations = [
            I2cTransaction::write(ADDR, vec![]),
            I2cTransaction::write(ADDR, vec![0x42, 0x65]).with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.init(), Err(Error::I2c(ErrorKind::Other)));
        assert_eq!(sensor.sensitivity(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_reset_failure() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![]),
            I2cTransaction::write(ADDR, vec![0x42, 0x65]),
            I2cTransaction::write(ADDR, vec![ll::POWER_ON]),
            I2cTransaction::write(ADDR, vec![ll::RESET]).with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.init(), Err(Error::I2c(ErrorKind::Other)));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_start_then_read_raw_returns_exact_count() {
        // Counts that do not survive a lux -> raw float round trip
        let expectations = [
            I2cTransaction::write(ADDR, vec![ll::ONE_TIME_H_MODE]),
            I2cTransaction::write_read(ADDR, vec![ll::ONE_TIME_H_MODE], vec![0x00, 0x03]),
            I2cTransaction::write(ADDR, vec![ll::ONE_TIME_H_MODE]),
            I2cTransaction::write_read(ADDR, vec![ll::ONE_TIME_H_MODE], vec![0xFF, 0xFF]),
        ];
        let i2c = I2cMock::new(&expectations);
        let config = Config {
            address: Address::Low,
            mode: Mode::OneTimeHighRes,
        };
        let mut sensor = Bh1750::with_config(i2c, config);

        sensor.start_measurement().unwrap();
        assert_eq!(sensor.read_raw().unwrap(), 3);
        sensor.start_measurement().unwrap();
        assert_eq!(sensor.read_raw().unwrap(), u16::MAX);
        // read_raw does not touch the stored lux
        assert_eq!(sensor.last_lux(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_sensitivity_single_transaction() {
        // 254 = 0b111_11110
        let expectations = [I2cTransaction::write(ADDR, vec![0x47, 0x7E])];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.set_sensitivity(254).unwrap();
        assert_eq!(sensor.sensitivity(), Some(254));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_sensitivity_out_of_range_no_traffic() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        for s in [0, 30, 255] {
            assert_eq!(
                sensor.set_sensitivity(s),
                Err(Error::SensitivityOutOfRange(s))
            );
        }
        assert_eq!(sensor.sensitivity(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_set_sensitivity_failure_keeps_state() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![0x42, 0x65]),
            I2cTransaction::write(ADDR, vec![0x41, 0x7F]).with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.set_sensitivity(69).unwrap();
        assert_eq!(
            sensor.set_sensitivity(63),
            Err(Error::I2c(ErrorKind::Other))
        );
        assert_eq!(sensor.sensitivity(), Some(69));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_read_measurement() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![ll::CONT_H_RES_MODE],
            vec![0x01, 0x2C],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        let lux = sensor.read_measurement().unwrap();
        assert!((lux - 250.0).abs() < 1e-3);
        assert_eq!(sensor.last_lux(), Some(lux));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_read_measurement_zero() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![ll::CONT_H_RES_MODE],
            vec![0x00, 0x00],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.read_measurement().unwrap(), 0.0);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_read_failure_invalidates_last_lux() {
        let expectations = [
            I2cTransaction::write_read(ADDR, vec![ll::CONT_H_RES_MODE], vec![0x01, 0x2C]),
            I2cTransaction::write_read(ADDR, vec![ll::CONT_H_RES_MODE], vec![0x00, 0x00])
                .with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.read_measurement().unwrap();
        assert!(sensor.last_lux().is_some());

        assert_eq!(
            sensor.read_measurement(),
            Err(Error::I2c(ErrorKind::Other))
        );
        assert_eq!(sensor.last_lux(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_mode_and_address_changes_are_silent() {
        let expectations = [I2cTransaction::write_read(
            0x5C,
            vec![ll::ONE_TIME_L_MODE],
            vec![0x00, 0x0C],
        )];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.set_mode(Mode::OneTimeHighRes2);
        sensor.set_mode(Mode::OneTimeLowRes);
        sensor.set_address(Address::High);
        assert_eq!(sensor.address(), Address::High);

        // 12 / 1.2
        let lux = sensor.read_measurement().unwrap();
        assert!((lux - 10.0).abs() < 1e-3);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_power_commands() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![ll::POWER_ON]),
            I2cTransaction::write(ADDR, vec![ll::RESET]),
            I2cTransaction::write(ADDR, vec![ll::POWER_DOWN]),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.power_on().unwrap();
        sensor.reset().unwrap();
        sensor.power_down().unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_measure_one_shot() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![ll::ONE_TIME_H_MODE]),
            I2cTransaction::write_read(ADDR, vec![ll::ONE_TIME_H_MODE], vec![0x12, 0x34]),
        ];
        let i2c = I2cMock::new(&expectations);
        let config = Config {
            address: Address::Low,
            mode: Mode::OneTimeHighRes,
        };
        let mut sensor = Bh1750::new_with_delay(i2c, NoopDelay::new(), config);

        let lux = sensor.measure().unwrap();
        assert!((lux - raw_to_lux(0x1234)).abs() < f32::EPSILON);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_wait_time_scales_with_sensitivity() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x44, 0x6A])];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.wait_time_ms(), 180);
        sensor.set_mode(Mode::ContinuousLowRes);
        assert_eq!(sensor.wait_time_ms(), 24);

        // 138 = 2 * 69
        sensor.set_sensitivity(138).unwrap();
        assert_eq!(sensor.wait_time_ms(), 48);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_mode_properties() {
        assert!(Mode::OneTimeLowRes.is_one_shot());
        assert!(!Mode::ContinuousHighRes2.is_one_shot());
        assert_eq!(Mode::ContinuousHighRes2.resolution_lx(), 0.5);
        assert_eq!(Mode::OneTimeLowRes.measurement_time_ms(), 16);
        assert_eq!(Mode::OneTimeHighRes.opcode(), 0x20);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_init_async() {
        let expectations = init_expectations();
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        sensor.init_async().await.unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_init_async_probe_failure_stops_sequence() {
        let expectations =
            [I2cTransaction::write(ADDR, vec![]).with_error(ErrorKind::Other)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        assert_eq!(sensor.init_async().await, Err(Error::DeviceNotReady));
        assert_eq!(sensor.sensitivity(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_set_sensitivity_async_out_of_range_no_traffic() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new(i2c, Address::Low);

        for s in [0, 30, 255] {
            assert_eq!(
                sensor.set_sensitivity_async(s).await,
                Err(Error::SensitivityOutOfRange(s))
            );
        }
        assert_eq!(sensor.sensitivity(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_measure_async() {
        let expectations = [
            I2cTransaction::write(ADDR, vec![ll::CONT_H_RES_MODE]),
            I2cTransaction::write_read(ADDR, vec![ll::CONT_H_RES_MODE], vec![0x01, 0x2C]),
            I2cTransaction::write_read(ADDR, vec![ll::CONT_H_RES_MODE], vec![0x00, 0x00])
                .with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Bh1750::new_with_delay(i2c, NoopDelay::new(), Config::default());

        let lux = sensor.measure_async().await.unwrap();
        assert!((lux - 250.0).abs() < 1e-3);

        assert!(sensor.read_measurement_async().await.is_err());
        assert_eq!(sensor.last_lux(), None);

        let mut i2c = sensor.destroy();
        i2c.done();
    }
}
