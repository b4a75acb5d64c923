//! Low-level opcode map and bus interface for the BH1750
//!
//! The BH1750 has no addressable registers. Every interaction is a single
//! instruction byte written to the device, optionally followed by reading the
//! 16-bit illuminance result.

use embedded_hal::i2c::I2c;

/// Enter the low-power state
pub const POWER_DOWN: u8 = 0x00;
/// Wake the sensor and wait for a measurement command
pub const POWER_ON: u8 = 0x01;
/// Clear the illuminance data register. Not accepted while powered down.
pub const RESET: u8 = 0x07;

/// Opcode base carrying MTreg bits 7..5
pub const MT_REG_HIGH_BYTE: u8 = 0x40;
/// Opcode base carrying MTreg bits 4..0
pub const MT_REG_LOW_BYTE: u8 = 0x60;

/// Datasheet-nominal measurement-time register value
pub const DEFAULT_SENSITIVITY: u8 = 69;
/// Smallest accepted measurement-time register value
pub const SENSITIVITY_MIN: u8 = 31;
/// Largest accepted measurement-time register value
pub const SENSITIVITY_MAX: u8 = 254;

/// Continuous, 1 lx resolution
pub const CONT_H_RES_MODE: u8 = 0x10;
/// Continuous, 0.5 lx resolution
pub const CONT_H_RES_MODE_2: u8 = 0x11;
/// Continuous, 4 lx resolution
pub const CONT_L_RES_MODE: u8 = 0x13;
/// One-shot, 1 lx resolution
pub const ONE_TIME_H_MODE: u8 = 0x20;
/// One-shot, 0.5 lx resolution
pub const ONE_TIME_H_MODE_2: u8 = 0x21;
/// One-shot, 4 lx resolution
pub const ONE_TIME_L_MODE: u8 = 0x23;

/// Device address with ADDR tied high, in the datasheet's 8-bit form
pub const ADDR_HIGH: u8 = 0xB8;
/// Device address with ADDR tied low, in the datasheet's 8-bit form
pub const ADDR_LOW: u8 = 0x46;

/// Bus timeout the transport should be configured with, in milliseconds
pub const TIMEOUT_MS: u32 = 180;

/// Counts per lux at default sensitivity in H mode
pub const LX_CONSTANT: f32 = 1.2;

/// Device interface error types
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum DeviceInterfaceError<I2cError> {
    /// I2C communication error
    I2c(I2cError),
}

/// Returns true if `sensitivity` can be programmed into MTreg
pub const fn sensitivity_in_range(sensitivity: u8) -> bool {
    sensitivity >= SENSITIVITY_MIN && sensitivity <= SENSITIVITY_MAX
}

/// Split an MTreg value into its two instruction bytes, high byte first
pub const fn encode_sensitivity(sensitivity: u8) -> [u8; 2] {
    [
        MT_REG_HIGH_BYTE | (sensitivity >> 5),
        MT_REG_LOW_BYTE | (sensitivity & 0x1F),
    ]
}

/// Recover the MTreg value from the two instruction bytes
pub const fn decode_sensitivity(bytes: [u8; 2]) -> u8 {
    ((bytes[0] & 0x1F) << 5) | (bytes[1] & 0x1F)
}

/// Convert a raw count to lux.
///
/// The conversion assumes the default sensitivity. See
/// [`sensitivity_correction`] for other MTreg values.
pub fn raw_to_lux(raw: u16) -> f32 {
    f32::from(raw) / LX_CONSTANT
}

/// Factor to multiply a lux reading by when MTreg is not the default.
pub fn sensitivity_correction(sensitivity: u8) -> f32 {
    f32::from(DEFAULT_SENSITIVITY) / f32::from(sensitivity)
}

/// Device interface implementation
#[derive(Debug)]
pub struct DeviceInterface<I2c> {
    /// The I2C interface
    pub i2c: I2c,
    /// 7-bit bus address
    pub address: u8,
}

impl<I2cTrait: I2c> DeviceInterface<I2cTrait> {
    /// Address-only write. Succeeds if the device acknowledges its address.
    pub fn probe(&mut self) -> Result<(), DeviceInterfaceError<I2cTrait::Error>> {
        self.i2c
            .write(self.address, &[])
            .map_err(DeviceInterfaceError::I2c)
    }

    /// Write instruction bytes in a single transaction
    pub fn send_command(
        &mut self,
        opcodes: &[u8],
    ) -> Result<(), DeviceInterfaceError<I2cTrait::Error>> {
        self.i2c
            .write(self.address, opcodes)
            .map_err(DeviceInterfaceError::I2c)
    }

    /// Write `register` then read the two result bytes back
    pub fn read_data(
        &mut self,
        register: u8,
    ) -> Result<[u8; 2], DeviceInterfaceError<I2cTrait::Error>> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut data)
            .map_err(DeviceInterfaceError::I2c)?;
        Ok(data)
    }
}

#[cfg(feature = "async")]
impl<I2cTrait: embedded_hal_async::i2c::I2c> DeviceInterface<I2cTrait> {
    /// Address-only write (async version)
    pub async fn probe_async(&mut self) -> Result<(), DeviceInterfaceError<I2cTrait::Error>> {
        self.i2c
            .write(self.address, &[])
            .await
            .map_err(DeviceInterfaceError::I2c)
    }

    /// Write instruction bytes in a single transaction (async version)
    pub async fn send_command_async(
        &mut self,
        opcodes: &[u8],
    ) -> Result<(), DeviceInterfaceError<I2cTrait::Error>> {
        self.i2c
            .write(self.address, opcodes)
            .await
            .map_err(DeviceInterfaceError::I2c)
    }

    /// Write `register` then read the two result bytes back (async version)
    pub async fn read_data_async(
        &mut self,
        register: u8,
    ) -> Result<[u8; 2], DeviceInterfaceError<I2cTrait::Error>> {
        let mut data = [0u8; 2];
        self.i2c
            .write_read(self.address, &[register], &mut data)
            .await
            .map_err(DeviceInterfaceError::I2c)?;
        Ok(data)
    }
}
