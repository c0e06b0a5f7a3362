//! I2C control-port transport.
//!
//! The WM8741 control port carries 9-bit register values in a 7-bit
//! address space, packed big-endian into a two-byte I2C write:
//!
//! ```text
//! byte 0: [ A6 A5 A4 A3 A2 A1 A0 D8 ]   register address + value bit 8
//! byte 1: [ D7 D6 D5 D4 D3 D2 D1 D0 ]   value bits 7:0
//! ```
//!
//! # I2C Address
//!
//! | CSB/ADDR pin | Address |
//! |--------------|---------|
//! | GND          | `0x1A`  |
//! | VDD          | `0x1B`  |
//!
//! The dual-mono board straps one chip to each address and runs both on
//! the same bus.

use embedded_hal_async::i2c::I2c;
use platform::RegisterBus;

/// 7-bit I2C device address when the address pin is pulled low.
pub const I2C_ADDR_LOW: u8 = 0x1a;
/// 7-bit I2C device address when the address pin is pulled high.
pub const I2C_ADDR_HIGH: u8 = 0x1b;

/// WM8741 control port over an async I2C bus.
pub struct I2cControlPort<I> {
    i2c: I,
    addr: u8,
}

impl<I> I2cControlPort<I> {
    /// Create a control port for the chip at `addr`.
    ///
    /// `i2c` must be a configured async I2C peripheral reaching the chip.
    pub fn new(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }
}

impl<I: I2c> RegisterBus for I2cControlPort<I> {
    type Error = I::Error;

    async fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Self::Error> {
        let frame = [
            (reg << 1) | (((value >> 8) & 0x01) as u8),
            (value & 0xff) as u8,
        ];
        self.i2c.write(self.addr, &frame).await
    }

    async fn read_register(&mut self, reg: u8) -> Result<u16, Self::Error> {
        // The WM8741's port is write-only; its driver reads from the
        // register cache and never lands here. The transaction is still
        // implemented for bus-level diagnostics on boards that route a
        // readable port.
        let mut value = [0u8];
        self.i2c.write_read(self.addr, &[reg << 1], &mut value).await?;
        Ok(u16::from(value[0]))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::i2c::{Mock, Transaction};

    #[tokio::test]
    async fn packs_address_and_ninth_bit_into_the_first_byte() {
        let expectations = [
            // R5 = 0x080: address 0x05 << 1, D8 = 0, low byte 0x80.
            Transaction::write(I2C_ADDR_LOW, vec![0x0a, 0x80]),
            // R1 = 0x120: D8 = 1 lands in bit 0 of the first byte.
            Transaction::write(I2C_ADDR_LOW, vec![0x03, 0x20]),
        ];
        let mut port = I2cControlPort::new(Mock::new(&expectations), I2C_ADDR_LOW);

        port.write_register(0x05, 0x080).await.unwrap();
        port.write_register(0x01, 0x120).await.unwrap();

        port.i2c.done();
    }

    #[test]
    fn chip_addresses_are_adjacent() {
        assert_eq!(I2C_ADDR_HIGH, I2C_ADDR_LOW + 1);
    }
}
