//! Codec control-port primitive.
//!
//! A [`RegisterBus`] is the byte-level transport to one codec instance's
//! register file — typically an I2C or SPI control port. The trait is
//! deliberately narrow: address in, value out, chip-defined value width
//! (the WM8741 uses 9-bit values in a 7-bit address space; `u16` covers
//! every chip this board family carries).
//!
//! Register *semantics* — caching, bit fields, write ordering — live in
//! the codec driver, not here.

/// Byte-level register transport to a single codec instance.
pub trait RegisterBus {
    /// Error type
    type Error: core::fmt::Debug;

    /// Write `value` to register `reg`.
    async fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Self::Error>;

    /// Read the current value of register `reg`.
    ///
    /// Chips with a write-only control port (the WM8741 among them) cannot
    /// service this; their drivers satisfy reads from a register cache and
    /// never call it.
    async fn read_register(&mut self, reg: u8) -> Result<u16, Self::Error>;
}
