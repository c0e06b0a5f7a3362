//! WM8741 register map
//!
//! Reference: Wolfson/Cirrus WM8741 datasheet Rev 4.1, "Register Map".
//!
//! The WM8741 is a stereo attenuating DAC controlled through a write-only
//! 2-wire/3-wire port carrying 9-bit values in a 7-bit address space. Because
//! the port cannot be read back, the driver mirrors every cacheable register
//! in software (see [`REG_DEFAULTS`]) — the same approach the chip's vendor
//! drivers take.
//!
//! # Attenuation encoding
//!
//! Each channel's 10-bit attenuation is split across an LSB register
//! (bits 4:0) and an MSB register (bits 9:5). Bit 5 of either register is
//! the update/latch bit: a write with it set commits both halves to the
//! volume logic atomically. Writing the MSB half without a fresh LSB write
//! latches the *previous* LSB value, so LSB-before-MSB ordering is a hard
//! requirement of the volume path.

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// R0: left-channel attenuation, low half (bits 4:0) + update bit.
pub const REG_DACL_ATT_LSB: u8 = 0x00;
/// R1: left-channel attenuation, high half (bits 9:5) + update bit.
pub const REG_DACL_ATT_MSB: u8 = 0x01;
/// R2: right-channel attenuation, low half.
pub const REG_DACR_ATT_LSB: u8 = 0x02;
/// R3: right-channel attenuation, high half.
pub const REG_DACR_ATT_MSB: u8 = 0x03;
/// R4: volume control (zero detect, soft mute, ramp, anti-clipping).
pub const REG_VOLUME_CONTROL: u8 = 0x04;
/// R5: format control (word length, frame format, clock inversion, power-down).
pub const REG_FORMAT_CONTROL: u8 = 0x05;
/// R6: filter control (FIR response selection).
pub const REG_FILTER_CONTROL: u8 = 0x06;
/// R7: mode control 1 (oversampling rate).
pub const REG_MODE_CONTROL_1: u8 = 0x07;
/// R8: mode control 2 (dither, differential output mode).
pub const REG_MODE_CONTROL_2: u8 = 0x08;
/// R9: software reset — any write restores the register file defaults.
pub const REG_RESET: u8 = 0x09;
/// R32: additional control 1.
pub const REG_ADDITIONAL_CONTROL_1: u8 = 0x20;

// ---------------------------------------------------------------------------
// R0–R3: attenuation fields
// ---------------------------------------------------------------------------

/// Update/latch bit — commits the attenuation pair on this write.
pub const ATT_UPDATE: u16 = 0x0020;
/// Attenuation payload bits of one half-register.
pub const ATT_FIELD_MASK: u16 = 0x001f;
/// The MSB half carries raw attenuation bits 9:5.
pub const ATT_HALF_SHIFT: u8 = 5;

// ---------------------------------------------------------------------------
// R4: volume control fields
// ---------------------------------------------------------------------------

/// Soft mute trigger — ramps the output down when set, back up when cleared.
pub const VOLUME_SOFT_MUTE: u16 = 0x0008;
/// Anti-clipping mode (2 dB analogue attenuation), exposed as an
/// enumerated user control.
pub const VOLUME_ATT2DB: u16 = 0x0020;
/// Shift of the anti-clipping bit within R4.
pub const VOLUME_ATT2DB_SHIFT: u8 = 5;

// ---------------------------------------------------------------------------
// R5: format control fields
// ---------------------------------------------------------------------------

/// Input word length field.
pub const FORMAT_IWL_MASK: u16 = 0x0003;
/// 16-bit input words.
pub const IWL_16BIT: u16 = 0x0000;
/// 20-bit input words.
pub const IWL_20BIT: u16 = 0x0001;
/// 24-bit input words.
pub const IWL_24BIT: u16 = 0x0002;
/// 32-bit input words.
pub const IWL_32BIT: u16 = 0x0003;

/// Frame format field.
pub const FORMAT_FMT_MASK: u16 = 0x000c;
/// Right-justified frame format.
pub const FMT_RIGHT_JUSTIFIED: u16 = 0x0000;
/// Left-justified frame format.
pub const FMT_LEFT_JUSTIFIED: u16 = 0x0004;
/// I2S frame format.
pub const FMT_I2S: u16 = 0x0008;
/// DSP frame format.
pub const FMT_DSP: u16 = 0x000c;

/// Clock inversion code field (BCLK polarity / LRCLK phase).
pub const FORMAT_INV_MASK: u16 = 0x0030;
/// Normal BCLK, normal LRCLK.
pub const INV_NB_NF: u16 = 0x0000;
/// Inverted BCLK, inverted LRCLK.
pub const INV_IB_IF: u16 = 0x0010;
/// Inverted BCLK, normal LRCLK.
pub const INV_IB_NF: u16 = 0x0020;
/// Normal BCLK, inverted LRCLK.
pub const INV_NB_IF: u16 = 0x0030;

/// Power-down bit — DAC outputs are disabled while set.
pub const FORMAT_PWDN: u16 = 0x0080;

// ---------------------------------------------------------------------------
// R6: filter control fields
// ---------------------------------------------------------------------------

/// FIR response selection field (five valid responses, codes 0–4).
pub const FILTER_RESPONSE_MASK: u16 = 0x0007;
/// Shift of the response field within R6.
pub const FILTER_RESPONSE_SHIFT: u8 = 0;

// ---------------------------------------------------------------------------
// R7: mode control 1 fields
// ---------------------------------------------------------------------------

/// Oversampling rate field.
pub const MODE1_OSR_MASK: u16 = 0x0003;
/// Shift of the oversampling field within R7.
pub const MODE1_OSR_SHIFT: u8 = 0;

// ---------------------------------------------------------------------------
// R8: mode control 2 fields
// ---------------------------------------------------------------------------

/// Dither mode field.
pub const MODE2_DITHER_MASK: u16 = 0x0003;
/// Shift of the dither field within R8.
pub const MODE2_DITHER_SHIFT: u8 = 0;
/// Differential output mode field.
pub const MODE2_DIFF_MASK: u16 = 0x000c;
/// Shift of the differential mode field within R8.
pub const MODE2_DIFF_SHIFT: u8 = 2;

// ---------------------------------------------------------------------------
// Reset defaults
// ---------------------------------------------------------------------------

/// Register file contents after reset, in register order.
///
/// This table seeds the software register cache and is restored whenever
/// [`REG_RESET`](crate::registers::REG_RESET) is written. R9 itself is
/// volatile and deliberately absent.
pub const REG_DEFAULTS: &[(u8, u16)] = &[
    (REG_DACL_ATT_LSB, 0x0000),
    (REG_DACL_ATT_MSB, 0x0000),
    (REG_DACR_ATT_LSB, 0x0000),
    (REG_DACR_ATT_MSB, 0x0000),
    (REG_VOLUME_CONTROL, 0x0000),
    (REG_FORMAT_CONTROL, 0x000a),
    (REG_FILTER_CONTROL, 0x0000),
    (REG_MODE_CONTROL_1, 0x0000),
    (REG_MODE_CONTROL_2, 0x0002),
    (REG_ADDITIONAL_CONTROL_1, 0x0002),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attenuation_registers_are_paired() {
        assert_eq!(REG_DACL_ATT_MSB, REG_DACL_ATT_LSB + 1);
        assert_eq!(REG_DACR_ATT_MSB, REG_DACR_ATT_LSB + 1);
    }

    #[test]
    fn update_bit_sits_above_the_attenuation_field() {
        assert_eq!(ATT_UPDATE, ATT_FIELD_MASK + 1);
        assert_eq!(u16::from(ATT_HALF_SHIFT), ATT_FIELD_MASK.count_ones() as u16);
    }

    #[test]
    fn format_control_defaults_to_i2s_powered_up() {
        let (_, def) = REG_DEFAULTS[5];
        assert_eq!(def & FORMAT_FMT_MASK, FMT_I2S);
        assert_eq!(def & FORMAT_PWDN, 0);
    }

    #[test]
    fn defaults_cover_every_cached_register() {
        let addrs: Vec<u8> = REG_DEFAULTS.iter().map(|&(reg, _)| reg).collect();
        assert_eq!(
            addrs,
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8, REG_ADDITIONAL_CONTROL_1]
        );
        assert!(!addrs.contains(&REG_RESET), "reset register is volatile");
    }
}
