//! Split LSB/MSB attenuation encoding.
//!
//! The WM8741 spreads each channel's 10-bit attenuation over two adjacent
//! registers. The encode/decode pair here is the single place that knows
//! the split, the latch bit, and the control polarity; the driver only
//! decides *when* the two halves are written (LSB strictly first — see
//! [`crate::registers`]).

use platform::VolumeSteps;

use crate::registers::{
    ATT_FIELD_MASK, ATT_HALF_SHIFT, ATT_UPDATE, REG_DACL_ATT_LSB, REG_DACR_ATT_LSB,
};

/// One DAC channel of a codec instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Left DAC channel (R0/R1).
    Left,
    /// Right DAC channel (R2/R3).
    Right,
}

/// Register-pair descriptor for one channel's attenuation control.
///
/// `inverted` maps the user-facing scale (0 = muted … 1023 = 0 dB) onto
/// the raw attenuation code (0 = 0 dB … 1023 = full attenuation). Both
/// channels of the WM8741 are inverted; the flag exists so the mapping is
/// applied consistently in both directions rather than hard-coded.
#[derive(Debug, Clone, Copy)]
pub struct AttenuationControl {
    /// LSB-half register address; the MSB half is always `lsb_reg + 1`.
    pub lsb_reg: u8,
    /// Whether the user scale runs opposite to the raw attenuation code.
    pub inverted: bool,
}

impl AttenuationControl {
    /// Left-channel attenuation control.
    pub const LEFT: Self = Self {
        lsb_reg: REG_DACL_ATT_LSB,
        inverted: true,
    };

    /// Right-channel attenuation control.
    pub const RIGHT: Self = Self {
        lsb_reg: REG_DACR_ATT_LSB,
        inverted: true,
    };

    /// MSB-half register address.
    #[must_use]
    pub const fn msb_reg(self) -> u8 {
        self.lsb_reg + 1
    }

    /// Encode a volume into the `(lsb, msb)` register values.
    ///
    /// The MSB value carries the latch bit; the LSB value deliberately does
    /// not, so the pair only commits once both halves have been written.
    #[must_use]
    pub fn encode(self, volume: VolumeSteps) -> (u16, u16) {
        let raw = self.to_raw(volume);
        let lsb = raw & ATT_FIELD_MASK;
        let msb = (raw >> ATT_HALF_SHIFT) | ATT_UPDATE;
        (lsb, msb)
    }

    /// Decode the `(lsb, msb)` register values back into a volume.
    ///
    /// Latch bits are masked out of both halves.
    #[must_use]
    pub fn decode(self, lsb: u16, msb: u16) -> VolumeSteps {
        let raw = (lsb & ATT_FIELD_MASK) | ((msb & ATT_FIELD_MASK) << ATT_HALF_SHIFT);
        self.from_raw(raw)
    }

    fn to_raw(self, volume: VolumeSteps) -> u16 {
        if self.inverted {
            VolumeSteps::MAX - volume.get()
        } else {
            volume.get()
        }
    }

    fn from_raw(self, raw: u16) -> VolumeSteps {
        VolumeSteps::new(if self.inverted {
            VolumeSteps::MAX - raw
        } else {
            raw
        })
    }
}

impl Channel {
    /// The attenuation control backing this channel.
    #[must_use]
    pub const fn attenuation(self) -> AttenuationControl {
        match self {
            Self::Left => AttenuationControl::LEFT,
            Self::Right => AttenuationControl::RIGHT,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_volume_encodes_to_raw_zero_latched() {
        // User 1023 (0 dB) → raw attenuation 0; only the MSB carries the latch.
        let (lsb, msb) = AttenuationControl::LEFT.encode(VolumeSteps::FULL);
        assert_eq!(lsb, 0x0000);
        assert_eq!(msb, ATT_UPDATE);
    }

    #[test]
    fn muted_encodes_to_full_attenuation() {
        let (lsb, msb) = AttenuationControl::LEFT.encode(VolumeSteps::MUTED);
        assert_eq!(lsb, 0x001f);
        assert_eq!(msb, 0x001f | ATT_UPDATE);
    }

    #[test]
    fn lsb_half_never_carries_the_latch_bit() {
        for v in 0..=VolumeSteps::MAX {
            let (lsb, _) = AttenuationControl::RIGHT.encode(VolumeSteps::new(v));
            assert_eq!(lsb & ATT_UPDATE, 0, "volume {v}");
        }
    }

    #[test]
    fn decode_is_the_exact_inverse_of_encode() {
        for v in 0..=VolumeSteps::MAX {
            let ctl = AttenuationControl::LEFT;
            let (lsb, msb) = ctl.encode(VolumeSteps::new(v));
            assert_eq!(ctl.decode(lsb, msb).get(), v);
        }
    }

    #[test]
    fn decode_ignores_a_stale_latch_bit_in_the_lsb_half() {
        // The startup batch leaves latch bits set in all four registers.
        let ctl = AttenuationControl::LEFT;
        let (lsb, msb) = ctl.encode(VolumeSteps::new(700));
        assert_eq!(ctl.decode(lsb | ATT_UPDATE, msb).get(), 700);
    }

    #[test]
    fn channels_map_to_their_register_pairs() {
        assert_eq!(Channel::Left.attenuation().lsb_reg, 0x00);
        assert_eq!(Channel::Left.attenuation().msb_reg(), 0x01);
        assert_eq!(Channel::Right.attenuation().lsb_reg, 0x02);
        assert_eq!(Channel::Right.attenuation().msb_reg(), 0x03);
    }
}
