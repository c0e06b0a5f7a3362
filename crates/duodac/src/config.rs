//! Board configuration.
//!
//! Everything here is resolved once, outside this engine, by the platform
//! configuration loader (device tree on the reference board): clock
//! handles, codec addressing, differential modes. The engine never looks
//! anything up at runtime — it only consumes the handles it was attached
//! with.
//!
//! The startup register batch and the clock-group shape are deliberately
//! data: board revisions differ in both (one generation routes dedicated
//! frame clocks to each consumer, another shares the host's), and the
//! engine must not hard-code either.

use heapless::Vec;
use platform::ClockId;
use wm8741::registers::{
    REG_DACL_ATT_LSB, REG_DACL_ATT_MSB, REG_DACR_ATT_LSB, REG_DACR_ATT_MSB, REG_FORMAT_CONTROL,
    REG_VOLUME_CONTROL,
};
use wm8741::RegisterWrite;

/// Maximum number of bit or frame clocks in a group: one for the host
/// interface and one per codec instance.
pub const MAX_GROUP_CLOCKS: usize = 3;

/// Clock handles resolved at attach time.
///
/// The two oscillators, the mux selecting between them, and the gate sit
/// on the master-clock path; the bit/frame groups feed the host interface
/// and the codec instances. The frame group may be empty on board
/// revisions where the consumers track the host's frame clock directly.
#[derive(Debug, Clone)]
pub struct ClockConfig {
    /// 22.5792 MHz oscillator (44.1 kHz sample-rate family).
    pub mclk_22m: ClockId,
    /// 24.576 MHz oscillator (48 kHz sample-rate family).
    pub mclk_24m: ClockId,
    /// Mux selecting the active oscillator.
    pub mclk_mux: ClockId,
    /// Gate between the mux output and the consumers.
    pub mclk_gate: ClockId,
    /// Bit clocks: host interface, left codec, right codec.
    pub bit_clocks: Vec<ClockId, MAX_GROUP_CLOCKS>,
    /// Frame clocks, same ordering; may be empty.
    pub frame_clocks: Vec<ClockId, MAX_GROUP_CLOCKS>,
}

/// Full board configuration handed to [`Card::attach`].
///
/// [`Card::attach`]: crate::session::Card::attach
#[derive(Debug, Clone)]
pub struct CardConfig {
    /// Resolved clock handles.
    pub clocks: ClockConfig,
    /// Ordered register batch applied to every codec at attach.
    pub startup_registers: &'static [RegisterWrite],
    /// Whether the negotiator should also select an oversampling rate.
    pub select_oversampling: bool,
}

impl CardConfig {
    /// Configuration with the board-default startup batch and no
    /// oversampling selection.
    #[must_use]
    pub fn new(clocks: ClockConfig) -> Self {
        Self {
            clocks,
            startup_registers: STARTUP_REGISTERS,
            select_oversampling: false,
        }
    }
}

/// Board-default codec startup batch.
///
/// Applied to each codec in order at attach, while the chips are held in
/// power-down:
/// - R0–R3: 0 dB attenuation on both channels, committed by the latch bit
///   on each MSB half;
/// - R4: zero detect, soft mute and volume ramp enabled, zero-flag output
///   disabled;
/// - R5: power-down mode, normal output phase. In differential mono mode
///   the output phase must stay normal.
pub const STARTUP_REGISTERS: &[RegisterWrite] = &[
    RegisterWrite {
        reg: REG_DACL_ATT_LSB,
        value: 0x0000,
    },
    RegisterWrite {
        reg: REG_DACL_ATT_MSB,
        value: 0x0020,
    },
    RegisterWrite {
        reg: REG_DACR_ATT_LSB,
        value: 0x0000,
    },
    RegisterWrite {
        reg: REG_DACR_ATT_MSB,
        value: 0x0020,
    },
    RegisterWrite {
        reg: REG_VOLUME_CONTROL,
        value: 0x0079,
    },
    RegisterWrite {
        reg: REG_FORMAT_CONTROL,
        value: 0x0080,
    },
];

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wm8741::registers::{ATT_UPDATE, FORMAT_PWDN};
    use wm8741::{AttenuationControl, Channel};

    #[test]
    fn startup_batch_latches_full_volume_on_both_channels() {
        for channel in [Channel::Left, Channel::Right] {
            let ctl = channel.attenuation();
            let lsb = STARTUP_REGISTERS
                .iter()
                .find(|w| w.reg == ctl.lsb_reg)
                .map(|w| w.value);
            let msb = STARTUP_REGISTERS
                .iter()
                .find(|w| w.reg == ctl.msb_reg())
                .map(|w| w.value);
            assert_eq!(lsb, Some(0x0000));
            assert_eq!(msb, Some(ATT_UPDATE));
            // 0 dB: decodes to full scale on the user side.
            assert_eq!(
                AttenuationControl::LEFT.decode(0x0000, ATT_UPDATE).get(),
                1023
            );
        }
    }

    #[test]
    fn startup_batch_leaves_codecs_powered_down() {
        let format = STARTUP_REGISTERS
            .iter()
            .find(|w| w.reg == REG_FORMAT_CONTROL)
            .map(|w| w.value)
            .unwrap_or(0);
        assert_eq!(format & FORMAT_PWDN, FORMAT_PWDN);
    }

    #[test]
    fn startup_batch_writes_each_lsb_half_before_its_msb_half() {
        for channel in [Channel::Left, Channel::Right] {
            let ctl = channel.attenuation();
            let lsb_pos = STARTUP_REGISTERS.iter().position(|w| w.reg == ctl.lsb_reg);
            let msb_pos = STARTUP_REGISTERS.iter().position(|w| w.reg == ctl.msb_reg());
            assert!(lsb_pos < msb_pos);
        }
    }
}
