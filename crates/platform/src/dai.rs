//! Digital audio interface format descriptors.
//!
//! A [`DaiFormat`] is negotiated once per stream and handed to both sides
//! of the serial interface: the host controller (as clock master) and the
//! codec instances (always clock slaves). The codec driver maps it to its
//! format-control register fields; the host-side code is external to this
//! engine and consumes the same descriptor.

/// Serial frame format on the audio interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameFormat {
    /// Philips I2S: data one BCLK after the LRCLK transition.
    I2s,
    /// Left-justified: data aligned to the LRCLK transition.
    LeftJustified,
    /// Right-justified: data aligned to the end of the half-frame.
    RightJustified,
}

/// Bit-clock polarity / frame-sync phase convention.
///
/// 16-bit streams on this board use an inverted bit clock while wider
/// streams run both clocks in normal phase — intentional hardware timing
/// behavior, preserved as distinct variants rather than two booleans that
/// invite accidental recombination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockInversion {
    /// Normal bit clock, normal frame sync.
    None,
    /// Inverted bit clock, normal frame sync.
    BitClock,
    /// Normal bit clock, inverted frame sync.
    FrameSync,
    /// Both clocks inverted.
    Both,
}

/// Which side drives the interface bit/frame clocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRole {
    /// This side generates BCLK/LRCLK.
    Master,
    /// This side consumes externally generated clocks.
    Slave,
}

/// Complete interface format for one side of the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DaiFormat {
    /// Frame shape.
    pub frame: FrameFormat,
    /// Clock polarity convention.
    pub inversion: ClockInversion,
    /// Clocking role of this side.
    pub role: ClockRole,
}
