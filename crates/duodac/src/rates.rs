//! Sample-rate / format negotiation.
//!
//! Pure derivation of the per-stream clock plan from the requested sample
//! rate and bit width. No hardware is touched here — a rejected request
//! must leave no trace.
//!
//! The board's serial interface always runs two 32-bit slots per frame,
//! so the bit clock is `2 × 32 × fs` for every width; 16- and 24-bit
//! samples simply occupy part of their slot. The codec's word-length
//! field still reflects the requested width. 16-bit streams additionally
//! run an inverted bit clock — a fixed timing property of the host
//! interface at that width, not a tunable.

use platform::dai::{ClockInversion, ClockRole, DaiFormat, FrameFormat};
use platform::BitWidth;
use wm8741::OversamplingRate;

/// Bits per interface slot; samples travel in 32-bit containers
/// regardless of their width.
pub const SLOT_WIDTH_BITS: u32 = 32;
/// Slots (channels) per frame on the interleaved stereo interface.
pub const SLOTS_PER_FRAME: u32 = 2;

/// Master clock rate, one oscillator per sample-rate family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MasterClockRate {
    /// 22.5792 MHz — 44.1 kHz family (44.1/88.2/176.4 kHz).
    Rate22M5792,
    /// 24.576 MHz — 48 kHz family (32/48/96/192 kHz).
    Rate24M576,
}

impl MasterClockRate {
    /// The oscillator frequency in Hz.
    #[must_use]
    pub fn hz(self) -> u32 {
        match self {
            Self::Rate22M5792 => 22_579_200,
            Self::Rate24M576 => 24_576_000,
        }
    }

    /// Map a raw frequency onto the two-element rate set.
    #[must_use]
    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            22_579_200 => Some(Self::Rate22M5792),
            24_576_000 => Some(Self::Rate24M576),
            _ => None,
        }
    }

    /// The master clock serving a sample rate, by frequency family.
    #[must_use]
    pub fn for_sample_rate(sample_rate_hz: u32) -> Option<Self> {
        match sample_rate_hz {
            44_100 | 88_200 | 176_400 => Some(Self::Rate22M5792),
            32_000 | 48_000 | 96_000 | 192_000 => Some(Self::Rate24M576),
            _ => None,
        }
    }
}

/// Errors from format negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// The sample rate belongs to neither frequency family.
    UnsupportedSampleRate {
        /// Rejected rate in Hz.
        hz: u32,
    },
    /// The bit width is not carried by the interface.
    UnsupportedBitWidth {
        /// Rejected width in bits.
        bits: u8,
    },
}

impl core::fmt::Display for FormatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedSampleRate { hz } => write!(f, "sample rate not supported: {hz} Hz"),
            Self::UnsupportedBitWidth { bits } => write!(f, "bit depth not supported: {bits}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

/// The per-stream clock plan: consumed once by the session controller and
/// discarded at stream shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockPlan {
    /// Master clock for the stream's frequency family.
    pub mclk: MasterClockRate,
    /// Bit clock rate in Hz.
    pub bclk_hz: u32,
    /// Frame clock rate in Hz (equal to the sample rate).
    pub lrclk_hz: u32,
    /// Requested sample width (word-length programming).
    pub width: BitWidth,
    /// Host-side interface format: clock master.
    pub host_format: DaiFormat,
    /// Codec-side interface format: clock slave, same timing.
    pub codec_format: DaiFormat,
    /// Oversampling selection, when the board opts in.
    pub oversampling: Option<OversamplingRate>,
}

impl ClockPlan {
    /// Fill in the oversampling rate for this plan's sample rate.
    #[must_use]
    pub fn with_oversampling(mut self) -> Self {
        self.oversampling = Some(oversampling_for_rate(self.lrclk_hz));
        self
    }
}

/// Oversampling selection by sample-rate threshold.
#[must_use]
pub fn oversampling_for_rate(sample_rate_hz: u32) -> OversamplingRate {
    if sample_rate_hz <= 48_000 {
        OversamplingRate::Low
    } else if sample_rate_hz <= 96_000 {
        OversamplingRate::Medium
    } else {
        OversamplingRate::High
    }
}

/// Derive the clock plan for a `(sample rate, bit width)` request.
///
/// Pure function: validation failures leave no hardware side effects by
/// construction.
///
/// # Errors
///
/// [`FormatError::UnsupportedBitWidth`] for widths outside {16, 24, 32},
/// [`FormatError::UnsupportedSampleRate`] for rates outside the two
/// supported families.
pub fn negotiate(sample_rate_hz: u32, bit_width: u8) -> Result<ClockPlan, FormatError> {
    let width =
        BitWidth::from_bits(bit_width).ok_or(FormatError::UnsupportedBitWidth { bits: bit_width })?;

    let mclk = MasterClockRate::for_sample_rate(sample_rate_hz)
        .ok_or(FormatError::UnsupportedSampleRate { hz: sample_rate_hz })?;

    // 16-bit runs an inverted bit clock; wider widths run normal phase.
    let inversion = match width {
        BitWidth::W16 => ClockInversion::BitClock,
        BitWidth::W24 | BitWidth::W32 => ClockInversion::None,
    };

    Ok(ClockPlan {
        mclk,
        bclk_hz: SLOTS_PER_FRAME * SLOT_WIDTH_BITS * sample_rate_hz,
        lrclk_hz: sample_rate_hz,
        width,
        host_format: DaiFormat {
            frame: FrameFormat::I2s,
            inversion,
            role: ClockRole::Master,
        },
        codec_format: DaiFormat {
            frame: FrameFormat::I2s,
            inversion,
            role: ClockRole::Slave,
        },
        oversampling: None,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ALL_RATES: &[u32] = &[32_000, 44_100, 48_000, 88_200, 96_000, 176_400, 192_000];

    #[test]
    fn master_clock_comes_from_the_two_element_set() {
        for &rate in ALL_RATES {
            for bits in [16u8, 24, 32] {
                let plan = negotiate(rate, bits).unwrap();
                assert!(matches!(
                    plan.mclk.hz(),
                    22_579_200 | 24_576_000
                ));
            }
        }
    }

    #[test]
    fn bit_clock_is_sixty_four_times_the_sample_rate() {
        for &rate in ALL_RATES {
            for bits in [16u8, 24, 32] {
                let plan = negotiate(rate, bits).unwrap();
                assert_eq!(plan.bclk_hz, 2 * 32 * rate, "rate {rate}, bits {bits}");
                assert_eq!(plan.lrclk_hz, rate);
            }
        }
    }

    #[test]
    fn cd_rate_sixteen_bit_plan() {
        // 16-bit samples are widened to 32-bit slots for timing; the
        // inverted-bit-clock convention applies at this width.
        let plan = negotiate(44_100, 16).unwrap();
        assert_eq!(plan.mclk, MasterClockRate::Rate22M5792);
        assert_eq!(plan.bclk_hz, 2_822_400);
        assert_eq!(plan.host_format.frame, FrameFormat::I2s);
        assert_eq!(plan.host_format.inversion, ClockInversion::BitClock);
        assert_eq!(plan.host_format.role, ClockRole::Master);
        assert_eq!(plan.codec_format.role, ClockRole::Slave);
        assert_eq!(plan.width, BitWidth::W16);
    }

    #[test]
    fn high_rate_thirty_two_bit_plan() {
        let plan = negotiate(192_000, 32).unwrap();
        assert_eq!(plan.mclk, MasterClockRate::Rate24M576);
        assert_eq!(plan.bclk_hz, 12_288_000);
        assert_eq!(plan.host_format.inversion, ClockInversion::None);
    }

    #[test]
    fn twenty_four_bit_reports_its_own_width() {
        let plan = negotiate(96_000, 24).unwrap();
        assert_eq!(plan.width, BitWidth::W24);
        // Same wire timing as 32-bit.
        assert_eq!(plan.bclk_hz, negotiate(96_000, 32).unwrap().bclk_hz);
        assert_eq!(plan.codec_format, negotiate(96_000, 32).unwrap().codec_format);
    }

    #[test]
    fn unsupported_sample_rates_are_rejected() {
        for rate in [8_000, 22_050, 44_000, 352_800] {
            assert_eq!(
                negotiate(rate, 16),
                Err(FormatError::UnsupportedSampleRate { hz: rate })
            );
        }
    }

    #[test]
    fn unsupported_bit_widths_are_rejected() {
        for bits in [8u8, 20, 64] {
            assert_eq!(
                negotiate(48_000, bits),
                Err(FormatError::UnsupportedBitWidth { bits })
            );
        }
    }

    #[test]
    fn master_clock_round_trips_through_raw_hz() {
        for mclk in [MasterClockRate::Rate22M5792, MasterClockRate::Rate24M576] {
            assert_eq!(MasterClockRate::from_hz(mclk.hz()), Some(mclk));
        }
        assert_eq!(MasterClockRate::from_hz(12_288_000), None);
    }

    #[test]
    fn oversampling_tracks_the_rate_thresholds() {
        assert_eq!(oversampling_for_rate(44_100), OversamplingRate::Low);
        assert_eq!(oversampling_for_rate(48_000), OversamplingRate::Low);
        assert_eq!(oversampling_for_rate(96_000), OversamplingRate::Medium);
        assert_eq!(oversampling_for_rate(192_000), OversamplingRate::High);

        let plan = negotiate(176_400, 24).unwrap().with_oversampling();
        assert_eq!(plan.oversampling, Some(OversamplingRate::High));
    }
}
