//! Clock topology resolution.
//!
//! Every bit/frame leaf clock on the board hangs off the same three-level
//! chain inside the clock generator:
//!
//! ```text
//! oscillator input ← PLL stage ← multiplier stage ← leaf (BCLK/LRCLK)
//! ```
//!
//! The PLL and multiplier-stage rates are fixed ratios of the oscillator
//! input — properties of the generator silicon, kept as named constants
//! so a different generator only means different numbers, not different
//! code. Resolution is idempotent: re-applying the same targets to an
//! already-configured generator is harmless.

use platform::{ClockId, ClockTree};

/// PLL rate as a multiple of the oscillator input rate.
pub const PLL_INPUT_RATIO: u32 = 31;
/// Multiplier-stage rate as a divisor of the oscillator input rate.
pub const INPUT_DIVIDER_RATIO: u32 = 8;

/// Ancestry depth of a leaf clock: multiplier stage, PLL, oscillator.
const ANCESTRY_DEPTH: u8 = 3;

/// Errors from topology resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyError<E> {
    /// The leaf's ancestry chain is shorter than the generator requires.
    MissingAncestor {
        /// The leaf whose chain was walked.
        leaf: ClockId,
        /// 1-based level at which the chain ended (1 = multiplier stage).
        depth: u8,
    },
    /// Reading the oscillator input rate failed.
    RateRead {
        /// Clock whose rate could not be read.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
    /// A computed target rate was refused by the generator.
    RateSet {
        /// Clock the rate was requested on.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
}

impl<E> core::fmt::Display for TopologyError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingAncestor { leaf, depth } => write!(
                f,
                "clock {} has no ancestor at level {depth} (need {ANCESTRY_DEPTH})",
                leaf.raw()
            ),
            Self::RateRead { clock, .. } => {
                write!(f, "failed to read rate of clock {}", clock.raw())
            }
            Self::RateSet { clock, .. } => {
                write!(f, "rate request refused on clock {}", clock.raw())
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for TopologyError<E> {}

/// Rates applied to one leaf's PLL / multiplier-stage ancestors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PllTargets {
    /// PLL stage rate in Hz.
    pub pll_hz: u32,
    /// Multiplier stage rate in Hz.
    pub multiplier_stage_hz: u32,
}

/// Walk `leaf`'s ancestry and program the fixed-ratio PLL and
/// multiplier-stage rates derived from the oscillator input rate.
///
/// # Errors
///
/// [`TopologyError::MissingAncestor`] when the chain is not exactly three
/// levels deep, [`TopologyError::RateSet`] when the generator refuses a
/// computed rate.
pub async fn resolve_pll_targets<T: ClockTree>(
    tree: &mut T,
    leaf: ClockId,
) -> Result<PllTargets, TopologyError<T::Error>> {
    let multiplier_stage = tree
        .parent(leaf)
        .ok_or(TopologyError::MissingAncestor { leaf, depth: 1 })?;
    let pll = tree
        .parent(multiplier_stage)
        .ok_or(TopologyError::MissingAncestor { leaf, depth: 2 })?;
    let oscillator = tree
        .parent(pll)
        .ok_or(TopologyError::MissingAncestor { leaf, depth: 3 })?;

    let input_hz = tree
        .rate(oscillator)
        .await
        .map_err(|source| TopologyError::RateRead {
            clock: oscillator,
            source,
        })?;

    let targets = PllTargets {
        pll_hz: input_hz * PLL_INPUT_RATIO,
        multiplier_stage_hz: input_hz / INPUT_DIVIDER_RATIO,
    };

    tree.set_rate(pll, targets.pll_hz)
        .await
        .map_err(|source| TopologyError::RateSet { clock: pll, source })?;
    tree.set_rate(multiplier_stage, targets.multiplier_stage_hz)
        .await
        .map_err(|source| TopologyError::RateSet {
            clock: multiplier_stage,
            source,
        })?;

    Ok(targets)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
