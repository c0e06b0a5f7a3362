//! Clock lifecycle coordination.
//!
//! Tracks a `{prepared, enabled}` flag pair for every bit/frame clock and
//! an enabled flag for the master-clock gate, so that partial failures can
//! be unwound precisely and repeated calls are idempotent. The ordering
//! rules live here, not in callers:
//!
//! - prepare before enable, disable before unprepare — per clock;
//! - bit clocks transition before frame clocks, in configuration order;
//! - the master gate settles for a fixed 20 ms after enabling, *before*
//!   any consumer may be clocked or powered. The settle delay is a
//!   correctness requirement of the oscillator/mux path, not a tuning
//!   knob; returning early produces audible artifacts on the analogue
//!   outputs.
//!
//! Failure policy matches the glitch-avoidance goal: a failed prepare or
//! enable stops the walk and reports the offending clock, leaving earlier
//! clocks untouched — no automatic rollback that might tear down a path
//! already feeding a live signal.

use embassy_time::{Duration, Timer};
use heapless::Vec;
use platform::{ClockId, ClockTree};

use crate::config::{ClockConfig, MAX_GROUP_CLOCKS};
use crate::rates::MasterClockRate;

/// Mandatory settle time between enabling the master gate and clocking or
/// powering any consumer.
pub const MCLK_SETTLE_DELAY: Duration = Duration::from_millis(20);

/// Errors from clock lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockError<E> {
    /// The requested master rate is outside the two-oscillator set.
    UnsupportedMasterRate {
        /// Rejected frequency in Hz.
        hz: u32,
    },
    /// The mux refused to switch to the selected oscillator.
    Mux {
        /// The mux clock.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
    /// A prepare request was refused.
    Prepare {
        /// The clock that failed to prepare.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
    /// An enable request was refused.
    Enable {
        /// The clock that failed to enable.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
    /// Enable was requested on a clock that is not prepared — a
    /// coordinator-ordering violation surfaced instead of forwarded to
    /// hardware.
    NotPrepared {
        /// The unprepared clock.
        clock: ClockId,
    },
    /// A rate request on a bit/frame clock was refused.
    RateSet {
        /// The clock the rate was requested on.
        clock: ClockId,
        /// Underlying clock-tree error.
        source: E,
    },
}

impl<E> core::fmt::Display for ClockError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedMasterRate { hz } => {
                write!(f, "unsupported master clock rate: {hz} Hz")
            }
            Self::Mux { clock, .. } => write!(f, "mux select failed on clock {}", clock.raw()),
            Self::Prepare { clock, .. } => write!(f, "prepare failed on clock {}", clock.raw()),
            Self::Enable { clock, .. } => write!(f, "enable failed on clock {}", clock.raw()),
            Self::NotPrepared { clock } => {
                write!(f, "enable ordering violation on clock {}", clock.raw())
            }
            Self::RateSet { clock, .. } => {
                write!(f, "rate request refused on clock {}", clock.raw())
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for ClockError<E> {}

// ── Master clock ─────────────────────────────────────────────────────────────

/// The master-clock path: two oscillators, a mux, and a gate.
#[derive(Debug)]
pub struct MasterClock {
    mclk_22m: ClockId,
    mclk_24m: ClockId,
    mux: ClockId,
    gate: ClockId,
    enabled: bool,
}

impl MasterClock {
    /// Build from the resolved clock handles.
    #[must_use]
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            mclk_22m: config.mclk_22m,
            mclk_24m: config.mclk_24m,
            mux: config.mclk_mux,
            gate: config.mclk_gate,
            enabled: false,
        }
    }

    /// Whether the gate is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Select the oscillator for `target_hz`, open the gate, and block for
    /// the settle delay.
    ///
    /// Only returns once consumers may safely be clocked. Re-selecting
    /// while already enabled re-muxes without toggling the gate; the
    /// settle delay applies either way.
    pub async fn enable<T: ClockTree>(
        &mut self,
        tree: &mut T,
        target_hz: u32,
    ) -> Result<(), ClockError<T::Error>> {
        let oscillator = match MasterClockRate::from_hz(target_hz) {
            Some(MasterClockRate::Rate22M5792) => self.mclk_22m,
            Some(MasterClockRate::Rate24M576) => self.mclk_24m,
            None => return Err(ClockError::UnsupportedMasterRate { hz: target_hz }),
        };

        tree.set_parent(self.mux, oscillator)
            .await
            .map_err(|source| ClockError::Mux {
                clock: self.mux,
                source,
            })?;

        if !self.enabled {
            tree.prepare(self.gate)
                .await
                .map_err(|source| ClockError::Prepare {
                    clock: self.gate,
                    source,
                })?;
            tree.enable(self.gate)
                .await
                .map_err(|source| ClockError::Enable {
                    clock: self.gate,
                    source,
                })?;
            self.enabled = true;
        }

        // Hard requirement: the mux/oscillator path must settle before any
        // consumer is clocked or powered.
        Timer::after(MCLK_SETTLE_DELAY).await;
        Ok(())
    }

    /// Close the gate. Idempotent; never fails.
    pub async fn disable<T: ClockTree>(&mut self, tree: &mut T) {
        if self.enabled {
            tree.disable(self.gate).await;
            tree.unprepare(self.gate).await;
            self.enabled = false;
        }
    }
}

// ── Bit/frame clock groups ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct ClockMember {
    id: ClockId,
    prepared: bool,
    enabled: bool,
}

impl ClockMember {
    fn new(id: ClockId) -> Self {
        Self {
            id,
            prepared: false,
            enabled: false,
        }
    }
}

/// The bit/frame clock groups feeding the host interface and the codecs.
///
/// Group shape is configuration data: the frame group may be empty on
/// boards whose consumers track the host frame clock directly.
#[derive(Debug)]
pub struct I2sClocks {
    bit_clocks: Vec<ClockMember, MAX_GROUP_CLOCKS>,
    frame_clocks: Vec<ClockMember, MAX_GROUP_CLOCKS>,
}

impl I2sClocks {
    /// Build from the resolved clock handles.
    #[must_use]
    pub fn new(config: &ClockConfig) -> Self {
        let mut bit_clocks = Vec::new();
        let mut frame_clocks = Vec::new();
        for &id in &config.bit_clocks {
            let _ = bit_clocks.push(ClockMember::new(id));
        }
        for &id in &config.frame_clocks {
            let _ = frame_clocks.push(ClockMember::new(id));
        }
        Self {
            bit_clocks,
            frame_clocks,
        }
    }

    fn members(&self) -> impl Iterator<Item = &ClockMember> {
        self.bit_clocks.iter().chain(self.frame_clocks.iter())
    }

    fn members_mut(&mut self) -> impl Iterator<Item = &mut ClockMember> {
        self.bit_clocks.iter_mut().chain(self.frame_clocks.iter_mut())
    }

    /// The leaf clock handles, bit clocks first.
    pub fn leaves(&self) -> impl Iterator<Item = ClockId> + '_ {
        self.members().map(|m| m.id)
    }

    /// Apply the negotiated rates to every leaf.
    pub async fn set_rates<T: ClockTree>(
        &mut self,
        tree: &mut T,
        bclk_hz: u32,
        lrclk_hz: u32,
    ) -> Result<(), ClockError<T::Error>> {
        for member in &self.bit_clocks {
            tree.set_rate(member.id, bclk_hz)
                .await
                .map_err(|source| ClockError::RateSet {
                    clock: member.id,
                    source,
                })?;
        }
        for member in &self.frame_clocks {
            tree.set_rate(member.id, lrclk_hz)
                .await
                .map_err(|source| ClockError::RateSet {
                    clock: member.id,
                    source,
                })?;
        }
        Ok(())
    }

    /// Prepare every clock not already prepared, bit clocks first.
    ///
    /// Stops at the first refusal, reporting the clock; already-prepared
    /// clocks stay prepared (the caller decides whether to unwind).
    pub async fn prepare_all<T: ClockTree>(
        &mut self,
        tree: &mut T,
    ) -> Result<(), ClockError<T::Error>> {
        for member in self.members_mut() {
            if member.prepared {
                continue;
            }
            tree.prepare(member.id)
                .await
                .map_err(|source| ClockError::Prepare {
                    clock: member.id,
                    source,
                })?;
            member.prepared = true;
        }
        Ok(())
    }

    /// Enable every prepared-but-not-enabled clock, bit clocks first.
    ///
    /// An unprepared clock is an ordering violation and is reported
    /// without touching hardware.
    pub async fn enable_all<T: ClockTree>(
        &mut self,
        tree: &mut T,
    ) -> Result<(), ClockError<T::Error>> {
        for member in self.members_mut() {
            if member.enabled {
                continue;
            }
            if !member.prepared {
                return Err(ClockError::NotPrepared { clock: member.id });
            }
            tree.enable(member.id)
                .await
                .map_err(|source| ClockError::Enable {
                    clock: member.id,
                    source,
                })?;
            member.enabled = true;
        }
        Ok(())
    }

    /// Disable every enabled clock. Idempotent; never fails.
    pub async fn disable_all<T: ClockTree>(&mut self, tree: &mut T) {
        for member in self.members_mut() {
            if member.enabled {
                tree.disable(member.id).await;
                member.enabled = false;
            }
        }
    }

    /// Unprepare every prepared clock, disabling first where a caller
    /// skipped [`disable_all`]. Idempotent; never fails.
    ///
    /// [`disable_all`]: I2sClocks::disable_all
    pub async fn unprepare_all<T: ClockTree>(&mut self, tree: &mut T) {
        for member in self.members_mut() {
            if member.enabled {
                tree.disable(member.id).await;
                member.enabled = false;
            }
            if member.prepared {
                tree.unprepare(member.id).await;
                member.prepared = false;
            }
        }
    }

    /// Whether every clock in both groups is idle (unprepared, disabled).
    #[must_use]
    pub fn all_idle(&self) -> bool {
        self.members().all(|m| !m.prepared && !m.enabled)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
