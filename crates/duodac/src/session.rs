//! Playback session orchestration.
//!
//! [`Card`] owns the clock tree handle, the codec set, and every
//! per-clock lifecycle flag for one board instance, and drives the three
//! host-framework callbacks: `startup`, `hw_params`, `shutdown`. The host
//! framework serializes these per device, and `&mut self` makes a
//! concurrent negotiation/teardown unrepresentable — no further locking
//! is needed.
//!
//! `hw_params` ordering (shutdown is the exact mirror):
//!
//! 1. negotiate rates/format — pure, no hardware touched on rejection;
//! 2. configure codec sysclk, interface format, word length (and
//!    oversampling when enabled) — codecs still in power-down;
//! 3. resolve the PLL topology (first negotiation only);
//! 4. select and gate the master clock, blocking the mandatory settle;
//! 5. program bit/frame clock rates, then prepare and enable them —
//!    the codecs' clocks exist and are stable before they start moving;
//! 6. power the codecs up, last.
//!
//! A failure at any stage aborts the remaining steps, surfaces the stage
//! in the error, and leaves no codec powered up (a power-up failure
//! best-effort powers the set back down). Nothing is retried: retrying
//! mid-sequence risks audible artifacts, fast visible failure does not.

use platform::{ClockTree, RegisterBus, VolumeSteps};
use wm8741::controls;
use wm8741::{
    AntiClippingMode, Channel, CodecId, DitherMode, FilterResponse, SetError, Wm8741Set,
};

use crate::clocks::{ClockError, I2sClocks, MasterClock};
use crate::config::CardConfig;
use crate::rates::{negotiate, FormatError};
use crate::topology::{resolve_pll_targets, TopologyError};

/// Lifecycle state of the playback path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No stream; clocks idle, codecs powered down.
    Closed,
    /// Parameters accepted and codecs configured, clocks not yet running.
    ParamsNegotiated,
    /// Clocks running, codecs powered.
    Streaming,
}

/// Errors surfaced by the session controller, tagged by failing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardError<CE, BE> {
    /// Rate/format negotiation rejected the request (stage 1).
    Format(FormatError),
    /// Codec-side configuration or power sequencing failed (stages 2, 6).
    Codec(SetError<BE>),
    /// PLL topology resolution failed (stage 3).
    Topology(TopologyError<CE>),
    /// Clock lifecycle sequencing failed (stages 4, 5).
    Clock(ClockError<CE>),
    /// The addressed codec instance does not exist in this set.
    NoSuchCodec {
        /// The instance that was addressed.
        codec: CodecId,
    },
    /// A shared control register holds an item outside its enumeration —
    /// points at a corrupted register file.
    InvalidControlItem {
        /// The out-of-range item index.
        item: u16,
    },
}

impl<CE, BE> core::fmt::Display for CardError<CE, BE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Format(err) => write!(f, "format negotiation: {err}"),
            Self::Codec(err) => write!(f, "codec sequencing: {err}"),
            Self::Topology(err) => write!(f, "clock topology: {err}"),
            Self::Clock(err) => write!(f, "clock lifecycle: {err}"),
            Self::NoSuchCodec { codec } => write!(f, "no codec instance {codec:?}"),
            Self::InvalidControlItem { item } => {
                write!(f, "control holds out-of-range item {item}")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<CE: core::fmt::Debug, BE: core::fmt::Debug> std::error::Error for CardError<CE, BE> {}

impl<CE, BE> From<FormatError> for CardError<CE, BE> {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

impl<CE, BE> From<SetError<BE>> for CardError<CE, BE> {
    fn from(err: SetError<BE>) -> Self {
        Self::Codec(err)
    }
}

impl<CE, BE> From<TopologyError<CE>> for CardError<CE, BE> {
    fn from(err: TopologyError<CE>) -> Self {
        Self::Topology(err)
    }
}

impl<CE, BE> From<ClockError<CE>> for CardError<CE, BE> {
    fn from(err: ClockError<CE>) -> Self {
        Self::Clock(err)
    }
}

/// Convenience alias binding the error to the trait implementations.
pub type Error<T, B> =
    CardError<<T as ClockTree>::Error, <B as RegisterBus>::Error>;

/// One board instance: clock tree, codec set, and session state.
pub struct Card<T: ClockTree, B: RegisterBus> {
    tree: T,
    codecs: Wm8741Set<B>,
    master: MasterClock,
    i2s: I2sClocks,
    select_oversampling: bool,
    topology_resolved: bool,
    state: SessionState,
}

impl<T: ClockTree, B: RegisterBus> Card<T, B> {
    /// Attach the board: take ownership of the clock tree and the
    /// (already attached) codec set, and apply the configured startup
    /// batch to every codec. The codecs come out configured and held in
    /// power-down.
    pub async fn attach(
        tree: T,
        mut codecs: Wm8741Set<B>,
        config: &CardConfig,
    ) -> Result<Self, Error<T, B>> {
        codecs.apply_startup_registers(config.startup_registers).await?;
        Ok(Self {
            tree,
            codecs,
            master: MasterClock::new(&config.clocks),
            i2s: I2sClocks::new(&config.clocks),
            select_oversampling: config.select_oversampling,
            topology_resolved: false,
            state: SessionState::Closed,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Stream-open callback. No hardware action; reserved for rate
    /// constraint registration.
    pub fn startup(&mut self) -> Result<(), Error<T, B>> {
        Ok(())
    }

    /// Negotiate and bring up the full playback path for
    /// `(sample_rate_hz, bit_width)`.
    pub async fn hw_params(
        &mut self,
        sample_rate_hz: u32,
        bit_width: u8,
    ) -> Result<(), Error<T, B>> {
        let mut plan = negotiate(sample_rate_hz, bit_width)?;
        if self.select_oversampling {
            plan = plan.with_oversampling();
        }

        // Codec-side configuration, still in power-down: the chips must
        // know their clock source and format before the clocks move.
        self.codecs.set_sysclk(Some(plan.mclk.hz()))?;
        self.codecs.set_format(plan.codec_format).await?;
        self.codecs.configure_rate(plan.lrclk_hz, plan.width).await?;
        if let Some(osr) = plan.oversampling {
            self.codecs.set_oversampling(osr).await?;
        }
        self.state = SessionState::ParamsNegotiated;

        // PLL topology is a property of the generator, not of the stream;
        // resolve it once.
        if !self.topology_resolved {
            for leaf in self.i2s.leaves() {
                resolve_pll_targets(&mut self.tree, leaf).await?;
            }
            self.topology_resolved = true;
        }

        // Master clock first (with its settle delay), then the leaf rates,
        // then prepare/enable — bit clocks ahead of frame clocks.
        self.master.enable(&mut self.tree, plan.mclk.hz()).await?;
        self.i2s
            .set_rates(&mut self.tree, plan.bclk_hz, plan.lrclk_hz)
            .await?;
        self.i2s.prepare_all(&mut self.tree).await?;
        self.i2s.enable_all(&mut self.tree).await?;

        // Codecs power up last, against live, settled clocks. If any
        // instance refuses, no codec may stay powered.
        if let Err(err) = self.codecs.power_up().await {
            let _ = self.codecs.power_down().await;
            return Err(err.into());
        }

        self.state = SessionState::Streaming;
        Ok(())
    }

    /// Tear the playback path down, mirroring `hw_params` exactly:
    /// codecs into power-down (clearing their sysclk), clocks disabled
    /// then unprepared, master gate released.
    ///
    /// Best-effort by design — a refused step is logged and the teardown
    /// continues, so a transport hiccup cannot leak running clocks or
    /// powered codecs. Idempotent.
    pub async fn shutdown(&mut self) {
        if let Err(_err) = self.codecs.power_down().await {
            #[cfg(feature = "defmt")]
            defmt::warn!("codec power-down failed during shutdown");
        }
        self.i2s.disable_all(&mut self.tree).await;
        self.i2s.unprepare_all(&mut self.tree).await;
        self.master.disable(&mut self.tree).await;
        self.state = SessionState::Closed;
    }

    // ── Control surface ─────────────────────────────────────────────────────

    /// Set the anti-clipping mode on every codec instance.
    pub async fn set_anti_clipping(&mut self, mode: AntiClippingMode) -> Result<(), Error<T, B>> {
        Ok(self
            .codecs
            .write_synced(&controls::ANTI_CLIPPING, mode.item())
            .await?)
    }

    /// Read the anti-clipping mode, verifying both instances agree.
    pub fn anti_clipping(&self) -> Result<AntiClippingMode, Error<T, B>> {
        let item = self.codecs.read_synced(&controls::ANTI_CLIPPING)?;
        AntiClippingMode::from_item(item).ok_or(CardError::InvalidControlItem { item })
    }

    /// Set the dither mode on every codec instance.
    pub async fn set_dither(&mut self, mode: DitherMode) -> Result<(), Error<T, B>> {
        Ok(self
            .codecs
            .write_synced(&controls::DITHER, mode.item())
            .await?)
    }

    /// Read the dither mode, verifying both instances agree.
    pub fn dither(&self) -> Result<DitherMode, Error<T, B>> {
        let item = self.codecs.read_synced(&controls::DITHER)?;
        DitherMode::from_item(item).ok_or(CardError::InvalidControlItem { item })
    }

    /// Set the digital filter response on every codec instance.
    pub async fn set_filter(&mut self, response: FilterResponse) -> Result<(), Error<T, B>> {
        Ok(self
            .codecs
            .write_synced(&controls::FILTER, response.item())
            .await?)
    }

    /// Read the digital filter response, verifying both instances agree.
    pub fn filter(&self) -> Result<FilterResponse, Error<T, B>> {
        let item = self.codecs.read_synced(&controls::FILTER)?;
        FilterResponse::from_item(item).ok_or(CardError::InvalidControlItem { item })
    }

    /// Engage or release the ramped soft mute on every codec instance.
    ///
    /// The host framework drives this around stream start/stop so gain
    /// changes never hit the outputs as a step.
    pub async fn set_soft_mute(&mut self, mute: bool) -> Result<(), Error<T, B>> {
        Ok(self.codecs.set_soft_mute(mute).await?)
    }

    /// Set one channel's attenuation on one codec instance.
    pub async fn set_volume(
        &mut self,
        codec: CodecId,
        channel: Channel,
        volume: VolumeSteps,
    ) -> Result<(), Error<T, B>> {
        let instance = self
            .codecs
            .get_mut(codec)
            .ok_or(CardError::NoSuchCodec { codec })?;
        instance
            .set_volume(channel, volume)
            .await
            .map_err(|source| CardError::Codec(SetError::Codec { codec, source }))
    }

    /// Read back one channel's attenuation from one codec instance.
    pub fn volume(&self, codec: CodecId, channel: Channel) -> Result<VolumeSteps, Error<T, B>> {
        let instance = self
            .codecs
            .get(codec)
            .ok_or(CardError::NoSuchCodec { codec })?;
        instance
            .volume(channel)
            .map_err(|source| CardError::Codec(SetError::Codec { codec, source }))
    }

    // ── Observers ───────────────────────────────────────────────────────────

    /// Borrow the codec set.
    #[must_use]
    pub fn codecs(&self) -> &Wm8741Set<B> {
        &self.codecs
    }

    /// Mutably borrow the codec set (diagnostics, tests).
    pub fn codecs_mut(&mut self) -> &mut Wm8741Set<B> {
        &mut self.codecs
    }

    /// Borrow the clock tree handle.
    #[must_use]
    pub fn clock_tree(&self) -> &T {
        &self.tree
    }

    /// Mutably borrow the clock tree handle (diagnostics, tests).
    pub fn clock_tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    /// Whether the master gate is currently enabled.
    #[must_use]
    pub fn master_enabled(&self) -> bool {
        self.master.is_enabled()
    }

    /// Whether every bit/frame clock is idle.
    #[must_use]
    pub fn clocks_idle(&self) -> bool {
        self.i2s.all_idle()
    }
}
