//! WM8741 register sequencer.
//!
//! The control port is write-only, so the driver mirrors the register file
//! in a software cache seeded from the reset defaults; every read is served
//! from the cache and every successful write passes through it. A failed
//! transport write leaves the cache untouched — on the dual-mono board this
//! is what makes a half-applied shared control *observable* instead of
//! silently papered over (see [`crate::pair`]).
//!
//! Ordering rules enforced here:
//! - attenuation halves are written LSB first, MSB (with latch bit) second;
//! - format and system-clock configuration are plain register writes — the
//!   caller must sequence them while the chip is powered down;
//! - `power_down` clears the system-clock association so a stale MCLK can
//!   never leak into the next session.

use platform::dai::{ClockRole, DaiFormat};
use platform::{BitWidth, RegisterBus, VolumeSteps};

use crate::registers::{
    FORMAT_FMT_MASK, FORMAT_INV_MASK, FORMAT_IWL_MASK, FORMAT_PWDN, IWL_16BIT, IWL_24BIT,
    IWL_32BIT, MODE1_OSR_MASK, MODE1_OSR_SHIFT, MODE2_DIFF_MASK, MODE2_DIFF_SHIFT, REG_DEFAULTS,
    REG_FORMAT_CONTROL, REG_MODE_CONTROL_1, REG_MODE_CONTROL_2, REG_RESET, REG_VOLUME_CONTROL,
    VOLUME_SOFT_MUTE,
};
use crate::controls::EnumControl;
use crate::volume::Channel;

/// Number of cacheable registers (the write-only chip's full register file
/// minus the volatile reset register).
const NUM_CACHED: usize = REG_DEFAULTS.len();

// ── Errors ───────────────────────────────────────────────────────────────────

/// Errors returned by codec operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A transport write to `reg` was refused; the batch it belonged to was
    /// aborted at this register.
    Write {
        /// Register address of the failed write.
        reg: u8,
        /// Underlying transport error.
        source: E,
    },
    /// The requested system clock is not one the chip can run from.
    UnsupportedSysclk {
        /// Rejected frequency in Hz.
        hz: u32,
    },
    /// The sample rate is outside the constraint list of the active sysclk.
    RateNotAllowed {
        /// Requested sample rate in Hz.
        rate_hz: u32,
        /// Currently configured system clock in Hz.
        sysclk_hz: u32,
    },
    /// No system clock has been supplied for this session.
    NoSysclk,
    /// The chip can only be interface clock slave.
    MasterModeUnsupported,
    /// The item index is outside the enumerated control's range.
    InvalidItem {
        /// Rejected item index.
        item: u16,
    },
    /// The register is not part of the cacheable register file.
    UncachedRegister {
        /// Offending register address.
        reg: u8,
    },
}

impl<E> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Write { reg, .. } => write!(f, "write to register {reg:#04x} failed"),
            Self::UnsupportedSysclk { hz } => write!(f, "unsupported system clock {hz} Hz"),
            Self::RateNotAllowed { rate_hz, sysclk_hz } => {
                write!(f, "sample rate {rate_hz} Hz not allowed with MCLK {sysclk_hz} Hz")
            }
            Self::NoSysclk => write!(f, "no system clock configured"),
            Self::MasterModeUnsupported => write!(f, "codec supports clock-slave mode only"),
            Self::InvalidItem { item } => write!(f, "enumerated item {item} out of range"),
            Self::UncachedRegister { reg } => {
                write!(f, "register {reg:#04x} is not readable (uncached)")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}

// ── Configuration values ─────────────────────────────────────────────────────

/// Differential output mode, fixed per codec instance at attach.
///
/// On the dual-mono board each chip runs in a mono mode, combining both
/// internal DACs into a single higher-resolution differential output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DifferentialMode {
    /// Independent stereo outputs.
    Stereo,
    /// Stereo with swapped output assignment.
    StereoReversed,
    /// Mono, sourced from the left interface channel.
    MonoLeft,
    /// Mono, sourced from the right interface channel.
    MonoRight,
}

impl DifferentialMode {
    fn code(self) -> u16 {
        match self {
            Self::Stereo => 0,
            Self::StereoReversed => 1,
            Self::MonoLeft => 2,
            Self::MonoRight => 3,
        }
    }
}

/// Oversampling rate selection for the digital filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OversamplingRate {
    /// Low-rate setting (sample rates up to 48 kHz).
    Low,
    /// Mid-rate setting (88.2/96 kHz).
    Medium,
    /// High-rate setting (176.4/192 kHz).
    High,
}

impl OversamplingRate {
    fn code(self) -> u16 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }
}

/// One entry of an ordered register batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterWrite {
    /// Register address.
    pub reg: u8,
    /// Value to write.
    pub value: u16,
}

// ── Sysclk constraints ───────────────────────────────────────────────────────

const RATES_11M2896: &[u32] = &[44_100, 88_200];
const RATES_12M2880: &[u32] = &[32_000, 48_000, 96_000];
const RATES_16M3840: &[u32] = &[32_000];
const RATES_16M9344: &[u32] = &[44_100, 88_200];
const RATES_18M4320: &[u32] = &[48_000, 96_000];
const RATES_22M5792: &[u32] = &[44_100, 88_200, 176_400];
const RATES_24M5760: &[u32] = &[32_000, 48_000, 96_000, 192_000];
const RATES_36M8640: &[u32] = &[48_000, 96_000, 192_000];

/// The sample rates the chip supports for a given system clock.
///
/// Returns `None` for frequencies the chip cannot run from.
#[must_use]
pub fn sysclk_rates(hz: u32) -> Option<&'static [u32]> {
    match hz {
        11_289_600 => Some(RATES_11M2896),
        12_288_000 => Some(RATES_12M2880),
        16_384_000 => Some(RATES_16M3840),
        16_934_400 => Some(RATES_16M9344),
        18_432_000 => Some(RATES_18M4320),
        22_579_200 | 33_868_800 => Some(RATES_22M5792),
        24_576_000 => Some(RATES_24M5760),
        36_864_000 => Some(RATES_36M8640),
        _ => None,
    }
}

// ── Driver ───────────────────────────────────────────────────────────────────

/// One WM8741 codec instance.
///
/// Owns its control-port transport and the software register cache.
pub struct Wm8741<B> {
    bus: B,
    cache: [u16; NUM_CACHED],
    sysclk_hz: Option<u32>,
    diff_mode: DifferentialMode,
}

fn cache_index(reg: u8) -> Option<usize> {
    REG_DEFAULTS.iter().position(|&(r, _)| r == reg)
}

fn cache_defaults() -> [u16; NUM_CACHED] {
    let mut cache = [0u16; NUM_CACHED];
    let mut i = 0;
    while i < NUM_CACHED {
        cache[i] = REG_DEFAULTS[i].1;
        i += 1;
    }
    cache
}

impl<B: RegisterBus> Wm8741<B> {
    /// Attach a codec instance: reset the chip, then apply the fixed
    /// attach-time configuration (differential mode, attenuation latch
    /// bits).
    ///
    /// The differential mode is fixed for the lifetime of the instance.
    pub async fn attach(bus: B, diff_mode: DifferentialMode) -> Result<Self, Error<B::Error>> {
        let mut codec = Self {
            bus,
            cache: cache_defaults(),
            sysclk_hz: None,
            diff_mode,
        };
        codec.reset().await?;
        codec.configure().await?;
        Ok(codec)
    }

    /// Software-reset the chip and restore the cache to the reset defaults.
    pub async fn reset(&mut self) -> Result<(), Error<B::Error>> {
        self.bus
            .write_register(REG_RESET, 0)
            .await
            .map_err(|source| Error::Write {
                reg: REG_RESET,
                source,
            })?;
        self.cache = cache_defaults();
        Ok(())
    }

    /// Attach-time register configuration: differential mode and the four
    /// attenuation latch bits.
    async fn configure(&mut self) -> Result<(), Error<B::Error>> {
        self.update_bits(
            REG_MODE_CONTROL_2,
            MODE2_DIFF_MASK,
            self.diff_mode.code() << MODE2_DIFF_SHIFT,
        )
        .await?;

        for channel in [Channel::Left, Channel::Right] {
            let ctl = channel.attenuation();
            self.update_bits(ctl.lsb_reg, crate::registers::ATT_UPDATE, crate::registers::ATT_UPDATE)
                .await?;
            self.update_bits(ctl.msb_reg(), crate::registers::ATT_UPDATE, crate::registers::ATT_UPDATE)
                .await?;
        }
        Ok(())
    }

    /// The differential mode this instance was attached with.
    #[must_use]
    pub fn diff_mode(&self) -> DifferentialMode {
        self.diff_mode
    }

    /// The attenuation channels this instance exposes to the control
    /// surface, per its differential mode.
    #[must_use]
    pub fn volume_channels(&self) -> &'static [Channel] {
        match self.diff_mode {
            DifferentialMode::Stereo | DifferentialMode::StereoReversed => {
                &[Channel::Left, Channel::Right]
            }
            DifferentialMode::MonoLeft => &[Channel::Left],
            DifferentialMode::MonoRight => &[Channel::Right],
        }
    }

    /// Borrow the transport (test observation).
    #[must_use]
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Mutably borrow the transport.
    ///
    /// For diagnostics and test fault injection only — writes issued
    /// directly on the transport bypass the register cache.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Read a register from the cache.
    pub fn read(&self, reg: u8) -> Result<u16, Error<B::Error>> {
        cache_index(reg)
            .map(|i| self.cache[i])
            .ok_or(Error::UncachedRegister { reg })
    }

    /// Write a register through to the chip and, on success, the cache.
    pub async fn write(&mut self, reg: u8, value: u16) -> Result<(), Error<B::Error>> {
        self.bus
            .write_register(reg, value)
            .await
            .map_err(|source| Error::Write { reg, source })?;
        if let Some(i) = cache_index(reg) {
            self.cache[i] = value;
        }
        Ok(())
    }

    /// Read-modify-write a register field; skips the transport when the
    /// value is unchanged. Returns whether a write was issued.
    pub async fn update_bits(
        &mut self,
        reg: u8,
        mask: u16,
        value: u16,
    ) -> Result<bool, Error<B::Error>> {
        let old = self.read(reg)?;
        let new = (old & !mask) | (value & mask);
        if new == old {
            return Ok(false);
        }
        self.write(reg, new).await?;
        Ok(true)
    }

    /// Apply an ordered register batch, aborting at the first refused
    /// write. Registers already written stay written; the error names the
    /// register the batch stopped at.
    pub async fn apply_startup_registers(
        &mut self,
        batch: &[RegisterWrite],
    ) -> Result<(), Error<B::Error>> {
        for entry in batch {
            self.write(entry.reg, entry.value).await?;
        }
        Ok(())
    }

    /// Supply (or clear, with `None`) the system clock feeding the chip.
    ///
    /// The frequency must be one of the chip's supported MCLK rates; the
    /// matching sample-rate constraint list becomes active. Must be called
    /// while the chip is powered down.
    pub fn set_sysclk(&mut self, hz: Option<u32>) -> Result<(), Error<B::Error>> {
        if let Some(hz) = hz {
            if sysclk_rates(hz).is_none() {
                return Err(Error::UnsupportedSysclk { hz });
            }
        }
        self.sysclk_hz = hz;
        Ok(())
    }

    /// The currently configured system clock, if any.
    #[must_use]
    pub fn sysclk(&self) -> Option<u32> {
        self.sysclk_hz
    }

    /// The sample rates allowed under the active system clock.
    #[must_use]
    pub fn supported_rates(&self) -> Option<&'static [u32]> {
        self.sysclk_hz.and_then(sysclk_rates)
    }

    /// Program the interface format (frame shape, clock inversion).
    ///
    /// The chip is always interface clock slave; any other role is
    /// rejected without touching hardware. Must be called while powered
    /// down.
    pub async fn set_format(&mut self, fmt: DaiFormat) -> Result<(), Error<B::Error>> {
        if fmt.role != ClockRole::Slave {
            return Err(Error::MasterModeUnsupported);
        }
        let value = fmt_code(fmt);
        self.update_bits(REG_FORMAT_CONTROL, FORMAT_FMT_MASK | FORMAT_INV_MASK, value)
            .await?;
        Ok(())
    }

    /// Program the input word length for a negotiated stream.
    ///
    /// Fails if no system clock is configured or the rate is outside the
    /// active constraint list — the set of reachable sample rates depends
    /// on the MCLK actually feeding the chip.
    pub async fn configure_rate(
        &mut self,
        rate_hz: u32,
        width: BitWidth,
    ) -> Result<(), Error<B::Error>> {
        let sysclk_hz = self.sysclk_hz.ok_or(Error::NoSysclk)?;
        let allowed = sysclk_rates(sysclk_hz).ok_or(Error::UnsupportedSysclk { hz: sysclk_hz })?;
        if !allowed.contains(&rate_hz) {
            return Err(Error::RateNotAllowed { rate_hz, sysclk_hz });
        }

        let iwl = match width {
            BitWidth::W16 => IWL_16BIT,
            BitWidth::W24 => IWL_24BIT,
            BitWidth::W32 => IWL_32BIT,
        };
        self.update_bits(REG_FORMAT_CONTROL, FORMAT_IWL_MASK, iwl).await?;
        Ok(())
    }

    /// Leave power-down: the analogue outputs come alive.
    ///
    /// Callers must only do this once the interface clocks are running and
    /// stable — powering up against a dead or settling clock is audible.
    pub async fn power_up(&mut self) -> Result<(), Error<B::Error>> {
        self.update_bits(REG_FORMAT_CONTROL, FORMAT_PWDN, 0).await?;
        Ok(())
    }

    /// Enter power-down and drop the system-clock association, so the next
    /// session must negotiate a fresh one.
    pub async fn power_down(&mut self) -> Result<(), Error<B::Error>> {
        self.update_bits(REG_FORMAT_CONTROL, FORMAT_PWDN, FORMAT_PWDN)
            .await?;
        self.sysclk_hz = None;
        Ok(())
    }

    /// Whether the chip is currently in power-down.
    #[must_use]
    pub fn is_powered_down(&self) -> bool {
        self.read(REG_FORMAT_CONTROL)
            .map(|v| v & FORMAT_PWDN != 0)
            .unwrap_or(false)
    }

    /// Set one channel's attenuation.
    ///
    /// Writes the LSB half first and the MSB half (carrying the latch bit)
    /// second; the chip commits both halves atomically on the MSB write.
    /// Reordering these writes latches a stale LSB value.
    pub async fn set_volume(
        &mut self,
        channel: Channel,
        volume: VolumeSteps,
    ) -> Result<(), Error<B::Error>> {
        let ctl = channel.attenuation();
        let (lsb, msb) = ctl.encode(volume);
        self.write(ctl.lsb_reg, lsb).await?;
        self.write(ctl.msb_reg(), msb).await?;
        Ok(())
    }

    /// Read back one channel's attenuation from the cache.
    pub fn volume(&self, channel: Channel) -> Result<VolumeSteps, Error<B::Error>> {
        let ctl = channel.attenuation();
        let lsb = self.read(ctl.lsb_reg)?;
        let msb = self.read(ctl.msb_reg())?;
        Ok(ctl.decode(lsb, msb))
    }

    /// Engage or release the soft (ramped) mute.
    pub async fn set_soft_mute(&mut self, mute: bool) -> Result<(), Error<B::Error>> {
        let value = if mute { VOLUME_SOFT_MUTE } else { 0 };
        self.update_bits(REG_VOLUME_CONTROL, VOLUME_SOFT_MUTE, value)
            .await?;
        Ok(())
    }

    /// Select the digital filter oversampling rate.
    pub async fn set_oversampling(
        &mut self,
        osr: OversamplingRate,
    ) -> Result<(), Error<B::Error>> {
        self.update_bits(
            REG_MODE_CONTROL_1,
            MODE1_OSR_MASK << MODE1_OSR_SHIFT,
            osr.code() << MODE1_OSR_SHIFT,
        )
        .await?;
        Ok(())
    }

    /// Read an enumerated control's current item index.
    pub fn read_enum(&self, ctl: &EnumControl) -> Result<u16, Error<B::Error>> {
        Ok(ctl.extract(self.read(ctl.reg)?))
    }

    /// Write an enumerated control, rejecting out-of-range items before
    /// touching hardware.
    pub async fn write_enum(
        &mut self,
        ctl: &EnumControl,
        item: u16,
    ) -> Result<(), Error<B::Error>> {
        if !ctl.is_valid_item(item) {
            return Err(Error::InvalidItem { item });
        }
        self.update_bits(ctl.reg, ctl.mask << ctl.shift, item << ctl.shift)
            .await?;
        Ok(())
    }
}

fn fmt_code(fmt: DaiFormat) -> u16 {
    use platform::dai::{ClockInversion, FrameFormat};

    let frame = match fmt.frame {
        FrameFormat::I2s => crate::registers::FMT_I2S,
        FrameFormat::LeftJustified => crate::registers::FMT_LEFT_JUSTIFIED,
        FrameFormat::RightJustified => crate::registers::FMT_RIGHT_JUSTIFIED,
    };
    let inversion = match fmt.inversion {
        ClockInversion::None => crate::registers::INV_NB_NF,
        ClockInversion::BitClock => crate::registers::INV_IB_NF,
        ClockInversion::FrameSync => crate::registers::INV_NB_IF,
        ClockInversion::Both => crate::registers::INV_IB_IF,
    };
    frame | inversion
}

// ─── Tests ───────────────────────────────────────────────────────────────────
