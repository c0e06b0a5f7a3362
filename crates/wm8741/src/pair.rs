//! Dual-instance codec set.
//!
//! The dual-mono board carries two WM8741s — one per output channel —
//! that must stay value-synchronized for every stereo-shared control
//! (filter response, dither, anti-clipping, format, power state). A
//! [`Wm8741Set`] applies each operation to every instance in order and
//! reports *which* instance a failure occurred on; it never resolves a
//! disagreement by picking a winner.
//!
//! Divergence detection: a partially applied `write_synced` leaves the
//! failing instance's cache at its old value, so the next `read_synced`
//! surfaces [`SetError::Desync`] instead of a silently wrong answer.

use heapless::Vec;
use platform::dai::DaiFormat;
use platform::{BitWidth, RegisterBus};

use crate::controls::EnumControl;
use crate::driver::{Error, OversamplingRate, RegisterWrite, Wm8741};

/// Identifies one codec instance within a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecId {
    /// First instance (left output on the dual-mono board).
    Left,
    /// Second instance (right output).
    Right,
}

const CODEC_IDS: [CodecId; 2] = [CodecId::Left, CodecId::Right];

/// Errors returned by codec-set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetError<E> {
    /// An operation failed on one specific instance; earlier instances
    /// keep whatever was already applied.
    Codec {
        /// Instance the failure occurred on.
        codec: CodecId,
        /// The instance-level error.
        source: Error<E>,
    },
    /// A shared control reads back different values across the instances —
    /// a hardware or sequencing fault that must surface immediately.
    Desync {
        /// Register holding the diverged control.
        reg: u8,
        /// Value on the first instance.
        left: u16,
        /// Value on the second instance.
        right: u16,
    },
}

impl<E> core::fmt::Display for SetError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Codec { codec, source } => write!(f, "codec {codec:?}: {source}"),
            Self::Desync { reg, left, right } => write!(
                f,
                "register {reg:#04x} diverged across instances ({left:#05x} vs {right:#05x})"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for SetError<E> {}

/// One or two codec instances driven as a unit.
pub struct Wm8741Set<B> {
    codecs: Vec<Wm8741<B>, 2>,
}

impl<B: RegisterBus> Wm8741Set<B> {
    /// A single-codec set.
    #[must_use]
    pub fn single(codec: Wm8741<B>) -> Self {
        let mut codecs = Vec::new();
        let _ = codecs.push(codec);
        Self { codecs }
    }

    /// The dual-mono pair: `left` drives the left output, `right` the
    /// right output.
    #[must_use]
    pub fn dual_mono(left: Wm8741<B>, right: Wm8741<B>) -> Self {
        let mut codecs = Vec::new();
        let _ = codecs.push(left);
        let _ = codecs.push(right);
        Self { codecs }
    }

    /// Number of instances in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Whether the set is empty (never true for a constructed set).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }

    /// Borrow one instance.
    #[must_use]
    pub fn get(&self, codec: CodecId) -> Option<&Wm8741<B>> {
        self.codecs.get(codec as usize)
    }

    /// Mutably borrow one instance (per-instance volume addressing).
    pub fn get_mut(&mut self, codec: CodecId) -> Option<&mut Wm8741<B>> {
        self.codecs.get_mut(codec as usize)
    }

    /// Iterate over the instances with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (CodecId, &Wm8741<B>)> {
        CODEC_IDS.iter().copied().zip(self.codecs.iter())
    }

    fn instances(&mut self) -> impl Iterator<Item = (CodecId, &mut Wm8741<B>)> {
        CODEC_IDS.iter().copied().zip(self.codecs.iter_mut())
    }

    /// Apply the board's ordered startup batch to every instance.
    pub async fn apply_startup_registers(
        &mut self,
        batch: &[RegisterWrite],
    ) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .apply_startup_registers(batch)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Supply (or clear) the system clock on every instance.
    pub fn set_sysclk(&mut self, hz: Option<u32>) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .set_sysclk(hz)
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Program the interface format on every instance. The codecs must
    /// still be powered down.
    pub async fn set_format(&mut self, fmt: DaiFormat) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .set_format(fmt)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Program the negotiated sample rate / word length on every instance.
    pub async fn configure_rate(
        &mut self,
        rate_hz: u32,
        width: BitWidth,
    ) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .configure_rate(rate_hz, width)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Select the oversampling rate on every instance.
    pub async fn set_oversampling(
        &mut self,
        osr: OversamplingRate,
    ) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .set_oversampling(osr)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Power every instance up. On failure the error names the instance;
    /// the caller decides whether to unwind the ones already powered.
    pub async fn power_up(&mut self) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .power_up()
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Power every instance down and clear its sysclk association.
    pub async fn power_down(&mut self) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .power_down()
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Whether every instance is currently powered down.
    #[must_use]
    pub fn all_powered_down(&self) -> bool {
        self.codecs.iter().all(Wm8741::is_powered_down)
    }

    /// Read a shared enumerated control from every instance.
    ///
    /// # Errors
    ///
    /// Returns [`SetError::Desync`] when the instances disagree — the set
    /// is expected to mirror shared controls at all times, so divergence
    /// is reported, never resolved by choosing one side.
    pub fn read_synced(&self, ctl: &EnumControl) -> Result<u16, SetError<B::Error>> {
        let mut agreed: Option<u16> = None;
        for (codec, instance) in self.iter() {
            let item = instance
                .read_enum(ctl)
                .map_err(|source| SetError::Codec { codec, source })?;
            match agreed {
                None => agreed = Some(item),
                Some(first) if first != item => {
                    return Err(SetError::Desync {
                        reg: ctl.reg,
                        left: first,
                        right: item,
                    });
                }
                Some(_) => {}
            }
        }
        // A constructed set always has at least one instance.
        Ok(agreed.unwrap_or(0))
    }

    /// Write a shared enumerated control to every instance.
    ///
    /// On partial failure the error names the failing instance and the set
    /// is left divergent — detectable through [`read_synced`].
    ///
    /// [`read_synced`]: Wm8741Set::read_synced
    pub async fn write_synced(
        &mut self,
        ctl: &EnumControl,
        item: u16,
    ) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .write_enum(ctl, item)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }

    /// Engage or release soft mute on every instance.
    pub async fn set_soft_mute(&mut self, mute: bool) -> Result<(), SetError<B::Error>> {
        for (codec, instance) in self.instances() {
            instance
                .set_soft_mute(mute)
                .await
                .map_err(|source| SetError::Codec { codec, source })?;
        }
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::controls;
    use crate::driver::DifferentialMode;
    use platform::mocks::{MockBusError, MockRegisterBus};

    async fn dual_mono_set() -> Wm8741Set<MockRegisterBus> {
        let left = Wm8741::attach(MockRegisterBus::new(), DifferentialMode::MonoLeft)
            .await
            .unwrap();
        let right = Wm8741::attach(MockRegisterBus::new(), DifferentialMode::MonoRight)
            .await
            .unwrap();
        Wm8741Set::dual_mono(left, right)
    }

    #[tokio::test]
    async fn synced_write_reaches_both_instances() {
        let mut set = dual_mono_set().await;
        set.write_synced(&controls::DITHER, 3).await.unwrap();

        assert_eq!(set.read_synced(&controls::DITHER).unwrap(), 3);
        for (_, codec) in set.iter() {
            assert_eq!(codec.read_enum(&controls::DITHER).unwrap(), 3);
        }
    }

    #[tokio::test]
    async fn partial_synced_write_is_detected_as_desync() {
        let mut set = dual_mono_set().await;
        set.get_mut(CodecId::Right).unwrap().bus_mut().fail_on_register =
            Some(crate::registers::REG_FILTER_CONTROL);

        let err = set.write_synced(&controls::FILTER, 2).await.unwrap_err();
        assert!(matches!(
            err,
            SetError::Codec {
                codec: CodecId::Right,
                source: Error::Write { .. },
            }
        ));

        // The left instance took the write, the right did not: the shared
        // control is now divergent and the read path must say so.
        assert_eq!(
            set.read_synced(&controls::FILTER),
            Err(SetError::Desync {
                reg: crate::registers::REG_FILTER_CONTROL,
                left: 2,
                right: 0,
            })
        );
    }

    #[tokio::test]
    async fn read_synced_returns_the_common_value_when_agreeing() {
        let set = dual_mono_set().await;
        assert_eq!(set.read_synced(&controls::ANTI_CLIPPING).unwrap(), 0);
        // Reset default for dither is TPDF on both chips.
        assert_eq!(set.read_synced(&controls::DITHER).unwrap(), 2);
    }

    #[tokio::test]
    async fn single_instance_set_never_desyncs() {
        let codec = Wm8741::attach(MockRegisterBus::new(), DifferentialMode::Stereo)
            .await
            .unwrap();
        let mut set = Wm8741Set::single(codec);
        set.write_synced(&controls::FILTER, 4).await.unwrap();
        assert_eq!(set.read_synced(&controls::FILTER).unwrap(), 4);
    }

    #[tokio::test]
    async fn power_up_failure_names_the_instance() {
        let mut set = dual_mono_set().await;
        set.power_down().await.unwrap();
        set.get_mut(CodecId::Left).unwrap().bus_mut().fail_on_register =
            Some(crate::registers::REG_FORMAT_CONTROL);

        let err = set.power_up().await.unwrap_err();
        assert!(matches!(
            err,
            SetError::Codec {
                codec: CodecId::Left,
                source: Error::Write {
                    source: MockBusError::WriteRefused { .. },
                    ..
                },
            }
        ));
    }

    #[tokio::test]
    async fn power_state_tracks_across_the_set() {
        let mut set = dual_mono_set().await;
        // Reset default has PWDN clear.
        assert!(!set.all_powered_down());
        set.power_down().await.unwrap();
        assert!(set.all_powered_down());
    }
}
