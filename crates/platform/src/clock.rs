//! Hardware clock-tree primitive.
//!
//! Models the standard clock-tree operations the board driver needs:
//! rate get/set, parent lookup and reparenting (mux selection), and the
//! two-phase prepare/enable lifecycle. Getting the lifecycle order wrong
//! is not a recoverable error on real clock generators — enabling an
//! unprepared clock, or unpreparing an enabled one, leaves the generator
//! in an undefined state. The board driver serializes these transitions;
//! this trait only provides the primitives.
//!
//! Individual clocks are addressed by [`ClockId`] handles resolved once at
//! device attach from the platform configuration and never reassigned.

/// Opaque handle to a single node in the hardware clock tree.
///
/// Handles are resolved at attach time by the device-level configuration
/// and stay valid for the lifetime of the device binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockId(u8);

impl ClockId {
    /// Create a handle from the raw index assigned by the clock provider.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Return the raw provider index.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

/// Hardware clock-tree operations.
///
/// One implementation covers the whole tree; individual clocks are
/// addressed by [`ClockId`]. `disable` and `unprepare` are infallible by
/// contract — turning a clock off is always accepted by the hardware, and
/// teardown paths must not have failure branches.
pub trait ClockTree {
    /// Error type
    type Error: core::fmt::Debug;

    /// Return the parent of `clock`, or `None` for a root oscillator.
    fn parent(&self, clock: ClockId) -> Option<ClockId>;

    /// Read the current rate of `clock` in Hz.
    async fn rate(&mut self, clock: ClockId) -> Result<u32, Self::Error>;

    /// Request `clock` to run at `hz`.
    ///
    /// Fails if the rate is outside the generator's valid range.
    async fn set_rate(&mut self, clock: ClockId, hz: u32) -> Result<(), Self::Error>;

    /// Select `parent` as the active input of the mux clock `clock`.
    async fn set_parent(&mut self, clock: ClockId, parent: ClockId) -> Result<(), Self::Error>;

    /// Prepare `clock` for enabling (may sleep on real hardware).
    async fn prepare(&mut self, clock: ClockId) -> Result<(), Self::Error>;

    /// Undo a prepare. Must only be called on a disabled clock.
    async fn unprepare(&mut self, clock: ClockId);

    /// Start `clock`. Must only be called on a prepared clock.
    async fn enable(&mut self, clock: ClockId) -> Result<(), Self::Error>;

    /// Stop `clock`.
    async fn disable(&mut self, clock: ClockId);
}
