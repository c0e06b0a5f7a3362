//! Mock implementations for testing
//!
//! This module provides mock implementations of the platform traits for
//! use in unit and integration tests: a [`MockClockTree`] with fault
//! injection and per-clock call accounting, and a [`MockRegisterBus`]
//! that records every write in order.

#![cfg(any(test, feature = "std"))]

use crate::clock::{ClockId, ClockTree};
use crate::regbus::RegisterBus;

// ── Mock clock tree ──────────────────────────────────────────────────────────

/// Error type returned by [`MockClockTree`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockClockError {
    /// The handle does not name a clock in this tree.
    UnknownClock(ClockId),
    /// Fault injection: prepare was refused.
    PrepareRefused(ClockId),
    /// Fault injection: enable was refused.
    EnableRefused(ClockId),
    /// Fault injection: the rate request was refused.
    RateRefused(ClockId),
    /// Fault injection: the mux reparent request was refused.
    ParentRefused(ClockId),
}

/// One simulated clock node.
#[derive(Debug, Default, Clone)]
pub struct MockClock {
    /// Parent handle, `None` for a root oscillator.
    pub parent: Option<ClockId>,
    /// Current simulated rate in Hz.
    pub rate: u32,
    /// Whether the clock is currently prepared.
    pub prepared: bool,
    /// Whether the clock is currently enabled.
    pub enabled: bool,
    /// Number of successful prepare calls.
    pub prepare_count: usize,
    /// Number of successful enable calls.
    pub enable_count: usize,
    /// Every rate successfully applied via `set_rate`, in order.
    pub rate_history: heapless::Vec<u32, 8>,
    /// Refuse the next (and all further) prepare calls.
    pub fail_prepare: bool,
    /// Refuse the next (and all further) enable calls.
    pub fail_enable: bool,
    /// Refuse all rate requests.
    pub fail_set_rate: bool,
    /// Refuse all reparent requests.
    pub fail_set_parent: bool,
}

/// Mock clock tree — clocks are added at test setup and addressed by the
/// returned [`ClockId`] handles, mirroring attach-time handle resolution.
#[derive(Debug, Default)]
pub struct MockClockTree {
    clocks: heapless::Vec<MockClock, 32>,
}

impl MockClockTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clock with the given parent, returning its handle.
    pub fn add_clock(&mut self, parent: Option<ClockId>) -> ClockId {
        self.add_clock_with_rate(parent, 0)
    }

    /// Add a clock with a parent and an initial rate.
    pub fn add_clock_with_rate(&mut self, parent: Option<ClockId>, rate: u32) -> ClockId {
        let id = ClockId::new(self.clocks.len() as u8);
        let _ = self.clocks.push(MockClock {
            parent,
            rate,
            ..MockClock::default()
        });
        id
    }

    /// Inspect a clock node.
    pub fn clock(&self, id: ClockId) -> Option<&MockClock> {
        self.clocks.get(usize::from(id.raw()))
    }

    /// Mutate a clock node (fault injection, rate presets).
    pub fn clock_mut(&mut self, id: ClockId) -> Option<&mut MockClock> {
        self.clocks.get_mut(usize::from(id.raw()))
    }

    fn node(&mut self, id: ClockId) -> Result<&mut MockClock, MockClockError> {
        self.clocks
            .get_mut(usize::from(id.raw()))
            .ok_or(MockClockError::UnknownClock(id))
    }
}

impl ClockTree for MockClockTree {
    type Error = MockClockError;

    fn parent(&self, clock: ClockId) -> Option<ClockId> {
        self.clock(clock).and_then(|c| c.parent)
    }

    async fn rate(&mut self, clock: ClockId) -> Result<u32, Self::Error> {
        Ok(self.node(clock)?.rate)
    }

    async fn set_rate(&mut self, clock: ClockId, hz: u32) -> Result<(), Self::Error> {
        let node = self.node(clock)?;
        if node.fail_set_rate {
            return Err(MockClockError::RateRefused(clock));
        }
        node.rate = hz;
        let _ = node.rate_history.push(hz);
        Ok(())
    }

    async fn set_parent(&mut self, clock: ClockId, parent: ClockId) -> Result<(), Self::Error> {
        let node = self.node(clock)?;
        if node.fail_set_parent {
            return Err(MockClockError::ParentRefused(clock));
        }
        node.parent = Some(parent);
        Ok(())
    }

    async fn prepare(&mut self, clock: ClockId) -> Result<(), Self::Error> {
        let node = self.node(clock)?;
        if node.fail_prepare {
            return Err(MockClockError::PrepareRefused(clock));
        }
        node.prepared = true;
        node.prepare_count += 1;
        Ok(())
    }

    async fn unprepare(&mut self, clock: ClockId) {
        if let Ok(node) = self.node(clock) {
            node.prepared = false;
        }
    }

    async fn enable(&mut self, clock: ClockId) -> Result<(), Self::Error> {
        let node = self.node(clock)?;
        if node.fail_enable {
            return Err(MockClockError::EnableRefused(clock));
        }
        node.enabled = true;
        node.enable_count += 1;
        Ok(())
    }

    async fn disable(&mut self, clock: ClockId) {
        if let Ok(node) = self.node(clock) {
            node.enabled = false;
        }
    }
}

// ── Mock register bus ────────────────────────────────────────────────────────

/// Error type returned by [`MockRegisterBus`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBusError {
    /// Fault injection: the write to this register was refused.
    WriteRefused {
        /// Register address of the refused write.
        reg: u8,
    },
}

/// Mock codec register bus — records every write in order so tests can
/// assert write sequencing (LSB-before-MSB, batch order, abort points).
#[derive(Debug)]
pub struct MockRegisterBus {
    regs: [u16; 64],
    /// Every `(register, value)` write, in call order.
    pub writes: heapless::Vec<(u8, u16), 128>,
    /// Refuse writes to this register address.
    pub fail_on_register: Option<u8>,
}

impl Default for MockRegisterBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRegisterBus {
    /// Create a bus with all registers reading zero.
    pub fn new() -> Self {
        Self {
            regs: [0; 64],
            writes: heapless::Vec::new(),
            fail_on_register: None,
        }
    }

    /// Current value of `reg` as seen by the bus.
    pub fn register(&self, reg: u8) -> u16 {
        self.regs.get(usize::from(reg)).copied().unwrap_or(0)
    }

    /// The sequence of register addresses written so far.
    pub fn write_order(&self) -> impl Iterator<Item = u8> + '_ {
        self.writes.iter().map(|&(reg, _)| reg)
    }
}

impl RegisterBus for MockRegisterBus {
    type Error = MockBusError;

    async fn write_register(&mut self, reg: u8, value: u16) -> Result<(), Self::Error> {
        if self.fail_on_register == Some(reg) {
            return Err(MockBusError::WriteRefused { reg });
        }
        if let Some(slot) = self.regs.get_mut(usize::from(reg)) {
            *slot = value;
        }
        let _ = self.writes.push((reg, value));
        Ok(())
    }

    async fn read_register(&mut self, reg: u8) -> Result<u16, Self::Error> {
        Ok(self.register(reg))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_clock_tracks_lifecycle() {
        let mut tree = MockClockTree::new();
        let osc = tree.add_clock_with_rate(None, 19_200_000);
        let leaf = tree.add_clock(Some(osc));

        tree.prepare(leaf).await.unwrap();
        tree.enable(leaf).await.unwrap();
        let node = tree.clock(leaf).unwrap();
        assert!(node.prepared && node.enabled);
        assert_eq!(node.prepare_count, 1);

        tree.disable(leaf).await;
        tree.unprepare(leaf).await;
        let node = tree.clock(leaf).unwrap();
        assert!(!node.prepared && !node.enabled);
    }

    #[tokio::test]
    async fn mock_clock_parent_chain() {
        let mut tree = MockClockTree::new();
        let osc = tree.add_clock_with_rate(None, 19_200_000);
        let pll = tree.add_clock(Some(osc));
        let leaf = tree.add_clock(Some(pll));

        assert_eq!(tree.parent(leaf), Some(pll));
        assert_eq!(tree.parent(pll), Some(osc));
        assert_eq!(tree.parent(osc), None);
    }

    #[tokio::test]
    async fn mock_clock_fault_injection() {
        let mut tree = MockClockTree::new();
        let clk = tree.add_clock(None);
        tree.clock_mut(clk).unwrap().fail_prepare = true;

        assert_eq!(
            tree.prepare(clk).await,
            Err(MockClockError::PrepareRefused(clk))
        );
        assert!(!tree.clock(clk).unwrap().prepared);
    }

    #[tokio::test]
    async fn mock_bus_records_write_order() {
        let mut bus = MockRegisterBus::new();
        bus.write_register(0x00, 0x1f).await.unwrap();
        bus.write_register(0x01, 0x3f).await.unwrap();

        let order: Vec<u8> = bus.write_order().collect();
        assert_eq!(order, vec![0x00, 0x01]);
        assert_eq!(bus.register(0x01), 0x3f);
    }

    #[tokio::test]
    async fn mock_bus_refuses_configured_register() {
        let mut bus = MockRegisterBus::new();
        bus.fail_on_register = Some(0x05);
        assert_eq!(
            bus.write_register(0x05, 0x80).await,
            Err(MockBusError::WriteRefused { reg: 0x05 })
        );
        assert!(bus.writes.is_empty());
    }
}
