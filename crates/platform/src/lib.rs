//! Hardware Abstraction Layer (HAL) for the DuoDAC playback board
//!
//! This crate provides trait-based abstractions for the two hardware planes
//! the board driver touches, enabling development and testing without
//! physical hardware:
//!
//! - [`ClockTree`] — the hardware clock-tree primitive (rates, parents,
//!   prepare/enable lifecycle)
//! - [`RegisterBus`] — the codec control-port primitive (register
//!   read/write at chip-defined value width)
//!
//! # Architecture Layers
//!
//! ```text
//! Host audio framework (external)
//!         ↓
//! Board driver (duodac crate — session, clocks, negotiation)
//!         ↓
//! Codec driver (wm8741 crate — register sequencing)
//!         ↓
//! Platform HAL (this crate — trait seams + mocks)
//!         ↓
//! Hardware (clock generator, I2C control port)
//! ```
//!
//! # Features
//!
//! - `std`: expose the mock implementations to dependent crates' tests
//! - `defmt`: enable defmt::Format derives (hardware builds only)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // hex addresses and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // single-executor embedded style, Send bounds not needed

pub mod audio_types;
pub mod clock;
pub mod dai;
pub mod mocks;
pub mod regbus;

pub use audio_types::{BitWidth, OutOfRangeError, VolumeSteps};
pub use clock::{ClockId, ClockTree};
pub use dai::{ClockInversion, ClockRole, DaiFormat, FrameFormat};
pub use regbus::RegisterBus;
