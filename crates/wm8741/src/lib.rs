//! WM8741 stereo attenuating DAC driver
//!
//! Register sequencer for the Wolfson/Cirrus WM8741, written for boards
//! that run one chip per output channel (differential mono) as well as the
//! plain stereo configuration. The chip's control port is write-only, so
//! the driver keeps a software register cache seeded from the reset
//! defaults and serves every read from it.
//!
//! # Structure
//!
//! - [`registers`] — register map and field constants
//! - [`volume`] — split LSB/MSB attenuation encoding with latch-on-MSB
//! - [`driver`] — per-instance sequencing: startup batches, format/sysclk,
//!   power state, volume, soft mute
//! - [`controls`] — enumerated user controls (anti-clipping, dither,
//!   filter response)
//! - [`pair`] — one-or-two-instance sets with value-synchronized shared
//!   controls
//! - [`bus`] — I2C control-port transport (9-bit values, 7-bit addresses)
//!
//! # Example
//!
//! ```no_run
//! use platform::{RegisterBus, VolumeSteps};
//! use wm8741::{Channel, DifferentialMode, Wm8741};
//!
//! async fn bring_up<B: RegisterBus>(bus: B) -> Result<(), wm8741::Error<B::Error>> {
//!     let mut codec = Wm8741::attach(bus, DifferentialMode::MonoLeft).await?;
//!     codec.set_volume(Channel::Left, VolumeSteps::FULL).await?;
//!     Ok(())
//! }
//! ```

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

pub mod bus;
pub mod controls;
pub mod driver;
pub mod pair;
pub mod registers;
pub mod volume;

pub use bus::{I2cControlPort, I2C_ADDR_HIGH, I2C_ADDR_LOW};
pub use controls::{AntiClippingMode, DitherMode, EnumControl, FilterResponse};
pub use driver::{
    sysclk_rates, DifferentialMode, Error, OversamplingRate, RegisterWrite, Wm8741,
};
pub use pair::{CodecId, SetError, Wm8741Set};
pub use volume::{AttenuationControl, Channel};
