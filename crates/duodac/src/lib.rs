//! DuoDAC board driver
//!
//! Clock-domain negotiation and glitch-safe sequencing engine for a
//! dual-WM8741 playback board: a digital host interface feeding two
//! mono-configured codec chips, with a generator-derived tree of master,
//! bit, and frame clocks that must be brought up and torn down without
//! audible artifacts.
//!
//! # Structure
//!
//! - [`config`] — resolved clock handles, startup register batch, group
//!   shape (all data, no lookup at runtime)
//! - [`topology`] — fixed-ratio PLL / multiplier-stage resolution per leaf
//! - [`clocks`] — per-clock lifecycle flags, master-clock mux/gate with
//!   mandatory settle delay
//! - [`rates`] — pure `(sample rate, bit width)` → clock-plan negotiation
//! - [`session`] — the host-framework-facing controller ordering all of
//!   the above
//!
//! # Example
//!
//! ```no_run
//! use duodac::{Card, CardConfig};
//! use platform::{ClockTree, RegisterBus};
//! use wm8741::Wm8741Set;
//!
//! async fn play<T: ClockTree, B: RegisterBus>(
//!     tree: T,
//!     codecs: Wm8741Set<B>,
//!     config: CardConfig,
//! ) -> Result<(), duodac::Error<T, B>> {
//!     let mut card = Card::attach(tree, codecs, &config).await?;
//!     card.startup()?;
//!     card.hw_params(44_100, 16).await?;
//!     // ... stream ...
//!     card.shutdown().await;
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
#![allow(clippy::doc_markdown)] // register and clock names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_self)] // framework callbacks keep their receiver
#![allow(async_fn_in_trait)] // single-executor embedded style, Send bounds not needed

pub mod clocks;
pub mod config;
pub mod rates;
pub mod session;
pub mod topology;

pub use clocks::{ClockError, I2sClocks, MasterClock, MCLK_SETTLE_DELAY};
pub use config::{CardConfig, ClockConfig, STARTUP_REGISTERS};
pub use rates::{negotiate, ClockPlan, FormatError, MasterClockRate};
pub use session::{Card, CardError, Error, SessionState};
pub use topology::{resolve_pll_targets, PllTargets, TopologyError};
