//! # pal-loader: Configuration Transfer Protocol
//!
//! Streams a [`pal_record::ConfigurationRecord`] into the device through a
//! bank of parallel delivery channels (hardware sequencers), then starts
//! them with a single commit signal.
//!
//! ## Programming Pass
//!
//! ```text
//! quiesce() ──▶ Quiesced ──reset()──▶ Reset ──stream()──▶ Streamed ──commit()──▶ Committed ──enable()──▶ done
//! ```
//!
//! Each phase is a distinct type (`pass.rs`), so a pass cannot enable the
//! device before the commit signal or stream before the reset pulse.
//!
//! ## Exclusion
//!
//! After the commit the sequencers shift autonomously; the loader does not
//! wait for them. A new pass is refused with
//! [`pal_core::LoaderError::PassInProgress`] while the bank still reports
//! busy, and [`Loader::wait_idle`] blocks until the previous pass drains.

pub mod channel;
pub mod loader;
pub mod pass;
pub mod signals;

pub use channel::ChannelPlan;
pub use loader::{Loader, PassSummary};
pub use pass::{Committed, PassLog, PassPhase, ProgrammingPass, Quiesced, Reset, Streamed};
pub use signals::{DeviceControl, SequencerBank};
