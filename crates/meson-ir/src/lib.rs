//! Amlogic Meson IR remote receiver.
//!
//! The decoder runs in raw mode: every edge of the demodulated signal raises
//! an interrupt, the current level is handed to an [`RcDevice`] sink and a
//! flush timer closes the frame once the input stays quiet for the sink's
//! timeout.
//!
//! [`RcDevice`]: driver_interface::rc::RcDevice

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod capture;
pub mod config;
mod driver;
pub mod regs;
pub mod snapshot;

pub use config::{DecoderConfig, ModeField};
pub use driver::*;
pub use snapshot::RegisterSnapshot;
