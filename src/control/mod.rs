//! Control interface of the keyring daemon.
//!
//! This module provides:
//! - Protocol types and the big-endian integer codec
//! - A control client that performs the unlock exchange
//!
//! The control socket speaks a binary protocol of length-prefixed frames; see
//! [`protocol`] for the layout.

pub mod client;
pub mod protocol;

pub use client::{unlock, unlock_over, unlock_with_timeout, ControlClient};
pub use protocol::*;
