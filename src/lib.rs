//! Client for the keyring daemon's control socket.
//!
//! Finds the control socket from the environment and unlocks the login
//! keyring with a password, using the daemon's own binary framing.

pub mod control;
pub mod endpoint;
pub mod error;
pub mod secret;

pub use control::{unlock, unlock_with_timeout, ControlClient};
pub use endpoint::ControlEndpoint;
pub use error::{ErrorKind, SendStage, UnlockError};
pub use secret::Secret;
