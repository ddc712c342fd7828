//! Errors raised while locating the control socket or talking to it.

use std::fmt;
use std::io;

/// Which part of the request was being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendStage {
    Credentials,
    DataLength,
    Opcode,
    SecretLength,
    Secret,
}

impl fmt::Display for SendStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendStage::Credentials => write!(f, "error writing credentials byte"),
            SendStage::DataLength => write!(f, "error sending data length"),
            SendStage::Opcode => write!(f, "error sending opcode"),
            SendStage::SecretLength => write!(f, "error sending secret length"),
            SendStage::Secret => write!(f, "error sending secret data"),
        }
    }
}

/// Coarse classification of an [`UnlockError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No candidate path is a socket
    EndpointNotFound,
    /// Connecting, sending or receiving failed
    Transport,
    /// The daemon's reply is malformed or not understood
    Protocol,
    /// The daemon refused the secret
    Denied,
    /// The daemon tried and failed
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum UnlockError {
    #[error("control socket not found")]
    EndpointNotFound,

    #[error("error connecting to control socket: {0}")]
    Connect(#[source] io::Error),

    #[error("{stage}: {source}")]
    Send {
        stage: SendStage,
        #[source]
        source: io::Error,
    },

    #[error("{stage}: sent {sent} of {expected} bytes")]
    ShortSend {
        stage: SendStage,
        sent: usize,
        expected: usize,
    },

    #[error("error reading response: {0}")]
    Receive(#[source] io::Error),

    #[error("secret too large: {0} bytes")]
    SecretTooLarge(usize),

    #[error("invalid response length: {0}")]
    InvalidResponseLength(u32),

    #[error("unexpected result: {0}")]
    UnexpectedResult(u32),

    #[error("unlock denied")]
    Denied,

    #[error("unlock failed")]
    Failed,
}

impl UnlockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UnlockError::EndpointNotFound => ErrorKind::EndpointNotFound,
            UnlockError::Connect(_)
            | UnlockError::Send { .. }
            | UnlockError::ShortSend { .. }
            | UnlockError::Receive(_)
            | UnlockError::SecretTooLarge(_) => ErrorKind::Transport,
            UnlockError::InvalidResponseLength(_) | UnlockError::UnexpectedResult(_) => {
                ErrorKind::Protocol
            }
            UnlockError::Denied => ErrorKind::Denied,
            UnlockError::Failed => ErrorKind::Failed,
        }
    }
}
