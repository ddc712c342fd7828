//! Wire types for the keyring daemon's control socket.
//!
//! Every integer on the wire is an unsigned 32-bit big-endian value. A request
//! is preceded by a single credentials byte and looks like:
//! ```text
//! Client → Daemon: [00] [oplen:u32] [opcode:u32] [payload...]
//! Daemon → Client: [8:u32] [result:u32]
//! ```
//! `oplen` counts itself, the opcode and the payload.

use zeroize::Zeroizing;

/// Byte sent ahead of every request so the daemon can read peer credentials
pub const CREDENTIALS_BYTE: u8 = 0;

/// Size of the `[oplen][opcode]` header that starts every request
pub const HEADER_LENGTH: u32 = 8;

/// The only response length the daemon ever declares
pub const RESPONSE_LENGTH: u32 = 8;

/// Operations understood by the control socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ControlOperation {
    /// Create the login keyring with a new password
    Initialize = 0,
    /// Unlock the login keyring
    Unlock = 1,
    /// Change the login keyring password
    Change = 2,
    /// Ask the daemon to exit
    Quit = 4,
}

impl ControlOperation {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ControlOperation {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ControlOperation::Initialize),
            1 => Ok(ControlOperation::Unlock),
            2 => Ok(ControlOperation::Change),
            4 => Ok(ControlOperation::Quit),
            other => Err(other),
        }
    }
}

/// Result codes returned by the daemon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ControlResult {
    Ok = 0,
    Denied = 1,
    Failed = 2,
    NoDaemon = 3,
}

impl ControlResult {
    pub fn code(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for ControlResult {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ControlResult::Ok),
            1 => Ok(ControlResult::Denied),
            2 => Ok(ControlResult::Failed),
            3 => Ok(ControlResult::NoDaemon),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for ControlResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ControlResult::Ok => write!(f, "ok"),
            ControlResult::Denied => write!(f, "denied"),
            ControlResult::Failed => write!(f, "failed"),
            ControlResult::NoDaemon => write!(f, "no daemon"),
        }
    }
}

/// Encode a value as 4 big-endian bytes
pub fn encode_u32(value: u32) -> [u8; 4] {
    [
        (value >> 24) as u8,
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
    ]
}

/// Decode 4 big-endian bytes
pub fn decode_u32(bytes: [u8; 4]) -> u32 {
    u32::from(bytes[0]) << 24
        | u32::from(bytes[1]) << 16
        | u32::from(bytes[2]) << 8
        | u32::from(bytes[3])
}

/// A single request, built right before it is sent
///
/// Fields are private so the payload length always fits a 32-bit frame.
pub struct ControlMessage {
    operation: ControlOperation,
    /// May hold a password, so it is wiped on drop
    payload: Zeroizing<Vec<u8>>,
}

impl ControlMessage {
    /// Build an unlock request: `[secret length][secret bytes]`.
    ///
    /// Returns `None` when the secret cannot be described by a 32-bit frame
    /// length.
    pub fn unlock(secret: &[u8]) -> Option<Self> {
        unlock_frame_length(secret.len())?;
        let secret_len = secret.len() as u32;

        let mut payload = Zeroizing::new(Vec::with_capacity(4 + secret.len()));
        payload.extend_from_slice(&encode_u32(secret_len));
        payload.extend_from_slice(secret);

        Some(Self {
            operation: ControlOperation::Unlock,
            payload,
        })
    }

    pub fn operation(&self) -> ControlOperation {
        self.operation
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Value of the `oplen` field: header plus payload
    pub fn frame_length(&self) -> u32 {
        // Constructors guarantee the sum fits
        HEADER_LENGTH + self.payload.len() as u32
    }

    /// The `[oplen][opcode]` header
    pub fn header(&self) -> [u8; 8] {
        let mut header = [0u8; 8];
        header[..4].copy_from_slice(&encode_u32(self.frame_length()));
        header[4..].copy_from_slice(&encode_u32(self.operation.code()));
        header
    }
}

impl std::fmt::Debug for ControlMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlMessage")
            .field("operation", &self.operation)
            .field("payload", &"[REDACTED]")
            .field("len", &self.payload.len())
            .finish()
    }
}

/// `oplen` of an unlock request carrying `secret_len` bytes, if it fits in 32 bits
fn unlock_frame_length(secret_len: usize) -> Option<u32> {
    let secret_len = u32::try_from(secret_len).ok()?;
    HEADER_LENGTH.checked_add(4)?.checked_add(secret_len)
}

/// Fixed-size reply to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlResponse {
    pub length: u32,
    pub result: ControlResult,
}

impl ControlResponse {
    /// Check the declared length before any result code is read.
    ///
    /// Returns the offending length on mismatch.
    pub fn check_length(length: u32) -> Result<(), u32> {
        if length == RESPONSE_LENGTH {
            Ok(())
        } else {
            Err(length)
        }
    }
}
