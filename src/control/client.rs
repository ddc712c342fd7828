//! Control client for sending an unlock request to the keyring daemon.

use std::io::{self, Read, Write};
use std::os::unix::net::UnixStream;
use std::time::Duration;

use crate::control::protocol::*;
use crate::endpoint::ControlEndpoint;
use crate::error::{SendStage, UnlockError};

/// Client holding one connection to the control socket.
///
/// The connection is used for exactly one request and closed when the client
/// is dropped.
pub struct ControlClient {
    stream: UnixStream,
}

impl ControlClient {
    /// Connect to the control socket, blocking without a deadline
    pub fn connect(endpoint: &ControlEndpoint) -> Result<Self, UnlockError> {
        Self::connect_with_timeout(endpoint, None)
    }

    /// Connect to the control socket with an optional read/write deadline
    pub fn connect_with_timeout(
        endpoint: &ControlEndpoint,
        timeout: Option<Duration>,
    ) -> Result<Self, UnlockError> {
        let stream = UnixStream::connect(endpoint).map_err(UnlockError::Connect)?;

        stream
            .set_read_timeout(timeout)
            .map_err(UnlockError::Connect)?;
        stream
            .set_write_timeout(timeout)
            .map_err(UnlockError::Connect)?;

        log::debug!("Connected to {}", endpoint.path().display());
        Ok(Self { stream })
    }

    /// Send the unlock request and wait for the daemon's verdict.
    ///
    /// Consumes the client; the socket is closed on return.
    pub fn unlock(mut self, secret: &[u8]) -> Result<(), UnlockError> {
        unlock_over(&mut self.stream, secret)
    }
}

/// Connect to `endpoint` and unlock with `secret`
pub fn unlock(secret: &[u8], endpoint: &ControlEndpoint) -> Result<(), UnlockError> {
    ControlClient::connect(endpoint)?.unlock(secret)
}

/// Like [`unlock`], with a deadline on every send and receive
pub fn unlock_with_timeout(
    secret: &[u8],
    endpoint: &ControlEndpoint,
    timeout: Option<Duration>,
) -> Result<(), UnlockError> {
    ControlClient::connect_with_timeout(endpoint, timeout)?.unlock(secret)
}

/// Run one unlock exchange over an already open stream
pub fn unlock_over<S: Read + Write>(stream: &mut S, secret: &[u8]) -> Result<(), UnlockError> {
    let message =
        ControlMessage::unlock(secret).ok_or(UnlockError::SecretTooLarge(secret.len()))?;
    let (secret_len, secret_bytes) = message.payload().split_at(4);

    send_exact(stream, &[CREDENTIALS_BYTE], SendStage::Credentials)?;

    let header = message.header();
    send_exact(stream, &header[..4], SendStage::DataLength)?;
    send_exact(stream, &header[4..], SendStage::Opcode)?;
    send_exact(stream, secret_len, SendStage::SecretLength)?;
    send_all(stream, secret_bytes, SendStage::Secret)?;

    log::debug!(
        "Sent unlock request ({} byte frame), waiting for reply",
        message.frame_length()
    );

    let length = read_u32(stream)?;
    ControlResponse::check_length(length).map_err(UnlockError::InvalidResponseLength)?;
    let code = read_u32(stream)?;

    let result = ControlResult::try_from(code).map_err(UnlockError::UnexpectedResult)?;
    let response = ControlResponse { length, result };
    log::debug!("Daemon replied: {}", response.result);

    match response.result {
        ControlResult::Ok => Ok(()),
        ControlResult::Denied => Err(UnlockError::Denied),
        ControlResult::Failed => Err(UnlockError::Failed),
        ControlResult::NoDaemon => Err(UnlockError::UnexpectedResult(code)),
    }
}

/// Issue a single write that must take all of `buf`
fn send_exact<W: Write>(stream: &mut W, buf: &[u8], stage: SendStage) -> Result<(), UnlockError> {
    let sent = loop {
        match stream.write(buf) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(UnlockError::Send { stage, source }),
        }
    };

    if sent != buf.len() {
        return Err(UnlockError::ShortSend {
            stage,
            sent,
            expected: buf.len(),
        });
    }
    Ok(())
}

/// Keep writing the unsent suffix of `buf` until nothing is left
fn send_all<W: Write>(stream: &mut W, buf: &[u8], stage: SendStage) -> Result<(), UnlockError> {
    let mut remaining = buf;
    while !remaining.is_empty() {
        match stream.write(remaining) {
            Ok(0) => {
                return Err(UnlockError::ShortSend {
                    stage,
                    sent: buf.len() - remaining.len(),
                    expected: buf.len(),
                })
            }
            Ok(n) => remaining = &remaining[n..],
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(UnlockError::Send { stage, source }),
        }
    }
    stream
        .flush()
        .map_err(|source| UnlockError::Send { stage, source })
}

fn read_u32<R: Read>(stream: &mut R) -> Result<u32, UnlockError> {
    let mut buf = [0u8; 4];
    stream.read_exact(&mut buf).map_err(UnlockError::Receive)?;
    Ok(decode_u32(buf))
}
