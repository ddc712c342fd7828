//! A stand-in keyring daemon listening on a real Unix socket.

use std::{
    io::{self, Read, Write},
    os::unix::net::UnixListener,
    path::{Path, PathBuf},
    thread::{self, JoinHandle},
};

use tempfile::TempDir;

pub const REPLY_OK: [u8; 8] = [0, 0, 0, 8, 0, 0, 0, 0];
pub const REPLY_DENIED: [u8; 8] = [0, 0, 0, 8, 0, 0, 0, 1];
pub const REPLY_FAILED: [u8; 8] = [0, 0, 0, 8, 0, 0, 0, 2];

pub struct FakeDaemon {
    /// Directory the socket lives under; removed on drop
    dir: TempDir,
    pub socket_path: PathBuf,
    handle: Option<JoinHandle<io::Result<Vec<u8>>>>,
}

impl FakeDaemon {
    /// Listen on `<tempdir>/<socket>` and answer one request with `reply`
    pub fn start(socket: &str, reply: &[u8]) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let socket_path = dir.path().join(socket);
        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let listener = UnixListener::bind(&socket_path)?;
        let reply = reply.to_vec();
        let handle = thread::spawn(move || serve_once(listener, &reply));

        Ok(Self {
            dir,
            socket_path,
            handle: Some(handle),
        })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Wait for the exchange to finish and return every byte the client sent
    pub fn received(mut self) -> io::Result<Vec<u8>> {
        self.handle
            .take()
            .expect("daemon already joined")
            .join()
            .expect("daemon thread panicked")
    }
}

fn serve_once(listener: UnixListener, reply: &[u8]) -> io::Result<Vec<u8>> {
    let (mut stream, _) = listener.accept()?;

    // Credentials byte plus the frame length
    let mut received = vec![0u8; 5];
    stream.read_exact(&mut received)?;
    let oplen = u32::from_be_bytes([received[1], received[2], received[3], received[4]]);

    let mut rest = vec![0u8; oplen as usize - 4];
    stream.read_exact(&mut rest)?;
    received.extend_from_slice(&rest);

    stream.write_all(reply)?;
    Ok(received)
}

/// The bytes a correct client sends to unlock with `secret`
pub fn expected_request(secret: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0u8];
    bytes.extend_from_slice(&(12 + secret.len() as u32).to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&(secret.len() as u32).to_be_bytes());
    bytes.extend_from_slice(secret);
    bytes
}
