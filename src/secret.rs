//! The keyring password, held only as long as the unlock call needs it.

use std::fmt;
use std::io::{self, Read};

use zeroize::Zeroizing;

/// Password bytes, wiped on drop and never printed
pub struct Secret(Zeroizing<Vec<u8>>);

impl Secret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Zeroizing::new(bytes.into()))
    }

    /// Read the whole of `reader` as UTF-8 and strip trailing whitespace
    pub fn read_from(mut reader: impl Read) -> io::Result<Self> {
        let mut raw = Zeroizing::new(Vec::new());
        reader.read_to_end(&mut raw)?;

        let text = std::str::from_utf8(&raw)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "secret is not valid UTF-8"))?;
        let trimmed = text.trim_end().len();

        Ok(Self::new(&raw[..trimmed]))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secret")
            .field("inner", &"[REDACTED]")
            .field("len", &self.0.len())
            .finish()
    }
}
