use std::io::{Error, ErrorKind, Read, Write};

use chacha20::{
    cipher::{KeyIvInit, StreamCipher},
    ChaCha20,
};
use sha2::{Digest, Sha256};

use crate::layer::{ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle};

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 12;

/// Key and nonce for a ChaCha20 keystream.
///
/// This is a bare stream cipher: it hides bytes but does not authenticate
/// them.
#[derive(Clone)]
pub struct CipherKey {
    key: Vec<u8>,
    nonce: Vec<u8>,
}

impl CipherKey {
    pub fn new(key: Vec<u8>, nonce: Vec<u8>) -> std::io::Result<Self> {
        if key.len() != KEY_LEN || nonce.len() != NONCE_LEN {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "ChaCha20 needs a {} byte key and a {} byte nonce, got {} and {}",
                    KEY_LEN,
                    NONCE_LEN,
                    key.len(),
                    nonce.len()
                ),
            ));
        }
        Ok(CipherKey { key, nonce })
    }

    /// Hash the passphrase with SHA-256 to get the key.
    pub fn from_passphrase(passphrase: &str, nonce: Vec<u8>) -> std::io::Result<Self> {
        if passphrase.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "Password is empty"));
        }
        CipherKey::new(Sha256::digest(passphrase.as_bytes()).to_vec(), nonce)
    }

    fn cipher(&self) -> std::io::Result<ChaCha20> {
        ChaCha20::new_from_slices(&self.key, &self.nonce)
            .map_err(|_| Error::new(ErrorKind::InvalidInput, "Invalid key or nonce length"))
    }
}

// The 32-bit block counter gives out after 256 GiB under one key and nonce.
fn apply(cipher: &mut ChaCha20, buf: &mut [u8]) -> std::io::Result<()> {
    cipher
        .try_apply_keystream(buf)
        .map_err(|_| Error::new(ErrorKind::Other, "ChaCha20 keystream exhausted"))
}

pub struct CipherWriter {
    key: CipherKey,
    cipher: ChaCha20,
    inner: WriterHandle,
    scratch: Vec<u8>,
}

impl CipherWriter {
    pub fn new(below: WriterHandle, key: CipherKey) -> std::io::Result<Self> {
        Ok(CipherWriter {
            cipher: key.cipher()?,
            key,
            inner: below,
            scratch: Vec::new(),
        })
    }
}

impl Write for CipherWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        // The keystream has already advanced, so the whole buffer must go
        // down or the stream is out of step.
        self.scratch.clear();
        self.scratch.extend_from_slice(buf);
        apply(&mut self.cipher, &mut self.scratch)?;
        self.inner.write_all(&self.scratch)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

impl ResetWriter for CipherWriter {
    fn reset(&mut self, below: WriterHandle) -> std::io::Result<()> {
        self.cipher = self.key.cipher()?;
        self.inner = below;
        self.scratch.clear();
        Ok(())
    }
}

impl WriteLayer for CipherWriter {
    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        Some(self)
    }
}

pub struct CipherReader {
    key: CipherKey,
    cipher: ChaCha20,
    inner: ReaderHandle,
}

impl CipherReader {
    pub fn new(below: ReaderHandle, key: CipherKey) -> std::io::Result<Self> {
        Ok(CipherReader {
            cipher: key.cipher()?,
            key,
            inner: below,
        })
    }
}

impl Read for CipherReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        apply(&mut self.cipher, &mut buf[..n])?;
        Ok(n)
    }
}

impl ResetReader for CipherReader {
    fn reset(&mut self, below: ReaderHandle) -> std::io::Result<()> {
        self.cipher = self.key.cipher()?;
        self.inner = below;
        Ok(())
    }
}

impl ReadLayer for CipherReader {
    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        Some(self)
    }
}
