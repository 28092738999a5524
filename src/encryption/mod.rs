pub mod chacha;

use std::io::Error;

use crate::{reader::ReaderStack, writer::WriterStack};

use self::chacha::{CipherKey, CipherReader, CipherWriter};

/// Push a ChaCha20 layer that encrypts everything written above it.
pub fn encrypt(stack: &mut WriterStack, key: &CipherKey) -> Result<(), Error> {
    stack.try_wrap_with(|top| CipherWriter::new(top, key.clone()))
}

/// Push the matching ChaCha20 layer onto a reader stack.
pub fn decrypt(stack: &mut ReaderStack, key: &CipherKey) -> Result<(), Error> {
    stack.try_wrap_with(|top| CipherReader::new(top, key.clone()))
}
