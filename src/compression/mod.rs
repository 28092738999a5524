pub mod gzip;
pub mod lz4;
pub mod snappy;

use flate2::Compression;

use crate::{error::StackError, reader::ReaderStack, writer::WriterStack};

use self::{
    gzip::{GzipReader, GzipWriter},
    lz4::{Lz4Reader, Lz4Writer},
    snappy::{SnappyReader, SnappyWriter},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CompressionType {
    Passthrough,
    #[default]
    Lz4,
    Gzip,
    Snappy,
}

impl CompressionType {
    /// Push the compressing layer for this algorithm. `level` only matters
    /// for gzip. Passthrough pushes nothing.
    pub fn wrap_writer(
        &self,
        stack: &mut WriterStack,
        level: Compression,
    ) -> Result<(), StackError> {
        match self {
            CompressionType::Passthrough => Ok(()),
            CompressionType::Lz4 => stack.wrap_with(Lz4Writer::new),
            CompressionType::Gzip => stack.wrap_with(|top| GzipWriter::with_level(top, level)),
            CompressionType::Snappy => stack.wrap_with(SnappyWriter::new),
        }
    }

    pub fn wrap_reader(&self, stack: &mut ReaderStack) -> Result<(), StackError> {
        match self {
            CompressionType::Passthrough => Ok(()),
            CompressionType::Lz4 => stack.wrap_with(Lz4Reader::new),
            CompressionType::Gzip => stack.wrap_with(GzipReader::new),
            CompressionType::Snappy => stack.wrap_with(SnappyReader::new),
        }
    }
}
