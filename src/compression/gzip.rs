use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use std::io::{Error, ErrorKind, Read, Write};

use crate::layer::{
    Close, Downstream, ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle,
};

pub struct GzipWriter {
    encoder: GzEncoder<Downstream>,
    downstream: Downstream,
    level: Compression,
    finished: bool,
}

impl GzipWriter {
    pub fn new(below: WriterHandle) -> Self {
        GzipWriter::with_level(below, Compression::fast())
    }

    pub fn with_level(below: WriterHandle, level: Compression) -> Self {
        let downstream = Downstream::new(below);
        GzipWriter {
            encoder: GzEncoder::new(downstream.clone(), level),
            downstream,
            level,
            finished: false,
        }
    }
}

impl Write for GzipWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.finished {
            return Err(Error::new(ErrorKind::Other, "gzip member already finished"));
        }
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.encoder.flush()
    }
}

impl Close for GzipWriter {
    // Writes the gzip trailer. The layer below is left open.
    fn close(&mut self) -> std::io::Result<()> {
        self.encoder.try_finish()?;
        self.finished = true;
        Ok(())
    }
}

impl ResetWriter for GzipWriter {
    fn reset(&mut self, below: WriterHandle) -> std::io::Result<()> {
        // The old encoder finishes itself on drop; send that to nowhere.
        self.downstream.detach();
        self.downstream = Downstream::new(below);
        self.encoder = GzEncoder::new(self.downstream.clone(), self.level);
        self.finished = false;
        Ok(())
    }
}

impl WriteLayer for GzipWriter {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        Some(self)
    }
}

pub struct GzipReader {
    decoder: GzDecoder<ReaderHandle>,
}

impl GzipReader {
    pub fn new(below: ReaderHandle) -> Self {
        GzipReader {
            decoder: GzDecoder::new(below),
        }
    }
}

impl Read for GzipReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.decoder.read(buf)
    }
}

impl ResetReader for GzipReader {
    fn reset(&mut self, below: ReaderHandle) -> std::io::Result<()> {
        self.decoder = GzDecoder::new(below);
        Ok(())
    }
}

impl ReadLayer for GzipReader {
    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        Some(self)
    }
}
