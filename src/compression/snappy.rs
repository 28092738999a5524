use std::io::{Read, Write};

use snap::{write::FrameEncoder, read::FrameDecoder};

use crate::layer::{
    Downstream, ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle,
};

/// Snappy framing has no trailer, so flushing the pending block is all it
/// takes to terminate this layer.
pub struct SnappyWriter {
    encoder: FrameEncoder<Downstream>,
    downstream: Downstream,
}

impl SnappyWriter {
    pub fn new(below: WriterHandle) -> Self {
        let downstream = Downstream::new(below);
        SnappyWriter {
            encoder: FrameEncoder::new(downstream.clone()),
            downstream,
        }
    }
}

impl Write for SnappyWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.encoder.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.encoder.flush()
    }
}

impl ResetWriter for SnappyWriter {
    fn reset(&mut self, below: WriterHandle) -> std::io::Result<()> {
        // Dropping the old encoder flushes it.
        self.downstream.detach();
        self.downstream = Downstream::new(below);
        self.encoder = FrameEncoder::new(self.downstream.clone());
        Ok(())
    }
}

impl WriteLayer for SnappyWriter {
    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        Some(self)
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        Some(self)
    }
}

pub struct SnappyReader {
    decoder: FrameDecoder<ReaderHandle>,
}

impl SnappyReader {
    pub fn new(below: ReaderHandle) -> Self {
        SnappyReader {
            decoder: FrameDecoder::new(below),
        }
    }
}

impl Read for SnappyReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.decoder.read(buf)
    }
}

impl ResetReader for SnappyReader {
    fn reset(&mut self, below: ReaderHandle) -> std::io::Result<()> {
        self.decoder = FrameDecoder::new(below);
        Ok(())
    }
}

impl ReadLayer for SnappyReader {
    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        Some(self)
    }
}
