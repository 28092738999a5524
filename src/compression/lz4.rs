use std::io::{
    Write,
    Read,
    Error,
    ErrorKind
};
use lz4_flex::frame::{
    FrameEncoder,
    FrameDecoder
};

use crate::layer::{
    Close, Downstream, ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle,
};

pub struct Lz4Writer {
    // None once the frame has been finished.
    encoder: Option<FrameEncoder<Downstream>>,
    downstream: Downstream,
}

impl Lz4Writer {
    pub fn new(below: WriterHandle) -> Self {
        let downstream = Downstream::new(below);
        Lz4Writer {
            encoder: Some(FrameEncoder::new(downstream.clone())),
            downstream,
        }
    }

    fn encoder(&mut self) -> std::io::Result<&mut FrameEncoder<Downstream>> {
        self.encoder
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::Other, "lz4 frame already finished"))
    }
}

impl Write for Lz4Writer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.encoder()?.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.encoder.as_mut() {
            Some(encoder) => encoder.flush(),
            None => Ok(()),
        }
    }
}

impl Close for Lz4Writer {
    fn close(&mut self) -> std::io::Result<()> {
        match self.encoder.take() {
            Some(encoder) => match encoder.finish() {
                Ok(_) => Ok(()),
                Err(e) => Err(Error::new(
                    ErrorKind::Other,
                    format!("Failed to finish lz4 frame: {}", e),
                )),
            },
            None => Ok(()),
        }
    }
}

impl ResetWriter for Lz4Writer {
    fn reset(&mut self, below: WriterHandle) -> std::io::Result<()> {
        self.downstream.detach();
        self.downstream = Downstream::new(below);
        self.encoder = Some(FrameEncoder::new(self.downstream.clone()));
        Ok(())
    }
}

impl WriteLayer for Lz4Writer {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        Some(self)
    }
}

pub struct Lz4Reader {
    decoder: FrameDecoder<ReaderHandle>,
}

impl Lz4Reader {
    pub fn new(below: ReaderHandle) -> Self {
        Lz4Reader {
            decoder: FrameDecoder::new(below),
        }
    }
}

impl Read for Lz4Reader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.decoder.read(buf)
    }
}

impl ResetReader for Lz4Reader {
    fn reset(&mut self, below: ReaderHandle) -> std::io::Result<()> {
        self.decoder = FrameDecoder::new(below);
        Ok(())
    }
}

impl ReadLayer for Lz4Reader {
    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        Some(self)
    }
}
