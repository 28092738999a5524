// Layers that record what the stack does to them.

use std::{
    cell::RefCell,
    io::{self, Read, Write},
    rc::Rc,
};

use crate::layer::{
    Close, ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle,
};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Caps {
    close: bool,
    flush: bool,
    reset: bool,
    fail: bool,
}

impl Caps {
    pub fn none() -> Self {
        Caps::default()
    }

    pub fn close() -> Self {
        Caps { close: true, ..Caps::default() }
    }

    pub fn flush() -> Self {
        Caps { flush: true, ..Caps::default() }
    }

    pub fn reset() -> Self {
        Caps { reset: true, ..Caps::default() }
    }

    pub fn and_flush(self) -> Self {
        Caps { flush: true, ..self }
    }

    pub fn and_reset(self) -> Self {
        Caps { reset: true, ..self }
    }

    pub fn failing(self) -> Self {
        Caps { fail: true, ..self }
    }
}

fn record(journal: &Journal, name: &str, event: &str, fail: bool) -> io::Result<()> {
    journal.borrow_mut().push(format!("{}:{}", name, event));
    match fail {
        true => Err(io::Error::new(
            io::ErrorKind::Other,
            format!("{}:{} failed", name, event),
        )),
        false => Ok(()),
    }
}

pub struct RecordingWriter {
    name: &'static str,
    caps: Caps,
    journal: Journal,
    below: Option<WriterHandle>,
}

impl RecordingWriter {
    pub fn new(
        name: &'static str,
        caps: Caps,
        journal: &Journal,
        below: Option<WriterHandle>,
    ) -> Self {
        RecordingWriter {
            name,
            caps,
            journal: journal.clone(),
            below,
        }
    }
}

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.below.as_mut() {
            Some(below) => below.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        record(&self.journal, self.name, "flush", self.caps.fail)
    }
}

impl Close for RecordingWriter {
    fn close(&mut self) -> io::Result<()> {
        record(&self.journal, self.name, "close", self.caps.fail)
    }
}

impl ResetWriter for RecordingWriter {
    fn reset(&mut self, below: WriterHandle) -> io::Result<()> {
        record(&self.journal, self.name, "reset", self.caps.fail)?;
        self.below = Some(below);
        Ok(())
    }
}

impl WriteLayer for RecordingWriter {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        match self.caps.close {
            true => Some(self),
            false => None,
        }
    }

    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        match self.caps.flush {
            true => Some(self),
            false => None,
        }
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        match self.caps.reset {
            true => Some(self),
            false => None,
        }
    }
}

pub struct RecordingReader {
    name: &'static str,
    caps: Caps,
    journal: Journal,
    below: Option<ReaderHandle>,
}

impl RecordingReader {
    pub fn new(
        name: &'static str,
        caps: Caps,
        journal: &Journal,
        below: Option<ReaderHandle>,
    ) -> Self {
        RecordingReader {
            name,
            caps,
            journal: journal.clone(),
            below,
        }
    }
}

impl Read for RecordingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.below.as_mut() {
            Some(below) => below.read(buf),
            None => Ok(0),
        }
    }
}

impl Close for RecordingReader {
    fn close(&mut self) -> io::Result<()> {
        record(&self.journal, self.name, "close", self.caps.fail)
    }
}

impl ResetReader for RecordingReader {
    fn reset(&mut self, below: ReaderHandle) -> io::Result<()> {
        record(&self.journal, self.name, "reset", self.caps.fail)?;
        self.below = Some(below);
        Ok(())
    }
}

impl ReadLayer for RecordingReader {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        match self.caps.close {
            true => Some(self),
            false => None,
        }
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        match self.caps.reset {
            true => Some(self),
            false => None,
        }
    }
}
