use std::{
    any::Any,
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    mem,
};

use crate::{
    error::StackError,
    layer::{ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle},
    reader::ReaderStack,
    writer::WriterStack,
};

pub const DEFAULT_CAPACITY: usize = 8 * 1024;

/// `BufWriter` as a stack layer. Flushed when the stack closes.
pub struct BufferedWriter {
    inner: BufWriter<WriterHandle>,
    capacity: usize,
}

impl BufferedWriter {
    pub fn new(below: WriterHandle) -> Self {
        BufferedWriter::with_capacity(DEFAULT_CAPACITY, below)
    }

    pub fn with_capacity(capacity: usize, below: WriterHandle) -> Self {
        BufferedWriter {
            inner: BufWriter::with_capacity(capacity, below),
            capacity,
        }
    }

    /// Bytes held back and not yet written below.
    pub fn buffered(&self) -> &[u8] {
        self.inner.buffer()
    }
}

impl Write for BufferedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl ResetWriter for BufferedWriter {
    // Pending bytes belong to the old chain and are thrown away, not flushed.
    fn reset(&mut self, below: WriterHandle) -> io::Result<()> {
        let stale = mem::replace(
            &mut self.inner,
            BufWriter::with_capacity(self.capacity, below),
        );
        let (_, _discarded) = stale.into_parts();
        Ok(())
    }
}

impl WriteLayer for BufferedWriter {
    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        Some(self)
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        Some(self)
    }
}

/// `BufReader` as a stack layer.
pub struct BufferedReader {
    inner: BufReader<ReaderHandle>,
    capacity: usize,
}

impl BufferedReader {
    pub fn new(below: ReaderHandle) -> Self {
        BufferedReader::with_capacity(DEFAULT_CAPACITY, below)
    }

    pub fn with_capacity(capacity: usize, below: ReaderHandle) -> Self {
        BufferedReader {
            inner: BufReader::with_capacity(capacity, below),
            capacity,
        }
    }
}

impl Read for BufferedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl BufRead for BufferedReader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        self.inner.fill_buf()
    }

    fn consume(&mut self, amt: usize) {
        self.inner.consume(amt)
    }
}

impl ResetReader for BufferedReader {
    fn reset(&mut self, below: ReaderHandle) -> io::Result<()> {
        self.inner = BufReader::with_capacity(self.capacity, below);
        Ok(())
    }
}

impl ReadLayer for BufferedReader {
    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        Some(self)
    }
}

mod private {
    pub trait Sealed {}

    impl Sealed for crate::WriterStack {}
    impl Sealed for crate::ReaderStack {}
}

/// Push a buffering layer of the matching direction onto a stack.
pub trait Bufferable: private::Sealed {
    fn buffer_with_capacity(&mut self, capacity: usize) -> Result<(), StackError>;

    fn buffer(&mut self) -> Result<(), StackError> {
        self.buffer_with_capacity(DEFAULT_CAPACITY)
    }
}

impl Bufferable for WriterStack {
    fn buffer_with_capacity(&mut self, capacity: usize) -> Result<(), StackError> {
        self.wrap_with(|top| BufferedWriter::with_capacity(capacity, top))
    }
}

impl Bufferable for ReaderStack {
    fn buffer_with_capacity(&mut self, capacity: usize) -> Result<(), StackError> {
        self.wrap_with(|top| BufferedReader::with_capacity(capacity, top))
    }
}

/// Buffer whichever stack is behind `stack`.
///
/// # Panics
///
/// If `stack` is neither a [`WriterStack`] nor a [`ReaderStack`]. That is a
/// bug at the call site, not a runtime condition.
pub fn buffer(stack: &mut dyn Any) -> Result<(), StackError> {
    if let Some(writer) = stack.downcast_mut::<WriterStack>() {
        return writer.buffer();
    }
    if let Some(reader) = stack.downcast_mut::<ReaderStack>() {
        return reader.buffer();
    }
    panic!("iostack::buffer called on something that is neither a WriterStack nor a ReaderStack");
}
