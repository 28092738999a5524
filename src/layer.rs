use std::{
    cell::{RefCell, RefMut},
    fs::File,
    io::{self, Cursor, Empty, Read, Sink, Stderr, Stdin, Stdout, Write},
    net::{Shutdown, TcpStream},
    rc::Rc,
};

use crate::error::StackError;

/// A layer with an explicit terminal action that releases what it holds.
pub trait Close {
    fn close(&mut self) -> io::Result<()>;
}

/// A write layer that can drop its state and attach to a new writer below it.
///
/// After a successful reset the layer must behave exactly like one freshly
/// constructed on top of `below`.
pub trait ResetWriter {
    fn reset(&mut self, below: WriterHandle) -> io::Result<()>;
}

/// Read counterpart of [`ResetWriter`].
pub trait ResetReader {
    fn reset(&mut self, below: ReaderHandle) -> io::Result<()>;
}

/// Anything that can sit in a [`WriterStack`](crate::WriterStack).
///
/// The capability queries default to "not supported". A layer opts in by
/// returning itself, e.g. `Some(self)`.
pub trait WriteLayer: Write {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        None
    }

    /// Layers holding buffered bytes return themselves here so `flush` is
    /// called when the stack is closed.
    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        None
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetWriter> {
        None
    }
}

/// Anything that can sit in a [`ReaderStack`](crate::ReaderStack).
pub trait ReadLayer: Read {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        None
    }

    fn as_reset(&mut self) -> Option<&mut dyn ResetReader> {
        None
    }
}

/// Shared handle to a layer of a [`WriterStack`](crate::WriterStack).
///
/// The next layer up writes into this handle. Cloning is cheap and all clones
/// point at the same layer.
#[derive(Clone)]
pub struct WriterHandle(Rc<RefCell<dyn WriteLayer>>);

impl WriterHandle {
    pub fn new<L>(layer: L) -> Self
    where
        L: WriteLayer + 'static,
    {
        WriterHandle(Rc::new(RefCell::new(layer)))
    }

    /// A handle that swallows everything written to it.
    pub fn sink() -> Self {
        WriterHandle::new(io::sink())
    }

    /// Whether both handles refer to the same layer.
    pub fn same_layer(&self, other: &WriterHandle) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0) as *const u8,
            Rc::as_ptr(&other.0) as *const u8,
        )
    }

    pub fn borrow_mut(&self) -> Result<RefMut<'_, dyn WriteLayer + 'static>, StackError> {
        self.0.try_borrow_mut().map_err(|_| StackError::LayerBusy)
    }
}

impl Write for WriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.borrow_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.borrow_mut()?.flush()
    }
}

/// Shared handle to a layer of a [`ReaderStack`](crate::ReaderStack).
#[derive(Clone)]
pub struct ReaderHandle(Rc<RefCell<dyn ReadLayer>>);

impl ReaderHandle {
    pub fn new<L>(layer: L) -> Self
    where
        L: ReadLayer + 'static,
    {
        ReaderHandle(Rc::new(RefCell::new(layer)))
    }

    pub fn same_layer(&self, other: &ReaderHandle) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.0) as *const u8,
            Rc::as_ptr(&other.0) as *const u8,
        )
    }

    pub fn borrow_mut(&self) -> Result<RefMut<'_, dyn ReadLayer + 'static>, StackError> {
        self.0.try_borrow_mut().map_err(|_| StackError::LayerBusy)
    }
}

impl Read for ReaderHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.borrow_mut()?.read(buf)
    }
}

// Codecs that own their writer flush or finish it when dropped. Writing
// through a `Downstream` lets a layer cut the old codec loose before it is
// replaced, so nothing stale reaches the freshly reset layer below.
#[derive(Clone)]
pub(crate) struct Downstream(Rc<RefCell<WriterHandle>>);

impl Downstream {
    pub(crate) fn new(below: WriterHandle) -> Self {
        Downstream(Rc::new(RefCell::new(below)))
    }

    pub(crate) fn detach(&self) {
        *self.0.borrow_mut() = WriterHandle::sink();
    }

    fn target(&self) -> WriterHandle {
        self.0.borrow().clone()
    }
}

impl Write for Downstream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.target().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target().flush()
    }
}

// Standard resources.

impl WriteLayer for Vec<u8> {}

impl WriteLayer for Cursor<Vec<u8>> {}

impl WriteLayer for Sink {}

impl WriteLayer for Stdout {
    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        Some(self)
    }
}

impl WriteLayer for Stderr {
    fn as_flush(&mut self) -> Option<&mut dyn Write> {
        Some(self)
    }
}

// Pipes and character devices reject fsync, so only regular files are synced.
impl Close for File {
    fn close(&mut self) -> io::Result<()> {
        match self.metadata()?.is_file() {
            true => self.sync_all(),
            false => Ok(()),
        }
    }
}

impl WriteLayer for File {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }
}

impl ReadLayer for File {}

impl Close for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

impl WriteLayer for TcpStream {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }
}

impl ReadLayer for TcpStream {
    fn as_close(&mut self) -> Option<&mut dyn Close> {
        Some(self)
    }
}

impl ReadLayer for Cursor<Vec<u8>> {}

impl ReadLayer for &'static [u8] {}

impl ReadLayer for Empty {}

impl ReadLayer for Stdin {}
