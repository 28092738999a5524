use std::{
    cell::RefCell,
    io::{self, Cursor, Write},
    rc::Rc,
};

use crate::layer::WriteLayer;

/// An in-memory write base that can still be inspected once it is buried in
/// a stack. Clones share the same bytes.
#[derive(Debug, Default, Clone)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn new() -> Self {
        SharedBuf::default()
    }

    pub fn contents(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// A reader over a snapshot of what has been written so far.
    pub fn reader(&self) -> Cursor<Vec<u8>> {
        Cursor::new(self.contents())
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl WriteLayer for SharedBuf {}
