use std::io::{self, Read};

use log::{debug, trace, warn};

use crate::{
    error::StackError,
    layer::{ReadLayer, ReaderHandle},
    terminate::terminate_reader,
};

/// A stack of readers, each wrapping the one below it, down to a base which
/// may be a file, a socket, a byte buffer, etc.
///
/// Reads come from position 0, the top.
#[derive(Default)]
pub struct ReaderStack {
    // Base first, top last.
    layers: Vec<ReaderHandle>,
}

impl ReaderStack {
    /// A stack with nothing on it. Reads fail until something is wrapped.
    pub fn empty() -> Self {
        ReaderStack { layers: Vec::new() }
    }

    pub fn new<L>(base: L) -> Self
    where
        L: ReadLayer + 'static,
    {
        ReaderStack {
            layers: vec![ReaderHandle::new(base)],
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn at(&self, i: usize) -> Option<ReaderHandle> {
        let n = self.layers.len();
        match i < n {
            true => Some(self.layers[n - 1 - i].clone()),
            false => None,
        }
    }

    pub fn top(&self) -> Option<ReaderHandle> {
        self.layers.last().cloned()
    }

    pub fn base(&self) -> Option<ReaderHandle> {
        self.layers.first().cloned()
    }

    /// Push the outcome of building a layer, or hand its error back
    /// untouched. See [`WriterStack::wrap`](crate::WriterStack::wrap).
    pub fn wrap<L, E>(&mut self, layer: Result<L, E>) -> Result<(), E>
    where
        L: ReadLayer + 'static,
    {
        let layer = layer?;
        self.layers.push(ReaderHandle::new(layer));
        debug!("Wrapped reader stack, {} layers", self.layers.len());
        Ok(())
    }

    pub fn wrap_with<L, F>(&mut self, f: F) -> Result<(), StackError>
    where
        L: ReadLayer + 'static,
        F: FnOnce(ReaderHandle) -> L,
    {
        let top = self.top().ok_or(StackError::NoActiveLayer)?;
        self.wrap(Ok::<L, StackError>(f(top)))
    }

    pub fn try_wrap_with<L, E, F>(&mut self, f: F) -> Result<(), E>
    where
        L: ReadLayer + 'static,
        E: From<StackError>,
        F: FnOnce(ReaderHandle) -> Result<L, E>,
    {
        let top = self.top().ok_or(StackError::NoActiveLayer)?;
        self.wrap(f(top))
    }

    /// Close every closable reader from the top down to the base. All of them
    /// are closed whatever happens; the first error is returned.
    pub fn close(&mut self) -> io::Result<()> {
        let mut first: Option<io::Error> = None;

        for (position, handle) in self.layers.iter().rev().enumerate() {
            if let Err(e) = terminate(position, handle) {
                if first.is_none() {
                    first = Some(e);
                } else {
                    warn!("Dropping error from reader {}: {}", position, e);
                }
            }
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Rebind the stack onto a new base. Same contract as
    /// [`WriterStack::reset`](crate::WriterStack::reset).
    pub fn reset<L>(&mut self, base: L) -> Result<(), StackError>
    where
        L: ReadLayer + 'static,
    {
        let n = self.layers.len();
        if n == 0 {
            return Err(StackError::NoActiveLayer);
        }

        for (position, handle) in self.layers.iter().rev().enumerate().take(n - 1) {
            if handle.borrow_mut()?.as_reset().is_none() {
                return Err(StackError::NotResettable { position });
            }
        }

        let mut below = ReaderHandle::new(base);
        self.layers[0] = below.clone();

        for (index, handle) in self.layers.iter().enumerate().skip(1) {
            let position = n - 1 - index;
            let mut layer = handle.borrow_mut()?;
            let resettable = layer
                .as_reset()
                .ok_or(StackError::NotResettable { position })?;
            resettable
                .reset(below)
                .map_err(|source| StackError::Rebind { position, source })?;
            below = handle.clone();
        }

        debug!("Reset reader stack of {} layers onto a new base", n);
        Ok(())
    }
}

fn terminate(position: usize, handle: &ReaderHandle) -> io::Result<()> {
    let mut layer = handle.borrow_mut()?;
    let term = terminate_reader(&mut *layer);
    match term {
        Some(term) => {
            trace!("Terminating reader {} with {:?}", position, term.kind());
            term.run()
        }
        None => Ok(()),
    }
}

impl Read for ReaderStack {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.top().ok_or(StackError::NoActiveLayer)?.read(buf)
    }
}
