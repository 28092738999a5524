use std::io::{self, Write};

use log::{debug, trace, warn};

use crate::{
    error::StackError,
    layer::{WriteLayer, WriterHandle},
    terminate::terminate_writer,
};

/// A stack of writers, each wrapping the one below it, down to a base which
/// may be a file, a socket, a byte buffer, etc.
///
/// Position 0 is the top of the stack, the layer that [`Write`] calls land
/// on. The stack is not meant to be shared between threads.
#[derive(Default)]
pub struct WriterStack {
    // Base first, top last.
    layers: Vec<WriterHandle>,
}

impl WriterStack {
    /// A stack with nothing on it. Writes fail until something is wrapped.
    pub fn empty() -> Self {
        WriterStack { layers: Vec::new() }
    }

    pub fn new<L>(base: L) -> Self
    where
        L: WriteLayer + 'static,
    {
        WriterStack {
            layers: vec![WriterHandle::new(base)],
        }
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// The layer `i` positions below the top.
    pub fn at(&self, i: usize) -> Option<WriterHandle> {
        let n = self.layers.len();
        match i < n {
            true => Some(self.layers[n - 1 - i].clone()),
            false => None,
        }
    }

    pub fn top(&self) -> Option<WriterHandle> {
        self.layers.last().cloned()
    }

    pub fn base(&self) -> Option<WriterHandle> {
        self.layers.first().cloned()
    }

    /// Push the outcome of building a layer.
    ///
    /// An `Err` is handed straight back and the stack is left as it was, so
    /// constructors returning `Result` can be passed in without checking them
    /// first:
    ///
    /// ```
    /// use iostack::WriterStack;
    ///
    /// let mut stack = WriterStack::empty();
    /// stack.wrap(std::fs::File::create(std::env::temp_dir().join("iostack-doc")))?;
    /// # Ok::<(), std::io::Error>(())
    /// ```
    ///
    /// The new layer is expected to write into the previous top; nothing
    /// checks that it does.
    pub fn wrap<L, E>(&mut self, layer: Result<L, E>) -> Result<(), E>
    where
        L: WriteLayer + 'static,
    {
        let layer = layer?;
        self.layers.push(WriterHandle::new(layer));
        debug!("Wrapped writer stack, {} layers", self.layers.len());
        Ok(())
    }

    /// Push the layer built by `f` on top of the current top.
    pub fn wrap_with<L, F>(&mut self, f: F) -> Result<(), StackError>
    where
        L: WriteLayer + 'static,
        F: FnOnce(WriterHandle) -> L,
    {
        let top = self.top().ok_or(StackError::NoActiveLayer)?;
        self.wrap(Ok::<L, StackError>(f(top)))
    }

    /// Like [`wrap_with`](Self::wrap_with) for constructors that can fail.
    /// Their error is returned as is.
    pub fn try_wrap_with<L, E, F>(&mut self, f: F) -> Result<(), E>
    where
        L: WriteLayer + 'static,
        E: From<StackError>,
        F: FnOnce(WriterHandle) -> Result<L, E>,
    {
        let top = self.top().ok_or(StackError::NoActiveLayer)?;
        self.wrap(f(top))
    }

    /// Terminate every layer from the top down to the base.
    ///
    /// Closable layers are closed, flushable ones flushed, the rest skipped.
    /// Every layer is visited even when an earlier one fails; the first error
    /// is the one returned.
    pub fn close(&mut self) -> io::Result<()> {
        let mut first: Option<io::Error> = None;

        for (position, handle) in self.layers.iter().rev().enumerate() {
            if let Err(e) = terminate(position, handle) {
                if first.is_none() {
                    first = Some(e);
                } else {
                    warn!("Dropping error from writer {}: {}", position, e);
                }
            }
        }

        match first {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Rebind the stack onto a new base, reusing every layer above it.
    ///
    /// All layers above the base must be resettable. That is checked before
    /// anything changes: on [`StackError::NotResettable`] the stack, base
    /// included, is exactly as it was. Layers are then reset from the bottom
    /// up, each onto the one just below it. If a layer's own reset fails
    /// with [`StackError::Rebind`], the layers under it are already rebound
    /// and it and everything above it must not be used until a later reset
    /// succeeds.
    pub fn reset<L>(&mut self, base: L) -> Result<(), StackError>
    where
        L: WriteLayer + 'static,
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

        let mut below = WriterHandle::new(base);
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

        debug!("Reset writer stack of {} layers onto a new base", n);
        Ok(())
    }
}

fn terminate(position: usize, handle: &WriterHandle) -> io::Result<()> {
    let mut layer = handle.borrow_mut()?;
    let term = terminate_writer(&mut *layer);
    match term {
        Some(term) => {
            trace!("Terminating writer {} with {:?}", position, term.kind());
            term.run()
        }
        None => Ok(()),
    }
}

impl Write for WriterStack {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.top().ok_or(StackError::NoActiveLayer)?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.top().ok_or(StackError::NoActiveLayer)?.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::WriterStack;
    use crate::{
        error::StackError,
        layer::{WriteLayer, WriterHandle},
        memory::SharedBuf,
        testing::{journal, Caps, Journal, RecordingWriter},
    };

    // Upper-cases bytes and passes them on in pairs, holding back an odd one
    // until flushed.
    struct Shout {
        below: WriterHandle,
        pending: Vec<u8>,
    }

    impl Write for Shout {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.pending.extend(buf.iter().map(u8::to_ascii_uppercase));
            let ready = self.pending.len() - self.pending.len() % 2;
            self.below.write_all(&self.pending[..ready])?;
            self.pending.drain(..ready);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.below.write_all(&self.pending)?;
            self.pending.clear();
            self.below.flush()
        }
    }

    impl WriteLayer for Shout {
        fn as_flush(&mut self) -> Option<&mut dyn Write> {
            Some(self)
        }
    }

    fn recorder(stack: &mut WriterStack, name: &'static str, caps: Caps, log: &Journal) {
        stack
            .wrap_with(|top| RecordingWriter::new(name, caps, log, Some(top)))
            .unwrap();
    }

    #[test]
    fn empty_stack_has_no_active_layer() {
        let mut stack = WriterStack::empty();

        assert!(stack.is_empty());
        assert!(stack.top().is_none());
        let err = stack.write(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert!(matches!(
            stack.wrap_with(|_top| Vec::<u8>::new()),
            Err(StackError::NoActiveLayer)
        ));
    }

    #[test]
    fn wrap_passes_construction_errors_through() {
        let mut stack = WriterStack::new(Vec::new());
        let failed: Result<Vec<u8>, io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"));

        let err = stack.wrap(failed).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "nope");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn try_wrap_with_forwards_the_transform_error() {
        let mut stack = WriterStack::new(Vec::new());

        let err = stack
            .try_wrap_with(|_top| -> io::Result<Vec<u8>> {
                Err(io::Error::new(io::ErrorKind::InvalidInput, "bad key"))
            })
            .unwrap_err();

        assert_eq!(err.to_string(), "bad key");
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn positions_count_from_the_top() {
        let base = SharedBuf::new();
        let mut stack = WriterStack::new(base.clone());
        let original_base = stack.base().unwrap();

        stack.wrap_with(|top| Shout { below: top, pending: Vec::new() }).unwrap();
        let first = stack.top().unwrap();
        stack.wrap_with(|top| Shout { below: top, pending: Vec::new() }).unwrap();
        let second = stack.top().unwrap();

        assert_eq!(stack.len(), 3);
        assert!(stack.at(0).unwrap().same_layer(&second));
        assert!(stack.at(1).unwrap().same_layer(&first));
        assert!(stack.at(stack.len() - 1).unwrap().same_layer(&original_base));
        assert!(stack.at(3).is_none());
    }

    #[test]
    fn close_flushes_held_back_bytes_into_the_base() {
        let base = SharedBuf::new();
        let mut stack = WriterStack::new(base.clone());
        stack.wrap_with(|top| Shout { below: top, pending: Vec::new() }).unwrap();

        stack.write_all(b"abc").unwrap();
        assert_eq!(base.contents(), b"AB");

        stack.close().unwrap();
        assert_eq!(base.contents(), b"ABC");
    }

    #[test]
    fn close_visits_every_layer_top_down() {
        let log = journal();
        let mut stack = WriterStack::empty();
        let base = RecordingWriter::new("base", Caps::close(), &log, None);
        stack.wrap(Ok::<_, io::Error>(base)).unwrap();
        recorder(&mut stack, "plain", Caps::none(), &log);
        recorder(&mut stack, "buffer", Caps::flush(), &log);
        recorder(&mut stack, "codec", Caps::close().and_flush(), &log);

        stack.close().unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["codec:close", "buffer:flush", "base:close"]
        );
    }

    #[test]
    fn close_keeps_going_and_reports_the_first_failure() {
        let log = journal();
        let mut stack = WriterStack::empty();
        let base = RecordingWriter::new("base", Caps::close().failing(), &log, None);
        stack.wrap(Ok::<_, io::Error>(base)).unwrap();
        recorder(&mut stack, "middle", Caps::flush().failing(), &log);
        recorder(&mut stack, "top", Caps::close().failing(), &log);

        let err = stack.close().unwrap_err();

        assert_eq!(err.to_string(), "top:close failed");
        assert_eq!(
            *log.borrow(),
            vec!["top:close", "middle:flush", "base:close"]
        );
    }

    #[test]
    fn close_reports_a_failing_base() {
        let log = journal();
        let mut stack = WriterStack::empty();
        let base = RecordingWriter::new("base", Caps::close().failing(), &log, None);
        stack.wrap(Ok::<_, io::Error>(base)).unwrap();
        recorder(&mut stack, "top", Caps::close(), &log);

        let err = stack.close().unwrap_err();

        assert_eq!(err.to_string(), "base:close failed");
    }

    #[test]
    fn reset_rebinds_bottom_up() {
        let log = journal();
        let old_base = SharedBuf::new();
        let new_base = SharedBuf::new();
        let mut stack = WriterStack::new(old_base.clone());
        recorder(&mut stack, "lower", Caps::flush().and_reset(), &log);
        recorder(&mut stack, "upper", Caps::reset(), &log);
        let upper = stack.top().unwrap();

        stack.reset(new_base.clone()).unwrap();
        stack.write_all(b"fresh").unwrap();

        assert_eq!(*log.borrow(), vec!["lower:reset", "upper:reset"]);
        assert!(stack.top().unwrap().same_layer(&upper));
        assert_eq!(stack.len(), 3);
        assert!(old_base.is_empty());
        assert_eq!(new_base.contents(), b"fresh");
    }

    #[test]
    fn reset_refuses_layers_that_cannot_rebind() {
        let log = journal();
        let old_base = SharedBuf::new();
        let new_base = SharedBuf::new();
        let mut stack = WriterStack::new(old_base.clone());
        recorder(&mut stack, "stuck", Caps::none(), &log);

        let err = stack.reset(new_base.clone()).unwrap_err();
        assert!(matches!(err, StackError::NotResettable { position: 0 }));

        stack.write_all(b"still old").unwrap();
        assert_eq!(old_base.contents(), b"still old");
        assert!(new_base.is_empty());
    }

    #[test]
    fn reset_leaves_everything_untouched_when_any_layer_is_stuck() {
        let log = journal();
        let old_base = SharedBuf::new();
        let mut stack = WriterStack::new(old_base.clone());
        recorder(&mut stack, "lower", Caps::reset(), &log);
        recorder(&mut stack, "stuck", Caps::none(), &log);
        recorder(&mut stack, "upper", Caps::reset(), &log);

        let err = stack.reset(SharedBuf::new()).unwrap_err();

        assert!(matches!(err, StackError::NotResettable { position: 1 }));
        assert!(log.borrow().is_empty());
        stack.write_all(b"x").unwrap();
        assert_eq!(old_base.contents(), b"x");
    }

    #[test]
    fn reset_reports_where_a_rebind_failed() {
        let log = journal();
        let mut stack = WriterStack::new(SharedBuf::new());
        recorder(&mut stack, "lower", Caps::reset(), &log);
        recorder(&mut stack, "broken", Caps::reset().failing(), &log);
        recorder(&mut stack, "upper", Caps::reset(), &log);

        let err = stack.reset(SharedBuf::new()).unwrap_err();

        assert!(matches!(err, StackError::Rebind { position: 1, .. }));
        assert_eq!(*log.borrow(), vec!["lower:reset", "broken:reset"]);
    }

    #[test]
    fn reset_of_an_empty_stack_fails() {
        let mut stack = WriterStack::empty();
        assert!(matches!(
            stack.reset(Vec::new()),
            Err(StackError::NoActiveLayer)
        ));
    }
}
