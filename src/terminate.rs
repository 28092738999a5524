use std::io::{self, Write};

use crate::layer::{Close, ReadLayer, WriteLayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationKind {
    Close,
    Flush,
}

/// The action a stack takes on one layer when it is closed.
pub enum Termination<'a> {
    Close(&'a mut dyn Close),
    Flush(&'a mut dyn Write),
}

impl Termination<'_> {
    pub fn kind(&self) -> TerminationKind {
        match self {
            Termination::Close(_) => TerminationKind::Close,
            Termination::Flush(_) => TerminationKind::Flush,
        }
    }

    pub fn run(self) -> io::Result<()> {
        match self {
            Termination::Close(layer) => layer.close(),
            Termination::Flush(layer) => layer.flush(),
        }
    }
}

/// Pick the teardown action for a write layer.
///
/// Closing wins over flushing: a layer offering both is assumed to flush as
/// part of closing. Layers with neither are left alone.
pub fn terminate_writer(layer: &mut dyn WriteLayer) -> Option<Termination<'_>> {
    if layer.as_close().is_some() {
        return layer.as_close().map(Termination::Close);
    }
    layer.as_flush().map(Termination::Flush)
}

/// Pick the teardown action for a read layer. Only closing applies.
pub fn terminate_reader(layer: &mut dyn ReadLayer) -> Option<Termination<'_>> {
    layer.as_close().map(Termination::Close)
}
