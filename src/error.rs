use std::io::{Error, ErrorKind};

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    #[error("No active layer: the stack is empty")]
    NoActiveLayer,
    #[error("Layer is already borrowed; is a layer wired to itself?")]
    LayerBusy,
    #[error("Layer at position {position} is not resettable")]
    NotResettable { position: usize },
    #[error("Failed to reset layer at position {position}: {source}")]
    Rebind {
        position: usize,
        #[source]
        source: Error,
    },
    #[error(transparent)]
    IOError(Error),
}

impl From<Error> for StackError {
    fn from(value: Error) -> Self {
        StackError::IOError(value)
    }
}

impl From<StackError> for Error {
    fn from(value: StackError) -> Self {
        match value {
            StackError::IOError(e) => e,
            StackError::NoActiveLayer => Error::new(ErrorKind::NotConnected, value),
            StackError::LayerBusy => Error::new(ErrorKind::WouldBlock, value),
            StackError::NotResettable { .. } => Error::new(ErrorKind::Unsupported, value),
            StackError::Rebind { .. } => Error::new(ErrorKind::Other, value),
        }
    }
}
