//! Stacks of wrapping readers and writers.
//!
//! A [`WriterStack`] or [`ReaderStack`] holds a chain of layers, each wrapping
//! the one below it, down to a base such as a file, socket or byte buffer.
//! Reads and writes go to the top layer. Closing the stack terminates every
//! layer from the top down, so a compressor is finished before the buffer
//! under it is flushed and before the file under that is closed.
//!
//! ```
//! use std::io::{Read, Write};
//! use iostack::{
//!     compression::gzip::{GzipReader, GzipWriter},
//!     memory::SharedBuf,
//!     Bufferable, ReaderStack, WriterStack,
//! };
//!
//! let base = SharedBuf::new();
//! let mut writer = WriterStack::new(base.clone());
//! writer.buffer()?;
//! writer.wrap_with(GzipWriter::new)?;
//! writer.write_all(b"hello iostack\n")?;
//! writer.close()?;
//!
//! let mut reader = ReaderStack::new(base.reader());
//! reader.wrap_with(GzipReader::new)?;
//! let mut text = String::new();
//! reader.read_to_string(&mut text)?;
//! assert_eq!(text, "hello iostack\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod buffer;
pub mod compression;
pub mod encryption;
pub mod error;
pub mod layer;
pub mod memory;
pub mod reader;
pub mod terminate;
pub mod writer;

#[cfg(test)]
mod testing;

pub use buffer::{buffer, Bufferable};
pub use error::StackError;
pub use layer::{Close, ReadLayer, ReaderHandle, ResetReader, ResetWriter, WriteLayer, WriterHandle};
pub use reader::ReaderStack;
pub use writer::WriterStack;
