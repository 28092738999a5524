mod compression;
mod logging;

use std::{
    fs::File,
    io::{self},
};

use clap::{Parser, Subcommand};
use log::info;

use iostack::{
    compression::CompressionType,
    encryption::{
        self,
        chacha::{CipherKey, NONCE_LEN},
    },
    Bufferable, ReaderStack, StackError, WriterStack,
};

use self::{
    compression::{BinCompressionType, CompressionLevel},
    logging::{init_logger, Verbosity},
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    IOError(io::Error),
    #[error(transparent)]
    StackError(StackError),
    #[error(transparent)]
    FailedToInitialiseLogger(log::SetLoggerError),
}

impl From<io::Error> for CliError {
    fn from(value: io::Error) -> Self {
        CliError::IOError(value)
    }
}

impl From<StackError> for CliError {
    fn from(value: StackError) -> Self {
        CliError::StackError(value)
    }
}

impl From<log::SetLoggerError> for CliError {
    fn from(value: log::SetLoggerError) -> Self {
        CliError::FailedToInitialiseLogger(value)
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Stream a file through a stack of buffering, encryption and compression layers."
)]
pub struct Args {
    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn execute(self) -> Result<(), CliError> {
        self.command.execute()
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compress (and optionally encrypt) a file
    Pack {
        /// Input file
        input: String,
        /// Output file
        output: String,
        /// Encrypt with ChaCha20 using a key derived from this passphrase
        #[arg(short, long)]
        passphrase: Option<String>,
        /// Output verbosity
        #[arg(short, long, default_value = "normal")]
        verbosity: Verbosity,
        /// Compression algorithm
        #[arg(long, default_value = "lz4")]
        compression_algorithm: BinCompressionType,
        /// Compression level when using [--compression-algorithm gzip]
        #[arg(long, default_value = "fastest")]
        compression_level: CompressionLevel,
    },
    /// Reverse a pack
    Unpack {
        /// Input file
        input: String,
        /// Output file
        output: String,
        /// Passphrase used when packing
        #[arg(short, long)]
        passphrase: Option<String>,
        /// Output verbosity
        #[arg(short, long, default_value = "normal")]
        verbosity: Verbosity,
        /// Compression algorithm used when packing
        #[arg(long, default_value = "lz4")]
        compression_algorithm: BinCompressionType,
    },
}

impl Command {
    fn execute(self) -> Result<(), CliError> {
        match self {
            Command::Pack {
                input,
                output,
                passphrase,
                verbosity,
                compression_algorithm,
                compression_level,
            } => {
                preamble(verbosity)?;
                Self::pack(
                    input,
                    output,
                    passphrase,
                    compression_algorithm.into(),
                    compression_level,
                )
            }
            Command::Unpack {
                input,
                output,
                passphrase,
                verbosity,
                compression_algorithm,
            } => {
                preamble(verbosity)?;
                Self::unpack(input, output, passphrase, compression_algorithm.into())
            }
        }
    }

    fn pack(
        input: String,
        output: String,
        passphrase: Option<String>,
        compression: CompressionType,
        level: CompressionLevel,
    ) -> Result<(), CliError> {
        info!("Compression: {:?}", compression);
        info!("Encryption: {}", passphrase.is_some());

        let mut source = File::open(&input)?;

        let mut stack = WriterStack::empty();
        stack.wrap(File::create(&output))?;
        stack.buffer()?;
        if let Some(passphrase) = passphrase {
            encryption::encrypt(&mut stack, &cipher_key(&passphrase)?)?;
        }
        compression.wrap_writer(&mut stack, level.into())?;

        // The stack is closed even when the copy fails.
        let copied = io::copy(&mut source, &mut stack);
        let closed = stack.close();
        let bytes = settle(copied, vec![closed])?;

        info!("Packed {} bytes from {} into {}", bytes, input, output);
        Ok(())
    }

    fn unpack(
        input: String,
        output: String,
        passphrase: Option<String>,
        compression: CompressionType,
    ) -> Result<(), CliError> {
        let mut stack = ReaderStack::empty();
        stack.wrap(File::open(&input))?;
        stack.buffer()?;
        if let Some(passphrase) = passphrase {
            encryption::decrypt(&mut stack, &cipher_key(&passphrase)?)?;
        }
        compression.wrap_reader(&mut stack)?;

        let mut sink = WriterStack::empty();
        sink.wrap(File::create(&output))?;
        sink.buffer()?;

        let copied = io::copy(&mut stack, &mut sink);
        let closed = sink.close();
        let read_closed = stack.close();
        let bytes = settle(copied, vec![closed, read_closed])?;

        info!("Unpacked {} bytes from {} into {}", bytes, input, output);
        Ok(())
    }
}

// A failed copy is reported before any close error, and close errors in the
// order the stacks were closed.
fn settle(copied: io::Result<u64>, closed: Vec<io::Result<()>>) -> io::Result<u64> {
    let bytes = copied?;
    closed.into_iter().collect::<io::Result<()>>()?;
    Ok(bytes)
}

fn preamble(verbosity: Verbosity) -> Result<(), CliError> {
    init_logger(verbosity)?;

    log::debug!("pid: {}", std::process::id());

    Ok(())
}

// Every pack uses the same nonce, so a passphrase should not be reused across
// files whose contents must stay unrelated.
fn cipher_key(passphrase: &str) -> Result<CipherKey, CliError> {
    Ok(CipherKey::from_passphrase(passphrase, vec![0u8; NONCE_LEN])?)
}
