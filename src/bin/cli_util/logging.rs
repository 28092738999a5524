use clap::ValueEnum;
use log::LevelFilter;
use simple_logger::SimpleLogger;

#[derive(Debug, Clone, ValueEnum)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl From<Verbosity> for LevelFilter {
    fn from(verbosity: Verbosity) -> Self {
        match verbosity {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Normal => LevelFilter::Error,
            Verbosity::Verbose => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Trace,
        }
    }
}

// Only our own crate gets chatty; dependencies stay at errors.
pub fn init_logger(verbosity: Verbosity) -> Result<(), log::SetLoggerError> {
    let level: LevelFilter = verbosity.into();

    SimpleLogger::new()
        .with_level(level.min(LevelFilter::Error))
        .with_module_level("iostack", level)
        .without_timestamps()
        .init()
}
