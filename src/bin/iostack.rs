mod cli_util;

use clap::Parser;

use crate::cli_util::{Args, CliError};

fn main() -> Result<(), CliError> {
    Args::parse().execute()
}
