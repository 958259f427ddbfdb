use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for tabclean
#[derive(Parser, Debug)]
#[command(version, about = "tabclean")]
pub struct Args {
    /// Dataset to load (CSV, TSV or Parquet)
    pub path: Option<PathBuf>,

    /// Specify the delimiter to use when reading a file
    #[arg(long = "delimiter")]
    pub delimiter: Option<u8>,

    /// Specify that the file has no header
    #[arg(long = "no-header", action)]
    pub no_header: bool,

    /// Write the default configuration file and exit
    #[arg(long = "write-config", action)]
    pub write_config: bool,

    /// Overwrite an existing configuration file (with --write-config)
    #[arg(long = "force", action)]
    pub force: bool,
}
