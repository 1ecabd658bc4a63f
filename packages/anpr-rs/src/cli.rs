//! Command line arguments backing the `anpr` binary.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
  name = "anpr",
  about = "Number plate recognition tooling: consolidate raw OCR fragments and inspect pipeline options",
  version
)]
pub struct Args {
  /// Log pipeline decisions at debug level
  #[arg(long, short = 'v', global = true)]
  pub verbose: bool,

  /// Pipeline options file (JSON)
  #[arg(long, short = 'c', global = true)]
  pub config: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Print version information
  Version,
  /// Print the effective pipeline options as JSON
  Config,
  /// Consolidate raw recognition fragments into one plate reading
  Consolidate {
    /// JSON file holding an array of fragments, or `-` for stdin
    input: PathBuf,

    /// Detection box to offset the reading into, as X_MIN Y_MIN X_MAX Y_MAX
    #[arg(
      long,
      num_args = 4,
      value_names = ["X_MIN", "Y_MIN", "X_MAX", "Y_MAX"],
      allow_negative_numbers = true,
      requires = "det_conf"
    )]
    det_box: Option<Vec<i32>>,

    /// Detection confidence reported with the plate
    #[arg(long, requires = "det_box")]
    det_conf: Option<f32>,
  },
}
