mod cli;

use anpr_rs::{consolidate, DetectionBox, NumberPlate, PipelineOptions, PlateReading, TextFragment};
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Args, Commands};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  let args = Args::parse();
  init_tracing(args.verbose);

  if let Err(e) = run(args).await {
    eprintln!("Error: {:#}", e);
    std::process::exit(1);
  }
}

fn init_tracing(verbose: bool) {
  let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
    .init();
}

async fn run(args: Args) -> Result<()> {
  match args.command {
    Commands::Version => {
      println!("anpr {}", env!("CARGO_PKG_VERSION"));
    }
    Commands::Config => {
      let options = match &args.config {
        Some(path) => PipelineOptions::from_json_file(path)?,
        None => PipelineOptions::default(),
      };
      println!("{}", serde_json::to_string_pretty(&options)?);
    }
    Commands::Consolidate {
      input,
      det_box,
      det_conf,
    } => {
      let raw = read_input(&input).await?;
      let fragments: Vec<TextFragment> =
        serde_json::from_str(&raw).with_context(|| format!("invalid fragments in {}", input.display()))?;
      let reading = consolidate(&fragments);

      let output = match (det_box, det_conf) {
        (Some(coords), Some(conf)) => {
          let det_box = match coords.as_slice() {
            [x_min, y_min, x_max, y_max] => DetectionBox::new(*x_min, *y_min, *x_max, *y_max)?,
            _ => return Err(anyhow!("--det-box takes exactly four values")),
          };
          if !(0.0..=1.0).contains(&conf) {
            return Err(anyhow!("--det-conf must be within [0, 1], got {conf}"));
          }
          let reading = match reading {
            Some(r) => Some(
              PlateReading::from_consolidated(&det_box, r)
                .context("reading polygon leaves the image coordinate range once offset")?,
            ),
            None => None,
          };
          serde_json::to_string_pretty(&NumberPlate::new(det_box, conf, reading))?
        }
        _ => serde_json::to_string_pretty(&reading)?,
      };
      println!("{}", output);
    }
  }
  Ok(())
}

async fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut raw = String::new();
    tokio::io::stdin()
      .read_to_string(&mut raw)
      .await
      .context("failed to read fragments from stdin")?;
    return Ok(raw);
  }
  tokio::fs::read_to_string(path)
    .await
    .with_context(|| format!("failed to read {}", path.display()))
}
