//! Desktop shell for the `glowfield` ray marcher: renders the demo scene either to a
//! sequence of PNG files or as a live progressive preview in the terminal.

use anyhow::Context as _;
use clap::{Parser, Subcommand};

mod preview;
mod record;

#[derive(Debug, Parser)]
#[command(name = "glowfield", version, about = "CPU signed-distance-field ray marcher")]
struct Args {
    /// Additional logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Render frames and write them out as PNG files.
    Record(record::RecordOptions),
    /// Watch the render progressively in the terminal.
    Preview(preview::PreviewOptions),
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The preview takes over the terminal, so logging would scribble on the image;
    // keep it off there unless explicitly requested.
    let suppress_logging = matches!(args.mode, Mode::Preview(_));
    install_logging(args.verbose, suppress_logging)?;

    match args.mode {
        Mode::Record(options) => record::record_main(&options),
        Mode::Preview(options) => preview::preview_main(&options),
    }
}

fn install_logging(verbose: bool, suppress: bool) -> anyhow::Result<()> {
    use log::LevelFilter;

    if suppress && !verbose {
        return Ok(());
    }
    simplelog::WriteLogger::init(
        if verbose {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        },
        simplelog::ConfigBuilder::new()
            .set_target_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .build(),
        std::io::stderr(),
    )
    .context("failed to initialize logging")
}
