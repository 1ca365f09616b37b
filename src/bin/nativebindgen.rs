//! CLI entry point for nativebindgen.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// nativebindgen — generate Scala Native FFI bindings from C headers.
#[derive(Parser, Debug)]
#[command(name = "nativebindgen", version, about)]
struct Cli {
    /// Path to the nativebindgen.toml configuration file.
    #[arg(default_value = "nativebindgen.toml")]
    config: PathBuf,

    /// Output file path (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nativebindgen=info")),
        )
        .init();

    let cli = Cli::parse();
    nativebindgen::run(&cli.config, cli.output.as_deref())?;
    Ok(())
}
