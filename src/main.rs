use anyhow::{Context, Result};
use clap::Parser;
use elfscope::cli::Cli;
use elfscope::config::{ElfscopeConfig, OutputFormat};
use elfscope::io::MappedImage;
use elfscope::{logging, report};
use std::io::{self, BufWriter, Write};
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Analysis failed: {:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let base = match &cli.config {
        Some(path) => ElfscopeConfig::from_json_file(path)?,
        None => ElfscopeConfig::default(),
    };
    let config = cli.apply(base);
    logging::init(config.output.json_logs);

    let mapped = MappedImage::open(&cli.file, &config.io.limits())
        .with_context(|| format!("cannot open {}", cli.file.display()))?;
    info!(path = %mapped.path().display(), size = mapped.size(), "Mapped input");

    let analysis = elfscope::analyze(mapped.bytes(), &config.tables)
        .with_context(|| format!("{} is not a supported ELF image", cli.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let written = match config.output.format {
        OutputFormat::Text => report::render_text(&analysis, &mut out),
        OutputFormat::Json => report::render_json(&analysis, &mut out),
    }
    .and_then(|()| out.flush());
    match written {
        // Reader closed early, as with `elfscope bin | head`.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("stdout closed before the report was complete");
            Ok(())
        }
        other => Ok(other?),
    }
}
