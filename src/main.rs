use audiochunk::{fs, Format};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `debug` or
/// `audiochunk::wav=trace`.
const LOG_ENV: &str = "AUDIOCHUNK_LOG";

/// Re-encode an AIFF or WAV file, optionally converting between the two.
#[derive(Parser, Debug)]
#[command(name = "audiochunk")]
#[command(version)]
#[command(about = "Decode and re-encode PCM audio in AIFF/WAV containers", long_about = None)]
struct Cli {
    /// File to read; its format is detected from the header
    input: PathBuf,

    /// File to write
    output: PathBuf,

    /// Output format (aiff, wav). Defaults to the output file's extension
    #[arg(short, long, value_name = "FORMAT")]
    format: Option<Format>,
}

/// Sends `log` records to stderr. Warnings and up unless `AUDIOCHUNK_LOG`
/// says otherwise.
fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> audiochunk::Result<()> {
    let target = match cli.format {
        Some(f) => f,
        None => Format::from_path(&cli.output).ok_or(audiochunk::Error::UnknownFormat)?,
    };

    let decoded = audiochunk::decode(fs::read_file(&cli.input)?)?;
    for d in &decoded.diagnostics {
        warn!("{}: {}", cli.input.display(), d);
    }

    let c = &decoded.container;
    info!(
        "{}: {} channel(s), {} frame(s), {} bit, {} Hz",
        cli.input.display(),
        c.channel_count(),
        c.frame_count(),
        c.bit_depth,
        c.sample_rate
    );

    let bytes = target.encode(c)?;
    fs::write_file(&cli.output, &bytes)?;
    info!("{}: wrote {} as {}", cli.output.display(), bytes.len(), target);
    Ok(())
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}
