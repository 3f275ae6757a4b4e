//! osb-extract - study-Bible EPUB extractor

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use osb_extract::{ExtractOptions, JsonDirSink, extract, open_source};

#[derive(Parser)]
#[command(name = "osb-extract")]
#[command(version, about = "Extract verses and notes from a study-Bible EPUB", long_about = None)]
#[command(after_help = "EXAMPLES:
    osb-extract osb.epub -o corpus        Extract a packed EPUB into corpus/
    osb-extract osb-unpacked -o corpus    Extract an unpacked EPUB directory
    osb-extract osb.epub --summary-only   Print counts without writing output")]
struct Cli {
    /// Packed .epub file or unpacked EPUB directory
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory for the JSON collections
    #[arg(short, long, value_name = "DIR", required_unless_present = "summary_only")]
    out: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Only print the summary counts
    #[arg(long)]
    summary_only: bool,

    /// Content directory inside an unpacked EPUB
    #[arg(long, default_value = "OEBPS")]
    content_dir: String,

    /// Manifest ordinal of the first New Testament book
    #[arg(long, default_value_t = osb_extract::pipeline::DEFAULT_NT_START)]
    nt_start: u32,

    /// Log debug details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> osb_extract::Result<()> {
    let options = ExtractOptions::new()
        .with_content_dir(cli.content_dir.clone())
        .with_nt_start(cli.nt_start);

    let source = open_source(&cli.input, &options.content_dir)?;
    let corpus = extract(source.as_ref(), &options)?;

    for violation in corpus.validate() {
        tracing::warn!(%violation, "corpus check failed");
    }

    if let Some(out) = cli.out.as_deref().filter(|_| !cli.summary_only) {
        write_output(&corpus, out, cli.pretty)?;
    }

    println!("{}", corpus.summary());
    Ok(())
}

fn write_output(corpus: &osb_extract::Corpus, out: &Path, pretty: bool) -> osb_extract::Result<()> {
    let mut sink = JsonDirSink::new(out).pretty(pretty);
    corpus.load_into(&mut sink)?;
    tracing::info!(dir = %out.display(), "wrote corpus");
    Ok(())
}
