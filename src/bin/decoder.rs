//! NDJSON user-agent decoding driver.
//!
//! Reads one JSON record per line on stdin, decodes the configured source
//! field, and writes the augmented record to stdout. This is the host
//! wiring for the decoder: it constructs the pipeline directly rather
//! than going through any plugin registry.
//!
//! ```bash
//! cat records.ndjson | decoder --rules regexes.yaml --cache-size 10000
//! ```

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

use ua_decoder::{Decoder, DecoderConfig, Record};

/// Decode user-agent strings in an NDJSON record stream.
#[derive(Parser, Debug)]
#[command(name = "decoder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the classification rule file.
    #[arg(long)]
    rules: std::path::PathBuf,

    /// Record field holding the raw user-agent string.
    #[arg(long, default_value = "user_agent")]
    source_field: String,

    /// Classification cache capacity; 0 disables caching.
    #[arg(long, default_value_t = 0)]
    cache_size: usize,

    /// Print a JSON metrics report to stderr at end of stream.
    #[arg(long)]
    report: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();

    let config = DecoderConfig::new()
        .source_field(args.source_field)
        .rules_path(args.rules)
        .cache_size(args.cache_size)
        .build();

    let decoder = match Decoder::new(config) {
        Ok(decoder) => decoder,
        Err(err) => {
            eprintln!("failed to initialize decoder: {}", err);
            std::process::exit(1);
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = BufWriter::new(tokio::io::stdout());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let value: serde_json::Value = match serde_json::from_str(&line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "skipping malformed record");
                continue;
            }
        };

        // Non-object lines cannot carry fields; forward them untouched.
        let output = match Record::from_value(value.clone()) {
            Some(mut record) => {
                decoder.decode(&mut record);
                record.into_value()
            }
            None => value,
        };

        stdout.write_all(serde_json::to_string(&output)?.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await?;

    if args.report {
        eprintln!("{}", serde_json::to_string_pretty(&decoder.report())?);
    }

    Ok(())
}
