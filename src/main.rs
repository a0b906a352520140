//! `h2-cache-digest`: build, inspect and query cache digests from the shell.
//!
//! ```text
//! h2-cache-digest --encode URL1 URL2 ... > digest.bin
//! h2-cache-digest --decode < digest.bin
//! h2-cache-digest --check URL1 URL2 ... < digest.bin
//! h2-cache-digest --push URL1 URL2 ... < digest.bin
//! ```

use std::io::{self, Read, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use cache_digest::{CacheDigest, DigestConfig, PushVerdict};
use clap::error::ErrorKind;
use clap::{ArgGroup, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const FAILURE: u8 = 111;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["encode", "decode", "check", "push"])))]
struct Args {
    /// Build a digest from the URLs and write it to stdout
    #[arg(short, long)]
    encode: bool,

    /// Print the parameters and keys of the digest read from stdin
    #[arg(short, long)]
    decode: bool,

    /// Report whether each URL is in the digest read from stdin
    #[arg(short, long)]
    check: bool,

    /// Report whether each URL should be pushed, adding it to the digest as it goes
    #[arg(short, long)]
    push: bool,

    /// Golomb-Rice divisor exponent used by --encode
    #[arg(short = 'P', long = "p-log2", default_value_t = cache_digest::DEFAULT_P_LOG2)]
    p_log2: u8,

    /// Largest digest accepted or produced, in bytes
    #[arg(long, default_value_t = cache_digest::DEFAULT_MAX_ENCODED_LEN)]
    max_bytes: usize,

    /// Largest number of keys a digest may hold
    #[arg(long, default_value_t = cache_digest::DEFAULT_MAX_KEYS)]
    max_keys: usize,

    /// URLs to encode, check or push
    urls: Vec<String>,
}

impl Args {
    fn config(&self) -> DigestConfig {
        DigestConfig::new()
            .with_p_log2(self.p_log2)
            .with_max_encoded_len(self.max_bytes)
            .with_max_keys(self.max_keys)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let status = usage_status(err.kind());
            // Help and version text go to stdout, usage errors to stderr.
            let _ = err.print();
            return ExitCode::from(status);
        }
    };
    match run(&args, &mut io::stdin().lock(), &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("h2-cache-digest: {err:#}");
            ExitCode::from(FAILURE)
        }
    }
}

/// Exit status for a command line that did not parse.
fn usage_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => FAILURE,
    }
}

fn run(args: &Args, input: &mut impl Read, output: &mut impl Write) -> Result<()> {
    let config = args.config();
    if args.encode {
        encode(&args.urls, &config, output)
    } else if args.decode {
        let digest = read_digest(input, &config)?;
        write_decoded(&digest, output)
    } else if args.check {
        let digest = read_digest(input, &config)?;
        for (url, cached) in args.urls.iter().zip(digest.check(&args.urls)) {
            let verdict = if cached { "cached" } else { "not cached" };
            writeln!(output, "{url}: {verdict}")?;
        }
        Ok(())
    } else {
        let mut digest = read_digest(input, &config)?;
        let verdicts = digest.push(&args.urls).context("failed to update digest")?;
        for (url, verdict) in args.urls.iter().zip(verdicts) {
            let verdict = match verdict {
                PushVerdict::AlreadyCached => "should NOT push; already cached",
                PushVerdict::NotCached => "should push; not cached",
            };
            writeln!(output, "{url}: {verdict}")?;
        }
        Ok(())
    }
}

fn encode(urls: &[String], config: &DigestConfig, output: &mut impl Write) -> Result<()> {
    let encoded =
        CacheDigest::build_and_encode(urls, config).context("failed to encode digest")?;
    debug!(urls = urls.len(), bytes = encoded.len(), p_log2 = config.p_log2, "encoded digest");
    output.write_all(&encoded).context("failed to write digest")?;
    output.flush()?;
    Ok(())
}

fn read_digest(input: &mut impl Read, config: &DigestConfig) -> Result<CacheDigest> {
    let mut encoded = Vec::new();
    // One byte past the limit so oversized input is reported, not cut short.
    input
        .take((config.max_encoded_len as u64).saturating_add(1))
        .read_to_end(&mut encoded)
        .context("failed to read digest from stdin")?;
    let digest = CacheDigest::decode(&encoded, config).context("failed to decode digest")?;
    debug!(
        bytes = encoded.len(),
        keys = digest.len(),
        max_keys = digest.max_keys(),
        n_log2 = digest.n_log2(),
        p_log2 = digest.p_log2(),
        "decoded digest"
    );
    Ok(digest)
}

fn write_decoded(digest: &CacheDigest, output: &mut impl Write) -> Result<()> {
    writeln!(output, "N_log2: {}", digest.n_log2())?;
    writeln!(output, "P_log2: {}", digest.p_log2())?;
    let values: Vec<String> = digest.keys().iter().map(u64::to_string).collect();
    writeln!(output, "Values: {}", values.join(", "))?;
    Ok(())
}
