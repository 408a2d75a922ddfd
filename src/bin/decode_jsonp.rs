use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context};
use cinetree::payload::decode_document;
use mimalloc::MiMalloc;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(StructOpt)]
#[structopt(name = "decode_jsonp", about = "Decodes a nuxt payload document to json")]
struct Opts {
    #[structopt(long = "marker", default_value = "__NUXT_")]
    marker: String,

    /// Decode as a bare object literal, whatever the document starts with
    #[structopt(long = "simple")]
    simple: bool,

    /// Document to decode, stdin when omitted
    #[structopt(parse(from_os_str))]
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let opts = Opts::from_args();
    let document = match &opts.file {
        Some(file) => {
            fs::read_to_string(file).with_context(|| format!("Failed to read {file:?}"))?
        }
        None => {
            let mut document = String::new();
            io::stdin().read_to_string(&mut document)?;
            document
        }
    };

    let start = Instant::now();
    let value = if opts.simple {
        nuxt_jsonp::parse_simple(&document)
    } else {
        decode_document(&document, &opts.marker)
    }
    .map_err(|e| anyhow!("{} error: {e}", e.kind().as_str()))?;
    info!("Decoded in {}ms", start.elapsed().as_millis());

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
