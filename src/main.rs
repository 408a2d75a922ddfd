use std::env;

use mimalloc::MiMalloc;
use structopt::StructOpt;
use tracing::*;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const RUST_LOG: &str = "RUST_LOG";

fn main() -> anyhow::Result<()> {
    if env::var_os(RUST_LOG).is_none() {
        env::set_var(
            RUST_LOG,
            "warn,cinetree=debug,nuxt_jsonp=debug,tower_http=info",
        );
    }
    tracing_subscriber::fmt::init();

    let opts = Opts::from_args();
    info!("Log level: {:?}", env::var_os(RUST_LOG).unwrap_or_default());
    cinetree::start_server(&opts.site, &opts.marker, opts.async_threads, opts.port)
}

#[derive(StructOpt)]
#[structopt(name = "cinetree_server", about = "Serves decoded cinetree payload documents")]
struct Opts {
    #[structopt(short = "p", long = "port", default_value = "3000")]
    port: u16,

    #[structopt(long = "site", default_value = "https://cinetree.nl")]
    site: String,

    /// Documents with this marker in their first 16 chars are decoded as full payloads
    #[structopt(long = "marker", default_value = "__NUXT_")]
    marker: String,

    #[structopt(long = "async-threads", default_value = "4")]
    async_threads: usize,
}
