//! Demand-paging simulator - Main Entry Point
//!
//! Usage: mem_sim [OPTIONS] <ADDRESSES> <POLICY> <FRAMES>
//!
//! Translates every address in the address file through a 16-entry TLB and
//! a page table backed by `FRAMES` physical frames, printing one record per
//! address followed by fault and TLB statistics.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::info;

use mem_sim::io::{read_virtual_addresses, FileBackingStore};
use mem_sim::{SimConfig, SimError, VmManager, DEFAULT_BACKING_STORE};

#[derive(Debug, Parser)]
#[command(name = "mem_sim", version, about = "Simulates TLB and page-table translation with demand paging")]
struct Cli {
    /// File with one virtual address (0-65535) per line
    addresses: PathBuf,

    /// Page replacement policy: FIFO, LRU or OPT
    policy: String,

    /// Number of physical frames
    #[arg(allow_negative_numbers = true)]
    frames: i64,

    /// Backing store image (65536 bytes)
    #[arg(short, long, default_value = DEFAULT_BACKING_STORE)]
    backing_store: PathBuf,

    /// Log every fault and eviction to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), SimError> {
    let config = SimConfig::new(cli.addresses, cli.backing_store, cli.frames, &cli.policy)?;
    info!(
        "policy {}, {} frames, addresses from {}",
        config.policy,
        config.frames,
        config.addresses.display()
    );

    let addresses = read_virtual_addresses(&config.addresses)?;
    let store = FileBackingStore::open(&config.backing_store)?;
    let mut vm = VmManager::new(config.frames, config.policy, store);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stdout_err = |source: io::Error| SimError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    };

    let metrics = vm.run(&addresses, |record| writeln!(out, "{}", record).map_err(stdout_err))?;
    writeln!(out, "{}", metrics).map_err(stdout_err)?;
    out.flush().map_err(stdout_err)?;

    info!("{} faults over {} addresses", metrics.faults, metrics.translated());
    Ok(())
}
