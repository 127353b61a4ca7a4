//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::io;

use log::{info, LevelFilter};
use simplelog::{Config, TermLogger, TerminalMode};

use timecrunch::compression::compress::compress;
use timecrunch::compression::decompress::decompress;
use timecrunch::tools::cli::{ct_opts_init, Mode};
use timecrunch::tools::sidecar::SidecarStore;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> Result<(), std::io::Error> {
    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stdout,
        simplelog::ColorChoice::AlwaysAnsi,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let options = ct_opts_init()?;
    let store = SidecarStore::new();

    //----- Figure how what we need to do and go do it
    let result = match options.op_mode {
        Mode::Compress => compress(&options, &store),
        Mode::Decompress => decompress(&options, &store),
    };

    info!("Done.\n");
    result
}
