//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]

use std::process::ExitCode;

use bzip2_decoder::compression::decompress::decompress;
use bzip2_decoder::tools::cli::bzopts_init;

use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> ExitCode {
    // Available log levels are Error, Warn, Info, Debug, Trace. The command line narrows this down.
    // Log to stderr, stdout may be carrying decompressed data.
    if let Err(e) = TermLogger::init(
        LevelFilter::Trace,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("bunzip2: can't start logging: {}", e);
    }

    let options = bzopts_init();

    match decompress(&options) {
        Ok(()) => {
            info!("Done.\n");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
