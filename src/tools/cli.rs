use std::{fmt::Display, fmt::Formatter};

use clap::Parser;
use log::{info, LevelFilter};

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// Unzip, Test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Unzip,
    Test,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Define the two output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    File,
    Stdout,
}
impl Display for Output {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    name = "bunzip2",
    version,
    about = "Decompress bzip2 files",
    long_about = "
    Decompresses files made by bzip2. Each FILE.bz2 becomes FILE, FILE.tbz2 becomes FILE.tar, and
    the input is removed once its output has been written in full. With no files, reads standard
    input and writes standard output."
)]
pub struct Args {
    /// Files to decompress
    #[clap()]
    files: Vec<String>,

    /// Decompress (the only operation; accepted for compatibility)
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// Test compressed file integrity without writing anything
    #[clap(short = 't', long = "test")]
    test: bool,

    /// Send output to standard out
    #[clap(short = 'c', long = "stdout")]
    stdout: bool,

    /// Keep input files
    #[clap(short = 'k', long = "keep")]
    keep: bool,

    /// Force overwriting output files
    #[clap(short = 'f', long = "force")]
    force: bool,

    /// Suppress noncritical messages
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Be verbose. Repeat for more (-vvvv is trace level)
    #[clap(short = 'v', long = "verbose", parse(from_occurrences))]
    verbose: u8,

    /// Only decode the first of several concatenated streams
    #[clap(long = "single-stream")]
    single_stream: bool,
}

/// Define all user settable options to control program behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BzOpts {
    /// Names of files to read for input. Empty means standard input.
    pub files: Vec<String>,
    /// Silently overwrite existing files with the same name
    pub force_overwrite: bool,
    /// Don't remove input files after processing
    pub keep_input_files: bool,
    /// Decompress/Test
    pub op_mode: Mode,
    /// Location where output is sent
    pub output: Output,
    /// Decode every stream of a concatenated file
    pub multi_stream: bool,
    /// Verbosity of user information
    pub verbose: Verbosity,
}

impl BzOpts {
    pub fn new() -> Self {
        Self {
            files: vec![],
            force_overwrite: false,
            keep_input_files: false,
            op_mode: Mode::Unzip,
            output: Output::File,
            multi_stream: true,
            verbose: Verbosity::Errors,
        }
    }
}

impl Default for BzOpts {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Args> for BzOpts {
    fn from(args: Args) -> Self {
        let verbose = if args.quiet {
            Verbosity::Quiet
        } else {
            match args.verbose {
                0 => Verbosity::Errors,
                1 => Verbosity::Warnings,
                2 => Verbosity::Info,
                3 => Verbosity::Debug,
                _ => Verbosity::Trace,
            }
        };
        // Without files there is nowhere to write but standard out.
        let output = if args.stdout || args.files.is_empty() {
            Output::Stdout
        } else {
            Output::File
        };
        Self {
            files: args.files,
            force_overwrite: args.force,
            keep_input_files: args.keep,
            op_mode: if args.test { Mode::Test } else { Mode::Unzip },
            output,
            multi_stream: !args.single_stream,
            verbose,
        }
    }
}

/// Parse the command line and set the log level to match.
pub fn bzopts_init() -> BzOpts {
    let opts = BzOpts::from(Args::parse());
    log::set_max_level(opts.verbose.level_filter());

    info!("---- Bunzip2 Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Output sent to {}", opts.output);
    if opts.force_overwrite {
        info!("Forcing file overwriting")
    };
    if opts.keep_input_files {
        info!("Keeping input files")
    };
    info!("---- Bunzip2 Initialization End ----\n");
    opts
}
