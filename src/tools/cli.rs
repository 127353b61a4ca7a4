use std::io;
use std::path::{Path, PathBuf};
use std::{fmt::Display, fmt::Formatter};

use clap::{ArgGroup, Parser};
use log::info;

/// Default number of compressed bytes the decoder holds at once.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Compress or Decompress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Compress,
    Decompress,
}
impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Defines all user settable options to control program behavior
#[derive(Debug, Clone)]
pub struct CtOpts {
    /// Compress/Decompress
    pub op_mode: Mode,
    /// File to read
    pub input: PathBuf,
    /// File to write. The dictionary sidecar is kept beside the compressed file.
    pub output: PathBuf,
    /// Bytes of compressed data the decoder reads at a time
    pub chunk_size: usize,
}

impl CtOpts {
    pub fn new(op_mode: Mode, input: PathBuf, output: PathBuf) -> Self {
        Self {
            op_mode,
            input,
            output,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// The compressed file of this run, which is the one the sidecar belongs to.
    pub fn artifact(&self) -> &Path {
        match self.op_mode {
            Mode::Compress => &self.output,
            Mode::Decompress => &self.input,
        }
    }
}

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Constrained time-crunch compression for market data tick files",
    long_about = "
    Losslessly compresses comma separated tick records
    (ticker,exchange,side,condition,sendTime,recvTime,price,size) into a dense bitstream.
    The dictionary needed to decompress is written next to the compressed file as a hidden
    .<name>.ctcd file and must travel with it."
)]
#[clap(group(ArgGroup::new("mode").required(true).args(&["compress", "decompress"])))]
pub struct Args {
    /// Compress the input file into the output file
    #[clap(short = 'c', long = "compress")]
    compress: bool,

    /// Decompress the input file into the output file
    #[clap(short = 'd', long = "decompress")]
    decompress: bool,

    /// The file to read as input
    #[clap()]
    input: PathBuf,

    /// The file to write as output
    #[clap()]
    output: PathBuf,

    /// Bytes of compressed data to decode at a time
    #[clap(long = "chunk-size", default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Sets verbosity. -v0 is silent, -v5 is chatty
    #[clap(short = 'v', default_value_t = 3)]
    v: u8,
}

/// Parse the command line into CtOpts and set the log level.
pub fn ct_opts_init() -> io::Result<CtOpts> {
    opts_from_args(Args::parse())
}

/// Copy command line settings into our internal structure and report them.
fn opts_from_args(args: Args) -> io::Result<CtOpts> {
    // Set the log level
    match args.v {
        0 => log::set_max_level(log::LevelFilter::Off),
        1 => log::set_max_level(log::LevelFilter::Error),
        2 => log::set_max_level(log::LevelFilter::Warn),
        3 => log::set_max_level(log::LevelFilter::Info),
        4 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    };

    if args.chunk_size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "Chunk size must be at least one byte.",
        ));
    }

    let op_mode = if args.decompress {
        Mode::Decompress
    } else {
        Mode::Compress
    };
    let mut opts = CtOpts::new(op_mode, args.input, args.output);
    opts.chunk_size = args.chunk_size;

    // Below we report initialization status to the user
    info!("---- Timecrunch Initialization Start ----");
    info!("Verbosity set to {}", log::max_level());
    info!("Operational mode set to {}", opts.op_mode);
    info!("Getting input from the file {}", opts.input.display());
    info!("Sending output to the file {}", opts.output.display());
    if opts.op_mode == Mode::Decompress {
        info!("Chunk size set to {} bytes", opts.chunk_size);
    }
    info!("---- Timecrunch Initialization End ----\n");
    Ok(opts)
}

#[cfg(test)]
mod test {
    use super::{opts_from_args, Args, Mode, DEFAULT_CHUNK_SIZE};
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn compress_args_test() {
        let args = Args::try_parse_from(["timecrunch", "-c", "ticks.csv", "ticks.ct"]).unwrap();
        let opts = opts_from_args(args).unwrap();
        assert_eq!(opts.op_mode, Mode::Compress);
        assert_eq!(opts.input, Path::new("ticks.csv"));
        assert_eq!(opts.output, Path::new("ticks.ct"));
        assert_eq!(opts.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(opts.artifact(), Path::new("ticks.ct"));
    }

    #[test]
    fn decompress_args_test() {
        let args = Args::try_parse_from([
            "timecrunch",
            "--decompress",
            "--chunk-size",
            "7",
            "ticks.ct",
            "ticks.csv",
        ])
        .unwrap();
        let opts = opts_from_args(args).unwrap();
        assert_eq!(opts.op_mode, Mode::Decompress);
        assert_eq!(opts.chunk_size, 7);
        assert_eq!(opts.artifact(), Path::new("ticks.ct"));
    }

    #[test]
    fn mode_is_required_test() {
        assert!(Args::try_parse_from(["timecrunch", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["timecrunch", "-c", "-d", "a", "b"]).is_err());
        assert!(Args::try_parse_from(["timecrunch", "-c", "a"]).is_err());
    }

    #[test]
    fn zero_chunk_size_test() {
        let args =
            Args::try_parse_from(["timecrunch", "-d", "--chunk-size", "0", "a", "b"]).unwrap();
        assert_eq!(
            opts_from_args(args).unwrap_err().kind(),
            std::io::ErrorKind::InvalidInput
        );
    }
}
