pub mod report;

use crate::api::{ConvertConfig, DEFAULT_EXT};
use crate::types::TimeBasis;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dcmvol
#[derive(Parser, Debug)]
#[command(name = "dcmvol")]
#[command(about = "Convert DICOM series to NIfTI volumes, with SUV scaling for PET")]
#[command(version)]
pub struct Cli {
    /// Directory of DICOM files, or a .zip archive of one
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file for the first series; later series get a _(<n>) suffix
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Directory for derived output names (ignored when OUTPUT is given)
    #[arg(long)]
    pub outdir: Option<PathBuf>,

    /// Directory in which zip inputs are extracted
    #[arg(long)]
    pub tmpdir: Option<PathBuf>,

    /// Extension of derived output names
    #[arg(short, long, default_value = DEFAULT_EXT)]
    pub ext: String,

    /// Compress integer volumes
    #[arg(long)]
    pub compress: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Continue with the next series when one fails
    #[arg(long)]
    pub keep_going: bool,

    /// How DICOM dates and times are placed on the calendar for decay correction
    #[arg(long, default_value = "local")]
    pub time_basis: TimeBasisArg,
}

/// Calendar interpretation of DICOM date and time values
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TimeBasisArg {
    /// Local civil time of this machine
    Local,
    /// Wall-clock values taken as UTC, no DST
    Naive,
}

impl From<TimeBasisArg> for TimeBasis {
    fn from(arg: TimeBasisArg) -> Self {
        match arg {
            TimeBasisArg::Local => TimeBasis::Local,
            TimeBasisArg::Naive => TimeBasis::Naive,
        }
    }
}

impl From<&Cli> for ConvertConfig {
    fn from(cli: &Cli) -> Self {
        ConvertConfig::new(&cli.input)
            .with_output(cli.output.clone())
            .with_outdir(cli.outdir.clone())
            .with_tmpdir(cli.tmpdir.clone())
            .with_ext(cli.ext.as_str())
            .with_compress(cli.compress)
            .with_keep_going(cli.keep_going)
            .with_time_basis(cli.time_basis.into())
    }
}
