use crate::archive::{extract_archive, is_zip};
use crate::dispatch::{select_for, ReconstructionPlan};
use crate::error::{DcmvolError, Result};
use crate::series::{resolve, OutputNamer, SeriesDescriptor};
use crate::suv::rescale_series;
use crate::types::TimeBasis;
use crate::volume::{NiftiWriter, VolumeWriter};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Extension of derived output names unless configured otherwise
pub const DEFAULT_EXT: &str = ".nii.gz";

/// Options of one conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Directory tree or `.zip` archive of DICOM files
    pub input: PathBuf,

    /// Output file of the first series; later series derive from it
    pub output: Option<PathBuf>,

    /// Directory receiving derived output names
    pub outdir: Option<PathBuf>,

    /// Parent of the archive extraction directory
    pub tmpdir: Option<PathBuf>,

    /// Extension of derived output names
    pub ext: String,

    /// Requested output compression
    pub compress: bool,

    /// Continue with the next series after a series fails
    pub keep_going: bool,

    /// Calendar interpretation of DICOM date and time values
    pub time_basis: TimeBasis,
}

impl ConvertConfig {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
            outdir: None,
            tmpdir: None,
            ext: DEFAULT_EXT.to_string(),
            compress: false,
            keep_going: false,
            time_basis: TimeBasis::default(),
        }
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_outdir(mut self, outdir: Option<PathBuf>) -> Self {
        self.outdir = outdir;
        self
    }

    pub fn with_tmpdir(mut self, tmpdir: Option<PathBuf>) -> Self {
        self.tmpdir = tmpdir;
        self
    }

    pub fn with_ext(mut self, ext: impl Into<String>) -> Self {
        self.ext = ext.into();
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn with_time_basis(mut self, time_basis: TimeBasis) -> Self {
        self.time_basis = time_basis;
        self
    }

    /// Directory that receives the outputs
    ///
    /// An explicit output file decides on its own: its parent directory is
    /// used and `outdir` is ignored. Otherwise `outdir`, falling back to the
    /// directory containing the input.
    pub fn resolve_outdir(&self) -> PathBuf {
        if let Some(output) = &self.output {
            if let Some(outdir) = &self.outdir {
                warn!(
                    "Ignoring outdir {} since an output file was given",
                    outdir.display()
                );
            }
            return parent_or_current(output);
        }

        match &self.outdir {
            Some(outdir) => outdir.clone(),
            None => parent_or_current(&self.input),
        }
    }
}

fn parent_or_current(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Result of one converted series
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOutcome {
    pub series_uid: String,
    pub description: Option<String>,
    pub output: PathBuf,
    pub plan: ReconstructionPlan,

    /// Whether the series went through SUV rescaling
    pub suv_applied: bool,

    pub file_count: usize,
}

/// A series that could not be converted
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFailure {
    pub series_uid: String,
    pub reason: String,
}

/// Outcome of a conversion run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionSummary {
    pub converted: Vec<SeriesOutcome>,
    pub failed: Vec<SeriesFailure>,
}

impl ConversionSummary {
    /// Whether every discovered series was converted
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of series seen
    pub fn series_count(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

/// Converts every series of a DICOM input into a volume file
///
/// Series are handled one after another in discovery order. A PET series
/// is first rescaled to SUV on disk, then reconstructed.
///
/// # Example
///
/// ```no_run
/// use dcmvol_core::{ConvertConfig, Converter};
///
/// let config = ConvertConfig::new("/data/study.zip").with_compress(true);
/// let summary = Converter::new(config).run().unwrap();
/// for series in &summary.converted {
///     println!("{} -> {}", series.series_uid, series.output.display());
/// }
/// ```
pub struct Converter<W: VolumeWriter = NiftiWriter> {
    config: ConvertConfig,
    writer: W,
}

impl Converter<NiftiWriter> {
    /// Creates a converter writing NIfTI volumes
    pub fn new(config: ConvertConfig) -> Self {
        Self::with_writer(config, NiftiWriter::new())
    }
}

impl<W: VolumeWriter> Converter<W> {
    pub fn with_writer(config: ConvertConfig, writer: W) -> Self {
        Self { config, writer }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Runs the conversion
    ///
    /// A zip input is extracted into a temporary directory that is removed
    /// when the run ends, whether or not it succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input or output directory does not exist
    /// - The archive cannot be extracted
    /// - A series fails and `keep_going` is not set
    pub fn run(&self) -> Result<ConversionSummary> {
        let input = &self.config.input;
        if !input.exists() {
            return Err(DcmvolError::InputNotFound(input.clone()));
        }

        let outdir = self.config.resolve_outdir();
        if !outdir.is_dir() {
            return Err(DcmvolError::OutputDirNotFound(outdir));
        }

        if is_zip(input) {
            let extracted = extract_archive(input, self.config.tmpdir.as_deref())?;
            self.convert_directory(extracted.path(), &outdir)
        } else {
            self.convert_directory(input, &outdir)
        }
    }

    /// Converts every series found under `root` into `outdir`
    pub fn convert_directory(&self, root: &Path, outdir: &Path) -> Result<ConversionSummary> {
        let series = resolve(root)?;
        let namer = OutputNamer::new(self.config.output.clone(), outdir, self.config.ext.as_str());

        let mut summary = ConversionSummary::default();
        for (index, descriptor) in series.iter().enumerate() {
            match self.convert_series(index + 1, descriptor, &namer) {
                Ok(outcome) => summary.converted.push(outcome),
                Err(e) if self.config.keep_going => {
                    error!("Series {} failed: {}", descriptor.series_uid, e);
                    summary.failed.push(SeriesFailure {
                        series_uid: descriptor.series_uid.clone(),
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(summary)
    }

    fn convert_series(
        &self,
        ordinal: usize,
        series: &SeriesDescriptor,
        namer: &OutputNamer,
    ) -> Result<SeriesOutcome> {
        let output = namer.output_path(ordinal, series)?;
        info!(
            "Converting series {} ({} file(s)) to {}",
            series.series_uid,
            series.file_paths.len(),
            output.display()
        );

        // Every file is rescaled before any pixel data is read
        let suv_applied = series.is_pet();
        if suv_applied {
            rescale_series(&series.file_paths, self.config.time_basis)?;
        }

        let image = series.probe()?;
        let plan = select_for(&image, self.config.compress)?;
        self.writer
            .reconstruct_and_write(&series.file_paths, &output, &plan)?;

        Ok(SeriesOutcome {
            file_count: series.file_paths.len(),
            series_uid: series.series_uid.clone(),
            description: series.description.clone(),
            output,
            plan,
            suv_applied,
        })
    }
}
