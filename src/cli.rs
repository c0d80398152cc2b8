// ============================================================================
// FilterLab CLI — headless front end over the transform engine
// ============================================================================
//
// Usage examples:
//   filterlab -i photo.png --op edges -o edges.png
//   filterlab -i photo.jpg --op blur --kernel-size 8            (k=9 after odd coercion)
//   filterlab -i "shots/*.jpg" --op contours --output-dir out/ --histogram-csv
//   filterlab -i photo.png --config params.json --histogram-plot
//
// All processing runs synchronously, one file after another.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::config::{RunConfig, load_config};
use crate::engine::{OperationKind, ParameterSet};
use crate::io::SaveFormat;
use crate::session::Session;

/// Size of the rendered histogram plot.
const PLOT_WIDTH: u32 = 256;
const PLOT_HEIGHT: u32 = 160;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FilterLab headless image processor.
#[derive(Parser, Debug)]
#[command(
    name = "filterlab",
    about = "Apply a classic image operation and export the result with its brightness histogram",
    long_about = "Apply one of: identity, grayscale, blur, edges, contours, erode, dilate.\n\
                  Reads and writes PNG, JPEG, BMP, TGA, TIFF, WEBP.\n\n\
                  Example:\n  \
                  filterlab --input photo.png --op edges --threshold1 50 --threshold2 150 -o edges.png\n  \
                  filterlab -i *.jpg --op erode --kernel-size 7 --output-dir out/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Operation name. Unknown names fall back to identity.
    #[arg(long = "op", value_name = "NAME")]
    pub operation: Option<String>,

    /// Low edge threshold (0–255).
    #[arg(long, value_name = "0-255", allow_negative_numbers = true)]
    pub threshold1: Option<i64>,

    /// High edge threshold (0–255).
    #[arg(long, value_name = "0-255", allow_negative_numbers = true)]
    pub threshold2: Option<i64>,

    /// Blur / morphology kernel size (1–31, even values are rounded up).
    #[arg(short, long, value_name = "1-31", allow_negative_numbers = true)]
    pub kernel_size: Option<i64>,

    /// JSON file with operation, params and output settings.
    #[arg(short, long, value_name = "FILE.json")]
    pub config: Option<PathBuf>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Output directory. Required when more than one input is given.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, bmp, tga, tiff, webp.
    /// When omitted, inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, value_name = "1-100", allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Also write `<output>.hist.csv` with the 256 histogram bins.
    #[arg(long)]
    pub histogram_csv: bool,

    /// Also write `<output>.hist.png` with a plot of the histogram.
    #[arg(long)]
    pub histogram_plot: bool,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Everything a single file needs, resolved once from flags + config.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub operation: OperationKind,
    pub params: ParameterSet,
    pub format: SaveFormat,
    pub quality: u8,
    pub histogram_csv: bool,
    pub histogram_plot: bool,
    pub verbose: bool,
}

impl RunSettings {
    /// Flags take precedence over the config file, which takes precedence
    /// over defaults. Fails only on a `--format` that names no known format.
    pub fn resolve(args: &CliArgs, config: &RunConfig) -> Result<Self, String> {
        let format = match args.format.as_deref() {
            Some(f) => SaveFormat::from_name(f).ok_or_else(|| {
                format!("unknown output format '{}' (expected png, jpeg, bmp, tga, tiff or webp)", f)
            })?,
            None => match (&args.output, config.format()) {
                (Some(out), _) => SaveFormat::from_path(out),
                (None, Some(f)) => f,
                (None, None) => SaveFormat::Png,
            },
        };
        let operation = config.resolve_operation(args.operation.as_deref());

        if args.quality.is_some() && !format.supports_quality() {
            log_warn!("--quality ignored: {:?} output is lossless", format);
        }
        if (args.threshold1.is_some() || args.threshold2.is_some()) && !operation.uses_thresholds() {
            log_warn!("--threshold1/--threshold2 have no effect on '{}'", operation);
        }
        if args.kernel_size.is_some() && !operation.uses_kernel() {
            log_warn!("--kernel-size has no effect on '{}'", operation);
        }

        Ok(Self {
            operation,
            params: config.resolve_params(args.threshold1, args.threshold2, args.kernel_size),
            format,
            quality: config.quality(args.quality),
            histogram_csv: args.histogram_csv,
            histogram_plot: args.histogram_plot,
            verbose: args.verbose,
        })
    }
}

/// Per-file outcome counts of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = a setup error or one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    match run_batch(&args) {
        Ok(summary) if summary.failed == 0 => ExitCode::SUCCESS,
        Ok(summary) => {
            eprintln!("{} of {} file(s) failed.", summary.failed, summary.succeeded + summary.failed);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            log_err!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Validate the arguments, then process every input in order.
///
/// `Err` means nothing was processed; per-file failures are counted in the
/// summary and processing continues with the next file.
pub fn run_batch(args: &CliArgs) -> Result<BatchSummary, String> {
    let config = match &args.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => RunConfig::default(),
    };

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        return Err("no input files matched the given pattern(s).".to_string());
    }

    if inputs.len() > 1 && args.output_dir.is_none() {
        return Err(format!(
            "{} input files given; batch processing requires --output-dir.",
            inputs.len()
        ));
    }

    let settings = RunSettings::resolve(args, &config)?;

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir).map_err(|e| {
            format!("could not create output directory '{}': {}", dir.display(), e)
        })?;
    }

    log_info!(
        "CLI run: {} file(s), op={}, params={:?}, format={:?}",
        inputs.len(),
        settings.operation,
        settings.params,
        settings.format
    );

    let total = inputs.len();
    let multi = total > 1;
    let mut summary = BatchSummary::default();

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || settings.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }

        let file_start = Instant::now();

        let Some(output_path) = build_output_path(
            input_path,
            args.output.as_deref(),
            args.output_dir.as_deref(),
            settings.operation,
            settings.format,
        ) else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            summary.failed += 1;
            continue;
        };

        match run_one(input_path, &output_path, &settings) {
            Ok(()) => {
                summary.succeeded += 1;
                if settings.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                eprintln!("  error: {}", e);
                log_err!("{}: {}", input_path.display(), e);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

// ============================================================================
// Per-file processing pipeline
// ============================================================================

/// Load → apply → save (+ optional histogram artifacts) for one file.
pub fn run_one(input: &Path, output: &Path, settings: &RunSettings) -> Result<(), String> {
    let mut session = Session::new(settings.operation, settings.params);

    session
        .open(input)
        .map_err(|e| format!("load failed: {}", e))?;

    session
        .export_with(output, settings.format, settings.quality)
        .map_err(|e| format!("save failed: {}", e))?;

    let Some(result) = session.result() else {
        return Err("no result produced".to_string());
    };

    if settings.histogram_csv {
        let path = sidecar_path(output, "hist.csv");
        result
            .histogram
            .write_csv(&path)
            .map_err(|e| format!("histogram write failed ({}): {}", path.display(), e))?;
    }

    if settings.histogram_plot {
        let path = sidecar_path(output, "hist.png");
        result
            .histogram
            .render_plot(PLOT_WIDTH, PLOT_HEIGHT)
            .save(&path)
            .map_err(|e| format!("histogram plot failed ({}): {}", path.display(), e))?;
    }

    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
pub fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (`<dir>/<stem>_<op>.<ext>`)
/// 3. Next to the input as `<stem>_<op>.<ext>`
pub fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    op: OperationKind,
    format: SaveFormat,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let file_name = format!("{}_{}.{}", stem, op.name(), format.extension());

    match output_dir {
        Some(dir) => Some(dir.join(file_name)),
        None => Some(input.parent().unwrap_or(Path::new(".")).join(file_name)),
    }
}

/// `out/edges.png` + `hist.csv` → `out/edges.hist.csv`.
fn sidecar_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output.with_file_name(format!("{}.{}", stem, suffix))
}
