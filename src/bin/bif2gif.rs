use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use bif2gif::{
    BifFile, ExtractOptions, GifOptions, LastFrameEnd, ProgressCallback, ProgressInfo,
    TimingSelection,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const DEFAULT_OUTPUT: &str = "./animated.gif";

const CLI_AFTER_HELP: &str = "Examples:\n  bif2gif thumbnails.bif\n  bif2gif thumbnails.bif --out preview.gif --width 320 --progress\n  bif2gif info thumbnails.bif --json\n  bif2gif validate thumbnails.bif --last-frame-end terminal\n  bif2gif extract thumbnails.bif --out frames\n  bif2gif completions zsh > _bif2gif";

#[derive(Debug, Parser)]
#[command(
    name = "bif2gif",
    version,
    about = "Convert Roku BIF trick-mode thumbnails into an animated GIF",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    /// Input .bif file to convert.
    input: Option<PathBuf>,

    /// Output GIF path.
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Scale the animation to this width (height keeps the aspect ratio).
    #[arg(long)]
    width: Option<u32>,

    /// GIF quantizer speed, 1 (best) to 30 (fastest).
    #[arg(long, default_value_t = 10)]
    speed: i32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while converting or extracting.
    #[arg(long, global = true)]
    progress: bool,

    /// Allow writing into an existing output directory.
    #[arg(long, global = true)]
    overwrite: bool,

    /// Timing interpretation (auto, fixed, variable).
    #[arg(long, global = true)]
    timing: Option<String>,

    /// Where the last frame ends (buffer, terminal).
    #[arg(long, global = true)]
    last_frame_end: Option<String>,

    /// Delay in milliseconds for a frame with no next timestamp.
    #[arg(long, global = true)]
    fallback_delay: Option<u32>,

    /// Fail instead of warning on an unsupported BIF version.
    #[arg(long, global = true)]
    strict: bool,

    /// Worker thread count for parallel decoding.
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print container metadata.
    #[command(
        about = "Print BIF metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  bif2gif info thumbnails.bif\n  bif2gif info thumbnails.bif --json"
    )]
    Info {
        /// Input .bif file.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Walk the whole index and report problems.
    #[command(about = "Validate a BIF file")]
    Validate {
        /// Input .bif file.
        input: PathBuf,
    },

    /// Write every raw frame payload into a directory.
    #[command(
        about = "Extract raw thumbnails",
        after_help = "Examples:\n  bif2gif extract thumbnails.bif --out frames"
    )]
    Extract {
        /// Input .bif file.
        input: PathBuf,
        /// Output directory for the extracted images.
        #[arg(long)]
        out: PathBuf,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_timing(value: &str) -> Option<TimingSelection> {
    match value.to_ascii_lowercase().as_str() {
        "auto" => Some(TimingSelection::Auto),
        "fixed" | "interval" | "fixed-interval" => Some(TimingSelection::FixedInterval),
        "variable" | "timestamp" | "variable-timestamp" => {
            Some(TimingSelection::VariableTimestamp)
        }
        _ => None,
    }
}

fn parse_last_frame_end(value: &str) -> Option<LastFrameEnd> {
    match value.to_ascii_lowercase().as_str() {
        "buffer" | "eof" | "end-of-buffer" => Some(LastFrameEnd::EndOfBuffer),
        "terminal" | "sentinel" | "terminal-entry" => Some(LastFrameEnd::TerminalEntry),
        _ => None,
    }
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "rayon")]
    {
        if let Some(threads) = global.threads.filter(|&threads| threads > 0) {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build_global()?;
        }
    }

    #[cfg(not(feature = "rayon"))]
    {
        if global.threads.is_some() {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                "--threads requires building with the `rayon` feature".yellow()
            );
        }
    }

    Ok(())
}

fn base_extract_options(
    global: &GlobalOptions,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new().with_strict_version(global.strict);

    if let Some(timing) = &global.timing {
        let selection =
            parse_timing(timing).ok_or(format!("unsupported --timing mode: {timing}"))?;
        options = options.with_timing(selection);
    }

    if let Some(end) = &global.last_frame_end {
        let convention =
            parse_last_frame_end(end).ok_or(format!("unsupported --last-frame-end: {end}"))?;
        options = options.with_last_frame_end(convention);
    }

    if let Some(delay) = global.fallback_delay {
        options = options.with_fallback_delay(delay);
    }

    Ok(options)
}

fn ensure_writable_dir(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if !overwrite {
            return Err(format!(
                "output directory already exists: {} (use --overwrite)",
                path.display()
            )
            .into());
        }
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("writing into existing directory {}", path.display()).yellow()
        );
    }
    Ok(())
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_length(u64::from(info.frame_count));
        self.bar.set_position(u64::from(info.frames_done));
        if let Some(frame) = &info.last_frame {
            self.bar.set_message(format!("#{} {} ms", frame.index, frame.delay_ms));
        }
    }
}

fn with_progress(
    options: ExtractOptions,
    enabled: bool,
) -> Result<(ExtractOptions, Option<Arc<TerminalProgress>>), Box<dyn std::error::Error>> {
    if !enabled {
        return Ok((options, None));
    }
    let progress = Arc::new(TerminalProgress::new()?);
    Ok((options.with_progress(progress.clone()), Some(progress)))
}

fn convert(cli: &Cli, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading BIF file...");
    let bif = BifFile::open(input)?;
    println!("Images count: {}", bif.header().frame_count);

    let (options, progress) =
        with_progress(base_extract_options(&cli.global)?, cli.global.progress)?;

    let mut gif_options = GifOptions::new().speed(cli.speed);
    if let Some(width) = cli.width {
        gif_options = gif_options.width(width);
    }

    if cli.out.exists() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            format!("overwriting {}", cli.out.display()).yellow()
        );
    }

    let summary = bif.export_gif_with_options(&cli.out, &gif_options, &options)?;
    if let Some(progress) = progress {
        progress.bar.finish_with_message("done");
    }

    if summary.frame_count == 0 {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "container holds no frames; nothing written".yellow()
        );
        return Ok(());
    }

    println!(
        "{} {}",
        "success:".green().bold(),
        format!(
            "Wrote {} frame(s), {}x{}, {:.2}s to {}",
            summary.frame_count,
            summary.width,
            summary.height,
            summary.duration.as_secs_f64(),
            cli.out.display()
        )
        .green()
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    apply_global_options(&cli.global)?;

    match &cli.command {
        None => {
            let input = cli
                .input
                .as_deref()
                .ok_or("missing <INPUT> .bif file (see --help)")?;
            convert(&cli, input)?;
        }
        Some(Commands::Info { input, json }) => {
            let bif = BifFile::open(input)?;
            let options = base_extract_options(&cli.global)?;
            let metadata = bif.metadata_with_options(&options)?;
            let dimensions = if metadata.frame_count > 0 {
                bif.frame_with_options(0, &options)
                    .and_then(|frame| frame.dimensions())
                    .ok()
            } else {
                None
            };

            if *json {
                let payload = json!({
                    "version": metadata.version,
                    "frame_count": metadata.frame_count,
                    "timestamp_multiplier": metadata.timestamp_multiplier,
                    "timing_mode": metadata.timing_mode.to_string(),
                    "duration_seconds": metadata.duration.as_secs_f64(),
                    "file_size": metadata.file_size,
                    "has_terminal_entry": metadata.has_terminal_entry,
                    "width": dimensions.map(|(width, _)| width),
                    "height": dimensions.map(|(_, height)| height),
                    "warnings": metadata
                        .warnings
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("Version: {}", metadata.version);
                println!("Frames: {}", metadata.frame_count);
                println!("Timing: {}", metadata.timing_mode);
                println!("Duration: {:.2}s", metadata.duration.as_secs_f64());
                println!("Size: {} bytes", metadata.file_size);
                if let Some((width, height)) = dimensions {
                    println!("Dimensions: {width}x{height}");
                }
                if metadata.has_terminal_entry {
                    println!("Terminal entry: present");
                }
            }
        }
        Some(Commands::Validate { input }) => {
            let bif = BifFile::open(input)?;
            let options = base_extract_options(&cli.global)?;
            let report = bif.validate_with_options(&options);
            print!("{report}");
            if !report.is_valid() {
                return Err(format!("{} is not a valid BIF file", input.display()).into());
            }
        }
        Some(Commands::Extract { input, out }) => {
            ensure_writable_dir(out, cli.global.overwrite)?;
            let bif = BifFile::open(input)?;
            let (options, progress) =
                with_progress(base_extract_options(&cli.global)?, cli.global.progress)?;

            let written = bif.save_frames(out, &options)?;
            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }

            if cli.global.verbose {
                for path in &written {
                    eprintln!("saved {}", path.display());
                }
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Extracted {} frame(s) to {}", written.len(), out.display()).green()
            );
        }
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "bif2gif", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
