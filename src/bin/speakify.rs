use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speakify", version, about = "Convert an image into a looping GIF")]
struct Cli {
    /// Input image (png, jpeg, gif, webp or bmp).
    #[arg(long, short = 'i')]
    input: PathBuf,

    /// Output GIF path. Defaults to `<input stem>_speakify.gif` next to the input.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Grid resolution (output width in pixels).
    #[arg(long, default_value_t = 128)]
    resolution: u32,

    /// Number of output frames.
    #[arg(long, default_value_t = 100)]
    frames: u32,

    /// Resolution mapping; overrides the config file.
    #[arg(long, value_enum)]
    shape: Option<ShapeChoice>,

    /// Engine options as JSON (see `ConvertOpts`); missing fields take defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print conversion stats as JSON on stdout.
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` applies otherwise.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ShapeChoice {
    Square,
    Aspect,
}

impl From<ShapeChoice> for speakify::GridShape {
    fn from(c: ShapeChoice) -> Self {
        match c {
            ShapeChoice::Square => Self::Square,
            ShapeChoice::Aspect => Self::PreserveAspect,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = load_opts(cli.config.as_deref(), cli.shape)?;
    let input = std::fs::read(&cli.input)
        .with_context(|| format!("read input '{}'", cli.input.display()))?;

    let mut engine = speakify::Engine::new(opts).context("engine options")?;
    let (gif, stats) = engine
        .convert_with_stats(&input, cli.resolution, cli.frames)
        .with_context(|| format!("convert '{}'", cli.input.display()))?;

    let out = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output(&cli.input));
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out, &gif).with_context(|| format!("write gif '{}'", out.display()))?;

    tracing::info!(
        frames = stats.output_frames,
        dims = %stats.output_dims,
        palette = stats.palette_len,
        bytes = stats.output_bytes,
        "converted"
    );
    if cli.stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_opts(
    config: Option<&Path>,
    shape: Option<ShapeChoice>,
) -> anyhow::Result<speakify::ConvertOpts> {
    let mut opts = match config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            speakify::ConvertOpts::from_json(&json)
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => speakify::ConvertOpts::default(),
    };
    if let Some(shape) = shape {
        opts.shape = shape.into();
    }
    Ok(opts)
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_owned());
    input.with_file_name(format!("{stem}_speakify.gif"))
}
