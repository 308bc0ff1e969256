//! Command line front end for the dual letter illusion generator.
//!
//! `duotype render` builds one model and writes `preview.stl` plus the named
//! export into the output directory; `duotype fonts` browses a fonts
//! directory laid out as one subdirectory per family.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use duotype_types::{BaseParams, OutputFormat, PegMask, PegParams, RenderMode, RenderRequest};
use font_index::FontIndex;
use illusion_ops::{CancelToken, RenderService};
use kernel_bridge::{FontOutliner, TruckKernel};
use tracing::debug;

#[derive(Parser)]
#[command(name = "duotype")]
#[command(about = "Dual letter illusion generator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a model and write preview.stl plus the named export
    Render(RenderArgs),

    /// List font families, or one family's variants
    Fonts {
        /// Fonts directory holding one subdirectory per family
        #[arg(long)]
        fonts_dir: PathBuf,

        /// Family whose variants to list; omit to list families
        #[arg(name = "FAMILY")]
        family: Option<String>,
    },
}

#[derive(Args)]
struct RenderArgs {
    /// Text read from the first viewing angle
    #[arg(long)]
    text_a: String,

    /// Text read from the second viewing angle (unused in heart mode)
    #[arg(long, default_value = "")]
    text_b: String,

    /// Font file used directly
    #[arg(long, conflicts_with_all = ["fonts_dir", "family", "style"])]
    font: Option<PathBuf>,

    /// Fonts directory; resolved together with --family/--style
    #[arg(long, requires = "family")]
    fonts_dir: Option<PathBuf>,

    /// Family name inside --fonts-dir
    #[arg(long, requires = "fonts_dir")]
    family: Option<String>,

    /// Style inside the family; defaults to Regular, else the first variant
    #[arg(long)]
    style: Option<String>,

    /// Letter height in model units
    #[arg(long, default_value_t = 20.0)]
    font_size: f64,

    /// Gap between stacked letters as a fraction of the font size
    #[arg(long, default_value_t = 0.3)]
    spacing: f64,

    /// Model kind to build
    #[arg(long, value_enum, default_value_t = ModeArg::Dual)]
    mode: ModeArg,

    /// Named export format
    #[arg(long, value_enum, default_value_t = FormatArg::Stl)]
    format: FormatArg,

    /// File stem of the named export
    #[arg(long, default_value = "file")]
    stem: String,

    /// Directory receiving preview.stl and the named export
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Peg mask, one character per letter pair; 'X' places a peg
    #[arg(long)]
    pegs: Option<String>,

    /// Peg cylinder height above the plate
    #[arg(long, default_value_t = 1.0)]
    peg_height: f64,

    /// Peg cylinder radius
    #[arg(long, default_value_t = 2.0)]
    peg_radius: f64,

    /// Base plate thickness
    #[arg(long, default_value_t = 1.0)]
    base_height: f64,

    /// Margin around the assembly footprint
    #[arg(long, default_value_t = 2.0)]
    base_padding: f64,

    /// Corner fillet radius as a fraction of half the plate width
    #[arg(long, default_value_t = 0.8)]
    base_fillet: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Dual,
    Heart,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Stl,
    Step,
}

fn main() -> Result<()> {
    // INFO by default; RUST_LOG overrides (e.g. RUST_LOG=illusion_ops=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Fonts { fonts_dir, family } => fonts(&fonts_dir, family.as_deref()),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let font_path = resolve_font(&args)?;
    let request = build_request(&args, font_path);

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("cannot create {}", args.out_dir.display()))?;
    let stale = file_export::clean_stale_outputs(&args.out_dir);
    if stale > 0 {
        debug!(count = stale, "removed stale output files");
    }

    let outliner = FontOutliner::from_file(&request.font_path)
        .with_context(|| format!("cannot load font {}", request.font_path.display()))?;
    let mut kernel = TruckKernel::new();
    let service = RenderService::new(&args.out_dir);
    let outcome = service
        .render(&mut kernel, &outliner, &request, &CancelToken::new())
        .context("render failed")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn fonts(fonts_dir: &Path, family: Option<&str>) -> Result<()> {
    let index = FontIndex::new(fonts_dir);
    match family {
        None => {
            for family in index.families()? {
                println!("{family}");
            }
        }
        Some(family) => {
            for variant in index.variants(family)? {
                println!("{}\t{}", variant.label(), variant.path.display());
            }
        }
    }
    Ok(())
}

fn resolve_font(args: &RenderArgs) -> Result<PathBuf> {
    if let Some(path) = &args.font {
        return Ok(path.clone());
    }
    match (&args.fonts_dir, &args.family) {
        (Some(dir), Some(family)) => {
            let path = FontIndex::new(dir).resolve(family, args.style.as_deref())?;
            debug!(family = %family, path = %path.display(), "resolved font");
            Ok(path)
        }
        _ => bail!("pass either --font or --fonts-dir with --family"),
    }
}

fn build_request(args: &RenderArgs, font_path: PathBuf) -> RenderRequest {
    let mut request = RenderRequest::new(&args.text_a, &args.text_b, font_path);
    request.mode = match args.mode {
        ModeArg::Dual => RenderMode::DualText,
        ModeArg::Heart => RenderMode::HeartLamp,
    };
    request.font_size = args.font_size;
    request.spacing_frac = args.spacing;
    request.base = BaseParams {
        height: args.base_height,
        padding: args.base_padding,
        fillet_frac: args.base_fillet,
    };
    request.format = match args.format {
        FormatArg::Stl => OutputFormat::Stl,
        FormatArg::Step => OutputFormat::Step,
    };
    request.output_stem = args.stem.clone();
    if let Some(mask) = &args.pegs {
        request.pegs = Some(PegParams {
            mask: PegMask::new(mask),
            height: args.peg_height,
            radius: args.peg_radius,
        });
    }
    request
}
