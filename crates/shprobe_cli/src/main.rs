//! shprobe CLI
//!
//! Bake ambient lighting spherical harmonics from cubemap face images.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use shprobe_core::{
    decode_rgbm, Color, ColorSpace, Cubemap, CubemapFace, Projection, ShProjector,
    SH_CHANNELS, SH_L2_COUNT,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod faces;

use config::{OutputFormat, ShprobeConfig, CONFIG_FILE};

#[derive(Parser)]
#[command(name = "shprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cubemap to spherical harmonics baker", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a cubemap into L2 spherical harmonics
    Bake {
        /// Directory containing shprobe.toml and the face images
        #[arg(default_value = ".")]
        dir: String,

        /// Mip level to project (overrides config)
        #[arg(short, long)]
        mip: Option<u32>,

        /// Lighting color space (overrides config)
        #[arg(short, long, value_enum)]
        color_space: Option<ColorSpaceArg>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (overrides config, "-" for stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Show cubemap size, mip chain and per-face mean color
    Inspect {
        /// Directory containing shprobe.toml and the face images
        #[arg(default_value = ".")]
        dir: String,
    },

    /// Write a default shprobe.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        dir: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorSpaceArg {
    Linear,
    Gamma,
}

impl From<ColorSpaceArg> for ColorSpace {
    fn from(arg: ColorSpaceArg) -> Self {
        match arg {
            ColorSpaceArg::Linear => ColorSpace::Linear,
            ColorSpaceArg::Gamma => ColorSpace::Gamma,
        }
    }
}

/// Baked coefficients with the parameters that produced them
#[derive(Serialize)]
struct BakeOutput {
    mip_level: u32,
    face_size: u32,
    color_space: ColorSpace,
    weight_sum: f32,
    coefficients: [[f32; SH_CHANNELS]; SH_L2_COUNT],
}

impl BakeOutput {
    fn new(mip_level: u32, color_space: ColorSpace, projection: &Projection) -> Self {
        Self {
            mip_level,
            face_size: projection.size,
            color_space,
            weight_sum: projection.weight_sum,
            coefficients: *projection.coefficients.as_array(),
        }
    }

    fn render(&self, format: OutputFormat) -> Result<String> {
        Ok(match format {
            OutputFormat::Json => serde_json::to_string_pretty(self)?,
            OutputFormat::Toml => toml::to_string_pretty(self)?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Bake {
            dir,
            mip,
            color_space,
            format,
            output,
        } => cmd_bake(&dir, mip, color_space.map(Into::into), format, output.as_deref()),

        Commands::Inspect { dir } => cmd_inspect(&dir),

        Commands::Init { dir } => cmd_init(&dir),
    }
}

fn load(dir: &Path, config: &ShprobeConfig) -> Result<Cubemap> {
    let cubemap = faces::load_cubemap(dir, &config.faces)?.with_generated_mips();
    info!(
        "Loaded {}x{} cubemap with {} mip levels",
        cubemap.base_size(),
        cubemap.base_size(),
        cubemap.mip_count()
    );
    Ok(cubemap)
}

fn cmd_bake(
    dir: &str,
    mip: Option<u32>,
    color_space: Option<ColorSpace>,
    format: Option<OutputFormat>,
    output: Option<&str>,
) -> Result<()> {
    let path = PathBuf::from(dir);
    let config = ShprobeConfig::load_from_dir(&path)?;

    let mut settings = config.projection;
    if let Some(level) = mip {
        settings.mip_level = level;
    }
    if let Some(space) = color_space {
        settings.color_space = space;
    }
    let format = format.unwrap_or(config.output.format);

    let cubemap = load(&path, &config)?;
    let projector = ShProjector::new(settings);
    if !projector.supports(&cubemap) {
        anyhow::bail!(
            "Mip level {} not available: a {}x{} cubemap has levels 0..={}",
            settings.mip_level,
            cubemap.base_size(),
            cubemap.base_size(),
            cubemap.mip_count() - 1
        );
    }

    info!(
        "Projecting mip {} ({}x{}) in {} space",
        settings.mip_level,
        cubemap.mip_size(settings.mip_level),
        cubemap.mip_size(settings.mip_level),
        settings.color_space
    );
    let projection = projector.project_with_stats(&cubemap);
    debug!(
        "Weight sum {} normalization {}",
        projection.weight_sum, projection.normalization
    );

    let rendered =
        BakeOutput::new(settings.mip_level, settings.color_space, &projection).render(format)?;

    let target = match output {
        Some("-") => None,
        Some(p) => Some(PathBuf::from(p)),
        None => config.output.path.as_ref().map(|p| path.join(p)),
    };
    match target {
        Some(out) => {
            fs::write(&out, rendered)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!("Coefficients written to {}", out.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn cmd_inspect(dir: &str) -> Result<()> {
    let path = PathBuf::from(dir);
    let config = ShprobeConfig::load_from_dir(&path)?;
    let cubemap = load(&path, &config)?;

    println!("Face size:  {}x{}", cubemap.base_size(), cubemap.base_size());
    println!("Mip levels: {}", cubemap.mip_count());
    for (level, mip) in cubemap.mips().iter().enumerate() {
        println!("  mip {:>2}: {}x{}", level, mip.size(), mip.size());
    }

    println!();
    println!("Mean decoded color per face:");
    let base = &cubemap.mips()[0];
    for face in CubemapFace::ALL {
        let decoded: Vec<Color> = base.face(face).iter().map(|c| decode_rgbm(*c)).collect();
        let mean = Color::average(&decoded);
        println!(
            "  {:<10} ({:.4}, {:.4}, {:.4})  {}",
            face.name(),
            mean.r,
            mean.g,
            mean.b,
            config.faces.path(face)
        );
    }

    Ok(())
}

fn cmd_init(dir: &str) -> Result<()> {
    let path = PathBuf::from(dir);
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    fs::create_dir_all(&path)?;
    ShprobeConfig::default().save_to_dir(&path)?;
    info!("Created {}", config_path.display());

    Ok(())
}
