use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use spritepress_core::config::{BuildOptions, OutputFormat};
use spritepress_core::model::Atlas;
use spritepress_core::pipeline::{BuildGroup, build_atlases, decode_sprites};
use tracing::info;
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "spritepress",
    about = "Pack folders of images into texture atlases",
    version,
    author
)]
struct Cli {
    // Input/Output
    /// Root directories to search for sprites; each becomes one build group
    #[arg(required = true, help_heading = "Input/Output")]
    roots: Vec<PathBuf>,
    /// Glob applied to paths below each root
    #[arg(
        long,
        default_value = "**/*.{png,jpg,jpeg,bmp,gif,tga}",
        help_heading = "Input/Output"
    )]
    glob: String,
    /// Directory the atlases land in, and the prefix recorded in `meta.image`
    #[arg(short, long, default_value = "atlases", help_heading = "Input/Output")]
    out_dir: String,
    /// Root directory the out-dir is created under
    #[arg(long, default_value = ".", help_heading = "Input/Output")]
    dest: PathBuf,
    /// YAML config file; its values override the atlas option flags
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,

    // Atlas
    /// Output format: png | jpeg
    #[arg(short, long, default_value = "png", help_heading = "Atlas")]
    format: String,
    /// Empty pixels kept between frames
    #[arg(long, default_value_t = 1, help_heading = "Atlas")]
    margin: u32,
    /// Maximum atlas width/height; another atlas opens past this size
    #[arg(long, default_value_t = 4096, help_heading = "Atlas")]
    max_size: u32,
    /// Drop file extensions from frame names
    #[arg(long, default_value_t = false, help_heading = "Atlas")]
    strip_extensions: bool,

    // Trim
    /// Trim transparent sprite borders
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Trim")]
    trim: bool,
    /// Alpha tolerance for trimming (0..=1)
    #[arg(long, default_value_t = 0.0, help_heading = "Trim")]
    trim_tolerance: f32,

    // Sizing
    /// Round atlas dimensions up to powers of two
    #[arg(long, default_value_t = false, help_heading = "Sizing")]
    pow2: bool,
    /// Force square atlases
    #[arg(long, default_value_t = false, help_heading = "Sizing")]
    square: bool,
    /// Size every atlas to max-size instead of shrinking to content
    #[arg(long, default_value_t = false, help_heading = "Sizing")]
    no_smart_size: bool,

    // Logging/UX
    /// Show progress bars (disable with --progress=false or --quiet)
    #[arg(long, default_value_t = true, action = ArgAction::Set, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(short, long, default_value_t = false, help_heading = "Logging/UX")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    run(&cli)
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let options = resolve_options(cli)?;
    let glob = compile_glob(&cli.glob)?;

    let mut groups = Vec::with_capacity(cli.roots.len());
    for root in &cli.roots {
        let paths = gather_paths(root, &glob)?;
        info!(root = %root.display(), files = paths.len(), "resolved sprite files");
        let inputs = read_files_with_progress(&paths, cli.progress && !cli.quiet)?;
        let sources = decode_sprites(inputs)?;
        groups.push(BuildGroup {
            name: group_name(root),
            sources,
            options: options.clone(),
        });
    }

    let atlases = build_atlases(groups)?;
    write_atlases(&cli.dest, &atlases)?;
    info!(atlases = atlases.len(), "build complete");
    Ok(())
}

fn resolve_options(cli: &Cli) -> anyhow::Result<BuildOptions> {
    let mut options = BuildOptions {
        format: cli.format.parse::<OutputFormat>()?,
        out_dir: cli.out_dir.clone(),
        margin: cli.margin,
        strip_extensions: cli.strip_extensions,
        max_size: cli.max_size,
        trim: cli.trim,
        trim_tolerance: cli.trim_tolerance,
        ..BuildOptions::default()
    };
    options.packer.power_of_two = cli.pow2;
    options.packer.square = cli.square;
    options.packer.smart_size = !cli.no_smart_size;

    if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        options = y.into_build_options(options)?;
    }

    options.validate()?;
    Ok(options)
}

fn compile_glob(pattern: &str) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    b.add(Glob::new(pattern).with_context(|| format!("invalid glob `{pattern}`"))?);
    Ok(b.build()?)
}

/// Walk one root and return the matching files, sorted so the build sees
/// a stable order regardless of directory traversal quirks.
fn gather_paths(root: &Path, glob: &GlobSet) -> anyhow::Result<Vec<PathBuf>> {
    let mut list: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        let p = entry.path();
        if !p.is_file() {
            continue;
        }
        let rel = p.strip_prefix(root).unwrap_or(p);
        let rel = rel.to_string_lossy().replace('\\', "/");
        if glob.is_match(&rel) {
            list.push(p.to_path_buf());
        }
    }
    list.sort();
    Ok(list)
}

fn group_name(root: &Path) -> String {
    root.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.to_string_lossy().replace('\\', "/"))
}

fn read_files_with_progress(
    paths: &[PathBuf],
    progress: bool,
) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} reading {pos}/{len} [{elapsed_precise}] {wide_msg}",
            )
            .unwrap(),
        );
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        let bytes = fs::read(p).with_context(|| format!("read {}", p.display()))?;
        let key = p.to_string_lossy().replace('\\', "/");
        list.push((key, bytes));
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn write_atlases(dest: &Path, atlases: &[Atlas]) -> anyhow::Result<()> {
    for atlas in atlases {
        let image_path = dest.join(atlas.file_name());
        if let Some(parent) = image_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&image_path, &atlas.image)
            .with_context(|| format!("write {}", image_path.display()))?;

        let json_path = image_path.with_extension("json");
        let json = serde_json::to_string_pretty(&atlas.json)?;
        fs::write(&json_path, json)
            .with_context(|| format!("write {}", json_path.display()))?;

        info!(
            image = %atlas.file_name(),
            frames = atlas.json.frames.len(),
            "atlas written"
        );
    }
    Ok(())
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    format: Option<String>,
    out_dir: Option<String>,
    margin: Option<u32>,
    strip_extensions: Option<bool>,
    max_size: Option<u32>,
    trim: Option<bool>,
    trim_tolerance: Option<f32>,
    power_of_two: Option<bool>,
    square: Option<bool>,
    smart_size: Option<bool>,
}

impl YamlConfig {
    fn into_build_options(self, mut opts: BuildOptions) -> anyhow::Result<BuildOptions> {
        if let Some(v) = self.format {
            opts.format = v.parse::<OutputFormat>()?;
        }
        if let Some(v) = self.out_dir {
            opts.out_dir = v;
        }
        if let Some(v) = self.margin {
            opts.margin = v;
        }
        if let Some(v) = self.strip_extensions {
            opts.strip_extensions = v;
        }
        if let Some(v) = self.max_size {
            opts.max_size = v;
        }
        if let Some(v) = self.trim {
            opts.trim = v;
        }
        if let Some(v) = self.trim_tolerance {
            opts.trim_tolerance = v;
        }
        if let Some(v) = self.power_of_two {
            opts.packer.power_of_two = v;
        }
        if let Some(v) = self.square {
            opts.packer.square = v;
        }
        if let Some(v) = self.smart_size {
            opts.packer.smart_size = v;
        }
        Ok(opts)
    }
}
