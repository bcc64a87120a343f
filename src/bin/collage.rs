use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use sha2::Digest as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "collage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a project and export the flattened photo as a PNG.
    Render(RenderArgs),
    /// Print diagnostics about a font file (family name + SHA-256 of font bytes).
    Font(FontArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Font file used for overlay text. Falls back to `COLLAGE_FONT_PATH`.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Text size at overlay scale 1, in display points. Overrides the project and
    /// `COLLAGE_FONT_SIZE_PX`.
    #[arg(long)]
    font_size: Option<f32>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,

    /// Render on a background worker thread.
    #[arg(long)]
    background: bool,

    /// Refuse to replace an existing output file.
    #[arg(long)]
    no_overwrite: bool,
}

#[derive(Parser, Debug)]
struct FontArgs {
    /// Font file (TTF/OTF).
    #[arg(long)]
    font: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Font(args) => cmd_font(args),
    }
}

fn make_backend(
    choice: BackendChoice,
    settings: &collage::RenderSettings,
) -> anyhow::Result<Box<dyn collage::CompositeBackend>> {
    let kind = match choice {
        BackendChoice::Cpu => collage::BackendKind::Cpu,
    };

    Ok(collage::create_backend(kind, settings)?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut project = collage::load_project(&args.in_path)?;
    project.style = project.style.with_env_overrides();
    if let Some(px) = args.font_size {
        project.style.base_font_size_px = px;
    }

    let mut settings = collage::RenderSettings::from_env()?;
    if let Some(path) = &args.font {
        settings.font = Some(collage::load_font(path)?);
    }

    let root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut session = project
        .open_session(root)
        .with_context(|| format!("replay project '{}'", args.in_path.display()))?;

    let mut sink = collage::PngFileSink::new(&args.out);
    if args.no_overwrite {
        sink = sink.no_overwrite();
    }

    let report = if args.background {
        let job = session.begin_export()?;
        let handle = job.spawn(settings)?;
        let ticket = handle.ticket();
        session.complete_export(ticket, handle.join(), &mut sink)?
    } else {
        let mut backend = make_backend(args.backend, &settings)?;
        session.export(backend.as_mut(), &mut sink)?
    };

    eprintln!(
        "wrote {} ({}x{}, {} overlays)",
        args.out.display(),
        report.width,
        report.height,
        report.overlays
    );
    Ok(())
}

fn cmd_font(args: FontArgs) -> anyhow::Result<()> {
    let font = collage::load_font(&args.font)?;
    println!("font:    {}", args.font.display());
    println!("family:  {}", font.family);
    println!("sha256:  {}", sha256_hex(&font.bytes));
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
