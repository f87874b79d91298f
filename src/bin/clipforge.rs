use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use clipforge::{
    ClipforgeError, CustomizationRequest, GenerationRequest, RenderConfig, RenderSession,
    SessionOpts, Template,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a customization request against a template.
    Validate(CustomizeArgs),
    /// Apply a customization request and print the derived scene graph.
    Customize(CustomizeArgs),
    /// Like `customize`, reduced for quick previews.
    Preview(CustomizeArgs),
    /// List customizable elements and their edit schema.
    Options(TemplateArgs),
    /// Render a template (optionally customized) to a video or HTML preview.
    Render(RenderArgs),
    /// Build a template from a generation request.
    Synthesize(SynthesizeArgs),
}

#[derive(Parser, Debug)]
struct TemplateArgs {
    /// Template scene graph JSON.
    #[arg(long)]
    template: PathBuf,
}

#[derive(Parser, Debug)]
struct CustomizeArgs {
    /// Template scene graph JSON.
    #[arg(long)]
    template: PathBuf,

    /// Customization request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Template scene graph JSON.
    #[arg(long)]
    template: PathBuf,

    /// Optional customization request JSON.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Output video path; a degraded render writes `<stem>.html` next to it.
    #[arg(long)]
    out: PathBuf,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Quality label recorded in the result.
    #[arg(long, default_value = "medium")]
    quality: String,

    /// Render only the capped preview.
    #[arg(long, default_value_t = false)]
    preview: bool,

    /// Render frames on a single thread.
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Override rayon worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct SynthesizeArgs {
    /// Generation request JSON.
    #[arg(long)]
    request: PathBuf,

    /// Write JSON here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Customize(args) => cmd_customize(args, false),
        Command::Preview(args) => cmd_customize(args, true),
        Command::Options(args) => cmd_options(args),
        Command::Render(args) => cmd_render(args),
        Command::Synthesize(args) => cmd_synthesize(args),
    }
}

fn load(template: &Path, request: &Path) -> anyhow::Result<(Template, CustomizationRequest)> {
    let t = Template::from_path(template)?;
    let r = CustomizationRequest::from_path(request)?;
    Ok((t, r))
}

fn emit(value: &impl serde::Serialize, out: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, json)
                .with_context(|| format!("write '{}'", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("write stdout")?;
        }
    }
    Ok(())
}

fn cmd_validate(args: CustomizeArgs) -> anyhow::Result<()> {
    let (template, req) = load(&args.template, &args.request)?;
    let report = clipforge::validate(&template, &req);
    emit(&report, args.out.as_deref())?;
    if !report.is_valid {
        anyhow::bail!("customization has {} error(s)", report.errors.len());
    }
    Ok(())
}

fn cmd_customize(args: CustomizeArgs, preview: bool) -> anyhow::Result<()> {
    let (template, req) = load(&args.template, &args.request)?;
    let report = clipforge::validate(&template, &req);
    if !report.is_valid {
        return Err(clipforge::ClipforgeError::Rejected(report).into());
    }
    for w in &report.warnings {
        tracing::warn!("{w}");
    }
    let derived = if preview {
        clipforge::preview(&template, &req)?
    } else {
        clipforge::customize(&template, &req)?
    };
    emit(&derived, args.out.as_deref())
}

fn cmd_options(args: TemplateArgs) -> anyhow::Result<()> {
    let template = Template::from_path(&args.template)?;
    let elements = clipforge::customizable_elements(&template)?;
    emit(&elements, None)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let template = Template::from_path(&args.template)?;
    let req = match &args.request {
        Some(p) => CustomizationRequest::from_path(p)?,
        None => CustomizationRequest::default(),
    };

    let mut opts = SessionOpts::from_env();
    opts.compositor.parallel = !args.sequential;
    if args.threads.is_some() {
        opts.compositor.threads = args.threads;
    }
    if !clipforge::encode::is_ffmpeg_available(&opts.encoder.ffmpeg_bin) {
        tracing::info!(
            bin = %opts.encoder.ffmpeg_bin.display(),
            "ffmpeg not available; output will be an HTML preview"
        );
    }
    let session = RenderSession::new(opts);

    let (derived, report) = if args.preview {
        let report = clipforge::validate(&template, &req);
        if !report.is_valid {
            return Err(ClipforgeError::Rejected(report).into());
        }
        (clipforge::preview(&template, &req)?, report)
    } else {
        let customized = clipforge::customize_validated(&template, &req)?;
        (customized.template, customized.report)
    };
    for w in &report.warnings {
        tracing::warn!("{w}");
    }
    let config = RenderConfig {
        fps: args.fps,
        quality: args.quality.clone(),
        ..RenderConfig::for_template(&derived)
    };
    let record = session.render(&derived, &config, &args.out)?;
    emit(&record, None)
}

fn cmd_synthesize(args: SynthesizeArgs) -> anyhow::Result<()> {
    let f = std::fs::File::open(&args.request)
        .with_context(|| format!("open '{}'", args.request.display()))?;
    let req: GenerationRequest = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parse generation request '{}'", args.request.display()))?;
    let template = clipforge::synthesize(&req);
    emit(&template, args.out.as_deref())
}
