mod args;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use args::{ParamAssign, ParamRef, selection};
use clap::{Args, Parser, Subcommand};
use mods::form::{VideoStyle, VideoType};
use mods::{Locale, ModError};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use vidmod::config::{ConfigError, ConfigOverrides};
use vidmod::project::{read_project, read_upload, write_data_uri, write_project};
use vidmod::{ApiError, Backend, HttpBackend, Panel, PanelConfig, PanelError, PreviewState};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Mod(#[from] ModError),
    #[error("mod `{0}` is not in the catalog")]
    UnknownMod(String),
    #[error("--image is required")]
    MissingImage,
    #[error("preview failed: {0}")]
    Preview(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "vidmod", about = "Mod panel CLI for the vidmod video backend")]
struct Cli {
    /// Backend origin; overrides `VIDMOD_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// `en` or `ru`; overrides `VIDMOD_LOCALE`.
    #[arg(long)]
    locale: Option<Locale>,

    /// Overrides `VIDMOD_REQUEST_TIMEOUT_SECS`.
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Overrides `VIDMOD_CONNECT_TIMEOUT_SECS`.
    #[arg(long)]
    connect_timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the mod catalog as JSON.
    Mods,
    /// Render one preview frame.
    Preview(PreviewArgs),
    /// Generate a video.
    Generate(InputArgs),
    History(HistoryCommand),
    Project(ProjectCommand),
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(long)]
    audio: Option<PathBuf>,

    /// Video name; defaults to the audio file name.
    #[arg(long)]
    name: Option<String>,

    /// `YouTube` or `Shorts`.
    #[arg(long = "type")]
    video_type: Option<String>,

    /// `black` or `blur`.
    #[arg(long)]
    style: Option<String>,

    /// Output folder; overrides `VIDMOD_SAVE_FOLDER`.
    #[arg(long)]
    save_folder: Option<String>,

    /// Select a mod with its defaults (repeatable).
    #[arg(long = "mod")]
    mods: Vec<String>,

    /// Set a parameter: MOD.PARAM=VALUE (repeatable).
    #[arg(long = "param")]
    params: Vec<ParamAssign>,

    /// Upload a file parameter: MOD.PARAM=FILE (repeatable).
    #[arg(long = "param-file")]
    param_files: Vec<ParamAssign>,

    /// Trigger a button parameter before the request: MOD.PARAM (repeatable).
    #[arg(long)]
    press: Vec<ParamRef>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Where to write the preview image.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct HistoryCommand {
    #[command(subcommand)]
    command: HistorySubcommand,
}

#[derive(Subcommand, Debug)]
enum HistorySubcommand {
    Clear,
    Delete { path: String },
}

#[derive(Args, Debug)]
struct ProjectCommand {
    #[command(subcommand)]
    command: ProjectSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProjectSubcommand {
    Save {
        #[arg(long)]
        out: PathBuf,
        #[command(flatten)]
        inputs: InputArgs,
    },
    Load {
        file: PathBuf,
        #[arg(long)]
        preview_out: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        generate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PanelConfig::from_env()?.with_overrides(ConfigOverrides {
        base_url: cli.base_url,
        locale: cli.locale,
        request_timeout_secs: cli.request_timeout_secs,
        connect_timeout_secs: cli.connect_timeout_secs,
    })?;
    let backend = Arc::new(HttpBackend::new(&config)?);

    match cli.command {
        Command::Mods => {
            let mods = backend.list_mods().await?;
            print_json(&mods)
        }
        Command::Preview(args) => run_preview(&config, backend, args).await,
        Command::Generate(inputs) => run_generate(&config, backend, inputs).await,
        Command::History(history) => run_history(backend, history).await,
        Command::Project(project) => run_project(&config, backend, project).await,
    }
}

async fn run_preview(config: &PanelConfig, backend: Arc<HttpBackend>, args: PreviewArgs) -> Result<(), CliError> {
    if args.inputs.image.is_none() {
        return Err(CliError::MissingImage);
    }
    let mut panel = prepare_panel(config, backend, &args.inputs).await?;
    let result = save_preview(&panel, &args.out).await;
    flush_notifications(&mut panel);
    let written = result?;
    println!("{} ({written} bytes)", args.out.display());
    Ok(())
}

async fn run_generate(config: &PanelConfig, backend: Arc<HttpBackend>, inputs: InputArgs) -> Result<(), CliError> {
    let mut panel = prepare_panel(config, backend, &inputs).await?;
    let result = panel.generate().await;
    flush_notifications(&mut panel);
    print_json(&result?)
}

async fn run_history(backend: Arc<HttpBackend>, history: HistoryCommand) -> Result<(), CliError> {
    let reply = match history.command {
        HistorySubcommand::Clear => backend.clear_history().await?,
        HistorySubcommand::Delete { path } => backend.delete_video(&path).await?,
    };
    print_json(&reply)
}

async fn run_project(config: &PanelConfig, backend: Arc<HttpBackend>, project: ProjectCommand) -> Result<(), CliError> {
    match project.command {
        ProjectSubcommand::Save { out, inputs } => {
            let mut panel = prepare_panel(config, backend, &inputs).await?;
            let project = panel.save_project();
            write_project(&out, &project).await?;
            flush_notifications(&mut panel);
            println!("{}", out.display());
            Ok(())
        }
        ProjectSubcommand::Load { file, preview_out, generate } => {
            let project = read_project(&file).await?;
            let mut panel = Panel::new(backend, config.locale);
            panel.load_catalog().await?;
            let loaded = panel.load_project(project).await;
            flush_notifications(&mut panel);
            for name in loaded? {
                eprintln!("dropped mod `{name}`: not in the current catalog");
            }
            if let Some(out) = preview_out {
                let written = save_preview(&panel, &out).await?;
                println!("{} ({written} bytes)", out.display());
            }
            if generate {
                let result = panel.generate().await;
                flush_notifications(&mut panel);
                print_json(&result?)?;
            }
            Ok(())
        }
    }
}

/// Build a panel from command-line inputs: catalog, mods, parameters, form
/// fields, then media. The image goes last so its preview sees everything.
async fn prepare_panel(config: &PanelConfig, backend: Arc<HttpBackend>, inputs: &InputArgs) -> Result<Panel, CliError> {
    let mut panel = Panel::new(backend, config.locale);
    panel.load_catalog().await?;

    let refs = inputs
        .params
        .iter()
        .chain(&inputs.param_files)
        .map(|a| &a.target)
        .chain(&inputs.press);
    let names = selection(&inputs.mods, refs);
    if let Some(unknown) = panel.apply_selection(&names).into_iter().next() {
        return Err(CliError::UnknownMod(unknown));
    }

    for assign in &inputs.params {
        let index = position(&panel, &assign.target)?;
        panel.set_param_input(index, &assign.target.param, &assign.value)?;
    }
    for assign in &inputs.param_files {
        let index = position(&panel, &assign.target)?;
        let file = read_upload(Path::new(&assign.value)).await?;
        panel.upload_mod_file(index, &assign.target.param, file).await?;
    }
    for target in &inputs.press {
        let index = position(&panel, target)?;
        if let Some(message) = panel.press_button(index, &target.param).await? {
            tracing::info!(module = %target.module, param = %target.param, %message, "button pressed");
        }
    }

    let form = panel.form_mut();
    if let Some(name) = &inputs.name {
        form.video_name.clone_from(name);
    }
    if let Some(video_type) = &inputs.video_type {
        form.video_type = VideoType::from(video_type.clone());
    }
    if let Some(style) = &inputs.style {
        form.video_style = VideoStyle::from(style.clone());
    }
    form.save_folder = inputs.save_folder.clone().unwrap_or_else(|| config.save_folder.clone());

    if let Some(path) = &inputs.audio {
        panel.set_audio(read_upload(path).await?).await?;
    }
    if let Some(path) = &inputs.image {
        panel.set_image(read_upload(path).await?).await?;
    }
    Ok(panel)
}

fn position(panel: &Panel, target: &ParamRef) -> Result<usize, CliError> {
    panel
        .session()
        .position(&target.module)
        .ok_or_else(|| CliError::UnknownMod(target.module.clone()))
}

async fn save_preview(panel: &Panel, out: &Path) -> Result<usize, CliError> {
    match panel.preview() {
        PreviewState::Ready(uri) => Ok(write_data_uri(out, uri).await?),
        PreviewState::Failed(message) => Err(CliError::Preview(message.clone())),
        PreviewState::Placeholder | PreviewState::Loading => Err(CliError::MissingImage),
    }
}

fn flush_notifications(panel: &mut Panel) {
    for notification in panel.drain_notifications() {
        eprintln!("{}", notification.text);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
