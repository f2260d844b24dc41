//! CLI for VidGen - text-to-video generation via AI APIs.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use vidgen::video::{Resolution, VideoGenerationRequest, VideoProviderKind, VideoStyle};
use vidgen::{Config, FileHandler, VideoGenerator};

#[derive(Parser)]
#[command(name = "vidgen")]
#[command(about = "Generate short videos from text prompts (Runway, Pika, Stable Video)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a video from a text prompt
    Generate(GenerateArgs),

    /// List providers and whether they are configured
    Providers,

    /// Probe a provider's API connectivity
    Check(CheckArgs),

    /// List previously generated videos
    List,
}

#[derive(Args)]
struct GenerateArgs {
    /// The text prompt describing the video (at least 10 characters)
    prompt: String,

    /// Provider to use
    #[arg(short, long, value_enum, default_value = "runway")]
    provider: ProviderArg,

    /// Video duration in seconds (5-10)
    #[arg(short, long, default_value_t = 7)]
    duration: u32,

    /// Visual style
    #[arg(short, long, value_enum, default_value = "realistic")]
    style: StyleArg,

    /// Resolution (e.g., 1024x576)
    #[arg(long)]
    resolution: Option<String>,

    /// Override the output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct CheckArgs {
    /// Provider to probe; probes all configured providers when omitted
    #[arg(short, long, value_enum)]
    provider: Option<ProviderArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ProviderArg {
    Runway,
    Pika,
    #[value(name = "stable-video")]
    StableVideo,
}

impl From<ProviderArg> for VideoProviderKind {
    fn from(arg: ProviderArg) -> Self {
        match arg {
            ProviderArg::Runway => VideoProviderKind::Runway,
            ProviderArg::Pika => VideoProviderKind::Pika,
            ProviderArg::StableVideo => VideoProviderKind::StableVideo,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Realistic,
    Animated,
    Cinematic,
    Abstract,
}

impl From<StyleArg> for VideoStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Realistic => VideoStyle::Realistic,
            StyleArg::Animated => VideoStyle::Animated,
            StyleArg::Cinematic => VideoStyle::Cinematic,
            StyleArg::Abstract => VideoStyle::Abstract,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("vidgen=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Generate(args) => generate(args, &config, cli.json).await?,
        Commands::Providers => providers(&config, cli.json)?,
        Commands::Check(args) => check(args, &config, cli.json).await?,
        Commands::List => list(&config, cli.json)?,
    }

    Ok(())
}

async fn generate(args: GenerateArgs, config: &Config, json_output: bool) -> anyhow::Result<()> {
    let mut config = config.clone();
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }

    let mut request = VideoGenerationRequest::new(&args.prompt)
        .with_duration(args.duration)
        .with_style(args.style.into());

    if let Some(ref res) = args.resolution {
        let resolution = Resolution::parse(res)
            .ok_or_else(|| anyhow::anyhow!("unsupported resolution: {res}"))?;
        request = request.with_resolution(resolution);
    }

    let generator = VideoGenerator::new(&config);
    let files = FileHandler::new(&config)?;

    if config.is_demo_mode() {
        eprintln!("No API keys configured - running in demo mode");
    }

    let kind: VideoProviderKind = args.provider.into();
    let (path, metadata) = generator.generate_to_file(&request, kind, &files).await?;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": path.display().to_string(),
            "size_bytes": std::fs::metadata(&path)?.len(),
            "demo_mode": metadata.demo_mode,
            "model": metadata.model,
            "generation_ms": metadata.generation_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("Generated video: {}", path.display());
        if metadata.demo_mode {
            println!("Note: this is a demo placeholder, not real provider output");
        }
        if let Some(ms) = metadata.generation_ms {
            println!("Generation time: {}ms", ms);
        }
    }

    Ok(())
}

fn providers(config: &Config, json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ProviderLine {
        kind: String,
        name: &'static str,
        description: &'static str,
        max_duration_secs: u32,
        configured: bool,
    }

    let lines: Vec<ProviderLine> = VideoProviderKind::ALL
        .into_iter()
        .map(|kind| {
            let info = VideoGenerator::provider_info(kind);
            ProviderLine {
                kind: kind.to_string(),
                name: info.name,
                description: info.description,
                max_duration_secs: info.max_duration_secs,
                configured: config.has_valid_key(kind),
            }
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else {
        println!("Providers:\n");
        for line in &lines {
            let status = if line.configured { "✓" } else { "✗" };
            println!("  {} {} ({})", status, line.name, line.kind);
            println!("    {} (max {}s)", line.description, line.max_duration_secs);
        }
        if config.is_demo_mode() {
            println!("\nNo API keys configured - demo mode is active");
        }
    }

    Ok(())
}

async fn check(args: CheckArgs, config: &Config, json_output: bool) -> anyhow::Result<()> {
    let generator = VideoGenerator::new(config);

    let kinds: Vec<VideoProviderKind> = match args.provider {
        Some(p) => vec![p.into()],
        None => generator.available_providers(),
    };

    let mut results = serde_json::Map::new();
    for kind in kinds {
        let ok = generator.test_connection(kind).await;
        if json_output {
            results.insert(kind.to_string(), serde_json::Value::Bool(ok));
        } else {
            let status = if ok { "ok" } else { "unreachable" };
            println!("{}: {}", kind, status);
        }
    }

    if json_output {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }

    Ok(())
}

fn list(config: &Config, json_output: bool) -> anyhow::Result<()> {
    let files = FileHandler::new(config)?;
    let videos = files.list_videos()?;

    if json_output {
        let lines: Vec<serde_json::Value> = videos
            .iter()
            .map(|v| {
                serde_json::json!({
                    "filename": v.filename,
                    "path": v.path.display().to_string(),
                    "size_bytes": v.size_bytes,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&lines)?);
    } else if videos.is_empty() {
        println!("No generated videos in {}", files.output_dir().display());
    } else {
        for v in &videos {
            println!("{}  ({} bytes)", v.filename, v.size_bytes);
        }
    }

    Ok(())
}
