mod cli;

use castforged::{config, inspect, MediaClassifier};
use castforged_avc::{CompatibilityVerdict, H264Metadata, Level, MediaInput};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "castforged=trace,castforged_av=debug,castforged_avc=debug,castforged_formats=debug"
                .to_string()
        } else {
            "castforged=info,castforged_av=info,castforged_avc=warn,castforged_formats=warn"
                .to_string()
        }
    });

    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Format { value, json } => classify_format(&value, json),
        Commands::Subtitle { value, codec, json } => classify_subtitle(&value, codec, json),
        Commands::Formats { json } => list_formats(json),
        Commands::Subtitles { json } => list_subtitles(json),
        Commands::H264 {
            file,
            width,
            height,
            level,
            ref_frames,
            no_probe,
            json,
        } => {
            let request = H264Request {
                file,
                width,
                height,
                level,
                ref_frames,
                no_probe,
            };
            check_h264(request, cli.config.as_deref(), json)
        }
        Commands::Inspect { file, json } => inspect_file(&file, cli.config.as_deref(), json),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("castforged {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn classify_format(value: &str, json: bool) -> Result<()> {
    let classifier = MediaClassifier::build()?;
    let descriptor = classifier
        .classify_format(value)
        .or_else(|| classifier.classify_file(value))
        .with_context(|| format!("Unknown format: {}", value))?;

    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("Format: {}", descriptor.identifier);
    println!("Description: {}", descriptor.description);
    println!("Category: {}", descriptor.category);
    if let Some(kind) = descriptor.media_kind() {
        println!("Media kind: {}", kind);
    }
    println!("Extensions: {}", descriptor.extensions.join(", "));
    println!("MIME type: {}", descriptor.mime_type_or_default());
    println!("Transcodable: {}", if descriptor.transcodable { "yes" } else { "no" });
    if let Some(secondary) = classifier.formats().secondary(descriptor) {
        println!("Secondary format: {}", secondary.identifier);
    }

    Ok(())
}

fn classify_subtitle(value: &str, by_signature: bool, json: bool) -> Result<()> {
    let classifier = MediaClassifier::build()?;
    let descriptor = classifier.classify_subtitle(value, by_signature);

    if json {
        println!("{}", serde_json::to_string_pretty(descriptor)?);
        return Ok(());
    }

    println!("Subtitle type: {}", descriptor.subtitle_type);
    println!("Description: {}", descriptor.description);
    println!("Stable index: {}", descriptor.stable_index);
    println!("Category: {}", descriptor.category);
    if !descriptor.extensions.is_empty() {
        println!("Extensions: {}", descriptor.extensions.join(", "));
    }

    Ok(())
}

fn list_formats(json: bool) -> Result<()> {
    let classifier = MediaClassifier::build()?;
    let formats = classifier.formats();

    if json {
        let all: Vec<_> = formats.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{:<12} {:<10} {:<6} EXTENSIONS", "FORMAT", "CATEGORY", "XCODE");
    for d in formats.iter() {
        println!(
            "{:<12} {:<10} {:<6} {}",
            d.identifier.as_str(),
            d.category.to_string(),
            if d.transcodable { "yes" } else { "no" },
            d.extensions.join(",")
        );
    }
    println!("\n{} formats, {} extensions", formats.len(), formats.extensions().len());

    Ok(())
}

fn list_subtitles(json: bool) -> Result<()> {
    let classifier = MediaClassifier::build()?;
    let subtitles = classifier.subtitles();

    if json {
        let all: Vec<_> = subtitles.iter().collect();
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{:<5} {:<12} {:<10} EXTENSIONS", "INDEX", "TYPE", "CATEGORY");
    for d in subtitles.iter() {
        println!(
            "{:<5} {:<12} {:<10} {}",
            d.stable_index,
            d.subtitle_type.to_string(),
            d.category.to_string(),
            d.extensions.join(",")
        );
    }

    Ok(())
}

struct H264Request {
    file: PathBuf,
    width: Option<u32>,
    height: Option<u32>,
    level: Option<Level>,
    ref_frames: Option<i32>,
    no_probe: bool,
}

impl H264Request {
    fn reads_stdin(&self) -> bool {
        self.file.as_os_str() == "-"
    }

    fn apply_overrides(&self, mut metadata: H264Metadata) -> H264Metadata {
        if let Some(width) = self.width {
            metadata.width = width;
        }
        if let Some(height) = self.height {
            metadata.height = height;
        }
        if let Some(level) = self.level {
            metadata.level = Some(level);
        }
        if let Some(ref_frames) = self.ref_frames {
            metadata.ref_frames = ref_frames;
        }
        metadata
    }
}

fn check_h264(request: H264Request, config_path: Option<&Path>, json: bool) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if request.no_probe {
        config.probe.enabled = false;
    }

    let classifier = Arc::new(MediaClassifier::from_config(&config)?);

    let stdin_data = if request.reads_stdin() {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stream from stdin")?;
        Some(bytes::Bytes::from(buf))
    } else {
        None
    };

    let rt = tokio::runtime::Runtime::new()?;
    let (metadata, verdict) = rt.block_on(async {
        let metadata = match stdin_data {
            Some(data) => {
                let (Some(width), Some(height)) = (request.width, request.height) else {
                    anyhow::bail!("--width and --height are required when reading from stdin");
                };
                request.apply_overrides(H264Metadata::new(MediaInput::Stream(data), width, height))
            }
            None => h264_metadata_for_file(&request, &config).await?,
        };

        let verdict = inspect::evaluate(classifier, &config, metadata.clone()).await?;
        Ok::<_, anyhow::Error>((metadata, verdict))
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
    } else {
        print_verdict(&metadata, &verdict);
    }

    Ok(())
}

async fn h264_metadata_for_file(request: &H264Request, config: &config::Config) -> Result<H264Metadata> {
    let path = request.file.as_path();
    if !path.exists() {
        anyhow::bail!("File does not exist: {:?}", path);
    }

    if let (Some(width), Some(height)) = (request.width, request.height) {
        return Ok(request.apply_overrides(H264Metadata::new(path, width, height)));
    }

    let media = inspect::probe_media(config, path)
        .await?
        .context("ffprobe is not available; pass --width and --height")?;

    let metadata = media
        .h264_metadata(path)
        .with_context(|| format!("No H.264 video stream in {:?}", path))?;

    Ok(request.apply_overrides(metadata))
}

fn print_verdict(metadata: &H264Metadata, verdict: &CompatibilityVerdict) {
    let unknown = || "unknown".to_string();

    println!("Input: {}", metadata.input);
    println!("Resolution: {}x{}", metadata.width, metadata.height);
    println!(
        "Level: {}",
        verdict.level.map(|l| l.to_string()).unwrap_or_else(unknown)
    );
    println!(
        "Reference frames: {}",
        verdict
            .reference_frame_count
            .map(|r| r.to_string())
            .unwrap_or_else(unknown)
    );
    if let Some(max) = verdict.max_reference_frames_for_resolution {
        println!("Max reference frames: {}", max);
    }
    println!("Result: {}", verdict);
}

fn inspect_file(file: &Path, config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let classifier = Arc::new(MediaClassifier::from_config(&config)?);

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(inspect::inspect_file(classifier, &config, file))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("File: {}", report.path.display());
    match &report.format {
        Some(format) => println!(
            "Format: {} ({}, {}{})",
            format.identifier,
            format.category,
            format.mime_type,
            if format.transcodable { ", transcodable" } else { "" }
        ),
        None => println!("Format: unknown"),
    }

    if let Some(sub) = &report.external_subtitle {
        println!("Subtitle file: {} [{}] (index {})", sub.subtitle_type, sub.category, sub.stable_index);
    }

    if let Some(container) = &report.container {
        println!("Container: {}", container);
    }

    if let Some(video) = &report.video {
        print!("Video: {} {}x{}", video.codec, video.width, video.height);
        if let Some(level) = video.level {
            print!(", level {}", level);
        }
        if video.ref_frames > 0 {
            print!(", {} ref frames", video.ref_frames);
        }
        println!();
    }

    println!("\nSubtitle Tracks: {}", report.subtitles.len());
    for sub in &report.subtitles {
        print!("  [{}] {} -> {} [{}]", sub.stream_index.unwrap_or_default(), sub.source, sub.subtitle_type, sub.category);
        if let Some(ref lang) = sub.language {
            print!(" ({})", lang);
        }
        println!();
    }

    if let Some(verdict) = &report.h264 {
        println!("\nH.264: {}", verdict);
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = [
        castforged_av::check_tool_at("ffmpeg", config.tools.ffmpeg_path.as_deref()),
        castforged_av::check_tool_at("ffprobe", config.tools.ffprobe_path.as_deref()),
    ];
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Stream inspection and bitstream probing need ffprobe and ffmpeg.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let warnings = config::validate_config(&config)?;

    println!("✓ Configuration is valid");
    println!("  Probe enabled: {}", config.probe.enabled);
    println!("  Probe timeout: {}s", config.probe.timeout_secs);
    println!("  H.264 level threshold: {}", config.h264.level_threshold);
    println!("  H.264 DPB pixel budget: {}", config.h264.dpb_pixel_budget);
    for warning in &warnings {
        println!("  ⚠ {}", warning);
    }

    Ok(())
}
