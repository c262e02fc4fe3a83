use sneakpeek::config::Settings;
use sneakpeek::cue::{TextTrack, TrackKind};
use sneakpeek::geometry::{PointerPosition, ProgressBar};
use sneakpeek::overlay::{Outcome, PlayerEvent, Sneakpeek};
use sneakpeek::parser::Parser;
use sneakpeek::serialiser::{self, CssSurface};

use std::io::{self, Read};

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Resolve the progress bar thumbnail shown for a pointer position")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The WebVTT thumbnail track to read. If not supplied, the track will be read from standard input.",
        default_value = "-"
    )]
    track: String,
    #[arg(
        long,
        value_enum,
        default_value = "metadata",
        help = "The kind of the supplied track. Only metadata tracks carry thumbnails."
    )]
    kind: TrackKind,
    #[arg(long, help = "The label of the supplied track.")]
    label: Option<String>,
    #[arg(short, long, value_name = "SECONDS", help = "Duration of the media.")]
    duration: f64,
    #[arg(long, value_name = "PX", help = "Width of the progress bar.")]
    bar_width: f64,
    #[arg(
        long,
        value_name = "PX",
        default_value_t = 0.0,
        allow_negative_numbers = true,
        help = "Viewport position of the progress bar's left edge."
    )]
    bar_left: f64,
    #[arg(
        short = 'x',
        long,
        value_name = "PX",
        allow_negative_numbers = true,
        help = "Page position of the pointer."
    )]
    pointer_x: f64,
    #[arg(
        long,
        value_name = "PX",
        default_value_t = 0.0,
        allow_negative_numbers = true,
        help = "Horizontal scroll offset of the page."
    )]
    scroll_x: f64,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Read preview settings from a TOML file. Flags take precedence."
    )]
    config: Option<String>,
    #[arg(long, value_name = "PX", help = "Preview width for cues without a region width.")]
    width: Option<f64>,
    #[arg(long, value_name = "PX", help = "Preview height for cues without a region height.")]
    height: Option<f64>,
    #[arg(long, value_name = "PATH", help = "Prefix for sprite sheets that carry a region.")]
    base_path: Option<String>,
    #[arg(
        long,
        value_name = "KEY=VALUE",
        value_parser = parse_param,
        help = "Query parameter appended to image URLs. May be repeated."
    )]
    param: Vec<(String, String)>,
    #[arg(
        long,
        value_name = "LABEL",
        help = "Only use the metadata track with this label."
    )]
    track_label: Option<String>,
    #[arg(
        short,
        long,
        value_name = "URL",
        default_value = "",
        help = "URL of the media; root-relative sprite sheets resolve against its directory."
    )]
    media_src: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write the preview styles to. If not supplied, they will be written to standard output.",
        default_value = "-"
    )]
    output: String,
    #[arg(short, long, action = clap::ArgAction::Count, help = "Log more detail to stderr.")]
    verbose: u8,
}

fn parse_param(param: &str) -> Result<(String, String), String> {
    match param.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", param)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(width) = cli.width {
        settings.width = width;
    }
    if let Some(height) = cli.height {
        settings.height = height;
    }
    if let Some(base_path) = &cli.base_path {
        settings.base_path = base_path.clone();
    }
    if let Some(track_label) = &cli.track_label {
        settings.track_label = Some(track_label.clone());
    }
    settings.url_params.extend(cli.param.iter().cloned());
    settings.validate()?;
    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;

    let data = if cli.track == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.track)
            .context(format!("Failed to open track file: '{}'", cli.track))?
    };

    let mut parser = Parser::new();
    let cues = parser
        .parse(&data)
        .context(format!("Failed to parse track file: '{}'", cli.track))?;
    if cues.is_empty() {
        warn!("the track has no cues; no preview can be shown");
    }

    let mut peek = Sneakpeek::new(settings, cli.media_src.as_str());
    let mut surface = CssSurface::default();
    let events = vec![
        PlayerEvent::TrackAdded(TextTrack::new(cli.kind, cli.label.clone(), cues)),
        PlayerEvent::DurationChange(cli.duration),
        PlayerEvent::PointerMove {
            bar: ProgressBar {
                left: cli.bar_left,
                width: cli.bar_width,
            },
            pointer: PointerPosition {
                page_x: cli.pointer_x,
                scroll_x: cli.scroll_x,
            },
        },
    ];

    let outcome = events
        .into_iter()
        .map(|event| peek.handle(event, &mut surface))
        .last()
        .unwrap_or(Outcome::Ignored);

    match outcome {
        Outcome::Shown(preview) => {
            info!(
                timestamp = ?preview.timestamp,
                src = %preview.src,
                width = preview.width,
                height = preview.height,
                left = preview.left,
                clip = ?preview.clip,
                "preview resolved"
            );
        }
        Outcome::NoCue(timestamp) => {
            info!(?timestamp, "no cue covers the pointer position");
            return Ok(());
        }
        Outcome::Ignored | Outcome::Hidden => {
            return Err(anyhow!(
                "Nothing to preview: no usable metadata track, or the pointer has no media time."
            ));
        }
    }

    if cli.output == "-" {
        serialiser::serialise(&surface, io::stdout())?;
    } else {
        let dst = std::fs::File::create(&cli.output)
            .context(format!("Failed to create output file: '{}'", cli.output))?;
        serialiser::serialise(&surface, dst)?;
    }

    Ok(())
}
