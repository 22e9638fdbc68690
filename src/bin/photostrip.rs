use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use sha2::Digest as _;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use photostrip::{
    BoothConfig, BoothSession, ColorRgba8, Compositor, DEFAULT_DOWNLOAD_NAME, DirectorySource,
    FontBook, FrameGraphic, ImageSource, LAYOUTS, Layout, Phase, SequencerEvent, SkinSmoothing,
    TextRenderer, enhance_all, encode_data_url, encode_png, load_frame, load_photo,
};

#[derive(Parser, Debug)]
#[command(name = "photostrip", version, about = "Compose photobooth strips")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available layouts and their canvas sizes.
    Layouts(LayoutsArgs),
    /// Compose a strip from existing photos.
    Compose(ComposeArgs),
    /// Run a timed capture session against a directory of frames.
    Booth(BoothArgs),
}

#[derive(Args, Debug)]
struct LayoutsArgs {
    /// Booth config JSON (for frame geometry).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StyleArgs {
    /// Booth config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Layout name (2pose, 3pose, 4pose, 6pose).
    #[arg(long)]
    layout: Option<Layout>,

    /// Frame graphic (PNG/JPEG/SVG path or data URL).
    #[arg(long)]
    frame: Option<String>,

    /// Background color (#rgb, #rrggbb or a preset name).
    #[arg(long)]
    background: Option<ColorRgba8>,

    /// Caption text; use `\n` for line breaks.
    #[arg(long)]
    text: Option<String>,

    #[arg(long)]
    text_color: Option<ColorRgba8>,

    #[arg(long)]
    font_size: Option<f32>,

    #[arg(long)]
    font_family: Option<String>,

    /// Extra font files are loaded from this directory.
    #[arg(long)]
    fonts_dir: Option<PathBuf>,

    /// Literal date/time line appended to the caption.
    #[arg(long)]
    stamp: Option<String>,

    /// Enable per-photo enhancement.
    #[arg(long)]
    enhance: bool,

    #[arg(long)]
    smoothing: Option<f32>,

    #[arg(long)]
    brightness: Option<f32>,

    #[arg(long)]
    contrast: Option<f32>,

    #[arg(long)]
    saturation: Option<f32>,

    /// Output PNG path.
    #[arg(long, default_value = DEFAULT_DOWNLOAD_NAME)]
    out: PathBuf,

    /// Also print the PNG as a data URI on stdout.
    #[arg(long)]
    data_uri: bool,

    /// Print the SHA-256 of the written PNG.
    #[arg(long)]
    digest: bool,
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Photo path or data URL, in strip order; repeat once per slot.
    #[arg(long = "photo", required = true)]
    photos: Vec<String>,

    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Args, Debug)]
struct BoothArgs {
    /// Directory whose images stand in for the camera, served in name order.
    #[arg(long)]
    source_dir: PathBuf,

    /// Restart from the first image when the directory runs out.
    #[arg(long)]
    cycle: bool,

    /// Countdown length in seconds (1..=10).
    #[arg(long)]
    countdown: Option<u32>,

    #[command(flatten)]
    style: StyleArgs,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Layouts(args) => cmd_layouts(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Booth(args) => cmd_booth(args),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("photostrip=info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn cmd_layouts(args: LayoutsArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => BoothConfig::from_json_file(path)?,
        None => BoothConfig::default(),
    };
    for row in &LAYOUTS {
        let canvas = cfg.geometry.canvas_for(row.layout);
        println!(
            "{:<6} photos={} grid={}x{} canvas={}x{}",
            row.name, row.count, row.cols, row.rows, canvas.width, canvas.height
        );
    }
    Ok(())
}

/// Merge the config file with command-line overrides.
fn resolve_config(args: &StyleArgs) -> anyhow::Result<BoothConfig> {
    let mut cfg = match &args.config {
        Some(path) => BoothConfig::from_json_file(path)?,
        None => BoothConfig::default(),
    };
    if let Some(layout) = args.layout {
        cfg.layout = layout;
    }
    if let Some(frame) = &args.frame {
        cfg.frame = Some(frame.clone());
    }
    let style = &mut cfg.style;
    if let Some(bg) = args.background {
        style.background = bg;
    }
    if let Some(text) = &args.text {
        style.text = text.replace("\\n", "\n");
    }
    if let Some(c) = args.text_color {
        style.text_color = c;
    }
    if let Some(size) = args.font_size {
        style.font_size = size;
    }
    if let Some(family) = &args.font_family {
        style.font_family = family.clone();
    }
    if let Some(stamp) = &args.stamp {
        style.stamp = Some(stamp.clone());
    }
    let enhance = &mut cfg.enhance;
    enhance.enabled |= args.enhance;
    if let Some(v) = args.smoothing {
        enhance.options.skin_smoothing = v;
    }
    if let Some(v) = args.brightness {
        enhance.options.brightness = v;
    }
    if let Some(v) = args.contrast {
        enhance.options.contrast = v;
    }
    if let Some(v) = args.saturation {
        enhance.options.saturation = v;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn make_compositor(cfg: &BoothConfig, fonts_dir: Option<&Path>) -> anyhow::Result<Compositor> {
    let mut fonts = FontBook::with_system_fonts();
    if let Some(dir) = fonts_dir {
        fonts.load_fonts_dir(dir);
    }
    tracing::debug!(faces = fonts.face_count(), "font book ready");
    Ok(Compositor::with_text_renderer(
        cfg.geometry,
        TextRenderer::new(fonts),
    )?)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let cfg = resolve_config(&args.style)?;
    let mut compositor = make_compositor(&cfg, args.style.fonts_dir.as_deref())?;

    let photos = args
        .photos
        .iter()
        .map(|p| load_photo(&ImageSource::parse(p)).with_context(|| format!("load photo '{p}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let frame = match cfg.frame_source() {
        Some(src) => load_frame(&src, &cfg.geometry).context("load frame graphic")?,
        None => FrameGraphic::plain_border(&cfg.geometry, cfg.border_color),
    };

    let photos = if cfg.enhance.enabled {
        enhance_all(&SkinSmoothing::default(), &photos, &cfg.enhance.options)
    } else {
        photos
    };

    let raster = compositor.compose(&photos, &frame, cfg.layout, &cfg.style)?;
    let png = encode_png(&raster)?;
    write_output(&args.style, &png)?;
    Ok(())
}

fn cmd_booth(args: BoothArgs) -> anyhow::Result<()> {
    let mut cfg = resolve_config(&args.style)?;
    if let Some(seconds) = args.countdown {
        cfg.countdown_seconds = seconds;
        cfg.validate()?;
    }
    let compositor = make_compositor(&cfg, args.style.fonts_dir.as_deref())?;
    let mut session = BoothSession::from_config(&cfg, compositor)?;
    let mut camera = DirectorySource::open(&args.source_dir)?.cycling(args.cycle);

    let clock = Instant::now();
    session.start_capture(cfg.layout, clock.elapsed())?;
    eprintln!(
        "capturing {} photos for {} from {}",
        cfg.layout.count(),
        cfg.layout,
        args.source_dir.display()
    );

    while session.composite().is_none() {
        let Some(deadline) = session.next_deadline() else {
            anyhow::bail!("session stalled in phase {:?}", session.phase());
        };
        let now = clock.elapsed();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        let now = clock.elapsed();
        for event in session.poll(now, &mut camera) {
            report(&event, cfg.layout);
            if let SequencerEvent::CaptureFailed { error } = event {
                return Err(error).context("capture failed");
            }
        }
        if session.phase() == Phase::Previewing {
            session.recompose_due(now)?;
        }
    }

    let png = session.export_png()?;
    write_output(&args.style, &png)?;
    Ok(())
}

fn report(event: &SequencerEvent, layout: Layout) {
    match event {
        SequencerEvent::CountdownTick { remaining } => eprintln!("  {remaining}..."),
        SequencerEvent::PhotoAdded { index, .. } => {
            eprintln!("  snap! photo {}/{}", index + 1, layout.count());
        }
        SequencerEvent::Complete => eprintln!("all photos taken"),
        SequencerEvent::PreviewReady => eprintln!("composing strip"),
        SequencerEvent::CountdownStarted { .. } | SequencerEvent::CaptureFailed { .. } => {}
    }
}

fn write_output(args: &StyleArgs, png: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());

    if args.digest {
        println!("sha256 {}", sha256_hex(png));
    }
    if args.data_uri {
        println!("{}", encode_data_url("image/png", png));
    }
    Ok(())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
