use std::{path::Path, path::PathBuf, rc::Rc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lottiekit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print document metadata and build statistics.
    Info(InfoArgs),
    /// Seek through frames and print the damage rectangle of each seek.
    Seek(SeekArgs),
    /// Print the display list recorded at one frame.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SeekArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame to seek to.
    #[arg(long, default_value_t = 0.0)]
    frame: f32,

    /// Number of consecutive frames to seek.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Frame increment between seeks.
    #[arg(long, default_value_t = 1.0)]
    step: f32,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input Lottie JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame to render.
    #[arg(long, default_value_t = 0.0)]
    frame: f32,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Seek(args) => cmd_seek(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(path: &Path) -> anyhow::Result<lottiekit::Animation> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("read animation '{}'", path.display()))?;
    let animation = lottiekit::AnimationBuilder::new()
        .logger(Rc::new(lottiekit::TracingLogger))
        .build(&source)
        .with_context(|| format!("build animation '{}'", path.display()))?;
    Ok(animation)
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let animation = load(&args.in_path)?;
    let size = animation.size();
    let stats = animation.stats();

    println!("version:    {}", animation.version());
    println!("size:       {}x{}", size.width, size.height);
    println!("fps:        {}", animation.fps());
    println!(
        "frames:     [{}, {})",
        animation.in_point(),
        animation.out_point()
    );
    println!("duration:   {:.3}s", animation.duration());
    println!("layers:     {}", stats.layer_count);
    println!("precomps:   {}", stats.precomp_count);
    println!("animators:  {}", stats.animator_count);
    println!("json size:  {} bytes", stats.json_size);
    println!("parse time: {:?}", stats.json_parse_time);
    println!("build time: {:?}", stats.scene_build_time);
    Ok(())
}

fn cmd_seek(args: SeekArgs) -> anyhow::Result<()> {
    let mut animation = load(&args.in_path)?;
    for i in 0..args.frames {
        let frame = args.frame + i as f32 * args.step;
        let damage = animation.seek_frame(frame);
        if damage.is_zero_area() {
            println!("{frame:>8.2}  (no damage)");
        } else {
            println!(
                "{frame:>8.2}  [{:.1}, {:.1}, {:.1}, {:.1}]",
                damage.x0, damage.y0, damage.x1, damage.y1
            );
        }
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut animation = load(&args.in_path)?;
    animation.seek_frame(args.frame);

    let mut list = lottiekit::DisplayList::new();
    animation.render(&mut list);
    for op in list.ops() {
        println!("{op:?}");
    }
    Ok(())
}
