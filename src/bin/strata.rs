use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "strata", version)]
struct Cli {
    /// Log optimizer decisions and per-task execution.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a scene to a PNG.
    Render(RenderArgs),
    /// Print the optimized task tree of a scene.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Render tiles of split tasks in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel rendering.
    #[arg(long)]
    threads: Option<usize>,

    /// Always copy clamp inputs instead of rendering them in place.
    #[arg(long)]
    no_in_place: bool,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Plan for parallel tiles.
    #[arg(long)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

struct Loaded {
    scene: strata::SceneDesc,
    arena: strata::SurfaceArena,
    task: strata::Task,
    target: strata::SurfaceId,
}

fn load(path: &Path) -> anyhow::Result<Loaded> {
    let scene = strata::SceneDesc::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut arena = strata::SurfaceArena::new();
    let task = scene
        .root
        .build(&mut arena, base_dir)
        .with_context(|| format!("build task tree from '{}'", path.display()))?;
    let target = arena.alloc(scene.width as usize, scene.height as usize, false)?;
    if let Some(bg) = scene.background {
        arena.get_mut(target)?.fill(bg);
    }
    Ok(Loaded {
        scene,
        arena,
        task,
        target,
    })
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let Loaded {
        scene,
        mut arena,
        task,
        target,
    } = load(&args.in_path)?;

    let mut opts = strata::RenderOpts::default().with_env_overrides();
    opts.parallel |= args.parallel;
    opts.in_place = !args.no_in_place;
    if args.threads.is_some() {
        opts.threads = args.threads;
    }
    let renderer = strata::Renderer::new(opts)?;

    let stats = renderer.render(task, &mut arena, target, &strata::NoProgress)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    strata::save_png(arena.get(target)?, &args.out)?;

    eprintln!(
        "wrote {} ({}x{}, {} tasks, {} tiles, {} scratch surfaces, {} in place)",
        args.out.display(),
        scene.width,
        scene.height,
        stats.tasks_run,
        stats.tiles_run,
        stats.surfaces_allocated,
        stats.aliased
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let Loaded {
        mut arena,
        task,
        target,
        ..
    } = load(&args.in_path)?;

    let opts = strata::RenderOpts {
        parallel: args.parallel,
        ..strata::RenderOpts::default().with_env_overrides()
    };
    let renderer = strata::Renderer::new(opts)?;
    let (plan, report) = renderer.plan(task, &mut arena, target)?;

    println!(
        "{}",
        serde_json::to_string_pretty(&plan).context("serialize plan")?
    );
    eprintln!(
        "{} scratch surfaces, {} clamps in place, {} tiles",
        report.scratch.len(),
        report.aliased,
        report.tiles
    );
    Ok(())
}
