//! fitfield command line
//!
//! Renders the field of a point file to a PNG when `--output` is given,
//! otherwise starts the interactive shell on stdin.

mod commands;
mod shell;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use fitfield_io::{read_point_set, write_png, ColorEncoding};
use fitfield_render::parallel::{init_thread_pool, ThreadPoolConfig};
use fitfield_render::{
    ColorMap, FieldConfig, FieldKind, FitParameters, Pipeline, PointOverlay, RenderingContext,
    Session,
};
use shell::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "fitfield", version, about = "Visualize local algebraic fits over 2D point clouds")]
struct Args {
    /// Input point file (`x y` or `x y nx ny` per line)
    #[arg(short, long)]
    input: PathBuf,

    /// Field evaluator, e.g. "Plane", "Best Sphere", "One Oriented Sphere"
    #[arg(short, long = "fit-type", default_value = "Oriented Sphere")]
    fit_type: String,

    /// Fit scale, in point-space units
    #[arg(short, long, default_value_t = 40.0)]
    scale: f32,

    /// MLS re-centering steps
    #[arg(long, default_value_t = 1)]
    iterations: u32,

    /// Anchor point for the "One ..." and "Distance From Point" fields
    #[arg(long, default_value_t = 0)]
    anchor: usize,

    /// Draw point projection trajectories
    #[arg(long)]
    trajectories: bool,

    /// Output image. Without it the interactive shell starts
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, default_value_t = 500)]
    width: usize,

    #[arg(short = 'H', long, default_value_t = 500)]
    height: usize,

    /// Gamma-encode exported images
    #[arg(long)]
    srgb: bool,

    /// Number of color bands
    #[arg(long, default_value_t = 10)]
    bands: u32,

    /// Half width of the highlighted zero isocontour
    #[arg(long, default_value_t = 1.0)]
    iso_width: f32,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Draw the points on top of exported images
    #[arg(long)]
    show_points: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fit_type_names() -> String {
    FieldKind::all()
        .iter()
        .map(|kind| format!("\"{kind}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_session(args: &Args) -> Result<Session> {
    let kind = FieldKind::from_name(&args.fit_type)
        .with_context(|| format!("available fit types: {}", fit_type_names()))?;
    let params = FitParameters::new(args.scale, args.iterations).context("invalid fit parameters")?;
    let colormap = ColorMap::default()
        .with_bands(args.bands)
        .with_iso_width(args.iso_width);
    colormap.validate().context("invalid colormap")?;
    if args.width == 0 || args.height == 0 {
        bail!("image size must be positive, got {}x{}", args.width, args.height);
    }

    let points = read_point_set(&args.input)
        .with_context(|| format!("failed to load {}", args.input.display()))?;

    // exported images only show points on request
    let overlay = (args.output.is_none() || args.show_points).then(PointOverlay::default);
    let pipeline = Pipeline::new(kind)
        .with_config(
            FieldConfig::default()
                .with_params(params)
                .with_anchor(args.anchor)
                .with_trajectories(args.trajectories),
        )
        .with_colormap(colormap)
        .with_overlay(overlay);

    Ok(Session::new(
        points,
        RenderingContext::new(args.width, args.height),
        pipeline,
    ))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Some(threads) = args.threads {
        init_thread_pool(ThreadPoolConfig::default().with_threads(threads))
            .context("failed to configure the thread pool")?;
    }

    let mut session = build_session(&args)?;
    let encoding = if args.srgb {
        ColorEncoding::Srgb
    } else {
        ColorEncoding::Linear
    };

    match &args.output {
        Some(output) => {
            let frame = session.render().context("rendering failed")?;
            write_png(frame, output, encoding)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Saved {}", output.display());
        }
        None => {
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let mut shell = Shell::new(session, encoding);
            shell.run(stdin.lock(), &mut stdout)?;
            tracing::info!(points = shell.session().points().len(), "session closed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_arguments_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_scale_is_in_point_units() {
        let command = Args::command();
        let scale = command
            .get_arguments()
            .find(|arg| arg.get_id() == "scale")
            .unwrap();
        assert_eq!(scale.get_help().unwrap().to_string(), "Fit scale, in point-space units");

        let args = Args::parse_from(["fitfield", "-i", "cloud.txt", "-s", "12.5"]);
        assert_eq!(args.scale, 12.5);
    }
}
