//! `planum`: Green's theorem and friends from the command line.

mod config;
mod render;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use planum_optimize::Dimension;
use planum_regions::{parse_parameter, DiskMode, IntegrationOrder, PolarProblem, Region, RegionPlot};
use serde::Serialize;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use config::{Config, OutputFormat};

const DEFAULT_MATRIX: &str = "2 1\n1 2";

#[derive(Parser)]
#[command(name = "planum", version, about = "Symbolic vector calculus and matrix calculators")]
struct Cli {
    /// Config file (default: $PLANUM_CONFIG, then the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides `[output] format`)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a line integral over a region boundary with Green's theorem
    Greens(GreensArgs),

    /// Numerically evaluate a double integral in polar coordinates
    Polar(PolarArgs),

    /// Verify the Cayley-Hamilton theorem for a square matrix
    #[command(name = "cayley-hamilton")]
    CayleyHamilton(CayleyArgs),

    /// Find and classify critical points of f(x)
    Extrema {
        /// Function of x
        #[arg(long, default_value = "x**3 - 3*x + 2", allow_hyphen_values = true)]
        f: String,
    },

    /// Stationary points of f subject to g = 0
    Lagrange {
        /// Objective (default depends on --vars)
        #[arg(long, allow_hyphen_values = true)]
        f: Option<String>,

        /// Constraint g = 0 (default depends on --vars)
        #[arg(long, allow_hyphen_values = true)]
        g: Option<String>,

        /// Number of variables: 2 (x, y) or 3 (x, y, z)
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(2..=3))]
        vars: u8,
    },
}

#[derive(Args)]
struct GreensArgs {
    /// P(x, y), the dx component
    #[arg(long, default_value = "x**2", allow_hyphen_values = true)]
    p: String,

    /// Q(x, y), the dy component
    #[arg(long, default_value = "x*y", allow_hyphen_values = true)]
    q: String,

    /// Write the region outline as SVG
    #[arg(long, value_name = "FILE")]
    plot: Option<PathBuf>,

    /// Rectangle integration order (overrides `[greens] order`)
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Disk semantics (overrides `[greens] disk_mode`)
    #[arg(long, value_enum)]
    disk_mode: Option<DiskModeArg>,

    #[command(subcommand)]
    region: Option<RegionCommand>,
}

#[derive(Clone, Subcommand)]
enum RegionCommand {
    /// Axis-aligned rectangle [x1, x2] x [y1, y2] (default)
    Rectangle {
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        x1: String,
        #[arg(long, default_value = "2", allow_hyphen_values = true)]
        x2: String,
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        y1: String,
        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        y2: String,
    },
    /// Disk centred at the origin
    Disk {
        #[arg(long, default_value = "2")]
        radius: String,
    },
    /// Right triangle with vertices (0, 0), (a, 0), (0, b)
    Triangle {
        #[arg(long, default_value = "3")]
        a: String,
        #[arg(long, default_value = "4")]
        b: String,
    },
}

impl RegionCommand {
    fn build(&self) -> Result<Region> {
        let region = match self {
            Self::Rectangle { x1, x2, y1, y2 } => Region::rectangle(
                parse_parameter("x1", x1)?,
                parse_parameter("x2", x2)?,
                parse_parameter("y1", y1)?,
                parse_parameter("y2", y2)?,
            )?,
            Self::Disk { radius } => Region::disk(parse_parameter("radius", radius)?)?,
            Self::Triangle { a, b } => Region::right_triangle(parse_parameter("a", a)?, parse_parameter("b", b)?)?,
        };
        Ok(region)
    }
}

impl Default for RegionCommand {
    fn default() -> Self {
        Self::Rectangle {
            x1: "0".into(),
            x2: "2".into(),
            y1: "0".into(),
            y2: "3".into(),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    YThenX,
    XThenY,
}

impl From<OrderArg> for IntegrationOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::YThenX => Self::YThenX,
            OrderArg::XThenY => Self::XThenY,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DiskModeArg {
    Boundary,
    Area,
}

impl From<DiskModeArg> for DiskMode {
    fn from(arg: DiskModeArg) -> Self {
        match arg {
            DiskModeArg::Boundary => Self::Boundary,
            DiskModeArg::Area => Self::Area,
        }
    }
}

#[derive(Args)]
struct PolarArgs {
    /// Integrand f(r, theta)
    #[arg(long, default_value = "r*sin(theta)", allow_hyphen_values = true)]
    f: String,

    /// Inner lower bound r_min(theta)
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    r_min: String,

    /// Inner upper bound r_max(theta)
    #[arg(long, default_value = "1 + cos(theta)", allow_hyphen_values = true)]
    r_max: String,

    /// Outer lower bound, a constant
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    theta_min: String,

    /// Outer upper bound, a constant
    #[arg(long, default_value = "2*pi", allow_hyphen_values = true)]
    theta_max: String,

    /// Write the region outline as SVG
    #[arg(long, value_name = "FILE")]
    plot: Option<PathBuf>,
}

#[derive(Args)]
struct CayleyArgs {
    /// Rows separated by ';' or newlines, entries by spaces or commas
    #[arg(long, conflicts_with = "file")]
    matrix: Option<String>,

    /// Read the matrix from a file
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(verbosity(cli.verbose).into())
                .from_env_lossy(),
        )
        .init();

    let config = config::load_config(cli.config.clone())?;
    let format = cli.format.unwrap_or(config.output.format);
    debug!(?format, "starting");

    match cli.command {
        Commands::Greens(args) => cmd_greens(&args, &config, format),
        Commands::Polar(args) => cmd_polar(args, &config, format),
        Commands::CayleyHamilton(args) => cmd_cayley(&args, format),
        Commands::Extrema { f } => {
            let report = planum_optimize::find_extrema(&f, &config.extrema)
                .with_context(|| format!("finding extrema of {f}"))?;
            emit(format, &report, render::extrema)
        }
        Commands::Lagrange { f, g, vars } => cmd_lagrange(f, g, vars, &config, format),
    }
}

fn verbosity(count: u8) -> LevelFilter {
    match count {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn cmd_greens(args: &GreensArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let mut options = config.greens.clone();
    if let Some(order) = args.order {
        options.order = order.into();
    }
    if let Some(mode) = args.disk_mode {
        options.disk_mode = mode.into();
    }
    let region = args.region.clone().unwrap_or_default().build().context("invalid region")?;
    let result = planum_regions::evaluate(&args.p, &args.q, &region, &options)
        .with_context(|| format!("applying Green's theorem to P = {}, Q = {} over the {region}", args.p, args.q))?;
    if let Some(path) = &args.plot {
        write_plot(&result.plot, path)?;
    }
    emit(format, &result, render::greens)
}

fn cmd_polar(args: PolarArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let problem = PolarProblem {
        f: args.f,
        r_min: args.r_min,
        r_max: args.r_max,
        theta_min: args.theta_min,
        theta_max: args.theta_max,
    };
    let report = planum_regions::integrate_polar(&problem, &config.quadrature, config.greens.plot_samples)
        .with_context(|| format!("integrating {} in polar coordinates", problem.f))?;
    if let Some(path) = &args.plot {
        write_plot(&report.plot, path)?;
    }
    emit(format, &report, render::polar)
}

fn cmd_cayley(args: &CayleyArgs, format: OutputFormat) -> Result<()> {
    let text = match (&args.matrix, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
        (None, None) => DEFAULT_MATRIX.to_string(),
    };
    let report = planum_matrix::verify_text(&text).context("checking the Cayley-Hamilton theorem")?;
    emit(format, &report, render::cayley_hamilton)
}

fn cmd_lagrange(f: Option<String>, g: Option<String>, vars: u8, config: &Config, format: OutputFormat) -> Result<()> {
    let dimension = Dimension::from_count(usize::from(vars)).context("--vars must be 2 or 3")?;
    let (default_f, default_g) = match dimension {
        Dimension::Two => ("x**2 + y**2", "x + y - 1"),
        Dimension::Three => ("x**2 + y**2 + z**2", "x + y + z - 1"),
    };
    let f = f.unwrap_or_else(|| default_f.to_string());
    let g = g.unwrap_or_else(|| default_g.to_string());
    let report = planum_optimize::solve_lagrange(&f, &g, dimension, &config.lagrange)
        .with_context(|| format!("optimizing {f} subject to {g} = 0"))?;
    emit(format, &report, render::lagrange)
}

fn write_plot(plot: &RegionPlot, path: &Path) -> Result<()> {
    let size = planum_regions::plot::DEFAULT_SIZE;
    std::fs::write(path, plot.to_svg(size, size)).with_context(|| format!("writing plot to {}", path.display()))?;
    debug!(path = %path.display(), "wrote plot");
    Ok(())
}

fn emit<T: Serialize>(format: OutputFormat, report: &T, text: fn(&T, &mut io::StdoutLock<'static>) -> io::Result<()>) -> Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => text(report, &mut out)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, report)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
