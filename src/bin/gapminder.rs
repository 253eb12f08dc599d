use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gapminder_rs::{PipelineConfig, pipeline, stats, storage};
use num_format::{Locale, ToFormattedString};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "gapminder",
    version,
    about = "Reshape Gapminder tables, render charts & animate life expectancy vs. fertility"
)]
struct Cli {
    /// Defaults to `run` with every default setting.
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, reshape, render the charts and the animation.
    Run(RunArgs),
    /// Load and reshape, then save the tidy table (and optionally print stats).
    Export(ExportArgs),
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug, Default)]
struct InputArgs {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fertility table (csv or spreadsheet).
    #[arg(long)]
    fertility: Option<PathBuf>,
    /// Life expectancy table (csv or spreadsheet).
    #[arg(long)]
    life_expectancy: Option<PathBuf>,
    /// Population table (csv or spreadsheet).
    #[arg(long)]
    population: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output directory for charts, frames and the animation.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Countries for the time-series chart, separated by comma or semicolon.
    #[arg(short, long)]
    countries: Option<String>,
    /// Year of the single-year scatter chart.
    #[arg(long)]
    year: Option<i32>,
    /// Animation range FIRST:LAST (inclusive).
    #[arg(long)]
    years: Option<String>,
    /// Animation playback rate.
    #[arg(long)]
    fps: Option<u32>,
    /// Skip frame rendering and the GIF.
    #[arg(long, default_value_t = false)]
    no_animation: bool,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Destination file (format inferred by --format or extension).
    #[arg(long)]
    out: PathBuf,
    /// Output format (csv or json). If omitted, inferred from --out extension.
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
    /// Print grouped statistics to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() && x.abs() >= 10_000.0 => {
            (x.round() as i64).to_formatted_string(&Locale::en)
        }
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_range(s: &str) -> Option<(i32, i32)> {
    let (a, b) = s.split_once(':')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn base_config(input: &InputArgs) -> Result<PipelineConfig> {
    let mut cfg = match &input.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(p) = &input.fertility {
        cfg.fertility = p.clone();
    }
    if let Some(p) = &input.life_expectancy {
        cfg.life_expectancy = p.clone();
    }
    if let Some(p) = &input.population {
        cfg.population = p.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Some(Command::Run(args)) => cmd_run(args),
        Some(Command::Export(args)) => cmd_export(args),
        None => cmd_run(RunArgs::default()),
    }
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let mut cfg = base_config(&args.input)?;
    if let Some(dir) = args.out_dir {
        cfg.out_dir = dir;
    }
    if let Some(list) = args.countries.as_deref() {
        cfg.countries = parse_list(list);
    }
    if let Some(year) = args.year {
        cfg.scatter_year = year;
    }
    if let Some(s) = args.years.as_deref() {
        let Some((first, last)) = parse_range(s) else {
            bail!("invalid --years, expected FIRST:LAST");
        };
        cfg.first_year = first;
        cfg.last_year = last;
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    if args.no_animation {
        cfg.animate = false;
    }

    let report = pipeline::run(&cfg)?;
    for chart in &report.charts {
        eprintln!("Wrote chart to {}", chart.display());
    }
    if let Some(anim) = &report.animation {
        eprintln!(
            "Wrote animation ({} frames) to {}",
            anim.years.len(),
            anim.output.display()
        );
    }
    Ok(())
}

fn cmd_export(args: ExportArgs) -> Result<()> {
    let cfg = base_config(&args.input)?;
    let table = pipeline::load_tidy(&cfg)?;

    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => args.out.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(table.rows(), &args.out)?,
        "json" => storage::save_json(table.rows(), &args.out)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", table.len(), args.out.display());

    if args.stats {
        for s in stats::grouped_summary(table.rows()) {
            println!(
                "{} • {}  count={} missing={}  min={} max={} mean={} median={}",
                s.key.country,
                s.key.metric,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }
    Ok(())
}
