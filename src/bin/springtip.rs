use std::{io::Write as _, path::PathBuf, rc::Rc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use springtip::{DynamicNode, LinkableNode, Scene, TracingSink, Value, ValueNode as _, Vec2};

#[derive(Parser, Debug)]
#[command(name = "springtip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sample the tip position of a scene over time.
    Sample(SampleArgs),
    /// List the parameters of a dynamic node.
    Params,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the first sample time (seconds).
    #[arg(long)]
    start: Option<f64>,

    /// Override the last sample time (seconds).
    #[arg(long)]
    end: Option<f64>,

    /// Override the sample rate.
    #[arg(long)]
    fps: Option<f64>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Log every evaluation to stderr.
    #[arg(long, default_value_t = false)]
    trace: bool,
}

#[derive(serde::Serialize)]
struct Sample {
    t: f64,
    x: f64,
    y: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Sample(args) => cmd_sample(args),
        Command::Params => cmd_params(),
    }
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    if args.trace {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    let mut scene = Scene::from_path(&args.in_path)
        .with_context(|| format!("load scene '{}'", args.in_path.display()))?;
    if let Some(start) = args.start {
        scene.sampling.start = start;
    }
    if let Some(end) = args.end {
        scene.sampling.end = end;
    }
    if let Some(fps) = args.fps {
        scene.sampling.fps = fps;
    }

    let mut node = scene.build().context("build dynamic node")?;
    if args.trace {
        node.set_diagnostics(Some(Rc::new(TracingSink)));
    }

    let samples = scene
        .sample_times()
        .into_iter()
        .map(|t| {
            let tip = node
                .evaluate(t)
                .with_context(|| format!("evaluate at t={}", t.0))?;
            Ok(Sample {
                t: t.0,
                x: tip.x,
                y: tip.y,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut text = String::new();
    match args.format {
        Format::Csv => {
            text.push_str("t,x,y\n");
            for s in &samples {
                text.push_str(&format!("{},{},{}\n", s.t, s.x, s.y));
            }
        }
        Format::Json => {
            text = serde_json::to_string_pretty(&samples).context("serialize samples")?;
            text.push('\n');
        }
    }

    match &args.out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(path, text)
                .with_context(|| format!("write samples '{}'", path.display()))?;
            eprintln!("wrote {} samples to {}", samples.len(), path.display());
        }
        None => std::io::stdout()
            .write_all(text.as_bytes())
            .context("write samples to stdout")?,
    }
    Ok(())
}

fn cmd_params() -> anyhow::Result<()> {
    let node = DynamicNode::new(&Value::Vector(Vec2::ZERO))?;
    let mut out = std::io::stdout().lock();
    for (i, param) in node.vocab().iter().enumerate() {
        let ty = node
            .link(i)
            .map(|l| l.value_type().to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{i}\t{}\t{ty}\t{}\t{}",
            param.name, param.local_name, param.description
        )?;
    }
    Ok(())
}
