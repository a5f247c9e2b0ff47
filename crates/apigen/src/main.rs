use anyhow::{Context, bail};
use apigen::api::haunted_registry;
use apigen::{ApigenConfig, Mode, generate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "apigen", version, about = "Generate API server, client and OpenAPI code")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write every generated file
    Generate(GenerateArgs),
    /// List the built-in emitters
    List,
}

#[derive(Args)]
struct GenerateArgs {
    /// Project root that output paths are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file (defaults to <root>/apigen.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write nothing; fail if any file is out of date
    #[arg(long)]
    check: bool,
}

fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = ApigenConfig::load(&args.root, args.config.as_deref())
        .context("failed to load configuration")?;
    let registry = haunted_registry().context("API registry is invalid")?;
    let mode = if args.check { Mode::Check } else { Mode::Write };

    let report = generate(&registry, &config, &args.root, mode)
        .with_context(|| format!("failed to generate into {}", args.root.display()))?;

    if !report.is_clean() {
        for path in &report.stale {
            eprintln!("out of date: {}", path.display());
        }
        bail!("{} generated file(s) are out of date; run `apigen generate`", report.stale.len());
    }
    info!(
        written = report.written.len(),
        unchanged = report.unchanged.len(),
        "done"
    );
    Ok(())
}

fn run_list() {
    for emitter in apigen_emit::emitters() {
        println!(
            "{:<12} {:<12} {}",
            emitter.name(),
            emitter.language(),
            emitter.target().as_str()
        );
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "apigen=debug,apigen_registry=debug,apigen_emit=debug"
    } else {
        "apigen=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::List => {
            run_list();
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
