use std::path::PathBuf;

use clap::{Parser, Subcommand};
use monsetup_common::{
    CommandBuilder, DryRunExecutor, ErrorReporting, Executor, MonsetupError, OutputStatus,
    ProcessExecutor, ToolPaths, XrandrInventory,
};
use monsetup_config::Config;
use monsetup_engine::{Pipeline, PlannedMonitor, TopologyPlan};

#[derive(Parser)]
#[command(name = "monsetup")]
#[command(about = "monsetup (xrandr + bspwm multi-monitor session setup)")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure monitors, desktops, rules and status bars (default)
    Apply {
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the planned topology without changing anything
    Plan {
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// List xrandr outputs with their native and current modes
    Monitors,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" }),
    )
    .init();

    std::process::exit(exit_status(run(cli)));
}

fn exit_status(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Apply { dry_run: false }) {
        Commands::Apply { dry_run } => apply(&load_config(cli.config.as_ref())?, dry_run),
        Commands::Plan { json } => plan(&load_config(cli.config.as_ref())?, json),
        // Listing outputs works without a configuration file
        Commands::Monitors => monitors(),
    }
}

fn builder_for(config: &Config) -> CommandBuilder {
    CommandBuilder::new(ToolPaths::discover(&config.session.shell))
}

fn apply(config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let builder = builder_for(config);
    let executor: Box<dyn Executor> = if dry_run {
        Box::new(DryRunExecutor::new())
    } else {
        Box::new(ProcessExecutor::new())
    };

    Pipeline::new(config, &builder, executor.as_ref())
        .run()
        .map_err(report)?;
    Ok(())
}

fn plan(config: &Config, json: bool) -> anyhow::Result<()> {
    let builder = builder_for(config);
    let executor = ProcessExecutor::new();
    let plan = Pipeline::new(config, &builder, &executor)
        .plan()
        .map_err(report)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn monitors() -> anyhow::Result<()> {
    let builder = CommandBuilder::new(ToolPaths::discover("bash"));
    let executor = ProcessExecutor::new();
    let outputs = XrandrInventory::new(&builder, &executor)
        .outputs()
        .map_err(report)?;
    print_outputs(&outputs);
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    config.map_err(|e| {
        log::error!("Configuration error: {}", e);
        report(e)
    })
}

fn report(e: MonsetupError) -> anyhow::Error {
    anyhow::anyhow!(e.user_friendly_message())
}

fn print_plan(plan: &TopologyPlan) {
    println!("Mode: {}", plan.mode());
    print_monitor("Main", &plan.main);
    if let Some(secondary) = &plan.secondary {
        print_monitor("Secondary", secondary);
        if let Some(position) = plan.position {
            println!("  {} of {}", position, plan.main.id);
        }
    }
}

fn print_monitor(label: &str, monitor: &PlannedMonitor) {
    let desktops: Vec<String> = monitor.desktops.iter().map(|d| d.to_string()).collect();
    println!(
        "{}: {} {} rotate {} ({:?}) desktops {}",
        label,
        monitor.id,
        monitor.profile.resolution,
        monitor.profile.rotation,
        monitor.profile.source,
        desktops.join(" ")
    );
}

fn print_outputs(outputs: &[OutputStatus]) {
    for output in outputs {
        if !output.connected {
            println!("{}: disconnected", output.name);
            continue;
        }

        let native = output.detail.native_resolution;
        println!(
            "{}: connected{} | native {} | current {}{}",
            output.name,
            if output.primary { " primary" } else { "" },
            native.map_or_else(|| "unknown".to_string(), |r| r.to_string()),
            output
                .detail
                .current_resolution
                .map_or_else(|| "off".to_string(), |r| r.to_string()),
            if native.is_some_and(|r| r.is_hidpi()) { " | HiDPI" } else { "" }
        );
    }
}
