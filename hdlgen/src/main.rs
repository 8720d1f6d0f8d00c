use clap::{Parser, ValueEnum};
use hdlgen::loader::Snapshot;
use hdlgen::options::{ConfigFile, DialectChoice};
use hdlgen::{generate, ClockMode, Context, Dialect, GenerationOptions, LogReporter};
use log::{error, info};

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DialectArg {
    Vhdl,
    Verilog,
    Both,
}

impl From<DialectArg> for DialectChoice {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Vhdl => DialectChoice::Vhdl,
            DialectArg::Verilog => DialectChoice::Verilog,
            DialectArg::Both => DialectChoice::Both,
        }
    }
}

/// Generate structural VHDL or Verilog from a schematic design snapshot.
#[derive(Parser, Debug)]
#[command(name = "hdlgen", version, about)]
struct Args {
    /// Design snapshot (JSON)
    design: PathBuf,

    /// Target dialect(s)
    #[arg(short, long, value_enum)]
    dialect: Option<DialectArg>,

    /// Output directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// TOML configuration file; command-line flags take precedence
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Clock all registers from one global clock, using clock trees as enables
    #[arg(long)]
    global_tick: bool,
}

fn run_one(snapshot: &Snapshot, options: &GenerationOptions) -> Result<(), String> {
    let c = Context::new();
    let top = snapshot.build(&c).map_err(|e| e.to_string())?;
    let summary = generate(top, options, &LogReporter).map_err(|e| e.to_string())?;
    info!(
        "{}: {} file(s) in {}",
        summary.dialect,
        summary.files.len(),
        summary.output_dir.display()
    );
    Ok(())
}

fn run(args: Args) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => ConfigFile::load(path).map_err(|e| e.to_string())?,
        None => ConfigFile::default(),
    };

    let choice = args
        .dialect
        .map(DialectChoice::from)
        .or(config.dialect)
        .unwrap_or(DialectChoice::Vhdl);
    let output_dir = args
        .out
        .or(config.output_dir)
        .unwrap_or_else(|| GenerationOptions::default().output_dir);
    let clock_mode = if args.global_tick {
        ClockMode::GlobalTick
    } else {
        config.clock_mode.unwrap_or_default()
    };

    let snapshot = Snapshot::read(&args.design).map_err(|e| e.to_string())?;
    snapshot.validate().map_err(|e| e.to_string())?;

    let dialects = choice.dialects();
    let options_for = |dialect: Dialect| GenerationOptions {
        dialect,
        output_dir: dialect_dir(&output_dir, dialect, dialects.len() > 1),
        clock_mode,
    };

    if dialects.len() == 1 {
        return run_one(&snapshot, &options_for(dialects[0]));
    }

    // Each dialect gets its own context; contexts are not shared between threads.
    let results = thread::scope(|s| {
        let handles = dialects
            .iter()
            .map(|&dialect| {
                let options = options_for(dialect);
                let snapshot = &snapshot;
                s.spawn(move || run_one(snapshot, &options))
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err("generator thread panicked".to_string()))
            })
            .collect::<Vec<_>>()
    });

    let failures = results
        .into_iter()
        .filter_map(|result| result.err())
        .collect::<Vec<_>>();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("\n"))
    }
}

fn dialect_dir(output_dir: &Path, dialect: Dialect, split: bool) -> PathBuf {
    if split {
        output_dir.join(dialect.short_name())
    } else {
        output_dir.to_path_buf()
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}
