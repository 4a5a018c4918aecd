#![cfg_attr(feature = "strict", deny(warnings))]

use std::io;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use log::{info, LevelFilter};

use ptsim::{
    commands,
    config::{default_log_level, Config},
    logging,
    processes::OomPolicy,
    Machine,
};

#[derive(Parser)]
#[command(name = "ptsim")]
#[command(about = "Page table simulator over 16 KiB of simulated RAM", long_about = None)]
struct Cli {
    /// Free every page of a process whose creation runs out of memory
    #[arg(long)]
    rollback: bool,

    /// More log output (repeat for trace records)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Commands: pfm | ppt pid | np pid pages | kp pid | sb pid vaddr value | lb pid vaddr
    commands: Vec<String>,
}

impl Cli {
    fn config(&self) -> Config {
        let log_level = match (self.quiet, self.verbose) {
            (true, _) => LevelFilter::Error,
            (false, 0) => default_log_level(),
            (false, 1) => LevelFilter::Debug,
            (false, _) => LevelFilter::Trace,
        };
        let oom_policy = if self.rollback {
            OomPolicy::Rollback
        } else {
            OomPolicy::Retain
        };
        Config {
            oom_policy,
            log_level,
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    if cli.commands.is_empty() {
        eprintln!("usage: ptsim commands");
        return Ok(ExitCode::FAILURE);
    }

    let config = cli.config();
    logging::init(config.log_level)?;

    let commands = match commands::parse(&cli.commands) {
        Ok(commands) => commands,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };
    info!("running {} commands, oom policy {:?}", commands.len(), config.oom_policy);

    let mut machine = Machine::new(config);
    commands::run(&mut machine, &commands, &mut io::stdout().lock(), &mut io::stderr())?;

    Ok(ExitCode::SUCCESS)
}
