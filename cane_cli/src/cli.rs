//! CLI argument definitions and shared statics.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "cane", version, about = "Smart cane obstacle-risk controller")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Emit JSON lines (cycle reports, logs, errors) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute (defaults to `run`)
    #[command(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Stop after this many loop iterations
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,
    /// Replay a recorded walk (CSV with headers distance_cm,light) on the simulated rig
    #[arg(long, value_name = "CSV")]
    pub trace: Option<PathBuf>,
    /// Print loop statistics on exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub stats: bool,
    /// Enable real-time mode (mlockall + SCHED_FIFO)
    #[arg(
        long,
        action = ArgAction::SetTrue,
        long_help = "Enable real-time mode on Linux.\n\nLocks the process address space into RAM with mlockall(MCL_CURRENT|MCL_FUTURE) and switches to SCHED_FIFO. This reduces page faults and jitter on the echo timing but may require CAP_IPC_LOCK/CAP_SYS_NICE or root. Failures are reported as warnings and the loop still runs."
    )]
    pub rt: bool,
    /// SCHED_FIFO priority when --rt is enabled (clamped to the system range)
    #[arg(long, value_name = "PRIO")]
    pub rt_prio: Option<i32>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the sensing/alert loop until Ctrl-C or --max-cycles
    Run(RunArgs),
    /// Read every peripheral once and report
    SelfCheck,
}
