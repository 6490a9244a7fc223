mod config;
mod logger;
mod renamer;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::renamer::GoProRename;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Group and rename GoPro files by capture time"
)]
pub struct Args {
    /// Optional input directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    path: Option<PathBuf>,

    /// Copy files to the new name instead of renaming
    #[arg(short, long)]
    copy: bool,

    /// Overwrite existing
    #[arg(short, long)]
    force: bool,

    /// Path to the ffprobe executable
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::ExecutablePath)]
    ffprobe: Option<PathBuf>,

    /// Write a log file to ~/logs/gopro-rename
    #[arg(short, long)]
    log: bool,

    /// Only print changes without renaming
    #[arg(short, long)]
    print: bool,

    /// Generate shell completion
    #[arg(short = 'C', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        gopro_rename::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        GoProRename::new(args)?.run()
    }
}
