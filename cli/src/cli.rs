//! Command line argument parsing for `jsengine-cli`.

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Maximum number of VM instructions to execute before aborting with
    /// an Interrupted error. Applies to every subcommand that runs code.
    #[arg(long, global = true, default_value_t = 10_000_000)]
    pub step_limit: u64,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start an interactive read-eval-print loop. Also the default when no
    /// subcommand is given.
    Repl,

    /// Run a JavaScript source file as a script.
    Run(RunArgs),

    /// Evaluate a JavaScript expression passed directly on the command line.
    Exec(ExecArgs),

    /// Ahead-of-time compile a JavaScript source file to a `.qjsb` bytecode
    /// file without running it.
    Qjsc(QjscArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the `.js` file to run.
    pub file: std::path::PathBuf,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// JavaScript source to evaluate.
    pub source: String,
}

#[derive(Args, Debug)]
pub struct QjscArgs {
    /// Path to the input `.js` source file.
    pub input: std::path::PathBuf,

    /// Path to write the compiled `.qjsb` bytecode file to.
    pub output: std::path::PathBuf,
}
