pub mod cli;
pub mod collect;
pub mod collision;
pub mod error;
pub mod k8s;
pub mod netinfo;
pub mod output;
pub mod runner;

use anyhow::{Context, Result};
use cli::{Args, Mode};
use std::io::Write;
use tracing::info;

/// Runs the mode selected on the command line against the real system.
/// Parameters: `args` (Args) parsed command line.
/// Returns: Result<()> error for any fatal condition; main maps it to exit 1.
pub fn run(args: Args) -> Result<()> {
    // Reports go to stdout; tracing writes to stderr.
    let runner = runner::SystemRunner;
    let stdout = std::io::stdout();
    run_with(args.mode(), &runner, &mut stdout.lock())
}

/// Dispatches one mode, writing user-facing results to `out`.
pub fn run_with<W: Write>(mode: Mode, runner: &impl runner::Runner, out: &mut W) -> Result<()> {
    // Each mode is independent; none feeds another.
    match mode {
        Mode::DetectSubnet => {
            let net = netinfo::detect_local_subnet(runner)?;
            writeln!(out, "{net}")?;
        }
        Mode::Collect { output, image } => {
            info!(%image, output = %output.display(), "collecting logs");
            collect::collect_to_file(runner, &image, &output)?;
            writeln!(out, "Logs collected successfully in {}", output.display())?;
        }
        Mode::CheckCollision { input, policy } => {
            // Nothing is printed unless the whole file was processed.
            let report = collision::check_file(&input, policy)
                .with_context(|| format!("collision check of {} failed", input.display()))?;
            write!(out, "{report}")?;
        }
    }
    Ok(())
}
