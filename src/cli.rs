use clap::{Parser, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_IMAGE: &str = "ip-tool:latest";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ip-tool",
    version,
    about = "Container network inspection, subnet collision checks and log collection"
)]
pub struct Args {
    /// Collect logs from pods running `--image` into FILE (`-` for stdout).
    #[arg(long, value_name = "FILE", conflicts_with = "check_collision")]
    pub collect: Option<PathBuf>,

    /// Check FILE of `<identifier> <subnet>` lines for overlapping subnets.
    #[arg(long, value_name = "FILE")]
    pub check_collision: Option<PathBuf>,

    /// Image whose pods are collected [default: ip-tool:latest].
    #[arg(long, requires = "collect")]
    pub image: Option<String>,

    /// What to do with a subnet that does not parse [default: abort].
    #[arg(long, value_enum, requires = "check_collision")]
    pub on_invalid: Option<InvalidSubnetPolicy>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum InvalidSubnetPolicy {
    /// Stop at the first invalid subnet and report nothing else.
    Abort,
    /// Warn and ignore the line.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    DetectSubnet,
    Collect { output: PathBuf, image: String },
    CheckCollision { input: PathBuf, policy: InvalidSubnetPolicy },
}

impl Args {
    pub fn mode(&self) -> Mode {
        if let Some(output) = &self.collect {
            return Mode::Collect {
                output: output.clone(),
                image: self.image.clone().unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            };
        }
        if let Some(input) = &self.check_collision {
            return Mode::CheckCollision {
                input: input.clone(),
                policy: self.on_invalid.unwrap_or(InvalidSubnetPolicy::Abort),
            };
        }
        Mode::DetectSubnet
    }
}
