use crate::types::{EnvironmentMode, ModuleId};
use clap::{Parser, Subcommand};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Features Guard - conditional module dependency engine
#[derive(Parser)]
#[command(name = "features-guard")]
#[command(about = "Keeps dependent modules enabled exactly while one of their triggers is")]
#[command(version)]
pub struct Cli {
    /// Log engine decisions at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load and validate the dependency rules of a configuration file
    Validate {
        /// Path to the JSON configuration tree
        config: PathBuf,
    },
    /// Print triggers and dependents for every configured module
    Show {
        /// Path to the JSON configuration tree
        config: PathBuf,
    },
    /// Replay administrator actions against an in-memory environment
    Simulate {
        /// Path to the JSON configuration tree
        config: PathBuf,

        /// Modules that exist in the environment (comma separated)
        #[arg(long, value_delimiter = ',', required = true)]
        available: Vec<String>,

        /// Modules enabled before the first action (comma separated)
        #[arg(long, value_delimiter = ',')]
        enabled: Vec<String>,

        /// Modules the registry only enables when forced (comma separated)
        #[arg(long, value_delimiter = ',')]
        restricted: Vec<String>,

        /// Environment mode: tenant or default
        #[arg(long, default_value_t = EnvironmentMode::Tenant)]
        mode: EnvironmentMode,

        /// Treat the run as environment setup: `--enabled` modules are only
        /// visible in the descriptor snapshot until the actions finish
        #[arg(long)]
        bootstrap: bool,

        /// Actions to replay: `+id` enables, `-id` disables
        #[arg(required = true, allow_hyphen_values = true)]
        actions: Vec<Action>,
    },
}

/// A single administrator action replayed by `simulate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Enable(ModuleId),
    Disable(ModuleId),
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (sign, id) = s.split_at(s.chars().next().map_or(0, char::len_utf8));
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("action '{}' is missing a module id", s));
        }
        match sign {
            "+" => Ok(Self::Enable(ModuleId::from(id))),
            "-" => Ok(Self::Disable(ModuleId::from(id))),
            _ => Err(format!("action '{}' must start with '+' or '-'", s)),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enable(id) => write!(f, "+{}", id),
            Self::Disable(id) => write!(f, "-{}", id),
        }
    }
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
