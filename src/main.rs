//! Features Guard - Main entry point
//!
//! Validates dependency rules and replays module activation scenarios against
//! an in-memory environment.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use features_guard::cli::{Action, Cli, Commands};
use features_guard::{
    module_set, violations, DependencyMap, EngineContext, EnvironmentMode, FeaturesGuard,
    HostSimulator, MemoryShell, ModuleId,
};

/// Initialize the logger with appropriate settings
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    // RUST_LOG overrides the flag
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!("CLI arguments parsed");

    match cli.command {
        Commands::Validate { config } => {
            info!("Validating configuration file: {:?}", config);
            match load_rules(&config) {
                Ok(rules) => {
                    println!(
                        "✓ Configuration is valid: {} dependent module(s)",
                        rules.len()
                    );
                }
                Err(e) => {
                    error!("Configuration validation failed: {:#}", e);
                    eprintln!("✗ Configuration validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Show { config } => {
            let rules = load_rules(&config)?;
            show_rules(&rules);
        }
        Commands::Simulate {
            config,
            available,
            enabled,
            restricted,
            mode,
            bootstrap,
            actions,
        } => {
            let rules = load_rules(&config)?;
            let ctx = EngineContext {
                mode,
                bootstrapping: bootstrap,
            };
            simulate(&rules, available, enabled, restricted, ctx, &actions)?;
        }
    }

    Ok(())
}

fn load_rules(path: &Path) -> Result<DependencyMap> {
    DependencyMap::load_from_file(path)
        .with_context(|| format!("Failed to load dependency rules from {:?}", path))
}

fn show_rules(rules: &DependencyMap) {
    if rules.is_empty() {
        println!("No dependency rules configured");
        return;
    }

    let index = features_guard::DependencyIndex::new(rules);

    println!("Dependents (enabled while any trigger is enabled):");
    for dependent in index.all_dependents() {
        println!("  {} <- {}", dependent, join(index.triggers_of(dependent.as_str())));
    }

    println!("Triggers:");
    for trigger in index.all_triggers() {
        println!("  {} -> {}", trigger, join(index.dependents_of(trigger.as_str())));
    }
}

fn simulate(
    rules: &DependencyMap,
    available: Vec<String>,
    enabled: Vec<String>,
    restricted: Vec<String>,
    ctx: EngineContext,
    actions: &[Action],
) -> Result<()> {
    let mut shell = MemoryShell::new(module_set(available)).with_restricted(module_set(restricted));
    if ctx.bootstrapping {
        shell.stage_in_descriptor(module_set(enabled));
    } else {
        shell = shell.with_enabled(module_set(enabled));
    }

    let shell = Arc::new(shell);
    let guard = FeaturesGuard::new(rules, shell.clone(), shell.clone());
    let host = HostSimulator::new(shell.clone(), ctx).with_handler(guard);

    if ctx.mode == EnvironmentMode::Default {
        println!("Default environment: propagation is disabled");
    }

    for action in actions {
        shell.clear_journal();
        let announced = match action {
            Action::Enable(id) => host.enable(id.as_str()),
            Action::Disable(id) => host.disable(id.as_str()),
        }
        .with_context(|| format!("Action {} failed", action))?;

        println!("{}", action);
        for command in shell.journal() {
            println!("  issued {}", command);
        }
        for transition in &announced {
            println!("  {} {}", transition.event, transition.module);
        }
    }

    if ctx.bootstrapping {
        shell.sync_registry();
    }

    let final_set = shell.enabled();
    println!("Enabled: {}", join(&final_set));

    if ctx.mode != EnvironmentMode::Default {
        let index = features_guard::DependencyIndex::new(rules);
        for violation in violations(&index, &final_set, &shell.available()) {
            println!("  ! {}", violation);
        }
    }

    Ok(())
}

fn join<'a>(ids: impl IntoIterator<Item = &'a ModuleId>) -> String {
    let ids: Vec<&str> = ids.into_iter().map(ModuleId::as_str).collect();
    if ids.is_empty() {
        "(none)".to_string()
    } else {
        ids.join(", ")
    }
}
