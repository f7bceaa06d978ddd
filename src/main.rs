//! ia-commits - CLI entry point, invoked by the installed git hooks.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;

use ia_commits::config::{self, Environment};
use ia_commits::error::InstallError;
use ia_commits::hook::{self, EXIT_FAILURE, Outcome};
use ia_commits::{install, logging};

/// AI-assisted commit message suggestion and verification.
#[derive(Parser, Debug)]
#[command(name = "ia-commits")]
#[command(about = "AI-assisted commit message suggestion and verification")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// prepare-commit-msg hook: write a suggested message into FILE
    Prepare {
        /// Commit message file git passes to the hook
        file: PathBuf,
        /// Message source (message, template, merge, squash or commit)
        source: Option<String>,
        /// Commit SHA, given when amending
        sha: Option<String>,
    },

    /// commit-msg hook: reject FILE unless it is a Conventional Commit
    Verify {
        /// Commit message file git passes to the hook
        file: PathBuf,
    },

    /// Install both hooks into the current repository
    Install {
        /// Replace existing hooks that were not installed by ia-commits
        #[arg(long)]
        force: bool,
    },

    /// Remove the hooks ia-commits installed
    Uninstall,

    /// Check git, configuration and hook installation
    Doctor,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let env = Environment::capture();
    logging::init(&env, &config::log_path(&env));

    let code = match cli.command {
        Command::Prepare { file, source, sha } => {
            if let Some(sha) = sha {
                tracing::debug!("prepare-commit-msg for existing commit {}", sha);
            }
            hook_exit(hook::prepare::run(&file, source.as_deref(), Path::new("."), &env).await)
        }
        Command::Verify { file } => {
            let result = hook::verify::run(&file, &env).await;
            if let Ok(Outcome::Block(reason)) = &result {
                hook::print_block(reason);
            }
            hook_exit(result)
        }
        Command::Install { force } => admin_exit(run_install(force)),
        Command::Uninstall => admin_exit(run_uninstall()),
        Command::Doctor => admin_exit(run_doctor(&env)),
    };

    ExitCode::from(code)
}

fn hook_exit(result: Result<Outcome, ia_commits::HookError>) -> u8 {
    match result {
        Ok(outcome) => outcome.exit_code() as u8,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("ia-commits: {}", e);
            EXIT_FAILURE as u8
        }
    }
}

fn admin_exit(result: Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn run_install(force: bool) -> Result<()> {
    let dir = Path::new(".");
    let installed = match install::install_hooks(dir, force) {
        Err(InstallError::ForeignHook { path }) if std::io::stdin().is_terminal() => {
            let replace = Confirm::new()
                .with_prompt(format!(
                    "{} exists and was not installed by ia-commits. Replace it?",
                    path.display()
                ))
                .default(false)
                .interact()
                .context("Failed to read confirmation")?;

            if !replace {
                return Err(InstallError::Cancelled.into());
            }
            install::install_hooks(dir, true)?
        }
        other => other?,
    };

    for path in installed {
        println!("✓ Installed {}", path.display());
    }
    Ok(())
}

fn run_uninstall() -> Result<()> {
    let removed = install::uninstall_hooks(Path::new("."))?;
    if removed.is_empty() {
        println!("No ia-commits hooks installed. Nothing to remove.");
    }
    for path in removed {
        println!("✓ Removed {}", path.display());
    }
    Ok(())
}

fn run_doctor(env: &Environment) -> Result<()> {
    let checks = install::doctor(Path::new("."), env);
    for check in &checks {
        let mark = if check.ok { "✓" } else { "✗" };
        println!("{} {}: {}", mark, check.name, check.detail);
    }

    let failed = checks.iter().filter(|c| !c.ok).count();
    if failed > 0 {
        anyhow::bail!("{} check(s) failed", failed);
    }
    Ok(())
}
