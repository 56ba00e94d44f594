//! Command dispatch and handlers

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::application::services::CompensationService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::sample::{SAMPLE_DIRECTS, SAMPLE_DIRECT_BONUSES};
use crate::domain::{parse_direct_count, render_tree, ReferralNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Execute the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    // Completion must work without a valid config
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.as_deref())?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { file } => cmd_tree(&container, file.as_deref()),
        Commands::Volume { file } => cmd_volume(&container, file.as_deref()),
        Commands::Binary {
            file,
            pair_bv,
            payout_per_cycle,
        } => cmd_binary(&container, file.as_deref(), *pair_bv, *payout_per_cycle),
        Commands::FastStart { directs } => cmd_fast_start(&container, directs),
        Commands::Matching { bonuses } => cmd_matching(&container, bonuses),
        Commands::Snapshot {
            file,
            directs,
            direct_bonuses,
        } => cmd_snapshot(&container, file.as_deref(), directs.as_deref(), direct_bonuses),
        Commands::Config { command } => cmd_config(&container, command),
        Commands::Completion { .. } => Ok(()),
    }
}

/// Tree file from the command line, else from settings; `None` means the sample tree.
fn tree_path<'a>(container: &'a ServiceContainer, file: Option<&'a Path>) -> Option<&'a Path> {
    file.or(container.settings.tree_file.as_deref())
}

fn load_tree(container: &ServiceContainer, file: Option<&Path>) -> CliResult<ReferralNode> {
    Ok(container
        .compensation
        .load_tree(tree_path(container, file))?)
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let tree = load_tree(container, file)?;
    output::info(&render_tree(&tree));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_volume(container: &ServiceContainer, file: Option<&Path>) -> CliResult<()> {
    let tree = load_tree(container, file)?;
    let volume = container.compensation.team_volume(&tree);

    output::header(&format!("Team volume: {}", tree.name));
    output::field("Members", &volume.members);
    output::field("Left volume", &output::bv(volume.left));
    output::field("Right volume", &output::bv(volume.right));
    output::total("Team volume", &output::bv(volume.total));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_binary(
    container: &ServiceContainer,
    file: Option<&Path>,
    pair_bv: Option<f64>,
    payout_per_cycle: Option<f64>,
) -> CliResult<()> {
    let mut rules = *container.compensation.rules();
    if let Some(v) = pair_bv {
        rules.pair_bv = v;
    }
    if let Some(v) = payout_per_cycle {
        rules.payout_per_cycle = v;
    }
    debug!(?rules, "effective rules");
    let service = CompensationService::new(Arc::clone(&container.fs), rules);

    let tree = service.load_tree(tree_path(container, file))?;
    let est = service.binary(&tree)?;

    output::header("Binary snapshot");
    output::field("Left volume", &output::bv(est.left_vol));
    output::field("Right volume", &output::bv(est.right_vol));
    output::field("Current cycle", &format!("{} pairs", est.matched_pairs));
    output::field("Carry left", &output::bv(est.carry_left));
    output::field("Carry right", &output::bv(est.carry_right));
    output::total("Est. binary bonus", &output::money(est.est_binary_bonus));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_fast_start(container: &ServiceContainer, directs: &str) -> CliResult<()> {
    let count = parse_direct_count(directs)?;
    let fast_start = container.compensation.fast_start(count)?;
    output::total(
        &format!("Fast start ({} directs)", count),
        &output::money(fast_start),
    );
    Ok(())
}

#[instrument(skip(container))]
fn cmd_matching(container: &ServiceContainer, bonuses: &[f64]) -> CliResult<()> {
    let matching = container.compensation.matching(bonuses)?;
    let pct = container.compensation.rules().matching_pct * 100.0;
    output::total(
        &format!("1st level matching ({}%)", output::amount(pct)),
        &output::money(matching),
    );
    Ok(())
}

#[instrument(skip(container))]
fn cmd_snapshot(
    container: &ServiceContainer,
    file: Option<&Path>,
    directs: Option<&str>,
    direct_bonuses: &[f64],
) -> CliResult<()> {
    let path = tree_path(container, file);

    // Sample tree without explicit figures reproduces the sample dashboard
    let (count, bonuses) = match (path, directs, direct_bonuses.is_empty()) {
        (None, None, true) => (SAMPLE_DIRECTS, SAMPLE_DIRECT_BONUSES.to_vec()),
        (_, Some(text), _) => (parse_direct_count(text)?, direct_bonuses.to_vec()),
        (_, None, _) => (0, direct_bonuses.to_vec()),
    };

    let tree = container.compensation.load_tree(path)?;
    let snapshot = container.compensation.snapshot(&tree, count, &bonuses)?;
    let pct = container.compensation.rules().matching_pct * 100.0;

    output::header(&format!("Income snapshot: {}", tree.name));
    output::field("Left volume", &output::bv(snapshot.binary.left_vol));
    output::field("Right volume", &output::bv(snapshot.binary.right_vol));
    output::field(
        "Current cycle",
        &format!("{} pairs", snapshot.binary.matched_pairs),
    );
    output::field(
        "Est. binary bonus",
        &output::money(snapshot.binary.est_binary_bonus),
    );
    output::field(
        &format!("Fast start ({} directs)", count),
        &output::money(snapshot.fast_start),
    );
    output::field(
        &format!("1st level matching ({}%)", output::amount(pct)),
        &output::money(snapshot.matching),
    );
    output::total("Est. weekly total", &output::money(snapshot.weekly_total));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global, force } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path()
            };
            config_init(container, &path, *force)
        }
        ConfigCommands::Path => {
            for (label, path) in [
                ("Global", global_config_path()),
                ("Local", Some(local_config_path())),
            ] {
                match path {
                    Some(p) => {
                        let state = if container.fs.exists(&p) {
                            "exists"
                        } else {
                            "not found"
                        };
                        output::field(label, &format!("{} ({})", p.display(), state));
                    }
                    None => output::field(label, &"unavailable"),
                }
            }
            Ok(())
        }
    }
}

fn config_init(container: &ServiceContainer, path: &Path, force: bool) -> CliResult<()> {
    if container.fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "config already exists: {} (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        container
            .fs
            .create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    container
        .fs
        .write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::success(&format!("created {}", path.display()));
    Ok(())
}
