//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults (the sample plan rules)
//! 2. Global config: `$XDG_CONFIG_HOME/binplan/binplan.toml`
//! 3. Local config: `--config <file>`, else `./.binplan.toml` if present
//! 4. Environment variables: `BINPLAN_` prefix, `__` as section separator
//!    (`BINPLAN_RULES__PAIR_BV=300`, `BINPLAN_TREE_FILE=~/team.toml`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::PayoutRules;

/// Raw payout rules for intermediate parsing (`None` → not specified, inherit from base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRules {
    pub bv_per_referral: Option<f64>,
    pub pair_bv: Option<f64>,
    pub payout_per_cycle: Option<f64>,
    pub fast_start_per_direct: Option<f64>,
    pub matching_pct: Option<f64>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub tree_file: Option<PathBuf>,
    #[serde(default)]
    pub rules: RawRules,
}

impl RawRules {
    /// Overlay onto `base`: every specified option wins.
    pub fn apply_to(&self, base: &PayoutRules) -> PayoutRules {
        PayoutRules {
            bv_per_referral: self.bv_per_referral.unwrap_or(base.bv_per_referral),
            pair_bv: self.pair_bv.unwrap_or(base.pair_bv),
            payout_per_cycle: self.payout_per_cycle.unwrap_or(base.payout_per_cycle),
            fast_start_per_direct: self
                .fast_start_per_direct
                .unwrap_or(base.fast_start_per_direct),
            matching_pct: self.matching_pct.unwrap_or(base.matching_pct),
        }
    }
}

/// Unified configuration for binplan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    /// Tree file used when a command gets none (default: built-in sample tree)
    pub tree_file: Option<PathBuf>,
    /// Compensation plan rules
    pub rules: PayoutRules,
}

/// Get the XDG config directory for binplan.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "binplan").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("binplan.toml"))
}

/// Get the path of the implicit local config file.
pub fn local_config_path() -> PathBuf {
    PathBuf::from(".binplan.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(tree_file) = &self.tree_file {
            let expanded = shellexpand::full(tree_file.to_string_lossy().as_ref())
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| tree_file.to_string_lossy().into_owned());
            self.tree_file = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            tree_file: overlay
                .tree_file
                .clone()
                .or_else(|| self.tree_file.clone()),
            rules: overlay.rules.apply_to(&self.rules),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given
    ///
    /// Without an explicit file, `./.binplan.toml` is used if it exists.
    /// The merged rules are validated before returning.
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("load: global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Local config
        let local_path = match local {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(local_config_path()).filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            debug!("load: local config {}", path.display());
            current = current.merge_with(&load_raw_settings(&path)?);
        }

        // 4. Environment variables (explicit override)
        let env = Config::builder()
            .add_source(
                Environment::with_prefix("BINPLAN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;
        current = current.apply_overrides(&env);

        current.expand_paths();
        current.rules.validate()?;

        Ok(current)
    }

    /// Apply values from a `config::Config` (env vars) as explicit overrides.
    fn apply_overrides(mut self, config: &Config) -> Self {
        if let Ok(val) = config.get_string("tree_file") {
            self.tree_file = Some(PathBuf::from(val));
        }
        let rules = &mut self.rules;
        for (key, slot) in [
            ("rules.bv_per_referral", &mut rules.bv_per_referral),
            ("rules.pair_bv", &mut rules.pair_bv),
            ("rules.payout_per_cycle", &mut rules.payout_per_cycle),
            ("rules.fast_start_per_direct", &mut rules.fast_start_per_direct),
            ("rules.matching_pct", &mut rules.matching_pct),
        ] {
            if let Ok(val) = config.get_float(key) {
                *slot = val;
            }
        }
        self
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# binplan configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/binplan/binplan.toml
#   Local:  --config <file>, or ./.binplan.toml
#   Env:    BINPLAN_* environment variables, e.g. BINPLAN_RULES__PAIR_BV=300

# Tree file used when a command is given none (default: built-in sample tree)
# tree_file = "~/team.toml"

[rules]
# BV credited per qualifying referral
# bv_per_referral = 100

# Total BV across both legs that forms one matched pair
# pair_bv = 200

# Amount paid per matched pair
# payout_per_cycle = 20

# Amount paid per qualifying direct referral
# fast_start_per_direct = 25

# Fraction of a direct's binary bonus paid as matching, within [0, 1]
# matching_pct = 0.1
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
