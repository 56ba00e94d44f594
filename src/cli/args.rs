//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Binary compensation-plan calculator: leg volumes, pairing cycles, fast-start and matching bonuses
#[derive(Parser, Debug)]
#[command(name = "binplan")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (repeat for more: -d -d -d)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Config file (default: ./.binplan.toml if present)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show referral tree
    Tree {
        /// Tree file (default: configured tree_file, else sample tree)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Show team and leg volume
    Volume {
        /// Tree file (default: configured tree_file, else sample tree)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },

    /// Estimate binary pairing bonus
    Binary {
        /// Tree file (default: configured tree_file, else sample tree)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Override BV required across both legs for one pair
        #[arg(long)]
        pair_bv: Option<f64>,
        /// Override amount paid per matched pair
        #[arg(long)]
        payout_per_cycle: Option<f64>,
    },

    /// Estimate fast-start bonus
    FastStart {
        /// Number of qualifying direct referrals
        directs: String,
    },

    /// Estimate first-level matching bonus
    Matching {
        /// Binary bonuses earned by direct referrals
        #[arg(allow_negative_numbers = true)]
        bonuses: Vec<f64>,
    },

    /// Show binary, fast-start and matching estimates together
    Snapshot {
        /// Tree file (default: configured tree_file, else sample tree)
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
        /// Number of qualifying direct referrals
        #[arg(long)]
        directs: Option<String>,
        /// Binary bonus of a direct referral (repeatable)
        #[arg(long = "direct-bonus", allow_negative_numbers = true)]
        direct_bonuses: Vec<f64>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
