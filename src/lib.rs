//! binplan: binary compensation-plan calculator
//!
//! Architecture:
//! - `domain`: referral tree, payout rules and the pure compensation engine
//! - `application`: services that load trees and assemble estimates
//! - `infrastructure`: I/O boundary traits and dependency wiring
//! - `cli`: argument parsing, command handlers, terminal output
//! - `config`: layered settings

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
