//! Compensation service
//!
//! Loads referral trees and turns them into payout estimates under the configured rules.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::sample::sample_tree;
use crate::domain::{
    estimate_binary, estimate_fast_start, estimate_matching, sum_volume, BinaryEstimate,
    IncomeSnapshot, PayoutRules, ReferralNode,
};
use crate::infrastructure::traits::FileSystem;

/// Volume totals of a team.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamVolume {
    /// Whole tree including the root's own volume
    pub total: f64,
    pub left: f64,
    pub right: f64,
    pub members: usize,
}

/// Service for computing compensation-plan estimates.
pub struct CompensationService {
    fs: Arc<dyn FileSystem>,
    rules: PayoutRules,
}

impl CompensationService {
    /// Create a new compensation service.
    pub fn new(fs: Arc<dyn FileSystem>, rules: PayoutRules) -> Self {
        Self { fs, rules }
    }

    pub fn rules(&self) -> &PayoutRules {
        &self.rules
    }

    /// Load a referral tree from a TOML file, or the sample tree when no path is given.
    #[instrument(level = "debug", skip(self))]
    pub fn load_tree(&self, path: Option<&Path>) -> ApplicationResult<ReferralNode> {
        let Some(path) = path else {
            debug!("load_tree: no file given, using sample tree");
            return Ok(sample_tree());
        };

        if !self.fs.is_file(path) {
            return Err(ApplicationError::OperationFailed {
                context: format!("tree file not found: {}", path.display()),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "file does not exist",
                )),
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read tree file", path)?;
        let tree = Self::parse_tree(&content, path)?;
        debug!(
            "load_tree: {} members, depth {}",
            tree.member_count(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Parse tree file content.
    pub fn parse_tree(content: &str, path: &Path) -> ApplicationResult<ReferralNode> {
        toml::from_str(content).map_err(|e| ApplicationError::InvalidTree {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
    }

    /// Total volume and per-leg volume of a tree.
    pub fn team_volume(&self, tree: &ReferralNode) -> TeamVolume {
        TeamVolume {
            total: sum_volume(Some(tree)),
            left: sum_volume(tree.left()),
            right: sum_volume(tree.right()),
            members: tree.member_count(),
        }
    }

    pub fn binary(&self, tree: &ReferralNode) -> ApplicationResult<BinaryEstimate> {
        Ok(estimate_binary(tree, &self.rules)?)
    }

    pub fn fast_start(&self, direct_count: i64) -> ApplicationResult<f64> {
        Ok(estimate_fast_start(direct_count, &self.rules)?)
    }

    pub fn matching(&self, direct_binary_bonuses: &[f64]) -> ApplicationResult<f64> {
        Ok(estimate_matching(direct_binary_bonuses, &self.rules)?)
    }

    /// Binary, fast-start and matching estimates for one period.
    #[instrument(level = "debug", skip(self, tree), fields(root = %tree.name))]
    pub fn snapshot(
        &self,
        tree: &ReferralNode,
        direct_count: i64,
        direct_binary_bonuses: &[f64],
    ) -> ApplicationResult<IncomeSnapshot> {
        let binary = self.binary(tree)?;
        let fast_start = self.fast_start(direct_count)?;
        let matching = self.matching(direct_binary_bonuses)?;

        Ok(IncomeSnapshot {
            binary,
            fast_start,
            matching,
            weekly_total: fast_start + matching,
        })
    }
}
