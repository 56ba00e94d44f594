//! Domain entities: core data structures

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::error::{DomainError, DomainResult};

/// Label shown for nodes without an explicit role.
pub const DEFAULT_ROLE: &str = "Member";

/// One participant placed in a binary referral tree.
///
/// The two legs are explicit fields, so "left" and "right" never depend on
/// list position once a tree has been constructed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawNode")]
pub struct ReferralNode {
    /// Display identifier
    pub name: String,
    /// Descriptive label, e.g. "Left Sponsor"
    pub role: Option<String>,
    /// Business volume credited directly to this participant
    pub volume: f64,
    pub left: Option<Box<ReferralNode>>,
    pub right: Option<Box<ReferralNode>>,
}

impl ReferralNode {
    /// Create a node without children.
    pub fn leaf(name: impl Into<String>, volume: f64) -> Self {
        Self {
            name: name.into(),
            role: None,
            volume,
            left: None,
            right: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_left(mut self, node: ReferralNode) -> Self {
        self.left = Some(Box::new(node));
        self
    }

    pub fn with_right(mut self, node: ReferralNode) -> Self {
        self.right = Some(Box::new(node));
        self
    }

    /// Left leg, if placed.
    pub fn left(&self) -> Option<&ReferralNode> {
        self.left.as_deref()
    }

    /// Right leg, if placed.
    pub fn right(&self) -> Option<&ReferralNode> {
        self.right.as_deref()
    }

    /// Children in left, right order, skipping empty positions.
    pub fn children(&self) -> impl Iterator<Item = &ReferralNode> {
        self.left().into_iter().chain(self.right())
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Volume used in computations: negative or non-finite values count as 0.
    pub fn effective_volume(&self) -> f64 {
        sanitize_volume(self.volume)
    }

    /// Role label for display.
    pub fn role_label(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_ROLE)
    }

    /// Number of nodes in this subtree, including self.
    pub fn member_count(&self) -> usize {
        1 + self.children().map(ReferralNode::member_count).sum::<usize>()
    }

    /// Number of levels in this subtree (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children().map(ReferralNode::depth).max().unwrap_or(0)
    }
}

fn sanitize_volume(volume: f64) -> f64 {
    if volume.is_finite() && volume > 0.0 {
        volume
    } else {
        0.0
    }
}

/// Loosely-typed tree node as found in tree files.
///
/// `children` is positional: first entry is the left leg, second the right leg.
#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    volume: Option<LooseVolume>,
    #[serde(default)]
    children: Vec<RawNode>,
}

/// Volume value as written by an external source.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseVolume {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseVolume {
    fn coerce(self, name: &str) -> f64 {
        let value = match &self {
            LooseVolume::Number(v) => *v,
            LooseVolume::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
            LooseVolume::Other(_) => f64::NAN,
        };
        let sanitized = sanitize_volume(value);
        if sanitized != value && value != 0.0 {
            warn!("node '{}': volume {:?} coerced to 0", name, self);
        }
        sanitized
    }
}

impl TryFrom<RawNode> for ReferralNode {
    type Error = DomainError;

    fn try_from(raw: RawNode) -> Result<Self, Self::Error> {
        let name = raw.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::InvalidInput(
                "node name must not be empty".into(),
            ));
        }
        if raw.children.len() > 2 {
            return Err(DomainError::InvalidInput(format!(
                "node '{}' has {} children, a binary tree allows at most two",
                name,
                raw.children.len()
            )));
        }

        let volume = match raw.volume {
            Some(v) => v.coerce(&name),
            None => {
                warn!("node '{}': volume missing, coerced to 0", name);
                0.0
            }
        };

        let mut children = raw.children.into_iter().map(ReferralNode::try_from);
        let left = children.next().transpose()?.map(Box::new);
        let right = children.next().transpose()?.map(Box::new);

        Ok(Self {
            name,
            role: raw.role.filter(|r| !r.trim().is_empty()),
            volume,
            left,
            right,
        })
    }
}

/// Payout rules of the compensation plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutRules {
    /// BV credited per qualifying referral
    pub bv_per_referral: f64,
    /// Total volume across both legs required for one matched pair
    pub pair_bv: f64,
    /// Currency paid per matched pair
    pub payout_per_cycle: f64,
    /// Currency paid per qualifying direct referral
    pub fast_start_per_direct: f64,
    /// Fraction of a direct's binary earnings paid as override
    pub matching_pct: f64,
}

impl Default for PayoutRules {
    fn default() -> Self {
        Self {
            bv_per_referral: 100.0,
            pair_bv: 200.0,
            payout_per_cycle: 20.0,
            fast_start_per_direct: 25.0,
            matching_pct: 0.1,
        }
    }
}

impl PayoutRules {
    /// Volume each leg must contribute to one pair.
    ///
    /// Fails for a non-positive `pair_bv`: clamping it would misstate bonuses.
    pub fn side_bv_per_pair(&self) -> DomainResult<f64> {
        if !self.pair_bv.is_finite() || self.pair_bv <= 0.0 {
            return Err(DomainError::InvalidConfiguration(format!(
                "pair_bv must be a positive number, got {}",
                self.pair_bv
            )));
        }
        Ok(self.pair_bv / 2.0)
    }

    /// Matching percentage, checked to lie in [0, 1].
    pub fn checked_matching_pct(&self) -> DomainResult<f64> {
        if !self.matching_pct.is_finite() || !(0.0..=1.0).contains(&self.matching_pct) {
            return Err(DomainError::InvalidConfiguration(format!(
                "matching_pct must be within [0, 1], got {}",
                self.matching_pct
            )));
        }
        Ok(self.matching_pct)
    }

    /// Validate all rules at once.
    pub fn validate(&self) -> DomainResult<()> {
        self.side_bv_per_pair()?;
        self.checked_matching_pct()?;
        for (key, value) in [
            ("bv_per_referral", self.bv_per_referral),
            ("payout_per_cycle", self.payout_per_cycle),
            ("fast_start_per_direct", self.fast_start_per_direct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::InvalidConfiguration(format!(
                    "{} must be a non-negative number, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }
}

/// Result of pairing left and right leg volume.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BinaryEstimate {
    pub left_vol: f64,
    pub right_vol: f64,
    pub matched_pairs: u64,
    pub est_binary_bonus: f64,
    /// Unmatched left volume carried forward
    pub carry_left: f64,
    /// Unmatched right volume carried forward
    pub carry_right: f64,
}

/// Estimated income for one period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IncomeSnapshot {
    pub binary: BinaryEstimate,
    pub fast_start: f64,
    pub matching: f64,
    /// Fast start plus matching
    pub weekly_total: f64,
}
