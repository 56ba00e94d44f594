//! Compensation engine: pure reducers over a referral tree
//!
//! Every function here is synchronous and side-effect free apart from trace logging.

use tracing::{debug, instrument};

use crate::domain::entities::{BinaryEstimate, PayoutRules, ReferralNode};
use crate::domain::error::{DomainError, DomainResult};

/// Total business volume of a subtree.
///
/// Returns 0 for an absent node. Malformed volumes contribute 0.
pub fn sum_volume(node: Option<&ReferralNode>) -> f64 {
    match node {
        None => 0.0,
        Some(n) => n.effective_volume() + n.children().map(|c| sum_volume(Some(c))).sum::<f64>(),
    }
}

/// Pair left and right leg volume into bonus cycles.
///
/// Only the root's two children are paired; deeper levels contribute to their
/// leg's total. The weaker leg caps the number of cycles and whatever the
/// stronger leg has left over is carried forward.
///
/// # Errors
/// `InvalidConfiguration` if `rules.pair_bv` is not a positive number,
/// `InvalidInput` if a leg total overflows to infinity.
#[instrument(level = "debug", skip(tree), fields(root = %tree.name))]
pub fn estimate_binary(tree: &ReferralNode, rules: &PayoutRules) -> DomainResult<BinaryEstimate> {
    let side_bv_per_pair = rules.side_bv_per_pair()?;

    let left_vol = sum_volume(tree.left());
    let right_vol = sum_volume(tree.right());
    if !left_vol.is_finite() || !right_vol.is_finite() {
        return Err(DomainError::InvalidInput(format!(
            "leg volume overflows: left {}, right {}",
            left_vol, right_vol
        )));
    }

    let matched_pairs = (left_vol.min(right_vol) / side_bv_per_pair).floor() as u64;
    let consumed = matched_pairs as f64 * side_bv_per_pair;

    let estimate = BinaryEstimate {
        left_vol,
        right_vol,
        matched_pairs,
        est_binary_bonus: matched_pairs as f64 * rules.payout_per_cycle,
        carry_left: (left_vol - consumed).max(0.0),
        carry_right: (right_vol - consumed).max(0.0),
    };
    debug!(?estimate, "binary estimate");
    Ok(estimate)
}

/// Fast-start bonus for a number of qualifying direct referrals.
///
/// # Errors
/// `InvalidInput` for a negative count.
pub fn estimate_fast_start(direct_count: i64, rules: &PayoutRules) -> DomainResult<f64> {
    let count = checked_count(direct_count, "direct referral count")?;
    Ok(count * rules.fast_start_per_direct)
}

/// Level-1 matching bonus on the binary earnings of direct referrals.
///
/// # Errors
/// `InvalidConfiguration` if `rules.matching_pct` is outside `[0, 1]`.
pub fn estimate_matching(direct_binary_bonuses: &[f64], rules: &PayoutRules) -> DomainResult<f64> {
    let pct = rules.checked_matching_pct()?;
    let total: f64 = direct_binary_bonuses.iter().sum();
    Ok(total * pct)
}

/// Volume credited for a number of qualifying referrals.
pub fn volume_for_referrals(referrals: i64, rules: &PayoutRules) -> DomainResult<f64> {
    let count = checked_count(referrals, "referral count")?;
    Ok(count * rules.bv_per_referral)
}

/// Parse a direct-referral count from loosely-typed text.
///
/// Accepts `"6"` and `"6.0"`; rejects negative, fractional and non-numeric input.
pub fn parse_direct_count(text: &str) -> DomainResult<i64> {
    let trimmed = text.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return checked_count(n, "direct referral count").map(|_| n);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= i64::MAX as f64 => {
            Ok(v as i64)
        }
        Ok(_) => Err(DomainError::InvalidInput(format!(
            "direct referral count must be a non-negative integer, got '{}'",
            trimmed
        ))),
        Err(_) => Err(DomainError::InvalidInput(format!(
            "direct referral count is not a number: '{}'",
            trimmed
        ))),
    }
}

fn checked_count(count: i64, what: &str) -> DomainResult<f64> {
    if count < 0 {
        return Err(DomainError::InvalidInput(format!(
            "{} must not be negative, got {}",
            what, count
        )));
    }
    Ok(count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn legs(left: f64, right: f64) -> ReferralNode {
        ReferralNode::leaf("root", 0.0)
            .with_left(ReferralNode::leaf("L", left))
            .with_right(ReferralNode::leaf("R", right))
    }

    fn rules(pair_bv: f64, payout_per_cycle: f64) -> PayoutRules {
        PayoutRules {
            pair_bv,
            payout_per_cycle,
            ..PayoutRules::default()
        }
    }

    #[test]
    fn given_absent_node_when_sum_volume_then_zero() {
        assert_eq!(sum_volume(None), 0.0);
    }

    #[test]
    fn given_leaf_when_sum_volume_then_own_volume() {
        assert_eq!(sum_volume(Some(&ReferralNode::leaf("A", 5.0))), 5.0);
    }

    #[test]
    fn given_tree_when_sum_volume_then_root_plus_legs() {
        let tree = ReferralNode::leaf("root", 10.0)
            .with_left(ReferralNode::leaf("L", 3.0).with_left(ReferralNode::leaf("LL", 4.0)))
            .with_right(ReferralNode::leaf("R", 2.0));
        let total = sum_volume(Some(&tree));
        assert_eq!(total, 19.0);
        assert_eq!(
            total,
            tree.effective_volume() + sum_volume(tree.left()) + sum_volume(tree.right())
        );
    }

    #[test]
    fn given_negative_leaf_when_sum_volume_then_ignored() {
        let tree = ReferralNode::leaf("root", 10.0).with_left(ReferralNode::leaf("bad", -50.0));
        assert_eq!(sum_volume(Some(&tree)), 10.0);
    }

    #[test]
    fn given_dashboard_legs_when_estimate_binary_then_twelve_pairs() {
        let est = estimate_binary(&legs(1200.0, 1200.0), &rules(200.0, 20.0)).unwrap();
        assert_eq!(est.left_vol, 1200.0);
        assert_eq!(est.right_vol, 1200.0);
        assert_eq!(est.matched_pairs, 12);
        assert_eq!(est.est_binary_bonus, 240.0);
        assert_eq!(est.carry_left, 0.0);
        assert_eq!(est.carry_right, 0.0);
    }

    #[test]
    fn given_unbalanced_legs_when_estimate_binary_then_surplus_carries() {
        let est = estimate_binary(&legs(1250.0, 730.0), &rules(200.0, 20.0)).unwrap();
        assert_eq!(est.matched_pairs, 7);
        assert_eq!(est.est_binary_bonus, 140.0);
        assert_eq!(est.carry_left, 550.0);
        assert_eq!(est.carry_right, 30.0);
    }

    #[test]
    fn given_root_without_children_when_estimate_binary_then_all_zero() {
        let est = estimate_binary(&ReferralNode::leaf("root", 900.0), &rules(200.0, 20.0)).unwrap();
        assert_eq!(est, BinaryEstimate::default());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-200.0)]
    #[case(f64::NAN)]
    fn given_non_positive_pair_bv_when_estimate_binary_then_invalid_configuration(
        #[case] pair_bv: f64,
    ) {
        let result = estimate_binary(&legs(100.0, 100.0), &rules(pair_bv, 20.0));
        assert!(matches!(result, Err(DomainError::InvalidConfiguration(_))));
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(99.0, 1000.0)]
    #[case(100.0, 100.0)]
    #[case(12345.0, 678.0)]
    #[case(0.5, 0.25)]
    fn given_any_legs_when_estimate_binary_then_no_overcount_and_carries_non_negative(
        #[case] left: f64,
        #[case] right: f64,
    ) {
        let est = estimate_binary(&legs(left, right), &rules(200.0, 20.0)).unwrap();
        assert!(est.matched_pairs as f64 * 100.0 <= left.min(right));
        assert!(est.carry_left >= 0.0);
        assert!(est.carry_right >= 0.0);
    }

    #[test]
    fn given_leg_total_overflowing_when_estimate_binary_then_invalid_input() {
        let huge = ReferralNode::leaf("L", 1e308).with_left(ReferralNode::leaf("LL", 1e308));
        let tree = ReferralNode::leaf("root", 0.0)
            .with_left(huge)
            .with_right(ReferralNode::leaf("R", 500.0));

        let result = estimate_binary(&tree, &rules(200.0, 20.0));

        assert!(matches!(result, Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn given_growing_left_leg_when_estimate_binary_then_monotonic() {
        let rules = rules(200.0, 20.0);
        let mut previous = estimate_binary(&legs(0.0, 1000.0), &rules).unwrap();
        for left in (50..=1500).step_by(50) {
            let current = estimate_binary(&legs(left as f64, 1000.0), &rules).unwrap();
            assert!(current.matched_pairs >= previous.matched_pairs);
            assert!(current.carry_right <= previous.carry_right);
            previous = current;
        }
    }

    #[test]
    fn given_six_directs_when_estimate_fast_start_then_150() {
        assert_eq!(estimate_fast_start(6, &PayoutRules::default()).unwrap(), 150.0);
    }

    #[test]
    fn given_negative_directs_when_estimate_fast_start_then_invalid_input() {
        assert!(matches!(
            estimate_fast_start(-1, &PayoutRules::default()),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn given_one_direct_bonus_when_estimate_matching_then_ten_percent() {
        let matching = estimate_matching(&[450.0], &PayoutRules::default()).unwrap();
        assert!((matching - 45.0).abs() < 1e-9);
    }

    #[test]
    fn given_no_bonuses_when_estimate_matching_then_zero() {
        assert_eq!(estimate_matching(&[], &PayoutRules::default()).unwrap(), 0.0);
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.01)]
    fn given_out_of_range_pct_when_estimate_matching_then_invalid_configuration(
        #[case] matching_pct: f64,
    ) {
        let rules = PayoutRules {
            matching_pct,
            ..PayoutRules::default()
        };
        assert!(matches!(
            estimate_matching(&[100.0], &rules),
            Err(DomainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn given_referrals_when_volume_for_referrals_then_scaled_by_bv_per_referral() {
        assert_eq!(volume_for_referrals(12, &PayoutRules::default()).unwrap(), 1200.0);
        assert!(volume_for_referrals(-3, &PayoutRules::default()).is_err());
    }

    #[rstest]
    #[case("6", 6)]
    #[case(" 12 ", 12)]
    #[case("3.0", 3)]
    #[case("0", 0)]
    fn given_integer_text_when_parse_direct_count_then_ok(#[case] text: &str, #[case] expected: i64) {
        assert_eq!(parse_direct_count(text).unwrap(), expected);
    }

    #[rstest]
    #[case("-1")]
    #[case("2.5")]
    #[case("six")]
    #[case("")]
    fn given_bad_text_when_parse_direct_count_then_invalid_input(#[case] text: &str) {
        assert!(matches!(
            parse_direct_count(text),
            Err(DomainError::InvalidInput(_))
        ));
    }
}
