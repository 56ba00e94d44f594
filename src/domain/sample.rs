//! Sample team shown on the landing page

use crate::domain::entities::ReferralNode;

/// The three-level sample tree rooted at the viewing participant.
pub fn sample_tree() -> ReferralNode {
    let left = ReferralNode::leaf("Jane Smith", 1260.0)
        .with_role("Left Sponsor")
        .with_left(
            ReferralNode::leaf("Carlos Garcia", 620.0)
                .with_role("L2")
                .with_left(ReferralNode::leaf("K. Lee", 300.0).with_role("L3"))
                .with_right(ReferralNode::leaf("T. Owens", 220.0).with_role("L3")),
        )
        .with_right(ReferralNode::leaf("Pending", 0.0).with_role("L2"));

    let right = ReferralNode::leaf("Susan Wilson", 1320.0)
        .with_role("Right Sponsor")
        .with_left(
            ReferralNode::leaf("Donse Dors", 540.0)
                .with_role("L2")
                .with_left(ReferralNode::leaf("R. Patel", 180.0).with_role("L3")),
        )
        .with_right(ReferralNode::leaf("Emma Devis", 610.0).with_role("L2"));

    ReferralNode::leaf("Marco", 2400.0)
        .with_role("You")
        .with_left(left)
        .with_right(right)
}

/// Direct referrals counted for the sample fast-start figure.
pub const SAMPLE_DIRECTS: i64 = 6;

/// Binary bonuses earned by direct referrals in the sample matching figure.
pub const SAMPLE_DIRECT_BONUSES: [f64; 1] = [450.0];
