//! Tests for the triage policy table

#[cfg(test)]
mod tests {
    use crate::triage::{derive_actions, derive_referral, ActionPlan, SeverityTier, Urgency};

    #[test]
    fn test_every_tier_has_immediate_actions() {
        for tier in SeverityTier::ALL {
            let plan = derive_actions(tier);
            assert!(!plan.immediate.is_empty(), "{} has no immediate actions", tier);
            assert!(!plan.follow_up.is_empty(), "{} has no follow-up", tier);
        }
    }

    #[test]
    fn test_referral_iff_high() {
        for tier in SeverityTier::ALL {
            let referral = derive_referral(tier);
            assert_eq!(referral.required, tier == SeverityTier::High);
            let expected = if referral.required { Urgency::Emergency } else { Urgency::Routine };
            assert_eq!(referral.urgency, expected);
        }
    }

    #[test]
    fn test_policy_table() {
        assert_eq!(
            derive_actions(SeverityTier::Low),
            ActionPlan {
                immediate: vec!["Rest".to_string(), "Stay hydrated".to_string()],
                follow_up: vec!["Monitor symptoms".to_string()],
            }
        );
        assert_eq!(
            derive_actions(SeverityTier::Medium).immediate,
            vec!["Rest", "Stay hydrated", "Take prescribed medication"]
        );
        assert_eq!(
            derive_actions(SeverityTier::Medium).follow_up,
            vec!["Schedule follow-up in 48 hours"]
        );
        assert_eq!(
            derive_actions(SeverityTier::High).immediate,
            vec!["Seek immediate medical attention", "Take prescribed medication"]
        );
        assert_eq!(
            derive_actions(SeverityTier::High).follow_up,
            vec!["Urgent medical review required"]
        );
    }

    #[test]
    fn test_wire_format() {
        let plan = serde_json::to_value(derive_actions(SeverityTier::Low)).unwrap();
        assert!(plan.get("followUp").is_some());

        let referral = serde_json::to_value(derive_referral(SeverityTier::High)).unwrap();
        assert_eq!(referral["required"], true);
        assert_eq!(referral["urgency"], "emergency");

        assert_eq!(serde_json::to_value(SeverityTier::Medium).unwrap(), "medium");
    }
}
