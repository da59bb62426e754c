//! Identity pack
//!
//! Account behavior deviation: failed-login z-scores, off-hours sign-ins,
//! privileged group membership, dormant reactivation, impossible travel.
//! Deviation domain, mean-scaled like the flow pack.

use crate::artifact::{ArtifactKind, FieldValue};
use crate::catalog::packs::CATALOG_VERSION;
use crate::catalog::types::{
    CombineStrategy, FieldSelector, KindProfile, Predicate, Rule, RulePack, VerdictStyle, Weight,
};
use crate::catalog::Baseline;
use crate::constants::DEVIATION_SCALE;
use crate::severity::Severity;

const PRIVILEGED_GROUPS: &[&str] = &[
    "domain admins",
    "administrators",
    "enterprise admins",
    "root",
    "sudo",
];

pub fn pack() -> RulePack {
    let kind = ArtifactKind::Identity;
    RulePack {
        name: "identity".to_string(),
        version: CATALOG_VERSION.to_string(),
        profile: KindProfile::new(
            kind.clone(),
            CombineStrategy::MeanScaled(DEVIATION_SCALE),
            VerdictStyle::Anomalous,
        ),
        rules: vec![
            Rule::new(
                "IDN-001",
                kind.clone(),
                FieldSelector::field("failed_logins"),
                Predicate::ZScoreAbove { threshold: 3.0 },
                "auth.z_score",
                Weight::Scaled(1.0),
                Severity::High,
            )
            .label("auth_failures")
            .message("{value} failed logins (z={z})")
            .remediation("Lock the account pending password reset and review source addresses"),
            Rule::new(
                "IDN-002",
                kind.clone(),
                FieldSelector::field("last_login"),
                Predicate::TimeOutside { start: 7, end: 20 },
                "temporal",
                Weight::Fixed(1.5),
                Severity::Medium,
            )
            .label("off_hours_login")
            .message("login at hour {hour} outside the working window"),
            Rule::new(
                "IDN-003",
                kind.clone(),
                FieldSelector::field("groups"),
                Predicate::in_set(PRIVILEGED_GROUPS),
                "privilege",
                Weight::Fixed(1.0),
                Severity::Medium,
            )
            .label("privileged_group")
            .message("member of privileged groups: {matches}"),
            Rule::new(
                "IDN-004",
                kind.clone(),
                FieldSelector::field("dormant_days"),
                Predicate::Outside {
                    lo: None,
                    hi: Some(90.0),
                },
                "dormancy",
                Weight::Scaled(0.02),
                Severity::Medium,
            )
            .label("dormant_reactivation")
            .message("account dormant for {value} days before this activity")
            .remediation("Verify the reactivation with the account owner"),
            Rule::new(
                "IDN-005",
                kind.clone(),
                FieldSelector::field("impossible_travel"),
                Predicate::Equals(FieldValue::Int(1)),
                "geo",
                Weight::Fixed(4.0),
                Severity::Critical,
            )
            .label("impossible_travel")
            .message("sign-ins from locations not reachable in the elapsed time")
            .remediation("Force re-authentication and invalidate active sessions"),
        ],
        baselines: vec![("auth.z_score".to_string(), Baseline::new(2.0, 3.0))],
        derive: None,
    }
}
