//! Vote policy configuration from TOML (`[voting]` section)

use super::issue::{ConfigIssue, ConfigIssueCode};
use filing_application::VotingPolicies;
use filing_domain::VotePolicy;
use serde::{Deserialize, Serialize};

/// Vote policies per task kind, written as `"MAX/THRESHOLD"`.
///
/// Unset fields keep the built-in policy.
///
/// # Example
///
/// ```toml
/// [voting]
/// locate_table = "5/3"
/// concept_items = "7/4"
/// supervisor = "1/1"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileVotingConfig {
    pub locate_table: Option<String>,
    pub sum_units: Option<String>,
    pub end_marker: Option<String>,
    pub structured_table: Option<String>,
    pub column_dates: Option<String>,
    pub concept_items: Option<String>,
    pub supervisor: Option<String>,
}

impl FileVotingConfig {
    fn parse_policy(
        field: &str,
        value: Option<&String>,
        fallback: VotePolicy,
    ) -> (VotePolicy, Vec<ConfigIssue>) {
        let Some(raw) = value else {
            return (fallback, Vec::new());
        };
        match raw.parse::<VotePolicy>() {
            Ok(policy) => (policy, Vec::new()),
            Err(e) => (
                fallback,
                vec![ConfigIssue::error(
                    ConfigIssueCode::InvalidVotePolicy {
                        field: field.to_string(),
                        value: raw.clone(),
                    },
                    format!("voting.{}: {}", field, e),
                )],
            ),
        }
    }

    /// Policies with every configured override applied, plus parse issues.
    pub fn to_policies(&self) -> (VotingPolicies, Vec<ConfigIssue>) {
        let defaults = VotingPolicies::default();
        let mut issues = Vec::new();
        let mut parse = |field: &str, value: &Option<String>, fallback: VotePolicy| {
            let (policy, found) = Self::parse_policy(field, value.as_ref(), fallback);
            issues.extend(found);
            policy
        };

        let policies = VotingPolicies {
            locate_table: parse("locate_table", &self.locate_table, defaults.locate_table),
            sum_units: parse("sum_units", &self.sum_units, defaults.sum_units),
            end_marker: parse("end_marker", &self.end_marker, defaults.end_marker),
            structured_table: parse(
                "structured_table",
                &self.structured_table,
                defaults.structured_table,
            ),
            column_dates: parse("column_dates", &self.column_dates, defaults.column_dates),
            concept_items: parse("concept_items", &self.concept_items, defaults.concept_items),
            supervisor: parse("supervisor", &self.supervisor, defaults.supervisor),
        };
        (policies, issues)
    }
}
