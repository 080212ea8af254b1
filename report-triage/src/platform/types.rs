//! Report platform domain types and the JSON:API shapes they are read from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity rating filter (`filter[severity][]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::None,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Report state filter (`filter[state][]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportState {
    New,
    Triaged,
    PendingProgramReview,
    NeedsMoreInfo,
    Resolved,
    NotApplicable,
    Informative,
    Duplicate,
    Spam,
    Retesting,
}

impl ReportState {
    pub const ALL: [ReportState; 10] = [
        ReportState::New,
        ReportState::Triaged,
        ReportState::PendingProgramReview,
        ReportState::NeedsMoreInfo,
        ReportState::Resolved,
        ReportState::NotApplicable,
        ReportState::Informative,
        ReportState::Duplicate,
        ReportState::Spam,
        ReportState::Retesting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReportState::New => "new",
            ReportState::Triaged => "triaged",
            ReportState::PendingProgramReview => "pending-program-review",
            ReportState::NeedsMoreInfo => "needs-more-info",
            ReportState::Resolved => "resolved",
            ReportState::NotApplicable => "not-applicable",
            ReportState::Informative => "informative",
            ReportState::Duplicate => "duplicate",
            ReportState::Spam => "spam",
            ReportState::Retesting => "retesting",
        }
    }
}

macro_rules! wire_enum {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                $ty::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let allowed: Vec<_> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{}', expected one of: {}", $what, s, allowed.join(", "))
                    })
            }
        }
    };
}

wire_enum!(Severity, "severity");
wire_enum!(ReportState, "state");

/// Listing filter. Empty vectors mean "no filter" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub program: String,
    pub severities: Vec<Severity>,
    pub states: Vec<ReportState>,
    /// Only reports with no issue-tracker reference.
    pub without_reference: bool,
}

impl ReportFilter {
    /// Query pairs for `GET /reports`, page number included.
    pub fn query(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut q = vec![("filter[program][]", self.program.clone())];
        q.extend(
            self.severities
                .iter()
                .map(|s| ("filter[severity][]", s.as_str().to_string())),
        );
        q.extend(
            self.states
                .iter()
                .map(|s| ("filter[state][]", s.as_str().to_string())),
        );
        if self.without_reference {
            q.push(("filter[issue_tracker_reference_id__null]", "true".to_string()));
        }
        q.push(("page[number]", page.to_string()));
        q
    }
}

/// The subset of a report shown to the operator before triage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub id: String,
    pub title: String,
    pub state: String,
    pub reporter_reputation: Option<String>,
    pub reporter_signal: Option<String>,
}

/// One page of the report listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub number: u32,
    pub reports: Vec<ReportSummary>,
    /// `links.next` was present; another page exists.
    pub has_next: bool,
}

/* --- wire shapes --- */

#[derive(Debug, Deserialize)]
pub(crate) struct ListEnvelope {
    #[serde(default)]
    pub data: Vec<ReportResource>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Links {
    #[serde(default)]
    pub next: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SingleEnvelope {
    pub data: ReportResource,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportResource {
    pub id: Value,
    #[serde(default)]
    pub attributes: ReportAttributes,
    #[serde(default)]
    pub relationships: Option<Relationships>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportAttributes {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Relationships {
    #[serde(default)]
    pub reporter: Option<Related>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Related {
    #[serde(default)]
    pub data: Option<RelatedData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelatedData {
    #[serde(default)]
    pub attributes: serde_json::Map<String, Value>,
}

impl ReportResource {
    pub(crate) fn into_summary(self) -> Option<ReportSummary> {
        let id = match self.id {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        let reporter = self
            .relationships
            .and_then(|r| r.reporter)
            .and_then(|r| r.data)
            .map(|d| d.attributes)
            .unwrap_or_default();
        let stat = |key: &str| {
            reporter.get(key).and_then(|v| match v {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            })
        };

        Some(ReportSummary {
            reporter_reputation: stat("reputation"),
            reporter_signal: stat("signal"),
            id,
            title: self.attributes.title.unwrap_or_default(),
            state: self.attributes.state.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn filters_render_as_bracketed_query_pairs() {
        let f = ReportFilter {
            program: "acme".into(),
            severities: vec![Severity::High],
            states: vec![ReportState::PendingProgramReview, ReportState::New],
            without_reference: true,
        };
        assert_eq!(
            f.query(3),
            vec![
                ("filter[program][]", "acme".to_string()),
                ("filter[severity][]", "high".to_string()),
                ("filter[state][]", "pending-program-review".to_string()),
                ("filter[state][]", "new".to_string()),
                ("filter[issue_tracker_reference_id__null]", "true".to_string()),
                ("page[number]", "3".to_string()),
            ]
        );
    }

    #[test]
    fn wire_names_parse_back() {
        assert_eq!("Needs-More-Info".parse::<ReportState>(), Ok(ReportState::NeedsMoreInfo));
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert!("urgent".parse::<Severity>().unwrap_err().contains("none, low"));
    }

    #[test]
    fn summary_reads_reporter_stats_when_present() {
        let r: ReportResource = serde_json::from_value(json!({
            "id": "42",
            "type": "report",
            "attributes": { "title": "XSS", "state": "new" },
            "relationships": { "reporter": { "data": { "attributes": { "reputation": 120, "signal": 4.5 } } } }
        }))
        .unwrap();
        let s = r.into_summary().unwrap();
        assert_eq!(s.reporter_reputation.as_deref(), Some("120"));
        assert_eq!(s.reporter_signal.as_deref(), Some("4.5"));

        let r: ReportResource =
            serde_json::from_value(json!({ "id": 7, "attributes": { "title": "t", "state": "triaged" } })).unwrap();
        let s = r.into_summary().unwrap();
        assert_eq!(s.id, "7");
        assert_eq!(s.reporter_reputation, None);
        assert_eq!(s.reporter_signal, None);
    }
}
