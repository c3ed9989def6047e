use std::fmt;

use thiserror::Error;

use crate::types::{NodeKey, RelType};

/// A problem with a single source record.
///
/// Record issues never abort a stage: the offending row (or attribute) is
/// skipped, the issue is logged as a warning and counted in the stage report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordIssue {
    #[error("Missing required field '{field}'")]
    MissingRequiredField { field: &'static str },

    #[error("Malformed value for '{field}': {value:?}")]
    MalformedValue { field: &'static str, value: String },

    #[error("Unresolved {side} endpoint for {rel}: {from} -> {to}")]
    UnresolvedRelationshipEndpoint {
        rel: RelType,
        from: NodeKey,
        to: NodeKey,
        side: EndpointSide,
    },

    /// A team's MEMBER_OF edge needs its school's conference, and the
    /// schools source names none.
    #[error("Unresolved target endpoint for MEMBER_OF: {team} -> conference of {school}, which has no conference in the schools source")]
    UnknownSchoolConference { team: NodeKey, school: NodeKey },

    #[error("Unreadable row: {reason}")]
    UnreadableRow { reason: String },
}

impl RecordIssue {
    /// Whether the issue dropped the whole record (as opposed to one attribute).
    pub fn rejects_record(&self) -> bool {
        !matches!(self, RecordIssue::MalformedValue { .. })
    }
}

/// Which end of a relationship could not be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSide {
    From,
    To,
    Both,
}

impl EndpointSide {
    pub fn from_found(from_found: bool, to_found: bool) -> Option<Self> {
        match (from_found, to_found) {
            (true, true) => None,
            (false, true) => Some(EndpointSide::From),
            (true, false) => Some(EndpointSide::To),
            (false, false) => Some(EndpointSide::Both),
        }
    }
}

impl fmt::Display for EndpointSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointSide::From => "source",
            EndpointSide::To => "target",
            EndpointSide::Both => "source and target",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_side_from_match_flags() {
        assert_eq!(EndpointSide::from_found(true, true), None);
        assert_eq!(EndpointSide::from_found(false, true), Some(EndpointSide::From));
        assert_eq!(EndpointSide::from_found(true, false), Some(EndpointSide::To));
        assert_eq!(EndpointSide::from_found(false, false), Some(EndpointSide::Both));
    }

    #[test]
    fn unresolved_endpoint_message_names_both_keys() {
        let issue = RecordIssue::UnresolvedRelationshipEndpoint {
            rel: RelType::MemberOf,
            from: NodeKey::team("Alabama Crimson Tide"),
            to: NodeKey::conference("SEC"),
            side: EndpointSide::To,
        };
        let msg = issue.to_string();
        assert!(msg.contains("target"));
        assert!(msg.contains("MEMBER_OF"));
        assert!(msg.contains("Conference(name=\"SEC\")"));
        assert!(issue.rejects_record());
    }

    #[test]
    fn unknown_school_conference_names_the_lookup() {
        let issue = RecordIssue::UnknownSchoolConference {
            team: NodeKey::team("Notre Dame Fighting Irish"),
            school: NodeKey::school("Notre Dame"),
        };
        let msg = issue.to_string();
        assert!(msg.contains("MEMBER_OF"));
        assert!(msg.contains("conference of School(name=\"Notre Dame\")"));
        assert!(msg.contains("no conference in the schools source"));
        assert!(issue.rejects_record());
    }

    #[test]
    fn malformed_value_keeps_record() {
        let issue = RecordIssue::MalformedValue {
            field: "Height",
            value: "tall".to_string(),
        };
        assert!(!issue.rejects_record());
    }
}
