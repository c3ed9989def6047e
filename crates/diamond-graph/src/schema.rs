//! Uniqueness constraints on natural keys.
//!
//! The key properties of each constraint are exactly the properties the
//! upsert directives merge on, see [`NodeLabel::key_properties`].

use diamond_core::NodeLabel;

/// A named uniqueness constraint over a label's natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniqueConstraint {
    pub name: &'static str,
    pub label: NodeLabel,
}

impl UniqueConstraint {
    pub fn properties(&self) -> &'static [&'static str] {
        self.label.key_properties()
    }
}

/// One constraint per label.
pub const UNIQUE_CONSTRAINTS: [UniqueConstraint; 5] = [
    UniqueConstraint {
        name: "conference_name_unique",
        label: NodeLabel::Conference,
    },
    UniqueConstraint {
        name: "school_name_unique",
        label: NodeLabel::School,
    },
    UniqueConstraint {
        name: "team_name_unique",
        label: NodeLabel::Team,
    },
    UniqueConstraint {
        name: "player_identity_unique",
        label: NodeLabel::Player,
    },
    UniqueConstraint {
        name: "coach_identity_unique",
        label: NodeLabel::Coach,
    },
];
