//! Core domain types for the Diamond sports knowledge graph.
//!
//! The taxonomy is fixed: five node labels, six relationship types. Every
//! entity is identified by its natural key, never by a generated id.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Property Values ───────────────────────────────────────────────

/// A single graph property value.
///
/// `Null` means "absent": writing it removes the property from the node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Int(i64),
    Text(String),
    Null,
}

impl PropValue {
    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropValue::Int(i) => serde_json::Value::from(*i),
            PropValue::Text(s) => serde_json::Value::from(s.as_str()),
            PropValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_string())
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        PropValue::Int(i)
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(PropValue::Null)
    }
}

/// Ordered property list. Names always come from the fixed schema.
pub type Props = Vec<(&'static str, PropValue)>;

// ── Labels & Relationship Types ───────────────────────────────────

/// Node label of the fixed taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    Conference,
    School,
    Team,
    Player,
    Coach,
}

impl NodeLabel {
    pub const ALL: [NodeLabel; 5] = [
        NodeLabel::Conference,
        NodeLabel::School,
        NodeLabel::Team,
        NodeLabel::Player,
        NodeLabel::Coach,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Conference => "Conference",
            NodeLabel::School => "School",
            NodeLabel::Team => "Team",
            NodeLabel::Player => "Player",
            NodeLabel::Coach => "Coach",
        }
    }

    /// Property names forming the natural key, in key order.
    pub fn key_properties(&self) -> &'static [&'static str] {
        match self {
            NodeLabel::Player | NodeLabel::Coach => &["name", "school"],
            _ => &["name"],
        }
    }
}

impl fmt::Display for NodeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Relationship type of the fixed taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelType {
    /// School → Conference, Team → Conference.
    MemberOf,
    /// Team → School.
    AssociatedWith,
    /// Player → Team.
    PlaysFor,
    /// Player → School.
    EnrolledAt,
    /// Head coach → School.
    Coaches,
    /// Assistant coach → School.
    Assists,
}

impl RelType {
    pub const ALL: [RelType; 6] = [
        RelType::MemberOf,
        RelType::AssociatedWith,
        RelType::PlaysFor,
        RelType::EnrolledAt,
        RelType::Coaches,
        RelType::Assists,
    ];

    /// Cypher relationship type.
    pub fn as_str(&self) -> &'static str {
        match self {
            RelType::MemberOf => "MEMBER_OF",
            RelType::AssociatedWith => "ASSOCIATED_WITH",
            RelType::PlaysFor => "PLAYS_FOR",
            RelType::EnrolledAt => "ENROLLED_AT",
            RelType::Coaches => "COACHES",
            RelType::Assists => "ASSISTS",
        }
    }
}

impl fmt::Display for RelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Natural Keys ──────────────────────────────────────────────────

/// Identity of a node: its label plus the values of its key properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeKey {
    pub label: NodeLabel,
    pub values: Vec<(&'static str, String)>,
}

impl NodeKey {
    pub fn conference(name: impl Into<String>) -> Self {
        Self::by_name(NodeLabel::Conference, name)
    }

    pub fn school(name: impl Into<String>) -> Self {
        Self::by_name(NodeLabel::School, name)
    }

    pub fn team(name: impl Into<String>) -> Self {
        Self::by_name(NodeLabel::Team, name)
    }

    pub fn player(name: impl Into<String>, school: impl Into<String>) -> Self {
        Self {
            label: NodeLabel::Player,
            values: vec![("name", name.into()), ("school", school.into())],
        }
    }

    pub fn coach(name: impl Into<String>, school: impl Into<String>) -> Self {
        Self {
            label: NodeLabel::Coach,
            values: vec![("name", name.into()), ("school", school.into())],
        }
    }

    fn by_name(label: NodeLabel, name: impl Into<String>) -> Self {
        Self {
            label,
            values: vec![("name", name.into())],
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.label)?;
        for (i, (k, v)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v:?}")?;
        }
        f.write_str(")")
    }
}

// ── Entities ──────────────────────────────────────────────────────

/// Anything that upserts as a single node.
pub trait GraphEntity {
    const LABEL: NodeLabel;

    fn key(&self) -> NodeKey;

    /// Non-key properties written on every upsert. Absent values are `Null`.
    fn properties(&self) -> Props;
}

/// An athletic conference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conference {
    pub name: String,
    pub region: Option<String>,
    pub abbreviation: Option<String>,
    pub founded: Option<i64>,
    pub team_count: Option<i64>,
    pub headquarters: Option<String>,
}

impl Conference {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: None,
            abbreviation: None,
            founded: None,
            team_count: None,
            headquarters: None,
        }
    }
}

impl GraphEntity for Conference {
    const LABEL: NodeLabel = NodeLabel::Conference;

    fn key(&self) -> NodeKey {
        NodeKey::conference(&self.name)
    }

    fn properties(&self) -> Props {
        vec![
            ("region", self.region.clone().into()),
            ("abbreviation", self.abbreviation.clone().into()),
            ("founded", self.founded.into()),
            ("team_count", self.team_count.into()),
            ("headquarters", self.headquarters.clone().into()),
        ]
    }
}

/// A school (university).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct School {
    pub name: String,
    /// Denormalised conference name as given by the schools source.
    pub conference: Option<String>,
}

impl GraphEntity for School {
    const LABEL: NodeLabel = NodeLabel::School;

    fn key(&self) -> NodeKey {
        NodeKey::school(&self.name)
    }

    fn properties(&self) -> Props {
        vec![("conference", self.conference.clone().into())]
    }
}

/// A team. Keyed by the team name exactly as the sources spell it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub school: Option<String>,
}

impl GraphEntity for Team {
    const LABEL: NodeLabel = NodeLabel::Team;

    fn key(&self) -> NodeKey {
        NodeKey::team(&self.name)
    }

    fn properties(&self) -> Props {
        vec![("school", self.school.clone().into())]
    }
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub school: String,
    pub team: String,
    pub position: Option<String>,
    /// Height in inches.
    pub height: Option<i64>,
    /// Weight in pounds.
    pub weight: Option<i64>,
    pub year: Option<String>,
}

impl GraphEntity for Player {
    const LABEL: NodeLabel = NodeLabel::Player;

    fn key(&self) -> NodeKey {
        NodeKey::player(&self.name, &self.school)
    }

    fn properties(&self) -> Props {
        vec![
            ("team", self.team.clone().into()),
            ("position", self.position.clone().into()),
            ("height", self.height.into()),
            ("weight", self.weight.into()),
            ("year", self.year.clone().into()),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CoachRole {
    Head,
    Assistant,
}

impl CoachRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoachRole::Head => "Head",
            CoachRole::Assistant => "Assistant",
        }
    }

    /// The relationship wiring this coach to their school.
    pub fn relationship(&self) -> RelType {
        match self {
            CoachRole::Head => RelType::Coaches,
            CoachRole::Assistant => RelType::Assists,
        }
    }
}

/// A coach on a school's staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coach {
    pub name: String,
    pub school: String,
    pub role: CoachRole,
}

impl GraphEntity for Coach {
    const LABEL: NodeLabel = NodeLabel::Coach;

    fn key(&self) -> NodeKey {
        NodeKey::coach(&self.name, &self.school)
    }

    fn properties(&self) -> Props {
        vec![("role", self.role.as_str().into())]
    }
}
