//! Entity loaders: validate and normalise source rows, then upsert them.
//!
//! Preparation is pure and runs before the first store call; the load stages
//! only replay the prepared entities as `UpsertNode` directives. Loaders never
//! create parent entities. Parent names stay denormalised attributes and the
//! edges are left to the wirers.

use diamond_core::normalize::{clean, derive_attr, parse_height, parse_int, parse_weight, split_assistants};
use diamond_core::{Coach, CoachRole, Conference, GraphEntity, Player, RecordIssue, School, Team};
use diamond_graph::{Directive, GraphError};

use crate::context::StageContext;
use crate::pipeline::Stage;
use crate::report::StageReport;
use crate::sources::{CoachRow, ConferenceRow, PlayerRow, Row, SchoolRow, Source, SourceSet, TeamRow};

/// Entities derived from one source, with the issues found on the way.
#[derive(Debug, Clone)]
pub struct Prepared<E> {
    /// Records in the source, unreadable ones included.
    pub records: usize,
    /// Valid entities tagged with their source line.
    pub entities: Vec<(u64, E)>,
    pub issues: Vec<(u64, RecordIssue)>,
}

impl<E> Prepared<E> {
    fn from_source<T>(
        source: &Source<T>,
        mut prepare_row: impl FnMut(&T, &mut Vec<RecordIssue>) -> Vec<E>,
    ) -> Self {
        let mut entities = Vec::new();
        let mut issues = source.unreadable.clone();

        for Row { line, data } in &source.rows {
            let mut row_issues = Vec::new();
            for entity in prepare_row(data, &mut row_issues) {
                entities.push((*line, entity));
            }
            issues.extend(row_issues.into_iter().map(|issue| (*line, issue)));
        }
        issues.sort_by_key(|(line, _)| *line);

        Self {
            records: source.record_count(),
            entities,
            issues,
        }
    }
}

/// Everything the loaders and wirers work from, prepared once per run.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub conferences: Prepared<Conference>,
    pub schools: Prepared<School>,
    pub teams: Prepared<Team>,
    pub players: Prepared<Player>,
    pub coaches: Prepared<Coach>,
}

impl Catalog {
    pub fn prepare(sources: &SourceSet) -> Self {
        Self {
            conferences: Prepared::from_source(&sources.conferences, |row, issues| {
                prepare_conference(row, issues).into_iter().collect()
            }),
            schools: Prepared::from_source(&sources.schools, |row, issues| {
                prepare_school(row, issues).into_iter().collect()
            }),
            teams: Prepared::from_source(&sources.teams, |row, issues| {
                prepare_team(row, issues).into_iter().collect()
            }),
            players: Prepared::from_source(&sources.players, |row, issues| {
                prepare_player(row, issues).into_iter().collect()
            }),
            coaches: Prepared::from_source(&sources.coaches, prepare_coaches),
        }
    }
}

/// A required field, cleaned. Missing or sentinel values reject the record.
fn require(field: &'static str, raw: Option<&str>, issues: &mut Vec<RecordIssue>) -> Option<String> {
    let value = clean(raw);
    if value.is_none() {
        issues.push(RecordIssue::MissingRequiredField { field });
    }
    value
}

pub fn prepare_conference(row: &ConferenceRow, issues: &mut Vec<RecordIssue>) -> Option<Conference> {
    let name = require("Conference", row.conference.as_deref(), issues)?;
    Some(Conference {
        name,
        region: clean(row.region.as_deref()),
        abbreviation: clean(row.abbreviation.as_deref()),
        founded: derive_attr("Founded", row.founded.as_deref(), parse_int, issues),
        team_count: derive_attr("NumberOfTeams", row.number_of_teams.as_deref(), parse_int, issues),
        headquarters: clean(row.headquarters.as_deref()),
    })
}

pub fn prepare_school(row: &SchoolRow, issues: &mut Vec<RecordIssue>) -> Option<School> {
    let name = require("School", row.school.as_deref(), issues)?;
    Some(School {
        name,
        conference: clean(row.conference.as_deref()),
    })
}

pub fn prepare_team(row: &TeamRow, issues: &mut Vec<RecordIssue>) -> Option<Team> {
    let name = require("Team", row.team.as_deref(), issues)?;
    Some(Team {
        name,
        school: clean(row.school.as_deref()),
    })
}

pub fn prepare_player(row: &PlayerRow, issues: &mut Vec<RecordIssue>) -> Option<Player> {
    // Report the first missing key field only.
    let name = require("Name", row.name.as_deref(), issues)?;
    let school = require("School", row.school.as_deref(), issues)?;
    let team = require("Team", row.team.as_deref(), issues)?;

    Some(Player {
        name,
        school,
        team,
        position: clean(row.position.as_deref()),
        height: derive_attr("Height", row.height.as_deref(), parse_height, issues),
        weight: derive_attr("Weight", row.weight.as_deref(), parse_weight, issues),
        year: clean(row.year.as_deref()),
    })
}

/// One head coach plus zero or more assistants per row.
///
/// An assistant listed under the head coach's own name is not added twice.
pub fn prepare_coaches(row: &CoachRow, issues: &mut Vec<RecordIssue>) -> Vec<Coach> {
    let Some(school) = require("School", row.school.as_deref(), issues) else {
        return Vec::new();
    };
    let Some(head) = require("Head Coach", row.head_coach.as_deref(), issues) else {
        return Vec::new();
    };

    let assistants: Vec<Coach> = split_assistants(row.assistant_coaches.as_deref())
        .into_iter()
        .filter(|name| *name != head)
        .map(|name| Coach {
            name,
            school: school.clone(),
            role: CoachRole::Assistant,
        })
        .collect();

    let mut coaches = Vec::with_capacity(assistants.len() + 1);
    coaches.push(Coach {
        name: head,
        school,
        role: CoachRole::Head,
    });
    coaches.extend(assistants);
    coaches
}

/// Upsert every prepared entity, reporting the issues found while preparing.
pub async fn load_stage<E: GraphEntity>(
    ctx: &StageContext<'_>,
    stage: Stage,
    prepared: &Prepared<E>,
) -> Result<StageReport, GraphError> {
    let mut report = StageReport::new(stage);
    report.records = prepared.records;

    for (line, issue) in &prepared.issues {
        report.record_issue(*line, issue);
    }

    for (_, entity) in &prepared.entities {
        ctx.execute(&Directive::upsert(entity)).await?;
        report.written += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_row(name: &str, height: &str, weight: &str) -> PlayerRow {
        PlayerRow {
            name: Some(name.to_string()),
            school: Some("Alabama".to_string()),
            team: Some("Alabama Crimson Tide".to_string()),
            position: Some("QB".to_string()),
            height: Some(height.to_string()),
            weight: Some(weight.to_string()),
            year: Some("N/A".to_string()),
        }
    }

    #[test]
    fn test_player_normalisation() {
        let mut issues = Vec::new();
        let player = prepare_player(&player_row("Jalen Milroe", "6'2\"", "220 lb"), &mut issues).unwrap();
        assert_eq!(player.height, Some(74));
        assert_eq!(player.weight, Some(220));
        assert_eq!(player.year, None);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_malformed_height_keeps_player() {
        let mut issues = Vec::new();
        let player = prepare_player(&player_row("Jalen Milroe", "tall", "220"), &mut issues).unwrap();
        assert_eq!(player.height, None);
        assert_eq!(player.weight, Some(220));
        assert_eq!(
            issues,
            vec![RecordIssue::MalformedValue {
                field: "Height",
                value: "tall".to_string()
            }]
        );
    }

    #[test]
    fn test_player_missing_name_is_rejected() {
        let mut issues = Vec::new();
        let player = prepare_player(&player_row("  ", "6'2\"", "220"), &mut issues);
        assert!(player.is_none());
        assert_eq!(issues, vec![RecordIssue::MissingRequiredField { field: "Name" }]);
    }

    #[test]
    fn test_conference_integers() {
        let mut issues = Vec::new();
        let row = ConferenceRow {
            conference: Some("SEC".to_string()),
            founded: Some("1932.0".to_string()),
            number_of_teams: Some("sixteen".to_string()),
            ..Default::default()
        };
        let conf = prepare_conference(&row, &mut issues).unwrap();
        assert_eq!(conf.founded, Some(1932));
        assert_eq!(conf.team_count, None);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn test_coach_row_expands_to_head_and_assistants() {
        let mut issues = Vec::new();
        let row = CoachRow {
            school: Some("Alabama".to_string()),
            head_coach: Some("Kalen DeBoer".to_string()),
            assistant_coaches: Some("Ryan Grubb, Kane Wommack, Ryan Grubb, Kalen DeBoer".to_string()),
        };
        let coaches = prepare_coaches(&row, &mut issues);
        let names: Vec<_> = coaches.iter().map(|c| (c.name.as_str(), c.role)).collect();
        assert_eq!(
            names,
            vec![
                ("Kalen DeBoer", CoachRole::Head),
                ("Ryan Grubb", CoachRole::Assistant),
                ("Kane Wommack", CoachRole::Assistant),
            ]
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_empty_assistants_yield_head_only() {
        let mut issues = Vec::new();
        let row = CoachRow {
            school: Some("Auburn".to_string()),
            head_coach: Some("Hugh Freeze".to_string()),
            assistant_coaches: Some(String::new()),
        };
        let coaches = prepare_coaches(&row, &mut issues);
        assert_eq!(coaches.len(), 1);
        assert_eq!(coaches[0].role, CoachRole::Head);
    }

    #[test]
    fn test_coach_row_without_head_is_rejected() {
        let mut issues = Vec::new();
        let row = CoachRow {
            school: Some("Auburn".to_string()),
            head_coach: Some("N/A".to_string()),
            assistant_coaches: Some("Derrick Nix".to_string()),
        };
        assert!(prepare_coaches(&row, &mut issues).is_empty());
        assert_eq!(issues, vec![RecordIssue::MissingRequiredField { field: "Head Coach" }]);
    }

    #[test]
    fn test_prepared_keeps_unreadable_rows() {
        let source = Source {
            name: "teams",
            path: "teams.csv".into(),
            rows: vec![
                Row {
                    line: 2,
                    data: TeamRow {
                        team: Some("Auburn Tigers".to_string()),
                        school: Some("Auburn".to_string()),
                    },
                },
                Row {
                    line: 4,
                    data: TeamRow {
                        team: None,
                        school: Some("Auburn".to_string()),
                    },
                },
            ],
            unreadable: vec![(
                3,
                RecordIssue::UnreadableRow {
                    reason: "invalid UTF-8".to_string(),
                },
            )],
        };
        let prepared = Prepared::from_source(&source, |row, issues| {
            prepare_team(row, issues).into_iter().collect()
        });
        assert_eq!(prepared.records, 3);
        assert_eq!(prepared.entities.len(), 1);
        let lines: Vec<_> = prepared.issues.iter().map(|(line, _)| *line).collect();
        assert_eq!(lines, vec![3, 4]);
    }
}
