//! Relationship wirers: join records derived from the prepared sources,
//! merged edge by edge with match-only endpoint lookup.

use std::collections::HashMap;

use diamond_core::{EndpointSide, GraphEntity, NodeKey, RecordIssue, RelType};
use diamond_graph::{Directive, GraphError, Outcome};

use crate::context::StageContext;
use crate::loaders::Catalog;
use crate::pipeline::Stage;
use crate::report::StageReport;

/// One relationship to wire, tagged with the source line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub line: u64,
    pub rel: RelType,
    pub from: NodeKey,
    pub to: NodeKey,
}

/// Join records of a stage plus the ones that could not be derived.
#[derive(Debug, Clone, Default)]
pub struct Links {
    pub links: Vec<Link>,
    pub issues: Vec<(u64, RecordIssue)>,
}

/// `PLAYS_FOR` and `ENROLLED_AT` for every valid player.
pub fn player_links(catalog: &Catalog) -> Links {
    let mut out = Links::default();
    for (line, player) in &catalog.players.entities {
        let key = player.key();
        out.links.push(Link {
            line: *line,
            rel: RelType::PlaysFor,
            from: key.clone(),
            to: NodeKey::team(&player.team),
        });
        out.links.push(Link {
            line: *line,
            rel: RelType::EnrolledAt,
            from: key,
            to: NodeKey::school(&player.school),
        });
    }
    out
}

/// `ASSOCIATED_WITH` for teams, `MEMBER_OF` for schools, and `MEMBER_OF` for
/// teams via their school's conference.
pub fn team_links(catalog: &Catalog) -> Links {
    let mut out = Links::default();

    let conference_of: HashMap<&str, &str> = catalog
        .schools
        .entities
        .iter()
        .filter_map(|(_, s)| Some((s.name.as_str(), s.conference.as_deref()?)))
        .collect();

    for (line, school) in &catalog.schools.entities {
        if let Some(conference) = &school.conference {
            out.links.push(Link {
                line: *line,
                rel: RelType::MemberOf,
                from: school.key(),
                to: NodeKey::conference(conference),
            });
        }
    }

    for (line, team) in &catalog.teams.entities {
        let Some(school) = &team.school else {
            continue;
        };
        let key = team.key();

        out.links.push(Link {
            line: *line,
            rel: RelType::AssociatedWith,
            from: key.clone(),
            to: NodeKey::school(school),
        });

        match conference_of.get(school.as_str()) {
            Some(conference) => out.links.push(Link {
                line: *line,
                rel: RelType::MemberOf,
                from: key,
                to: NodeKey::conference(*conference),
            }),
            None => out.issues.push((
                *line,
                RecordIssue::UnknownSchoolConference {
                    team: key,
                    school: NodeKey::school(school),
                },
            )),
        }
    }

    out
}

/// `COACHES` for head coaches, `ASSISTS` for assistants.
pub fn coach_links(catalog: &Catalog) -> Links {
    let links = catalog
        .coaches
        .entities
        .iter()
        .map(|(line, coach)| Link {
            line: *line,
            rel: coach.role.relationship(),
            from: coach.key(),
            to: NodeKey::school(&coach.school),
        })
        .collect();
    Links {
        links,
        issues: Vec::new(),
    }
}

/// Merge every link; a link with a missing endpoint is skipped and reported.
pub async fn wire_stage(
    ctx: &StageContext<'_>,
    stage: Stage,
    links: &Links,
) -> Result<StageReport, GraphError> {
    let mut report = StageReport::new(stage);
    report.records = links.links.len() + links.issues.len();

    for (line, issue) in &links.issues {
        report.record_issue(*line, issue);
    }

    for link in &links.links {
        let directive = Directive::MergeEdge {
            rel: link.rel,
            from: link.from.clone(),
            to: link.to.clone(),
        };

        match ctx.execute(&directive).await? {
            Outcome::Edge {
                from_found,
                to_found,
            } => match EndpointSide::from_found(from_found, to_found) {
                None => report.written += 1,
                Some(side) => report.record_issue(
                    link.line,
                    &RecordIssue::UnresolvedRelationshipEndpoint {
                        rel: link.rel,
                        from: link.from.clone(),
                        to: link.to.clone(),
                        side,
                    },
                ),
            },
            other => {
                return Err(GraphError::Unexpected(format!(
                    "merge_edge returned {other:?}"
                )))
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loaders::Prepared;
    use diamond_core::{Coach, CoachRole, School, Team};

    fn prepared<E>(entities: Vec<E>) -> Prepared<E> {
        Prepared {
            records: entities.len(),
            entities: entities
                .into_iter()
                .enumerate()
                .map(|(i, e)| (i as u64 + 2, e))
                .collect(),
            issues: Vec::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog {
            conferences: prepared(Vec::new()),
            schools: prepared(vec![
                School {
                    name: "Alabama".to_string(),
                    conference: Some("SEC".to_string()),
                },
                School {
                    name: "Notre Dame".to_string(),
                    conference: None,
                },
            ]),
            teams: prepared(vec![
                Team {
                    name: "Alabama Crimson Tide".to_string(),
                    school: Some("Alabama".to_string()),
                },
                Team {
                    name: "Notre Dame Fighting Irish".to_string(),
                    school: Some("Notre Dame".to_string()),
                },
                Team {
                    name: "Unattached".to_string(),
                    school: None,
                },
            ]),
            players: prepared(Vec::new()),
            coaches: prepared(vec![
                Coach {
                    name: "Kalen DeBoer".to_string(),
                    school: "Alabama".to_string(),
                    role: CoachRole::Head,
                },
                Coach {
                    name: "Ryan Grubb".to_string(),
                    school: "Alabama".to_string(),
                    role: CoachRole::Assistant,
                },
            ]),
        }
    }

    #[test]
    fn test_team_links_join_school_conference() {
        let links = team_links(&catalog());

        assert!(links.links.contains(&Link {
            line: 2,
            rel: RelType::MemberOf,
            from: NodeKey::team("Alabama Crimson Tide"),
            to: NodeKey::conference("SEC"),
        }));
        assert!(links.links.contains(&Link {
            line: 2,
            rel: RelType::MemberOf,
            from: NodeKey::school("Alabama"),
            to: NodeKey::conference("SEC"),
        }));

        // Notre Dame has no conference row: the team's MEMBER_OF is unresolved.
        assert_eq!(
            links.issues,
            vec![(
                3,
                RecordIssue::UnknownSchoolConference {
                    team: NodeKey::team("Notre Dame Fighting Irish"),
                    school: NodeKey::school("Notre Dame"),
                }
            )]
        );

        // Teams without a school produce no links at all.
        assert!(links
            .links
            .iter()
            .all(|l| l.from != NodeKey::team("Unattached")));
    }

    #[test]
    fn test_coach_links_follow_role() {
        let links = coach_links(&catalog());
        let rels: Vec<_> = links.links.iter().map(|l| l.rel).collect();
        assert_eq!(rels, vec![RelType::Coaches, RelType::Assists]);
        assert!(links.links.iter().all(|l| l.to == NodeKey::school("Alabama")));
    }
}
