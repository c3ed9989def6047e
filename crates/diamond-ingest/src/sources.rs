//! CSV source files and their row shapes.
//!
//! All five sources are read and decoded up front, before the first store
//! call. A file that cannot be opened or whose header cannot be read is fatal;
//! a single row that fails to decode is kept as an `UnreadableRow` issue and
//! reported by the stage that consumes the source.

use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use diamond_core::RecordIssue;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{IngestError, Result};

/// Resolved locations of the five sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub conferences: PathBuf,
    pub schools: PathBuf,
    pub teams: PathBuf,
    pub players: PathBuf,
    pub coaches: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConferenceRow {
    #[serde(rename = "Conference", default)]
    pub conference: Option<String>,
    #[serde(rename = "Region", default)]
    pub region: Option<String>,
    #[serde(rename = "Abbreviation", default)]
    pub abbreviation: Option<String>,
    #[serde(rename = "Founded", default)]
    pub founded: Option<String>,
    #[serde(rename = "NumberOfTeams", default)]
    pub number_of_teams: Option<String>,
    #[serde(rename = "Headquarters", default)]
    pub headquarters: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolRow {
    #[serde(rename = "School", default)]
    pub school: Option<String>,
    #[serde(rename = "Conference", default)]
    pub conference: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRow {
    #[serde(rename = "Team", default)]
    pub team: Option<String>,
    #[serde(rename = "School", default)]
    pub school: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerRow {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "School", default)]
    pub school: Option<String>,
    #[serde(rename = "Team", default)]
    pub team: Option<String>,
    #[serde(rename = "Position", default)]
    pub position: Option<String>,
    #[serde(rename = "Height", default)]
    pub height: Option<String>,
    #[serde(rename = "Weight", default)]
    pub weight: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoachRow {
    #[serde(rename = "School", default)]
    pub school: Option<String>,
    #[serde(rename = "Head Coach", default)]
    pub head_coach: Option<String>,
    #[serde(rename = "Assistant Coaches", alias = "Assistance Coaches", default)]
    pub assistant_coaches: Option<String>,
}

/// One decoded row and the file line it came from.
#[derive(Debug, Clone)]
pub struct Row<T> {
    pub line: u64,
    pub data: T,
}

/// A fully read source: decoded rows plus rows that failed to decode.
#[derive(Debug, Clone)]
pub struct Source<T> {
    pub name: &'static str,
    pub path: PathBuf,
    pub rows: Vec<Row<T>>,
    pub unreadable: Vec<(u64, RecordIssue)>,
}

impl<T: DeserializeOwned> Source<T> {
    /// Open and decode the file at `path`.
    pub fn open(name: &'static str, path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| IngestError::Source {
            name,
            path: path.to_path_buf(),
            source: csv::Error::from(e),
        })?;
        Self::from_reader(name, path, file)
    }

    /// Decode CSV from any reader. `path` is only used for diagnostics.
    pub fn from_reader<R: io::Read>(name: &'static str, path: &Path, reader: R) -> Result<Self> {
        let source_error = |source: csv::Error| IngestError::Source {
            name,
            path: path.to_path_buf(),
            source,
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: StringRecord = rdr.headers().map_err(source_error)?.clone();

        let mut rows = Vec::new();
        let mut unreadable = Vec::new();
        let mut record = StringRecord::new();

        loop {
            match rdr.read_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {
                    let line = record.position().map(|p| p.line()).unwrap_or(0);
                    match record.deserialize::<T>(Some(&headers)) {
                        Ok(data) => rows.push(Row { line, data }),
                        Err(e) => unreadable.push((
                            line,
                            RecordIssue::UnreadableRow {
                                reason: e.to_string(),
                            },
                        )),
                    }
                }
                Err(e) if matches!(e.kind(), csv::ErrorKind::Io(_)) => {
                    return Err(source_error(e));
                }
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(0);
                    unreadable.push((
                        line,
                        RecordIssue::UnreadableRow {
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        tracing::debug!(
            source = name,
            path = %path.display(),
            rows = rows.len(),
            unreadable = unreadable.len(),
            "Read source"
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            rows,
            unreadable,
        })
    }
}

impl<T> Source<T> {
    /// Rows plus unreadable rows: everything the file held past its header.
    pub fn record_count(&self) -> usize {
        self.rows.len() + self.unreadable.len()
    }
}

/// All five sources of one run.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub conferences: Source<ConferenceRow>,
    pub schools: Source<SchoolRow>,
    pub teams: Source<TeamRow>,
    pub players: Source<PlayerRow>,
    pub coaches: Source<CoachRow>,
}

impl SourceSet {
    pub fn load(paths: &SourcePaths) -> Result<Self> {
        let set = Self {
            conferences: Source::open("conferences", &paths.conferences)?,
            schools: Source::open("schools", &paths.schools)?,
            teams: Source::open("teams", &paths.teams)?,
            players: Source::open("players", &paths.players)?,
            coaches: Source::open("coaches", &paths.coaches)?,
        };

        tracing::info!(
            conferences = set.conferences.record_count(),
            schools = set.schools.record_count(),
            teams = set.teams.record_count(),
            players = set.players.record_count(),
            coaches = set.coaches.record_count(),
            "Sources loaded"
        );
        Ok(set)
    }
}
