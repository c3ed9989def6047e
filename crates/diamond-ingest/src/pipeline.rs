//! Pipeline orchestrator: runs the stages in their fixed order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use diamond_core::{NodeLabel, RelType};
use diamond_graph::{Directive, GraphError, GraphGateway};
use serde::Serialize;
use uuid::Uuid;

use crate::context::StageContext;
use crate::error::{IngestError, Result};
use crate::guard;
use crate::loaders::{load_stage, Catalog};
use crate::report::{RunReport, StageReport};
use crate::retry::RetryPolicy;
use crate::sources::SourceSet;
use crate::wirers::{coach_links, player_links, team_links, wire_stage};

/// One pipeline phase. Each completes before the next starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Reset,
    DefineConstraints,
    LoadConferences,
    LoadSchools,
    LoadTeams,
    LoadPlayers,
    LoadCoaches,
    WirePlayers,
    WireTeams,
    WireCoaches,
    /// Final per-label and per-type counts. Runs after every planned stage.
    CollectCounts,
}

impl Stage {
    /// The stages of a rebuild, in order.
    pub const REBUILD: [Stage; 9] = [
        Stage::DefineConstraints,
        Stage::LoadConferences,
        Stage::LoadSchools,
        Stage::LoadTeams,
        Stage::LoadPlayers,
        Stage::LoadCoaches,
        Stage::WirePlayers,
        Stage::WireTeams,
        Stage::WireCoaches,
    ];

    pub fn plan(reset: bool) -> Vec<Stage> {
        let mut plan = Vec::with_capacity(Self::REBUILD.len() + 1);
        if reset {
            plan.push(Stage::Reset);
        }
        plan.extend(Self::REBUILD);
        plan
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Reset => "reset",
            Stage::DefineConstraints => "define_constraints",
            Stage::LoadConferences => "load_conferences",
            Stage::LoadSchools => "load_schools",
            Stage::LoadTeams => "load_teams",
            Stage::LoadPlayers => "load_players",
            Stage::LoadCoaches => "load_coaches",
            Stage::WirePlayers => "wire_players",
            Stage::WireTeams => "wire_teams",
            Stage::WireCoaches => "wire_coaches",
            Stage::CollectCounts => "collect_counts",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prepared run: the stage context plus the catalog every stage reads.
pub struct Pipeline<'a> {
    ctx: StageContext<'a>,
    catalog: Catalog,
}

impl<'a> Pipeline<'a> {
    pub fn new(ctx: StageContext<'a>, catalog: Catalog) -> Self {
        Self { ctx, catalog }
    }

    /// Run every stage of the plan, then collect node and edge counts.
    ///
    /// The first fatal error stops the run. Stages already completed are not
    /// rolled back.
    pub async fn run(&self, reset: bool) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%run_id, reset, database = self.ctx.database(), "Pipeline starting");

        let mut stages = Vec::new();
        for stage in Stage::plan(reset) {
            let report = self.run_stage(stage).await.map_err(|source| {
                tracing::error!(%run_id, stage = %stage, error = %source, "Stage failed");
                IngestError::Stage { stage, source }
            })?;
            report.log_completion();
            stages.push(report);
        }

        let (nodes, edges) = self.collect_counts().await.map_err(|source| {
            tracing::error!(%run_id, stage = %Stage::CollectCounts, error = %source, "Stage failed");
            IngestError::Stage {
                stage: Stage::CollectCounts,
                source,
            }
        })?;

        let report = RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            stages,
            nodes,
            edges,
        };

        tracing::info!(
            %run_id,
            nodes = report.nodes.values().sum::<i64>(),
            edges = report.edges.values().sum::<i64>(),
            skipped = report.total_skipped(),
            "Pipeline complete"
        );
        Ok(report)
    }

    async fn run_stage(&self, stage: Stage) -> std::result::Result<StageReport, GraphError> {
        let ctx = &self.ctx;
        let catalog = &self.catalog;

        match stage {
            Stage::Reset => guard::reset(ctx).await,
            Stage::DefineConstraints => guard::define_constraints(ctx).await,
            Stage::LoadConferences => load_stage(ctx, stage, &catalog.conferences).await,
            Stage::LoadSchools => load_stage(ctx, stage, &catalog.schools).await,
            Stage::LoadTeams => load_stage(ctx, stage, &catalog.teams).await,
            Stage::LoadPlayers => load_stage(ctx, stage, &catalog.players).await,
            Stage::LoadCoaches => load_stage(ctx, stage, &catalog.coaches).await,
            Stage::WirePlayers => wire_stage(ctx, stage, &player_links(catalog)).await,
            Stage::WireTeams => wire_stage(ctx, stage, &team_links(catalog)).await,
            Stage::WireCoaches => wire_stage(ctx, stage, &coach_links(catalog)).await,
            Stage::CollectCounts => Err(GraphError::Unexpected(
                "collect_counts is not a planned stage".to_string(),
            )),
        }
    }

    async fn collect_counts(
        &self,
    ) -> std::result::Result<(BTreeMap<NodeLabel, i64>, BTreeMap<RelType, i64>), GraphError> {
        let mut nodes = BTreeMap::new();
        for label in NodeLabel::ALL {
            let count = self.ctx.execute(&Directive::CountNodes(label)).await?.count()?;
            nodes.insert(label, count);
        }

        let mut edges = BTreeMap::new();
        for rel in RelType::ALL {
            let count = self.ctx.execute(&Directive::CountEdges(rel)).await?.count()?;
            edges.insert(rel, count);
        }

        Ok((nodes, edges))
    }
}

/// Verify the store answers, then run the full pipeline over `sources`.
pub async fn run_pipeline(
    gateway: &dyn GraphGateway,
    database: &str,
    retry: RetryPolicy,
    sources: &SourceSet,
    reset: bool,
) -> Result<RunReport> {
    let ctx = StageContext::new(gateway, database, retry);
    ctx.verify_connectivity().await?;

    let pipeline = Pipeline::new(ctx, Catalog::prepare(sources));
    pipeline.run(reset).await
}
