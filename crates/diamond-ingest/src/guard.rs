//! Schema guard: uniqueness constraints on every natural key.

use diamond_graph::{Directive, GraphError, UNIQUE_CONSTRAINTS};

use crate::context::StageContext;
use crate::pipeline::Stage;
use crate::report::StageReport;

/// Ensure one uniqueness constraint per label. Safe to repeat.
pub async fn define_constraints(ctx: &StageContext<'_>) -> Result<StageReport, GraphError> {
    let mut report = StageReport::new(Stage::DefineConstraints);
    report.records = UNIQUE_CONSTRAINTS.len();

    for constraint in UNIQUE_CONSTRAINTS {
        ctx.execute(&Directive::EnsureUnique(constraint)).await?;
        tracing::debug!(
            constraint = constraint.name,
            label = %constraint.label,
            "Constraint ensured"
        );
        report.written += 1;
    }

    Ok(report)
}

/// Detach and delete every node. Constraints survive.
pub async fn reset(ctx: &StageContext<'_>) -> Result<StageReport, GraphError> {
    ctx.execute(&Directive::DeleteAll).await?;
    tracing::warn!(database = ctx.database(), "Graph reset: all nodes deleted");

    let mut report = StageReport::new(Stage::Reset);
    report.written = 1;
    Ok(report)
}
