//! Post-execution hooks.
//!
//! After a cell runs, the runner applies a fixed sequence of hooks that fold
//! the run's outcome back into the cell's record: classify the result, store
//! the output, snapshot the variables the cell defined, and finally mark the
//! cell idle. Hooks are plain functions applied in order; runners may extend
//! the default list with their own.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::core::ids::CellId;

/// Why a run did not succeed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunError {
    /// The user interrupted the kernel mid-run
    Interrupted,
    /// The cell called stop(), optionally with a final output
    Stopped { output: Option<Value> },
    /// The cell raised
    Exception {
        exception_type: String,
        message: String,
    },
}

impl RunError {
    /// Message suitable for display; exceptions with an empty message get a
    /// generic one naming the exception type.
    pub fn message(&self) -> String {
        match self {
            RunError::Interrupted => "This cell was interrupted and needs to be re-run".to_string(),
            RunError::Stopped { .. } => "This cell was stopped".to_string(),
            RunError::Exception {
                exception_type,
                message,
            } => {
                if message.is_empty() {
                    format!("This cell raised an exception: {exception_type}")
                } else {
                    message.clone()
                }
            }
        }
    }
}

/// Outcome of running one cell once.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    /// The cell's final expression value, if any
    pub output: Option<Value>,
    pub error: Option<RunError>,
}

impl RunResult {
    pub fn success(&self) -> bool {
        self.error.is_none()
    }
}

/// How a finished run is recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Exception,
    Interrupted,
    Cancelled,
}

/// A cell's runtime state as the front end sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Queued,
    Running,
    Idle,
}

/// A variable a cell defined, paired with its current value.
///
/// Absent values (the cell errored before binding the name) snapshot as
/// `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableValue {
    pub name: String,
    pub value: Option<Value>,
}

/// The per-cell record post-execution hooks update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub cell_id: CellId,
    /// Names the cell defines
    pub defs: Vec<String>,
    pub status: ExecutionStatus,
    /// How the last run ended; `None` before the first run
    pub run_status: Option<RunStatus>,
    pub output: Option<Value>,
    /// Last snapshot of the cell's defined variables
    pub variables: Vec<VariableValue>,
}

impl CellSnapshot {
    pub fn new(cell_id: CellId, defs: Vec<String>) -> Self {
        Self {
            cell_id,
            defs,
            status: ExecutionStatus::Queued,
            run_status: None,
            output: None,
            variables: Vec::new(),
        }
    }
}

/// The slice of runner state hooks are allowed to read.
#[derive(Clone, Debug, Default)]
pub struct RunContext {
    /// Cells whose runs were cancelled, e.g. because an ancestor errored
    pub cancelled: HashSet<CellId>,
    /// Global bindings after the run
    pub globals: BTreeMap<String, Value>,
}

impl RunContext {
    pub fn is_cancelled(&self, cell_id: &CellId) -> bool {
        self.cancelled.contains(cell_id)
    }
}

/// A hook applied to a cell after it runs.
pub type PostExecutionHook = fn(&mut CellSnapshot, &RunContext, &RunResult);

/// How a finished run should be recorded.
///
/// Interruption wins over cancellation, cancellation over the exception
/// itself; a run with no error and no cancellation succeeded.
pub fn classify_run_result(cell_id: &CellId, ctx: &RunContext, result: &RunResult) -> RunStatus {
    match &result.error {
        Some(RunError::Interrupted) => RunStatus::Interrupted,
        _ if ctx.is_cancelled(cell_id) => RunStatus::Cancelled,
        Some(_) => RunStatus::Exception,
        None => RunStatus::Success,
    }
}

fn record_run_status(cell: &mut CellSnapshot, ctx: &RunContext, result: &RunResult) {
    cell.run_status = Some(classify_run_result(&cell.cell_id, ctx, result));
}

/// Store the run's output on the cell. A successful run with no output still
/// overwrites, clearing whatever the previous run left behind; a failed run
/// keeps the previous output so the front end doesn't blank a cell that was
/// merely interrupted.
fn store_output_reference(cell: &mut CellSnapshot, _ctx: &RunContext, result: &RunResult) {
    match &result.error {
        None => cell.output = result.output.clone(),
        Some(RunError::Stopped { output }) => cell.output = output.clone(),
        Some(_) => {}
    }
}

fn snapshot_variables(cell: &mut CellSnapshot, ctx: &RunContext, _result: &RunResult) {
    cell.variables = cell
        .defs
        .iter()
        .map(|name| VariableValue {
            name: name.clone(),
            value: ctx.globals.get(name).cloned(),
        })
        .collect();
}

fn set_status_idle(cell: &mut CellSnapshot, _ctx: &RunContext, _result: &RunResult) {
    cell.status = ExecutionStatus::Idle;
}

/// The hooks every runner applies, in order.
pub fn default_post_execution_hooks() -> Vec<PostExecutionHook> {
    vec![
        record_run_status,
        store_output_reference,
        snapshot_variables,
        // set status to idle after all post-processing is done, in case the
        // other hooks take a long time
        set_status_idle,
    ]
}

/// Apply `hooks` to `cell` in order.
pub fn run_post_execution_hooks(
    cell: &mut CellSnapshot,
    ctx: &RunContext,
    result: &RunResult,
    hooks: &[PostExecutionHook],
) {
    log::debug!("running {} post-execution hooks for {}", hooks.len(), cell.cell_id);
    for hook in hooks {
        hook(cell, ctx, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exception() -> RunError {
        RunError::Exception {
            exception_type: "ValueError".to_string(),
            message: "bad value".to_string(),
        }
    }

    #[test]
    fn classify_success() {
        let ctx = RunContext::default();
        let result = RunResult::default();
        assert_eq!(
            classify_run_result(&CellId::new("a"), &ctx, &result),
            RunStatus::Success
        );
    }

    #[test]
    fn classify_exception() {
        let ctx = RunContext::default();
        let result = RunResult {
            output: None,
            error: Some(exception()),
        };
        assert_eq!(
            classify_run_result(&CellId::new("a"), &ctx, &result),
            RunStatus::Exception
        );
    }

    #[test]
    fn interruption_wins_over_cancellation() {
        let cell_id = CellId::new("a");
        let mut ctx = RunContext::default();
        ctx.cancelled.insert(cell_id.clone());
        let result = RunResult {
            output: None,
            error: Some(RunError::Interrupted),
        };
        assert_eq!(
            classify_run_result(&cell_id, &ctx, &result),
            RunStatus::Interrupted
        );
    }

    #[test]
    fn cancellation_wins_over_exception() {
        let cell_id = CellId::new("a");
        let mut ctx = RunContext::default();
        ctx.cancelled.insert(cell_id.clone());
        let result = RunResult {
            output: None,
            error: Some(exception()),
        };
        assert_eq!(
            classify_run_result(&cell_id, &ctx, &result),
            RunStatus::Cancelled
        );
    }

    #[test]
    fn empty_exception_message_names_the_type() {
        let error = RunError::Exception {
            exception_type: "RuntimeError".to_string(),
            message: String::new(),
        };
        assert_eq!(
            error.message(),
            "This cell raised an exception: RuntimeError"
        );
    }
}
