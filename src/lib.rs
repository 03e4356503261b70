// Export modules for library usage
pub mod core;
pub mod runtime;

// Re-export commonly used types
pub use crate::core::config::{CellConfig, CellConfigPatch};
pub use crate::core::errors::Error;
pub use crate::core::ids::{CellId, RequestId, UiElementId};
pub use crate::core::names::{
    is_internal_cell_name, DEFAULT_CELL_NAME, SETUP_CELL_NAME, TOPLEVEL_CELL_PREFIX,
};

pub use crate::runtime::hooks::{
    classify_run_result, default_post_execution_hooks, run_post_execution_hooks, CellSnapshot,
    ExecutionStatus, PostExecutionHook, RunContext, RunError, RunResult, RunStatus, VariableValue,
};

pub use crate::runtime::requests::{
    AppMetadata, CodeCompletionRequest, ControlRequest, CreationRequest, DeleteCellRequest,
    ExecuteMultipleRequest, ExecuteScratchpadRequest, ExecuteStaleRequest, ExecutionRequest,
    FunctionCallRequest, HttpRequest, InstallMissingPackagesRequest, ListOrValue, Primitive,
    RenameRequest, SetCellConfigRequest, SetUiElementValueRequest, StopRequest,
};
