//! Control requests a front end sends to the kernel.
//!
//! Every request is plain serializable data; the kernel consumes them from a
//! queue and never replies through these types. [`ControlRequest`] is the
//! tagged union the transport layer decodes into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::core::config::CellConfigPatch;
use crate::core::errors::{Error, Result};
use crate::core::ids::{CellId, RequestId, UiElementId};

pub type CompletionRequestId = String;

/// A scalar or a list of scalars, as query strings and CLI flags allow both.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListOrValue<T> {
    Value(T),
    List(Vec<T>),
}

/// Scalar CLI argument value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Primitive {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

pub type SerializedQueryParams = BTreeMap<String, ListOrValue<String>>;
pub type SerializedCliArgs = BTreeMap<String, ListOrValue<Primitive>>;

/// Serializable subset of an incoming HTTP connection.
///
/// Session and auth data are deliberately left out; they may contain
/// information the app author does not want to expose to cell code.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpRequest {
    /// Serialized URL (path, port, scheme, netloc, query, hostname)
    pub url: BTreeMap<String, Value>,
    pub base_url: BTreeMap<String, Value>,
    pub headers: BTreeMap<String, String>,
    pub query_params: BTreeMap<String, Vec<String>>,
    pub path_params: BTreeMap<String, Value>,
    pub cookies: BTreeMap<String, String>,
    pub meta: BTreeMap<String, Value>,
    pub user: Value,
}

impl HttpRequest {
    /// Header prefixes owned by the kernel transport, never forwarded to cells.
    const INTERNAL_HEADER_PREFIXES: [&'static str; 2] = ["cell-", "x-cell-"];

    /// Drop headers the kernel transport added for its own use.
    pub fn sanitized(mut self) -> Self {
        self.headers.retain(|name, _| !Self::is_internal_header(name));
        self
    }

    fn is_internal_header(name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        Self::INTERNAL_HEADER_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
    }

    /// URL path, when the serialized URL carries one.
    pub fn path(&self) -> Option<&str> {
        self.url.get("path").and_then(Value::as_str)
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HttpRequest(path={}, params={})",
            self.path().unwrap_or(""),
            self.query_params.len()
        )
    }
}

/// Run a single cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub cell_id: CellId,
    pub code: String,
    /// Incoming HTTP request, when the kernel runs behind a server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
    /// Time at which the request was received
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRequest {
    pub fn new(cell_id: CellId, code: impl Into<String>) -> Self {
        Self {
            cell_id,
            code: code.into(),
            request: None,
            timestamp: Utc::now(),
        }
    }
}

impl fmt::Display for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self
            .code
            .chars()
            .take(10)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        write!(
            f,
            "ExecutionRequest(cell={}, code_preview={})",
            self.cell_id, preview
        )
    }
}

/// Reject parallel request lists that disagree in length.
fn check_arity(context: &'static str, ids: usize, values: usize) -> Result<()> {
    if ids != values {
        return Err(Error::MismatchedRequest {
            context,
            ids,
            values,
        });
    }
    Ok(())
}

/// Run a batch of cells in one scheduling pass.
///
/// Always one code string per cell id; decoding enforces this, so a request
/// that truncated in transit is rejected instead of silently dropping cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExecuteMultipleRequestPayload")]
pub struct ExecuteMultipleRequest {
    /// Ids of cells to run
    pub cell_ids: Vec<CellId>,
    /// Code to register/run for each cell
    pub codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ExecuteMultipleRequestPayload {
    cell_ids: Vec<CellId>,
    codes: Vec<String>,
    #[serde(default)]
    request: Option<HttpRequest>,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

impl TryFrom<ExecuteMultipleRequestPayload> for ExecuteMultipleRequest {
    type Error = Error;

    fn try_from(payload: ExecuteMultipleRequestPayload) -> Result<Self> {
        check_arity("cell codes", payload.cell_ids.len(), payload.codes.len())?;
        Ok(Self {
            cell_ids: payload.cell_ids,
            codes: payload.codes,
            request: payload.request,
            timestamp: payload.timestamp,
        })
    }
}

impl ExecuteMultipleRequest {
    /// Fails when `cell_ids` and `codes` disagree in length.
    pub fn new(cell_ids: Vec<CellId>, codes: Vec<String>) -> Result<Self> {
        check_arity("cell codes", cell_ids.len(), codes.len())?;
        Ok(Self {
            cell_ids,
            codes,
            request: None,
            timestamp: Utc::now(),
        })
    }

    /// Fan out to per-cell requests sharing the batch timestamp.
    pub fn execution_requests(&self) -> Vec<ExecutionRequest> {
        self.cell_ids
            .iter()
            .zip(&self.codes)
            .map(|(cell_id, code)| ExecutionRequest {
                cell_id: cell_id.clone(),
                code: code.clone(),
                request: self.request.clone(),
                timestamp: self.timestamp,
            })
            .collect()
    }
}

impl fmt::Display for ExecuteMultipleRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecuteMultipleRequest(cells={})", self.cell_ids.len())
    }
}

/// Re-run every cell currently marked stale.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecuteStaleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
}

/// Run throwaway code outside the notebook graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExecuteScratchpadRequest {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
}

/// Rename the notebook file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenameRequest {
    pub filename: PathBuf,
}

fn new_token() -> String {
    Uuid::new_v4().to_string()
}

/// Set the values of UI elements, usually in response to user interaction.
///
/// Always one value per object id; decoding enforces this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SetUiElementValueRequestPayload")]
pub struct SetUiElementValueRequest {
    pub object_ids: Vec<UiElementId>,
    pub values: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
    /// Uniquely identifies the request
    pub token: String,
}

#[derive(Deserialize)]
struct SetUiElementValueRequestPayload {
    object_ids: Vec<UiElementId>,
    values: Vec<Value>,
    #[serde(default)]
    request: Option<HttpRequest>,
    #[serde(default = "new_token")]
    token: String,
}

impl TryFrom<SetUiElementValueRequestPayload> for SetUiElementValueRequest {
    type Error = Error;

    fn try_from(payload: SetUiElementValueRequestPayload) -> Result<Self> {
        check_arity(
            "ui element values",
            payload.object_ids.len(),
            payload.values.len(),
        )?;
        Ok(Self {
            object_ids: payload.object_ids,
            values: payload.values,
            request: payload.request,
            token: payload.token,
        })
    }
}

impl SetUiElementValueRequest {
    /// Fails when `object_ids` and `values` disagree in length.
    pub fn new(object_ids: Vec<UiElementId>, values: Vec<Value>) -> Result<Self> {
        check_arity("ui element values", object_ids.len(), values.len())?;
        Ok(Self {
            object_ids,
            values,
            request: None,
            token: new_token(),
        })
    }

    pub fn from_ids_and_values(ids_and_values: Vec<(UiElementId, Value)>) -> Self {
        let (object_ids, values) = ids_and_values.into_iter().unzip();
        Self {
            object_ids,
            values,
            request: None,
            token: new_token(),
        }
    }

    pub fn ids_and_values(&self) -> impl Iterator<Item = (&UiElementId, &Value)> {
        self.object_ids.iter().zip(&self.values)
    }
}

impl fmt::Display for SetUiElementValueRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SetUiElementValueRequest(n_elements={}, token={})",
            self.object_ids.len(),
            self.token
        )
    }
}

/// Call a function exposed by a cell's namespace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCallRequest {
    pub function_call_id: RequestId,
    pub namespace: String,
    pub function_name: String,
    pub args: BTreeMap<String, Value>,
}

impl fmt::Display for FunctionCallRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FunctionCallRequest(id={}, fn={}.{})",
            self.function_call_id, self.namespace, self.function_name
        )
    }
}

/// Metadata about the running app, like its filename.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    pub query_params: SerializedQueryParams,
    pub cli_args: SerializedCliArgs,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<PathBuf>,
}

/// Update cell configs; patches may be partial.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SetCellConfigRequest {
    pub configs: BTreeMap<CellId, CellConfigPatch>,
}

/// Instantiate a notebook: register all cells, then optionally run them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreationRequest {
    pub execution_requests: Vec<ExecutionRequest>,
    pub set_ui_element_value_request: SetUiElementValueRequest,
    pub auto_run: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<HttpRequest>,
}

/// Delete a cell from the notebook.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeleteCellRequest {
    pub cell_id: CellId,
}

/// Interrupt whatever the kernel is doing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StopRequest {}

/// Request code completions at a position in a cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeCompletionRequest {
    pub id: CompletionRequestId,
    pub document: String,
    pub cell_id: CellId,
}

impl fmt::Display for CodeCompletionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CodeCompletionRequest(id={}, cell={})",
            self.id, self.cell_id
        )
    }
}

/// Install packages the notebook imports but the environment lacks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstallMissingPackagesRequest {
    /// Package manager to install with
    pub manager: String,
    /// Map from package name to desired version; packages not in the map get
    /// the latest version
    pub versions: BTreeMap<String, String>,
}

/// Union of all requests the kernel's control queue accepts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlRequest {
    Creation(CreationRequest),
    DeleteCell(DeleteCellRequest),
    ExecuteMultiple(ExecuteMultipleRequest),
    ExecuteScratchpad(ExecuteScratchpadRequest),
    ExecuteStale(ExecuteStaleRequest),
    FunctionCall(FunctionCallRequest),
    InstallMissingPackages(InstallMissingPackagesRequest),
    Rename(RenameRequest),
    SetCellConfig(SetCellConfigRequest),
    SetUiElementValue(SetUiElementValueRequest),
    Stop(StopRequest),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_prefers_int_over_float() {
        let v: Primitive = serde_json::from_str("7").unwrap();
        assert_eq!(v, Primitive::Int(7));
        let v: Primitive = serde_json::from_str("7.5").unwrap();
        assert_eq!(v, Primitive::Float(7.5));
    }

    #[test]
    fn list_or_value_accepts_both_shapes() {
        let v: ListOrValue<String> = serde_json::from_str("\"a\"").unwrap();
        assert_eq!(v, ListOrValue::Value("a".to_string()));
        let v: ListOrValue<String> = serde_json::from_str("[\"a\", \"b\"]").unwrap();
        assert_eq!(
            v,
            ListOrValue::List(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn internal_headers_are_stripped_case_insensitively() {
        let mut headers = BTreeMap::new();
        headers.insert("Accept".to_string(), "text/html".to_string());
        headers.insert("X-Cell-Session".to_string(), "abc".to_string());
        headers.insert("cell-run-id".to_string(), "123".to_string());
        let request = HttpRequest {
            headers,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(request.headers.len(), 1);
        assert!(request.headers.contains_key("Accept"));
    }

    #[test]
    fn execution_request_display_flattens_newlines() {
        let req = ExecutionRequest::new(CellId::new("c1"), "x = 1\ny = 2");
        assert_eq!(
            req.to_string(),
            "ExecutionRequest(cell=c1, code_preview=x = 1 y = )"
        );
    }
}
