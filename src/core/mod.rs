pub mod config;
pub mod errors;
pub mod ids;
pub mod names;

pub use config::{CellConfig, CellConfigPatch};
pub use errors::Error;
pub use ids::{CellId, RequestId, UiElementId};
