//! Reserved cell names.
//!
//! Cells the user never named get [`DEFAULT_CELL_NAME`]; the initialization
//! cell is always [`SETUP_CELL_NAME`]; synthetic top-level cells are prefixed
//! with [`TOPLEVEL_CELL_PREFIX`]. Collaborators (the scheduler, the code
//! rewriter that assigns names to anonymous cells, display layers) share these
//! constants instead of re-spelling the literals.

/// Name given to a cell the user left unnamed.
pub const DEFAULT_CELL_NAME: &str = "_";

/// Name reserved for the initialization cell.
pub const SETUP_CELL_NAME: &str = "setup";

/// Prefix marking synthetic top-level cell identifiers.
///
/// Intentionally an invalid identifier character, so prefixed names can never
/// collide with a user-chosen name.
pub const TOPLEVEL_CELL_PREFIX: &str = "*";

/// Whether `name` was generated internally rather than chosen by the user.
///
/// Display layers use this to hide placeholder names, and rename-conflict
/// checks skip names it accepts. Internal names are generated with
/// [`DEFAULT_CELL_NAME`]; `"__"` is the old spelling, still recognized for
/// backwards compatibility.
pub fn is_internal_cell_name(name: &str) -> bool {
    name == DEFAULT_CELL_NAME || name == "__"
}
