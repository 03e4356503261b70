//! Per-cell configuration and partial updates.

use serde::{Deserialize, Serialize};

/// Configuration attached to a single cell.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Cell is excluded from execution
    pub disabled: bool,
    /// Editor hides the cell's code
    pub hide_code: bool,
    /// Display column, for multi-column layouts
    pub column: Option<u32>,
}

/// Partial update to a [`CellConfig`].
///
/// Front ends send patches per cell; unset fields leave the current value
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfigPatch {
    pub disabled: Option<bool>,
    pub hide_code: Option<bool>,
    pub column: Option<u32>,
}

impl CellConfig {
    /// Overwrite only the fields the patch populates.
    pub fn apply(&mut self, patch: &CellConfigPatch) {
        if let Some(disabled) = patch.disabled {
            self.disabled = disabled;
        }
        if let Some(hide_code) = patch.hide_code {
            self.hide_code = hide_code;
        }
        if let Some(column) = patch.column {
            self.column = Some(column);
        }
    }
}

impl CellConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.disabled.is_none() && self.hide_code.is_none() && self.column.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_overwrites_only_populated_fields() {
        let mut config = CellConfig {
            disabled: true,
            hide_code: false,
            column: Some(1),
        };
        config.apply(&CellConfigPatch {
            hide_code: Some(true),
            ..Default::default()
        });
        assert!(config.disabled, "untouched field should survive the patch");
        assert!(config.hide_code);
        assert_eq!(config.column, Some(1));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut config = CellConfig::default();
        let patch = CellConfigPatch::default();
        assert!(patch.is_empty());
        config.apply(&patch);
        assert_eq!(config, CellConfig::default());
    }

    #[test]
    fn partial_patch_deserializes_with_missing_fields() {
        let patch: CellConfigPatch = serde_json::from_str(r#"{"disabled": true}"#).unwrap();
        assert_eq!(patch.disabled, Some(true));
        assert_eq!(patch.hide_code, None);
        assert_eq!(patch.column, None);
    }
}
