use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_MAX_TABLE_DEPTH: usize = 64;
pub const DEFAULT_MAX_FONT_DEPTH: usize = 256;
/// Hard ceiling on table nesting. The grammar recurses once per nested table, so deeper labels
/// would exhaust the thread stack instead of failing cleanly.
pub const MAX_TABLE_DEPTH_LIMIT: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParseOptions {
    /// Maximum number of simultaneously open tables, capped at [`MAX_TABLE_DEPTH_LIMIT`].
    pub max_table_depth: usize,
    /// Maximum number of font scopes open on top of the base font.
    pub max_font_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_table_depth: DEFAULT_MAX_TABLE_DEPTH,
            max_font_depth: DEFAULT_MAX_FONT_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Reads options from a JSON object; missing keys keep their defaults.
    pub fn from_value(value: &Value) -> Result<Self> {
        let options: Self =
            serde_json::from_value(value.clone()).map_err(|e| Error::InvalidOptions {
                message: e.to_string(),
            })?;
        if options.max_table_depth == 0 {
            return Err(Error::InvalidOptions {
                message: "maxTableDepth must be at least 1".to_string(),
            });
        }
        if options.max_table_depth > MAX_TABLE_DEPTH_LIMIT {
            return Err(Error::InvalidOptions {
                message: format!("maxTableDepth must not exceed {MAX_TABLE_DEPTH_LIMIT}"),
            });
        }
        Ok(options)
    }

    /// Sets the table nesting limit, clamped to [`MAX_TABLE_DEPTH_LIMIT`].
    pub fn with_max_table_depth(mut self, depth: usize) -> Self {
        self.max_table_depth = depth.min(MAX_TABLE_DEPTH_LIMIT);
        self
    }

    /// The table nesting limit actually enforced, whatever the field was set to.
    pub fn table_depth_limit(&self) -> usize {
        self.max_table_depth.min(MAX_TABLE_DEPTH_LIMIT)
    }

    pub fn with_max_font_depth(mut self, depth: usize) -> Self {
        self.max_font_depth = depth;
        self
    }
}
