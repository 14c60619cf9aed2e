//! Grid configuration
//!
//! A grid session is configured with its column set and row limits. Hosts
//! hand the config over as JSON (from JS) or YAML (bundled presets).

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};
use crate::models::{Column, ColumnSchema, ColumnType, ValidationRule};

fn default_min_rows() -> usize {
    1
}

fn default_rows() -> usize {
    10
}

fn default_max_displayed_errors() -> usize {
    5
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    pub columns: Vec<Column>,

    /// Floor below which row deletion is a no-op
    #[serde(default = "default_min_rows")]
    pub min_rows: usize,

    /// Rows shown for an empty seed
    #[serde(default = "default_rows")]
    pub default_rows: usize,

    /// How many validation errors the host lists before truncating
    #[serde(default = "default_max_displayed_errors")]
    pub max_displayed_errors: usize,
}

impl GridConfig {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            min_rows: default_min_rows(),
            default_rows: default_rows(),
            max_displayed_errors: default_max_displayed_errors(),
        }
    }

    pub fn with_min_rows(mut self, min_rows: usize) -> Self {
        self.min_rows = min_rows;
        self
    }

    pub fn with_default_rows(mut self, rows: usize) -> Self {
        self.default_rows = rows;
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.check()?;
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.check()?;
        Ok(config)
    }

    /// Rows an empty session starts with
    pub fn initial_rows(&self) -> usize {
        self.default_rows.max(self.min_rows)
    }

    /// Build and check the column schema
    pub fn schema(&self) -> Result<ColumnSchema> {
        ColumnSchema::new(self.columns.clone())
    }

    /// Reject configs a session cannot start from
    pub fn check(&self) -> Result<()> {
        if self.min_rows == 0 {
            return Err(GridError::ZeroMinRows);
        }
        self.schema().map(|_| ())
    }

    /// Columns used for bulk ad-slot registration
    pub fn slot_registration() -> Self {
        Self::new(vec![
            Column::new("keyword", "Keyword", ColumnType::Text)
                .required()
                .with_placeholder("e.g. running shoes")
                .with_width(180),
            Column::new("url", "Landing URL", ColumnType::Url)
                .required()
                .with_placeholder("https://")
                .with_width(260),
            Column::new("dailyBudget", "Daily budget", ColumnType::Number)
                .with_rule(ValidationRule::pattern("^[1-9][0-9]*$", "Daily budget must be greater than zero."))
                .with_width(120),
            Column::new("contact", "Contact email", ColumnType::Email).with_width(200),
            Column::new("placement", "Placement", ColumnType::Dropdown)
                .required()
                .with_options(["search", "shopping", "display"])
                .with_width(120),
            Column::new("memo", "Memo", ColumnType::Textarea).with_width(220),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_defaults() {
        let config = GridConfig::from_json(r#"{"columns":[{"id":"keyword","name":"Keyword"}]}"#).unwrap();
        assert_eq!(config.min_rows, 1);
        assert_eq!(config.default_rows, 10);
        assert_eq!(config.max_displayed_errors, 5);
        assert_eq!(config.columns[0].column_type, ColumnType::Text);
    }

    #[test]
    fn test_yaml_config() {
        let yaml = r#"
minRows: 3
defaultRows: 2
columns:
  - id: keyword
    name: Keyword
    type: text
    required: true
  - id: url
    name: URL
    type: url
"#;
        let config = GridConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.initial_rows(), 3);
        assert!(config.columns[0].required);
        assert_eq!(config.columns[1].column_type, ColumnType::Url);
    }

    #[test]
    fn test_rejects_zero_min_rows_and_bad_schema() {
        let zero = GridConfig::from_json(r#"{"columns":[],"minRows":0}"#);
        assert!(matches!(zero, Err(GridError::ZeroMinRows)));

        let dup = GridConfig::from_json(r#"{"columns":[{"id":"a","name":"A"},{"id":"a","name":"B"}]}"#);
        assert!(matches!(dup, Err(GridError::DuplicateColumn(_))));

        assert!(matches!(GridConfig::from_json("{"), Err(GridError::Json(_))));
    }

    #[test]
    fn test_slot_preset_is_valid() {
        let schema = GridConfig::slot_registration().schema().unwrap();
        assert_eq!(schema.index_of("url"), Some(1));
        assert_eq!(schema.get(4).unwrap().options.len(), 3);
    }
}
