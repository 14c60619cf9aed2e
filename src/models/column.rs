//! Column schema for the bulk-entry grid
//!
//! Each column declares its id, display name, data type and validation rules.
//! The schema is the only place that knows what a cell value *means*; the grid
//! itself stores plain strings.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").unwrap());
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://.+").unwrap());

/// Data type of a column
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Text,
    Number,
    Email,
    Url,
    Textarea,
    Dropdown,
    File,
}

impl ColumnType {
    /// Whether typing a character on a selected cell may start an edit.
    /// Dropdowns open a picker and files open a chooser instead.
    pub fn accepts_typed_entry(self) -> bool {
        !matches!(self, ColumnType::Dropdown | ColumnType::File)
    }

    /// Character-level input filter applied while typing
    pub fn accepts_char(self, ch: char) -> bool {
        match self {
            ColumnType::Number => ch.is_ascii_digit(),
            _ => true,
        }
    }

    /// Strip characters this type refuses at keystroke time
    pub fn filter_input(self, text: &str) -> String {
        text.chars().filter(|&c| self.accepts_char(c)).collect()
    }

    fn format_error(self, name: &str) -> Option<String> {
        match self {
            ColumnType::Number => Some(format!("{} must be a whole number.", name)),
            ColumnType::Email => Some(format!("{} must be a valid email address.", name)),
            ColumnType::Url => Some(format!("{} must start with http:// or https://.", name)),
            _ => None,
        }
    }

    fn matches_format(self, value: &str) -> bool {
        match self {
            ColumnType::Number => NUMBER_RE.is_match(value),
            ColumnType::Email => EMAIL_RE.is_match(value),
            ColumnType::Url => URL_RE.is_match(value),
            _ => true,
        }
    }
}

/// Host-supplied predicate returning an error message for bad values
#[derive(Clone)]
pub struct CustomRule(Rc<dyn Fn(&str) -> Option<String>>);

impl CustomRule {
    pub fn new(f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn check(&self, value: &str) -> Option<String> {
        (self.0)(value)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomRule(..)")
    }
}

/// Extra validation attached to a column
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    /// Regex the (non-empty) value must match
    #[serde(default)]
    pub pattern: Option<String>,

    /// Message reported when `pattern` does not match
    #[serde(default)]
    pub message: Option<String>,

    #[serde(skip)]
    pub custom: Option<CustomRule>,

    #[serde(skip)]
    compiled: Option<Regex>,
}

impl ValidationRule {
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn custom(f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        Self {
            custom: Some(CustomRule::new(f)),
            ..Default::default()
        }
    }

    fn compile(&mut self, column: &str) -> Result<()> {
        self.compiled = match &self.pattern {
            Some(p) => Some(Regex::new(p).map_err(|source| GridError::InvalidPattern {
                column: column.to_string(),
                source,
            })?),
            None => None,
        };
        Ok(())
    }
}

/// One editable column
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub column_type: ColumnType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Display width in pixels, rendering hint only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
}

impl Column {
    pub fn new(id: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            required: false,
            options: Vec::new(),
            placeholder: None,
            width: None,
            read_only: false,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }

    /// Validate a single value against this column.
    ///
    /// Checks run in order and stop at the first failure: required, built-in
    /// type format, rule pattern, then the custom predicate.
    pub fn validate(&self, value: &str) -> Option<String> {
        if self.required && value.trim().is_empty() {
            return Some(format!("{} is required.", self.name));
        }

        if !value.is_empty() && !self.column_type.matches_format(value) {
            return self.column_type.format_error(&self.name);
        }

        let rule = self.validation.as_ref()?;

        if let Some(re) = &rule.compiled {
            if !value.is_empty() && !re.is_match(value) {
                return Some(
                    rule.message
                        .clone()
                        .unwrap_or_else(|| format!("{} has an invalid format.", self.name)),
                );
            }
        }

        rule.custom.as_ref().and_then(|c| c.check(value))
    }
}

/// Ordered, checked set of columns for one grid session
#[derive(Clone, Debug, Default)]
pub struct ColumnSchema {
    columns: Vec<Column>,
}

impl ColumnSchema {
    /// Build a schema, rejecting empty or duplicate ids, option-less dropdowns
    /// and patterns that do not compile.
    pub fn new(mut columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for (i, col) in columns.iter_mut().enumerate() {
            if col.id.trim().is_empty() {
                return Err(GridError::EmptyColumnId(i));
            }
            if !seen.insert(col.id.clone()) {
                return Err(GridError::DuplicateColumn(col.id.clone()));
            }
            if col.column_type == ColumnType::Dropdown && col.options.is_empty() {
                return Err(GridError::MissingOptions(col.id.clone()));
            }
            if let Some(rule) = col.validation.as_mut() {
                rule.compile(&col.id)?;
            }
        }
        Ok(Self { columns })
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, col: usize) -> Option<&Column> {
        self.columns.get(col)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    /// Attach a custom predicate to an existing column
    pub fn set_custom_rule(&mut self, id: &str, rule: CustomRule) -> Result<()> {
        let col = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownField(id.to_string()))?;
        col.validation.get_or_insert_with(ValidationRule::default).custom = Some(rule);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_check_trims() {
        let col = Column::new("keyword", "Keyword", ColumnType::Text).required();
        assert_eq!(col.validate("   "), Some("Keyword is required.".to_string()));
        assert_eq!(col.validate("shoes"), None);
    }

    #[test]
    fn test_number_rejects_decimals_and_negatives() {
        let col = Column::new("bid", "Bid", ColumnType::Number);
        assert!(col.validate("120").is_none());
        assert!(col.validate("1.5").is_some());
        assert!(col.validate("-3").is_some());
        // Empty optional value skips the type check
        assert!(col.validate("").is_none());
    }

    #[test]
    fn test_email_and_url_formats() {
        let email = Column::new("contact", "Contact", ColumnType::Email);
        assert!(email.validate("ops@example.com").is_none());
        assert!(email.validate("ops@example").is_some());

        let url = Column::new("url", "URL", ColumnType::Url);
        assert!(url.validate("https://example.com/landing").is_none());
        assert!(url.validate("ftp://example.com").is_some());
        assert!(url.validate("http://").is_some());
    }

    #[test]
    fn test_custom_rule_runs_last() {
        let col = Column::new("keyword", "Keyword", ColumnType::Text)
            .required()
            .with_rule(ValidationRule::custom(|v| {
                (v.len() > 5).then(|| "Keyword is too long.".to_string())
            }));
        let schema = ColumnSchema::new(vec![col]).unwrap();
        let col = schema.get(0).unwrap();

        assert_eq!(col.validate(""), Some("Keyword is required.".to_string()));
        assert_eq!(col.validate("sneakers"), Some("Keyword is too long.".to_string()));
        assert_eq!(col.validate("shoe"), None);
    }

    #[test]
    fn test_pattern_rule_uses_message() {
        let col = Column::new("code", "Code", ColumnType::Text)
            .with_rule(ValidationRule::pattern("^[A-Z]{3}$", "Code must be three capitals."));
        let schema = ColumnSchema::new(vec![col]).unwrap();
        let col = schema.get(0).unwrap();

        assert!(col.validate("ABC").is_none());
        assert_eq!(col.validate("abc"), Some("Code must be three capitals.".to_string()));
    }

    #[test]
    fn test_schema_rejects_duplicates_and_bad_patterns() {
        let dup = ColumnSchema::new(vec![
            Column::new("a", "A", ColumnType::Text),
            Column::new("a", "A2", ColumnType::Text),
        ]);
        assert!(matches!(dup, Err(GridError::DuplicateColumn(id)) if id == "a"));

        let bad = ColumnSchema::new(vec![Column::new("a", "A", ColumnType::Text)
            .with_rule(ValidationRule::pattern("(", "never"))]);
        assert!(matches!(bad, Err(GridError::InvalidPattern { .. })));

        let dropdown = ColumnSchema::new(vec![Column::new("d", "D", ColumnType::Dropdown)]);
        assert!(matches!(dropdown, Err(GridError::MissingOptions(_))));
    }

    #[test]
    fn test_column_deserializes_from_camel_case() {
        let json = r#"{"id":"status","name":"Status","type":"dropdown","required":true,
                       "options":["active","paused"],"readOnly":false,"width":120}"#;
        let col: Column = serde_json::from_str(json).unwrap();
        assert_eq!(col.column_type, ColumnType::Dropdown);
        assert_eq!(col.options, vec!["active", "paused"]);
        assert_eq!(col.width, Some(120));
    }
}
