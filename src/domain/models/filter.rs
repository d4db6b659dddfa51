//! Column filter clauses and their query-string encoding.
//!
//! Comparison operators are carried as bracket suffixes on the column name:
//! `age[gte]=21`, `status[ne]=banned`. Equality has no suffix. Clauses with an
//! empty or null value encode to nothing so they never reach the backend as
//! blank conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

impl FilterOperator {
    /// Longest symbols first so `>=` is not read as `>`.
    const BY_SYMBOL_LEN: [Self; 6] = [Self::Ne, Self::Gte, Self::Lte, Self::Gt, Self::Lt, Self::Eq];

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    /// Bracket suffix appended to the column name.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Eq => "",
            Self::Ne => "[ne]",
            Self::Gt => "[gt]",
            Self::Gte => "[gte]",
            Self::Lt => "[lt]",
            Self::Lte => "[lte]",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Error parsing a `column<op>value` expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterParseError {
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    #[error("Filter expression has no operator: {0}")]
    MissingOperator(String),

    #[error("Filter expression has no column: {0}")]
    MissingColumn(String),
}

impl FromStr for FilterOperator {
    type Err = FilterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::BY_SYMBOL_LEN
            .into_iter()
            .find(|op| op.symbol() == s)
            .ok_or_else(|| FilterParseError::UnknownOperator(s.to_string()))
    }
}

/// A single `column <op> value` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
}

impl FilterClause {
    pub fn new(column: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Encoded `column[suffix]=value`, or `None` when the value is blank.
    pub fn encode(&self) -> Option<String> {
        let value = match &self.value {
            Value::Null => return None,
            Value::String(s) if s.is_empty() => return None,
            Value::String(s) => urlencoding::encode(s).into_owned(),
            Value::Array(items) if items.is_empty() => return None,
            other => urlencoding::encode(&other.to_string()).into_owned(),
        };
        Some(format!(
            "{}{}={}",
            self.column,
            self.operator.suffix(),
            value
        ))
    }
}

impl FromStr for FilterClause {
    type Err = FilterParseError;

    /// Parse `age>=21`, `status!=banned`, `name=bob`.
    ///
    /// Numeric and boolean literals become JSON numbers/bools, everything
    /// else stays a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let start = s
            .find(['=', '!', '<', '>'])
            .ok_or_else(|| FilterParseError::MissingOperator(s.to_string()))?;
        let column = s[..start].trim();
        if column.is_empty() {
            return Err(FilterParseError::MissingColumn(s.to_string()));
        }

        let rest = &s[start..];
        let operator = FilterOperator::BY_SYMBOL_LEN
            .into_iter()
            .find(|op| rest.starts_with(op.symbol()))
            .ok_or_else(|| {
                FilterParseError::UnknownOperator(rest.chars().take(2).collect())
            })?;

        let raw = rest[operator.symbol().len()..].trim();
        let value = if raw.is_empty() {
            Value::Null
        } else if let Ok(n) = raw.parse::<i64>() {
            Value::from(n)
        } else if let Ok(f) = raw.parse::<f64>() {
            Value::from(f)
        } else if let Ok(b) = raw.parse::<bool>() {
            Value::from(b)
        } else {
            Value::from(raw)
        };

        Ok(Self::new(column, operator, value))
    }
}

/// Ordered clauses plus raw parameters, rendered as one query fragment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default)]
    pub clauses: Vec<FilterClause>,
    /// Extra `key=value` parameters such as `has=roles` or `with=profile`
    #[serde(default)]
    pub params: Vec<(String, String)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn clause(mut self, clause: FilterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.encode().is_empty()
    }

    /// `&`-joined fragment; blank clauses and blank params are skipped.
    pub fn encode(&self) -> String {
        self.params
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .chain(self.clauses.iter().filter_map(FilterClause::encode))
            .collect::<Vec<_>>()
            .join("&")
    }
}
