//! Scope predicates for partitioned ordering
//!
//! A partition is "the records of a collection matching a predicate". The
//! predicate doubles as the canonical text that feeds partition-key
//! derivation, so its rendering must be deterministic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator for a scope predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeOperator {
    /// Equal to
    Eq,
    /// Not equal to
    Ne,
    /// Greater than
    Gt,
    /// Less than
    Lt,
    /// Greater than or equal
    Gte,
    /// Less than or equal
    Lte,
    /// Contains substring (strings) or element (arrays)
    Contains,
    /// In list of values
    In,
    /// Logical AND over nested predicates
    And,
    /// Logical OR over nested predicates
    Or,
    /// Logical NOT of a nested predicate
    Not,
}

impl ScopeOperator {
    /// Canonical lowercase name, matching the serde representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            ScopeOperator::Eq => "eq",
            ScopeOperator::Ne => "ne",
            ScopeOperator::Gt => "gt",
            ScopeOperator::Lt => "lt",
            ScopeOperator::Gte => "gte",
            ScopeOperator::Lte => "lte",
            ScopeOperator::Contains => "contains",
            ScopeOperator::In => "in",
            ScopeOperator::And => "and",
            ScopeOperator::Or => "or",
            ScopeOperator::Not => "not",
        }
    }
}

/// Scope predicate restricting a collection to one partition.
///
/// Logical operators (`And`, `Or`, `Not`) carry their nested predicates in
/// `value` as serialized expressions and leave `field` empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeExpr {
    /// Field to compare, looked up in the record's attribute map
    pub field: String,
    /// Operator to apply
    pub operator: ScopeOperator,
    /// Value to compare against (JSON value for flexibility)
    pub value: Value,
}

impl ScopeExpr {
    /// Create a new scope predicate.
    pub fn new(field: impl Into<String>, operator: ScopeOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality predicate.
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ScopeOperator::Eq, value)
    }

    /// Create a greater-than predicate.
    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ScopeOperator::Gt, value)
    }

    /// Create a contains predicate.
    pub fn contains(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, ScopeOperator::Contains, value)
    }

    /// Create a membership predicate over a list of values.
    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, ScopeOperator::In, Value::Array(values))
    }

    /// Create a conjunction of predicates.
    pub fn and(exprs: Vec<ScopeExpr>) -> Self {
        Self::new("", ScopeOperator::And, Self::pack(exprs))
    }

    /// Create a disjunction of predicates.
    pub fn or(exprs: Vec<ScopeExpr>) -> Self {
        Self::new("", ScopeOperator::Or, Self::pack(exprs))
    }

    /// Create a negated predicate.
    pub fn negate(expr: ScopeExpr) -> Self {
        Self::new("", ScopeOperator::Not, Self::pack(vec![expr]))
    }

    fn pack(exprs: Vec<ScopeExpr>) -> Value {
        serde_json::to_value(exprs).unwrap_or(Value::Null)
    }

    /// Nested predicates for logical operators, if `value` holds any.
    fn sub_exprs(&self) -> Option<Vec<ScopeExpr>> {
        serde_json::from_value(self.value.clone()).ok()
    }

    /// Evaluate the predicate against a record's attribute map.
    ///
    /// Missing fields compare as JSON null. Ordered comparisons apply to
    /// number pairs and string pairs; mixed types are never ordered.
    pub fn matches(&self, attrs: &serde_json::Map<String, Value>) -> bool {
        match self.operator {
            ScopeOperator::And => self
                .sub_exprs()
                .map(|subs| subs.iter().all(|e| e.matches(attrs)))
                .unwrap_or(false),
            ScopeOperator::Or => self
                .sub_exprs()
                .map(|subs| subs.iter().any(|e| e.matches(attrs)))
                .unwrap_or(false),
            ScopeOperator::Not => self
                .sub_exprs()
                .map(|subs| !subs.iter().all(|e| e.matches(attrs)))
                .unwrap_or(false),
            _ => {
                let actual = attrs.get(&self.field).unwrap_or(&Value::Null);
                self.compare(actual)
            }
        }
    }

    fn compare(&self, actual: &Value) -> bool {
        match self.operator {
            ScopeOperator::Eq => actual == &self.value,
            ScopeOperator::Ne => actual != &self.value,
            ScopeOperator::Gt => Self::ordering(actual, &self.value)
                .map(|o| o == std::cmp::Ordering::Greater)
                .unwrap_or(false),
            ScopeOperator::Lt => Self::ordering(actual, &self.value)
                .map(|o| o == std::cmp::Ordering::Less)
                .unwrap_or(false),
            ScopeOperator::Gte => Self::ordering(actual, &self.value)
                .map(|o| o != std::cmp::Ordering::Less)
                .unwrap_or(false),
            ScopeOperator::Lte => Self::ordering(actual, &self.value)
                .map(|o| o != std::cmp::Ordering::Greater)
                .unwrap_or(false),
            ScopeOperator::Contains => match (actual, &self.value) {
                (Value::String(s), Value::String(needle)) => s.contains(needle.as_str()),
                (Value::Array(items), needle) => items.contains(needle),
                _ => false,
            },
            ScopeOperator::In => match &self.value {
                Value::Array(items) => items.contains(actual),
                _ => false,
            },
            // Logical operators are handled in matches()
            ScopeOperator::And | ScopeOperator::Or | ScopeOperator::Not => false,
        }
    }

    fn ordering(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
        match (a, b) {
            (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
            (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
            _ => None,
        }
    }

    /// Deterministic textual form used for partition-key derivation.
    ///
    /// Distinct predicates render distinctly; the same predicate always
    /// renders the same way (serde_json object keys are ordered).
    pub fn canonical_text(&self) -> String {
        match self.operator {
            ScopeOperator::And | ScopeOperator::Or => match self.sub_exprs() {
                Some(subs) => {
                    let joined = subs
                        .iter()
                        .map(|e| e.canonical_text())
                        .collect::<Vec<_>>()
                        .join(&format!(" {} ", self.operator.as_db_str()));
                    format!("({joined})")
                }
                None => format!("({} {})", self.operator.as_db_str(), self.value),
            },
            ScopeOperator::Not => match self.sub_exprs() {
                Some(subs) if !subs.is_empty() => {
                    format!("not ({})", subs[0].canonical_text())
                }
                _ => format!("not ({})", self.value),
            },
            _ => format!("{} {} {}", self.field, self.operator.as_db_str(), self.value),
        }
    }
}
