use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A value bound into a dynamically assembled query. Filter input only
/// ever reaches SQL through one of these, never by string splicing.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
}

/// An ordered set of filter clauses combined conjunctively. Each clause
/// template carries a single `$?` marker that is rewritten to the next
/// positional placeholder; the matching value is kept alongside so the
/// caller binds them in the same order.
#[derive(Debug, Default)]
pub struct ConditionSet {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause with one bound value. The template must contain `$?`.
    pub fn push(&mut self, template: &str, value: SqlValue) {
        debug_assert!(template.contains("$?"));
        let placeholder = format!("${}", self.values.len() + 1);
        self.clauses.push(template.replacen("$?", &placeholder, 1));
        self.values.push(value);
    }

    /// Adds a clause with no bound value. Only for fixed SQL fragments,
    /// never for anything derived from request input.
    pub fn push_unbound(&mut self, clause: &str) {
        self.clauses.push(clause.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of values bound so far; the next free placeholder is
    /// `$(bind_count() + 1)`, which callers use for LIMIT/OFFSET.
    pub fn bind_count(&self) -> usize {
        self.values.len()
    }

    /// `""` when no clause was added, otherwise `"WHERE a AND b AND ..."`.
    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// Binds a [`ConditionSet`]'s values (in order) onto any sqlx query type.
#[macro_export]
macro_rules! bind_sql_values {
    ($query:expr, $values:expr) => {{
        let mut q = $query;
        for v in $values {
            q = match v {
                $crate::services::filter::SqlValue::Text(s) => q.bind(s.clone()),
                $crate::services::filter::SqlValue::Int(i) => q.bind(*i),
                $crate::services::filter::SqlValue::Float(f) => q.bind(*f),
                $crate::services::filter::SqlValue::Timestamp(t) => q.bind(*t),
                $crate::services::filter::SqlValue::Uuid(u) => q.bind(*u),
            };
        }
        q
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn empty_set_imposes_no_constraint() {
        let conds = ConditionSet::new();
        assert!(conds.is_empty());
        assert_eq!(conds.where_sql(), "");
        assert_eq!(conds.bind_count(), 0);
    }

    #[test]
    fn placeholders_are_numbered_in_push_order() {
        let mut conds = ConditionSet::new();
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        conds.push("u.created_at >= $?", SqlValue::Timestamp(start));
        conds.push("u.browser ILIKE $?", SqlValue::Text("%Firefox%".into()));
        conds.push("COALESCE(ev.total_events, 0) >= $?", SqlValue::Int(5));

        assert_eq!(
            conds.where_sql(),
            "WHERE u.created_at >= $1 AND u.browser ILIKE $2 AND COALESCE(ev.total_events, 0) >= $3"
        );
        assert_eq!(conds.bind_count(), 3);
        assert_eq!(conds.values()[2], SqlValue::Int(5));
    }

    #[test]
    fn unbound_clauses_do_not_consume_placeholders() {
        let mut conds = ConditionSet::new();
        conds.push_unbound("COALESCE(an.answers_count, 0) = 0");
        conds.push("u.os ILIKE $?", SqlValue::Text("%Linux%".into()));

        assert_eq!(
            conds.where_sql(),
            "WHERE COALESCE(an.answers_count, 0) = 0 AND u.os ILIKE $1"
        );
        assert_eq!(conds.bind_count(), 1);
    }
}
