//! Equality filters, sort/limit options and the SQL they compile to.
//!
//! Field names are interpolated into JSON paths, so they are restricted to ASCII
//! alphanumerics and `_`. Values are always bound as parameters.

use serde_json::{Map, Value};

use super::{StoreError, StoreResult};

/// Conjunction of `field == value` clauses on top-level string fields.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, String)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<String>) -> Self {
        self.clauses.push((field.to_string(), value.into()));
        self
    }

    /// Add a clause only when `value` is present and non-empty.
    pub fn eq_opt(self, field: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// The filter's fields as a document, used as the seed of an upsert.
    pub fn to_document(&self) -> Map<String, Value> {
        self.clauses
            .iter()
            .map(|(field, value)| (field.clone(), Value::String(value.clone())))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering and truncation for [`super::Collection::find`]. Without a sort key,
/// documents come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    sort: Option<(String, SortOrder)>,
    limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some((field.to_string(), order));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn json_path(field: &str) -> StoreResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(format!("json_extract(body, '$.{field}')"))
}

fn where_clause(filter: &Filter, args: &mut Vec<String>) -> StoreResult<String> {
    let mut sql = String::from("collection = ?1");
    for (field, value) in &filter.clauses {
        args.push(value.clone());
        sql.push_str(&format!(" AND {} = ?{}", json_path(field)?, args.len()));
    }
    Ok(sql)
}

/// `SELECT body ...` for a find. Returns the SQL and its positional arguments.
pub(crate) fn select_sql(
    collection: &str,
    filter: &Filter,
    options: &FindOptions,
) -> StoreResult<(String, Vec<String>)> {
    let mut args = vec![collection.to_string()];
    let mut sql = format!(
        "SELECT body FROM documents WHERE {}",
        where_clause(filter, &mut args)?
    );

    match &options.sort {
        Some((field, order)) => {
            let order = order.as_sql();
            sql.push_str(&format!(" ORDER BY {} {order}, seq {order}", json_path(field)?));
        }
        None => sql.push_str(" ORDER BY seq ASC"),
    }
    if let Some(limit) = options.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    Ok((sql, args))
}

/// `SELECT seq, body ...` for the earliest-inserted document matching `filter`.
pub(crate) fn first_match_sql(
    collection: &str,
    filter: &Filter,
) -> StoreResult<(String, Vec<String>)> {
    let mut args = vec![collection.to_string()];
    let sql = format!(
        "SELECT seq, body FROM documents WHERE {} ORDER BY seq ASC LIMIT 1",
        where_clause(filter, &mut args)?
    );
    Ok((sql, args))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_binds_values_as_parameters() {
        let filter = Filter::new().eq("user_id", "u1").eq("status", "pending");
        let options = FindOptions::new().sort("created_at", SortOrder::Desc).limit(100);
        let (sql, args) = select_sql("tasks", &filter, &options).unwrap();

        assert_eq!(
            sql,
            "SELECT body FROM documents WHERE collection = ?1 \
             AND json_extract(body, '$.user_id') = ?2 \
             AND json_extract(body, '$.status') = ?3 \
             ORDER BY json_extract(body, '$.created_at') DESC, seq DESC LIMIT 100"
        );
        assert_eq!(args, vec!["tasks", "u1", "pending"]);
    }

    #[test]
    fn unsafe_field_names_are_rejected() {
        let filter = Filter::new().eq("user_id') OR 1=1 --", "x");
        let err = select_sql("tasks", &filter, &FindOptions::default()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidField(_)));

        let options = FindOptions::new().sort("a.b", SortOrder::Asc);
        assert!(select_sql("tasks", &Filter::new(), &options).is_err());
    }

    #[test]
    fn eq_opt_skips_missing_and_empty_values() {
        let filter = Filter::new()
            .eq("user_id", "u1")
            .eq_opt("status", None)
            .eq_opt("category", Some(""));
        assert_eq!(filter.to_document().len(), 1);

        let filter = Filter::new().eq_opt("status", Some("pending"));
        assert_eq!(filter.to_document()["status"], "pending");
    }
}
