// mysite/src/db/listing.rs

//! Search and ordering clauses shared by the API list queries.

use sqlx::{QueryBuilder, Sqlite};

/// Splits a `search` value into terms on whitespace and commas.
pub fn search_terms(raw: &str) -> Vec<String> {
  raw
    .split(|c: char| c.is_whitespace() || c == ',')
    .filter(|t| !t.is_empty())
    .map(str::to_string)
    .collect()
}

/// `%term%` with LIKE wildcards in the term escaped by `\`.
pub fn contains_pattern(term: &str) -> String {
  let mut pattern = String::with_capacity(term.len() + 2);
  pattern.push('%');
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

/// Appends ` AND (col1 LIKE ? OR col2 LIKE ?)` per term. Every term has to
/// match at least one of `columns`. SQLite's LIKE ignores ASCII case.
pub fn push_search(qb: &mut QueryBuilder<'_, Sqlite>, raw: Option<&str>, columns: &[&str]) {
  let Some(raw) = raw else { return };
  for term in search_terms(raw) {
    let pattern = contains_pattern(&term);
    qb.push(" AND (");
    for (i, column) in columns.iter().enumerate() {
      if i > 0 {
        qb.push(" OR ");
      }
      qb.push(*column).push(" LIKE ").push_bind(pattern.clone()).push(" ESCAPE '\\'");
    }
    qb.push(")");
  }
}

/// Builds an `ORDER BY` body from a comma-separated `ordering` value.
///
/// `allowed` maps public field names to columns; unknown fields are ignored.
/// Falls back to `default` when nothing usable remains. `id` always closes
/// the list so results are stable.
pub fn order_by(raw: Option<&str>, allowed: &[(&str, &str)], default: &str) -> String {
  let mut parts: Vec<String> = Vec::new();
  for field in raw.unwrap_or_default().split(',').map(str::trim).filter(|f| !f.is_empty()) {
    let (name, direction) = match field.strip_prefix('-') {
      Some(name) => (name, "DESC"),
      None => (field, "ASC"),
    };
    if let Some((_, column)) = allowed.iter().find(|(public, _)| *public == name) {
      parts.push(format!("{} {}", column, direction));
    }
  }
  if parts.is_empty() {
    parts.push(default.to_string());
  }
  parts.push("id ASC".to_string());
  parts.join(", ")
}
