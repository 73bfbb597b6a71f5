//! Tabular results.
//!
//! Every operation returns a [`Table`]: an ordered list of loosely typed
//! records exactly as the API sent them. No schema is applied; callers that
//! want structs can use [`Table::deserialize_rows`].

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::error::{Result, VeracrossError};

/// One row: field name to JSON value, in the order the server sent them.
pub type Record = serde_json::Map<String, Value>;

/// An ordered collection of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Record>,
}

impl Table {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_rows(rows: Vec<Record>) -> Self {
        Self { rows }
    }

    /// Build a table from the `data` value of a response envelope.
    ///
    /// An array becomes one row per element, a single object becomes one row,
    /// and `null` becomes an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the value (or an array element) is not an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(record) => Ok(Self::from_rows(vec![record])),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(record) => Ok(record),
                    other => Err(VeracrossError::UnexpectedResponse(format!(
                        "expected an object row, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::from_rows),
            other => Err(VeracrossError::UnexpectedResponse(format!(
                "expected an array or object, got {other}"
            ))),
        }
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.rows.iter()
    }

    pub fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    /// Column names across all rows, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for key in self.rows.iter().flat_map(|row| row.keys()) {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
        columns
    }

    /// Values of one column, `None` where a row lacks the field.
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Option<&'a Value>> + 'a {
        self.rows.iter().map(move |row| row.get(name))
    }

    /// Deserialize every row into `T`.
    ///
    /// # Errors
    ///
    /// Returns an error if any row does not match `T`.
    pub fn deserialize_rows<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.rows
            .iter()
            .map(|row| Ok(serde_json::from_value(Value::Object(row.clone()))?))
            .collect()
    }

    /// Expand object-valued columns one level deep.
    ///
    /// For each row, every named column holding an object is replaced by
    /// `<column>_<key>` fields appended after the remaining fields. Null
    /// values are dropped with their column; other scalars are left alone.
    /// Nested objects inside the expanded values are not expanded further.
    ///
    /// ```
    /// use veracross::Table;
    /// use serde_json::json;
    ///
    /// let table = Table::from_value(json!([{"a": {"x": 1, "y": 2}, "b": 5}])).unwrap();
    /// let flat = table.flatten(&["a"]);
    /// assert_eq!(
    ///     flat,
    ///     Table::from_value(json!([{"b": 5, "a_x": 1, "a_y": 2}])).unwrap()
    /// );
    /// ```
    #[must_use]
    pub fn flatten(self, columns: &[&str]) -> Table {
        self.rows
            .into_iter()
            .map(|row| flatten_record(row, columns))
            .collect()
    }
}

fn flatten_record(record: Record, columns: &[&str]) -> Record {
    let mut flat = Record::new();
    let mut nested = Vec::new();

    for (key, value) in record {
        match columns.iter().position(|c| *c == key) {
            Some(order) => match value {
                Value::Object(inner) => nested.push((order, key, inner)),
                Value::Null => {}
                scalar => {
                    flat.insert(key, scalar);
                }
            },
            None => {
                flat.insert(key, value);
            }
        }
    }

    nested.sort_by_key(|(order, _, _)| *order);
    for (_, column, inner) in nested {
        for (key, value) in inner {
            flat.insert(format!("{column}_{key}"), value);
        }
    }
    flat
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns = self.columns();
        let mut builder = Builder::default();
        builder.push_record(columns.iter().map(|c| c.to_string()));
        for row in &self.rows {
            builder.push_record(columns.iter().map(|c| cell(row.get(*c))));
        }
        let mut grid = builder.build();
        grid.with(Style::modern());
        write!(f, "{grid}")
    }
}

impl From<Vec<Record>> for Table {
    fn from(rows: Vec<Record>) -> Self {
        Self::from_rows(rows)
    }
}

impl FromIterator<Record> for Table {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::from_rows(iter.into_iter().collect())
    }
}

impl Extend<Record> for Table {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.rows.extend(iter);
    }
}

impl IntoIterator for Table {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn table(value: Value) -> Table {
        Table::from_value(value).unwrap()
    }

    #[test]
    fn test_flatten_one_level() {
        let flat = table(json!([{"a": {"x": 1, "y": 2}, "b": 5}])).flatten(&["a"]);
        assert_eq!(flat, table(json!([{"b": 5, "a_x": 1, "a_y": 2}])));
        assert_eq!(flat.columns(), vec!["b", "a_x", "a_y"]);
    }

    #[test]
    fn test_flatten_does_not_recurse() {
        let flat = table(json!([{"a": {"x": {"deep": true}}}])).flatten(&["a"]);
        assert_eq!(flat.rows()[0]["a_x"], json!({"deep": true}));
    }

    #[test]
    fn test_flatten_null_and_missing_columns() {
        let flat = table(json!([
            {"id": 1, "home": null},
            {"id": 2},
            {"id": 3, "home": {"city": "Boston"}}
        ]))
        .flatten(&["home"]);

        assert_eq!(flat.rows()[0], json!({"id": 1}).as_object().unwrap().clone());
        assert_eq!(flat.rows()[1], json!({"id": 2}).as_object().unwrap().clone());
        assert_eq!(flat.rows()[2]["home_city"], "Boston");
        assert!(flat.rows()[2].get("home").is_none());
    }

    #[test]
    fn test_flatten_multiple_columns_keep_list_order() {
        let flat = table(json!([{"b": {"k": 2}, "a": {"k": 1}, "id": 9}])).flatten(&["a", "b"]);
        assert_eq!(flat.columns(), vec!["id", "a_k", "b_k"]);
    }

    #[test]
    fn test_flatten_keeps_scalar_in_named_column() {
        let flat = table(json!([{"a": 7}])).flatten(&["a"]);
        assert_eq!(flat.rows()[0]["a"], 7);
    }

    #[test]
    fn test_from_value_shapes() {
        assert!(table(Value::Null).is_empty());
        assert_eq!(table(json!({"id": 1})).len(), 1);
        assert_eq!(table(json!([{"id": 1}, {"id": 2}])).len(), 2);
        assert!(Table::from_value(json!([1, 2])).is_err());
        assert!(Table::from_value(json!("nope")).is_err());
    }

    #[test]
    fn test_columns_first_seen_order() {
        let t = table(json!([{"id": 1, "name": "A"}, {"id": 2, "grade": 9}]));
        assert_eq!(t.columns(), vec!["id", "name", "grade"]);
        let grades: Vec<_> = t.column("grade").collect();
        assert_eq!(grades, vec![None, Some(&json!(9))]);
    }

    #[test]
    fn test_deserialize_rows() {
        #[derive(Deserialize)]
        struct Student {
            id: u64,
            first_name: String,
        }

        let t = table(json!([{"id": 4, "first_name": "Ada", "extra": true}]));
        let students: Vec<Student> = t.deserialize_rows().unwrap();
        assert_eq!(students[0].id, 4);
        assert_eq!(students[0].first_name, "Ada");
    }

    #[test]
    fn test_display_renders_grid() {
        let t = table(json!([{"id": 1, "name": "Ada"}, {"id": 2, "name": null}]));
        let rendered = t.to_string();
        assert!(rendered.contains("name"));
        assert!(rendered.contains("Ada"));
        assert!(!rendered.contains("\"Ada\""));
        assert!(!rendered.contains("null"));
    }
}
