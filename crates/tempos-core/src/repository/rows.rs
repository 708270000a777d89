use crate::models::QueryRow;
use serde_json::{Number, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// Converts a row of unknown shape into column-name → JSON value, keeping
/// the select order. SQLite is dynamically typed, so the storage class of
/// each value decides the JSON type, not the declared column type.
pub fn row_to_map(row: &SqliteRow) -> Result<QueryRow, sqlx::Error> {
    let mut map = QueryRow::with_capacity(row.columns().len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" | "NUMERIC" => Number::from_f64(row.try_get_unchecked::<f64, _>(index)?)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                "BLOB" => {
                    let bytes: Vec<u8> = row.try_get_unchecked(index)?;
                    Value::String(String::from_utf8_lossy(&bytes).into_owned())
                }
                _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
            }
        };

        map.insert(column.name().to_string(), value);
    }

    Ok(map)
}
