//! Mapping between records and table rows.

use chrono::{DateTime, NaiveDate, Utc};
use lictrack_store::Record;
use lictrack_types::{Licence, RecordId, User};
use rusqlite::types::{Type, Value};
use rusqlite::Row;
use std::error::Error as StdError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A record stored as one row of a SQLite table.
///
/// `COLUMNS` starts with the `id` column; [`SqlRecord::to_values`] and
/// [`SqlRecord::from_row`] use the same order.
pub trait SqlRecord: Record {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    fn to_values(&self) -> Vec<Value>;
}

impl SqlRecord for Licence {
    const TABLE: &'static str = "licences";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "software_name",
        "vendor",
        "version",
        "type",
        "seats",
        "purchase_date",
        "expiration_date",
        "initial_cost",
        "assigned_to",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Licence {
            id: RecordId::new(row.get::<_, String>(0)?),
            software_name: row.get(1)?,
            vendor: row.get(2)?,
            version: row.get(3)?,
            licence_type: parsed(row, 4, str::parse)?,
            seats: row.get(5)?,
            purchase_date: optional_date(row, 6)?,
            expiration_date: optional_date(row, 7)?,
            initial_cost: row.get(8)?,
            assigned_to: row.get(9)?,
            created_at: parsed(row, 10, parse_timestamp)?,
            updated_at: parsed(row, 11, parse_timestamp)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.software_name.clone()),
            Value::Text(self.vendor.clone()),
            Value::Text(self.version.clone()),
            Value::Text(self.licence_type.as_str().to_string()),
            Value::Integer(i64::from(self.seats)),
            date_value(self.purchase_date),
            date_value(self.expiration_date),
            Value::Real(self.initial_cost),
            self.assigned_to.clone().map_or(Value::Null, Value::Text),
            Value::Text(self.created_at.to_rfc3339()),
            Value::Text(self.updated_at.to_rfc3339()),
        ]
    }
}

impl SqlRecord for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "login",
        "password_hash",
        "role",
        "must_change_password",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: RecordId::new(row.get::<_, String>(0)?),
            login: row.get(1)?,
            password_hash: row.get(2)?,
            role: parsed(row, 3, str::parse)?,
            must_change_password: row.get(4)?,
            created_at: parsed(row, 5, parse_timestamp)?,
            updated_at: parsed(row, 6, parse_timestamp)?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.id.to_string()),
            Value::Text(self.login.clone()),
            Value::Text(self.password_hash.clone()),
            Value::Text(self.role.as_str().to_string()),
            Value::Integer(i64::from(self.must_change_password)),
            Value::Text(self.created_at.to_rfc3339()),
            Value::Text(self.updated_at.to_rfc3339()),
        ]
    }
}

fn date_value(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| Value::Text(d.format(DATE_FORMAT).to_string()))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

fn conversion_error<E: StdError + Send + Sync + 'static>(idx: usize, e: E) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

/// Reads a text column and parses it.
fn parsed<T, E>(row: &Row<'_>, idx: usize, parse: impl FnOnce(&str) -> Result<T, E>) -> rusqlite::Result<T>
where
    E: StdError + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    parse(&raw).map_err(|e| conversion_error(idx, e))
}

fn optional_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}
