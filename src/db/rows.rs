//! Mapping between SQLite rows and domain records.
//!
//! Every query in [`Database`](super::Database) selects columns in the order
//! documented on the mapping function it hands its rows to.

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef};
use rusqlite::Row;

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

macro_rules! sql_id {
    ($($name:ident),*) => {$(
        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.to_string()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    )*};
}

sql_id!(CarId, CustomerId, TransportationId);

/// A `car` row before its relations are resolved.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct CarRow {
    pub id: CarId,
    pub model: String,
}

impl CarRow {
    pub fn into_car(self, owners: Vec<CustomerId>, transportations: Vec<Transportation>) -> Car {
        Car {
            id: self.id,
            model: self.model,
            owners,
            transportations,
        }
    }
}

/// Columns: `id, model`.
pub(super) fn car_row(row: &Row<'_>) -> rusqlite::Result<CarRow> {
    Ok(CarRow {
        id: row.get(0)?,
        model: row.get(1)?,
    })
}

/// Columns: `id, name`.
pub(super) fn customer(row: &Row<'_>) -> rusqlite::Result<Customer> {
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Columns: `id, transportation_start, transportation_end, car_id, passenger_id`.
pub(super) fn transportation(row: &Row<'_>) -> rusqlite::Result<Transportation> {
    Ok(Transportation {
        id: row.get(0)?,
        transportation_start: date_column(row, 1)?,
        transportation_end: date_column(row, 2)?,
        car_id: row.get(3)?,
        passenger_id: row.get(4)?,
    })
}

pub(super) fn date_to_sql(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
