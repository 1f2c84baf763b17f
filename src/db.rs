//! SQLite persistence for search records.
//!
//! Tables and inserts are derived from each record's [`Record`] descriptor,
//! so a field added through [`record!`] shows up as a column without touching
//! any SQL here. Statements auto-commit one by one and nothing is
//! deduplicated: crawling twice stores every row twice.

use std::path::Path;
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::data::{Restaurant, Review};
use crate::error::{ApiError, Result};

/// A single bound column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Integer(i64),
    Text(&'a str),
}

impl From<&i64> for Value<'_> {
    fn from(value: &i64) -> Self {
        Value::Integer(*value)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Value::Text(value)
    }
}

/// A field type a record can hold, read from element text.
pub trait Field: Sized {
    fn from_text(text: &str) -> Option<Self>;
}

impl Field for String {
    fn from_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }
}

/// Surrounding whitespace is ignored and empty text reads as 0.
impl Field for i64 {
    fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Some(0);
        }
        text.parse().ok()
    }
}

/// Schema descriptor of a record kind.
///
/// `FIELDS`, `values()` and `set()` must line up one to one; [`record!`]
/// generates all three from the same field list.
pub trait Record: Default {
    /// Table the record is saved into.
    const TABLE: &'static str;
    /// Column names, in declaration order.
    const FIELDS: &'static [&'static str];

    fn values(&self) -> Vec<Value<'_>>;

    /// Fill the field stored in `column` from element text. Unknown columns
    /// are ignored.
    fn set(&mut self, column: &str, text: &str) -> Result<(), ApiError>;
}

/// Declare a record struct together with its [`Record`] descriptor.
///
/// Each field is written as `name: Type => "Column"`, where the column name is
/// both the XML element the value is read from and the table column it is
/// stored in. Field types implement [`Field`].
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty => $column:literal
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::db::Record for $name {
            const TABLE: &'static str = $table;
            const FIELDS: &'static [&'static str] = &[$($column),*];

            fn values(&self) -> Vec<$crate::db::Value<'_>> {
                vec![$($crate::db::Value::from(&self.$field)),*]
            }

            fn set(
                &mut self,
                column: &str,
                text: &str,
            ) -> ::core::result::Result<(), $crate::error::ApiError> {
                match column {
                    $(
                        $column => {
                            self.$field = <$ty as $crate::db::Field>::from_text(text).ok_or_else(|| {
                                $crate::error::ApiError::InvalidValue {
                                    element: column.to_string(),
                                    value: text.to_string(),
                                }
                            })?;
                        }
                    )*
                    _ => {}
                }
                Ok(())
            }
        }
    };
}

pub(crate) use record;

pub fn create_table_sql(table: &str, fields: &[&str]) -> String {
    format!("CREATE TABLE IF NOT EXISTS {table}({})", fields.join(","))
}

pub fn insert_sql(table: &str, fields: &[&str]) -> String {
    format!(
        "INSERT INTO {table}({}) values({})",
        fields.join(","),
        vec!["?"; fields.len()].join(",")
    )
}

/// Handle on the crawl database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if needed) the database file at `path`.
    pub async fn connect(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(Self { pool })
    }

    /// Private in-memory database, gone once the store is dropped.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // one connection, otherwise every pooled connection sees its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the tables of every record kind the crawler saves.
    pub async fn init(&self) -> Result<()> {
        self.ensure_table::<Restaurant>().await?;
        self.ensure_table::<Review>().await?;
        Ok(())
    }

    pub async fn ensure_table<R: Record>(&self) -> Result<()> {
        let sql = create_table_sql(R::TABLE, R::FIELDS);
        sqlx::query(&sql).execute(&self.pool).await.map_err(|err| {
            tracing::error!(%sql, "fail to create table");
            err
        })?;
        Ok(())
    }

    /// Insert `record` into `table`, binding every field positionally.
    pub async fn insert<R: Record>(&self, table: &str, record: &R) -> Result<()> {
        let sql = insert_sql(table, R::FIELDS);
        let mut query = sqlx::query(&sql);
        for value in record.values() {
            query = match value {
                Value::Integer(v) => query.bind(v),
                Value::Text(v) => query.bind(v),
            };
        }

        query.execute(&self.pool).await.map_err(|err| {
            tracing::error!(%sql, "fail to insert record");
            err
        })?;
        Ok(())
    }

    /// Ensure the record's own table exists, then insert into it.
    pub async fn save<R: Record>(&self, record: &R) -> Result<()> {
        self.ensure_table::<R>().await?;
        self.insert(R::TABLE, record).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
