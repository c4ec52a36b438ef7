//! Source type definition for Tessera schemas.

use super::column::Column;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::types::DataType;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// A flat source type: the relational shape behind a feature type mapping.
#[derive(Clone, Debug)]
pub struct SourceType {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
}

impl SourceType {
    /// Returns the source type name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the primary key column names, in key order.
    #[inline]
    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Gets a column by name.
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Gets a column index by name.
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Returns the column index for `name`, or a column-not-found error.
    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.get_column_index(name)
            .ok_or_else(|| Error::column_not_found(&self.name, name))
    }

    /// Checks a row against this source's arity, column types and nullability.
    pub fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ArityMismatch {
                source_type: self.name.clone(),
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(row.values()) {
            match value.data_type() {
                None if !column.is_nullable() => {
                    return Err(Error::null_constraint(column.name()));
                }
                Some(got) if got != column.data_type() => {
                    return Err(Error::type_mismatch(column.data_type(), got));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Builder for creating source type definitions.
pub struct SourceTypeBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Vec<String>,
}

impl SourceTypeBuilder {
    /// Creates a new source type builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            columns: Vec::new(),
            primary_key: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    fn check_naming_rules(name: &str) -> Result<()> {
        let first = match name.chars().next() {
            Some(c) => c,
            None => return Err(Error::invalid_schema("Name cannot be empty")),
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(Error::invalid_schema(format!(
                "Name must start with letter or underscore: {}",
                name
            )));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_schema(format!(
                "Name contains invalid characters: {}",
                name
            )));
        }
        Ok(())
    }

    /// Adds a column to the source type.
    pub fn add_column(mut self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        if self.columns.iter().any(|c| c.name() == name) {
            return Err(Error::invalid_schema(format!(
                "Column already exists: {}",
                name
            )));
        }
        self.columns.push(Column::new(name, data_type));
        Ok(self)
    }

    /// Marks columns as nullable.
    pub fn add_nullable(mut self, columns: &[&str]) -> Self {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| c.name() == *name) {
                *col = col.clone().nullable(true);
            }
        }
        self
    }

    /// Sets the primary key.
    pub fn add_primary_key(mut self, columns: &[&str]) -> Result<Self> {
        for name in columns {
            match self.columns.iter().find(|c| c.name() == *name) {
                None => {
                    return Err(Error::invalid_schema(format!(
                        "Column not found: {}",
                        name
                    )))
                }
                Some(c) if !c.data_type().is_key_compatible() => {
                    return Err(Error::invalid_schema(format!(
                        "Column cannot be part of a key: {}",
                        name
                    )))
                }
                _ => {}
            }
        }
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        Ok(self)
    }

    /// Builds the source type definition.
    pub fn build(self) -> Result<SourceType> {
        if self.columns.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Source type has no columns: {}",
                self.name
            )));
        }
        let columns = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_index(i))
            .collect();
        Ok(SourceType {
            name: self.name,
            columns,
            primary_key: self.primary_key,
        })
    }
}
