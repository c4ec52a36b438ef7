//! Feature type mappings.
//!
//! A [`FeatureTypeMapping`] describes how the flat rows of one source type
//! become features: which expression yields the feature identifier, and
//! which expression feeds each target attribute. A
//! [`NestedAttributeMapping`] links a parent mapping to the rows of another
//! mapping through a join key.

use crate::error::{Error, Result};
use hashbrown::HashMap;
use tessera_core::Value;
use tessera_query::{primary_key_column, Expr, Query, QueryExecutor, RowRef};

/// Maps one source expression onto a target attribute path.
#[derive(Clone, Debug, PartialEq)]
pub struct AttributeMapping {
    target_path: String,
    source: Expr,
    mandatory: bool,
}

impl AttributeMapping {
    pub fn new(target_path: impl Into<String>, source: Expr) -> Self {
        Self {
            target_path: target_path.into(),
            source,
            mandatory: false,
        }
    }

    /// Marks the attribute as mandatory.
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    #[inline]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    #[inline]
    pub fn source(&self) -> &Expr {
        &self.source
    }

    #[inline]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }
}

/// An attribute whose values are features of another mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct NestedAttributeMapping {
    target_path: String,
    source: Expr,
    nested_type: Expr,
    nested_target_path: String,
    same_source: bool,
}

impl NestedAttributeMapping {
    /// Links `target_path` to the features of `nested_type`.
    ///
    /// `source` is the join key on the parent rows; `nested_target_path`
    /// names the attribute of the nested mapping holding the matching key.
    pub fn new(
        target_path: impl Into<String>,
        source: Expr,
        nested_type: impl Into<String>,
        nested_target_path: impl Into<String>,
    ) -> Self {
        Self::polymorphic(
            target_path,
            source,
            Expr::literal(nested_type.into()),
            nested_target_path,
        )
    }

    /// Links `target_path` to a nested type chosen per parent row.
    pub fn polymorphic(
        target_path: impl Into<String>,
        source: Expr,
        nested_type: Expr,
        nested_target_path: impl Into<String>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            source,
            nested_type,
            nested_target_path: nested_target_path.into(),
            same_source: false,
        }
    }

    /// Marks the nested features as read from the parent's own rows.
    pub fn same_source(mut self) -> Self {
        self.same_source = true;
        self
    }

    #[inline]
    pub fn target_path(&self) -> &str {
        &self.target_path
    }

    #[inline]
    pub fn source(&self) -> &Expr {
        &self.source
    }

    #[inline]
    pub fn nested_type(&self) -> &Expr {
        &self.nested_type
    }

    #[inline]
    pub fn nested_target_path(&self) -> &str {
        &self.nested_target_path
    }

    #[inline]
    pub fn is_same_source(&self) -> bool {
        self.same_source
    }

    /// Resolves the nested type name. Literal types need no parent row.
    pub fn resolve_nested_type(&self, parent: Option<RowRef<'_>>) -> Result<String> {
        let value = match (&self.nested_type, parent) {
            (Expr::Literal(value), _) => Some(value.clone()),
            (expr, Some(row)) => expr.eval(row).ok(),
            (_, None) => None,
        };
        value
            .filter(|v| !v.is_null())
            .map(|v| v.canonical_text())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| Error::UnresolvedNestedType(self.target_path.clone()))
    }
}

/// Describes how rows of a source type become features.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureTypeMapping {
    name: String,
    source_type: String,
    id_expression: Expr,
    attributes: Vec<AttributeMapping>,
    nested: Vec<NestedAttributeMapping>,
}

impl FeatureTypeMapping {
    /// Creates a mapping with no identifier expression. Features are then
    /// identified by the source's primary key.
    pub fn new(name: impl Into<String>, source_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source_type: source_type.into(),
            id_expression: Expr::Nil,
            attributes: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn with_id(mut self, id_expression: Expr) -> Self {
        self.id_expression = id_expression;
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeMapping) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_nested(mut self, nested: NestedAttributeMapping) -> Self {
        self.nested.push(nested);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    #[inline]
    pub fn id_expression(&self) -> &Expr {
        &self.id_expression
    }

    #[inline]
    pub fn attributes(&self) -> &[AttributeMapping] {
        &self.attributes
    }

    #[inline]
    pub fn nested_attributes(&self) -> &[NestedAttributeMapping] {
        &self.nested
    }

    /// Returns the attribute mapping at a target path.
    pub fn attribute(&self, path: &str) -> Option<&AttributeMapping> {
        self.attributes.iter().find(|a| a.target_path == path)
    }

    /// Returns the nested attribute mapping at a target path.
    pub fn nested_attribute(&self, path: &str) -> Option<&NestedAttributeMapping> {
        self.nested.iter().find(|a| a.target_path == path)
    }

    /// Returns true if features carry an identifier expression of their own.
    #[inline]
    pub fn has_id_column(&self) -> bool {
        !self.id_expression.is_nil()
    }

    /// Identifier columns: the attributes of the identifier expression, or
    /// the source's primary key when the expression is unset.
    pub fn id_columns(&self, executor: &dyn QueryExecutor) -> Result<Vec<String>> {
        if self.has_id_column() {
            Ok(self.id_expression.attribute_names())
        } else {
            Ok(executor.primary_key(&self.source_type)?)
        }
    }

    /// Identifier values of a row, in the order nested cursors label them:
    /// the row's own identifier columns followed by its foreign-id columns.
    pub fn id_values(&self, row: RowRef<'_>) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        if self.has_id_column() {
            for column in self.id_expression.attribute_names() {
                values.push(self.read(row, &column)?);
            }
        } else {
            for (position, _) in row.layout().primary_key_columns() {
                values.push(row.row().get(position).cloned().unwrap_or(Value::Null));
            }
        }
        for (position, _) in row.layout().foreign_id_columns() {
            values.push(row.row().get(position).cloned().unwrap_or(Value::Null));
        }
        Ok(values)
    }

    /// Feature identifier of a row: the identifier expression's text, or
    /// `<name>.<pk>[.<pk>...]` when features are keyed by primary key.
    pub fn feature_id(&self, row: RowRef<'_>) -> Result<String> {
        if self.has_id_column() {
            return Ok(self.id_expression.eval(row)?.canonical_text());
        }
        let mut id = self.name.clone();
        let mut keyed = false;
        for (position, _) in row.layout().primary_key_columns() {
            keyed = true;
            id.push('.');
            if let Some(value) = row.row().get(position) {
                id.push_str(&value.canonical_text());
            }
        }
        if !keyed {
            id.push('.');
            id.push_str(&row.row().id().to_string());
        }
        Ok(id)
    }

    /// Translates selected target paths into the source columns to project.
    /// `None` selects every column. Identifier columns are always included.
    pub fn source_columns(
        &self,
        properties: Option<&[String]>,
        include_mandatory: bool,
    ) -> Result<Option<Vec<String>>> {
        let Some(paths) = properties else {
            return Ok(None);
        };
        let mut columns = self.id_expression.attribute_names();
        let mut push = |expr: &Expr| {
            for name in expr.attribute_names() {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        };
        for path in paths {
            let attribute = self
                .attribute(path)
                .ok_or_else(|| Error::unknown_attribute(&self.name, path.as_str()))?;
            push(&attribute.source);
        }
        if include_mandatory {
            for attribute in self.attributes.iter().filter(|a| a.mandatory) {
                push(&attribute.source);
            }
        }
        Ok(Some(columns))
    }

    /// The query reading every row of this mapping's source.
    pub fn base_query(&self) -> Query {
        Query::new(self.source_type.clone()).with_id_column(self.has_id_column())
    }

    fn read(&self, row: RowRef<'_>, column: &str) -> Result<Value> {
        row.get(column)
            .cloned()
            .ok_or_else(|| Error::missing_column(&self.name, column))
    }
}

/// Feature type mappings by name.
#[derive(Clone, Debug, Default)]
pub struct MappingRegistry {
    mappings: HashMap<String, FeatureTypeMapping>,
}

impl MappingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mapping, replacing any mapping of the same name.
    pub fn register(&mut self, mapping: FeatureTypeMapping) {
        self.mappings.insert(mapping.name.clone(), mapping);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, mapping: FeatureTypeMapping) -> Self {
        self.register(mapping);
        self
    }

    /// Returns a mapping by name.
    pub fn mapping(&self, name: &str) -> Result<&FeatureTypeMapping> {
        self.mappings
            .get(name)
            .ok_or_else(|| Error::MissingMapping(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}
