//! Features built from matched rows.

use crate::error::Result;
use crate::mapping::{AttributeMapping, FeatureTypeMapping};
use tessera_core::{Row, Value};
use tessera_query::{RowLayout, RowRef};

/// A feature assembled from one or more consecutive rows.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    id: String,
    type_name: String,
    attributes: Vec<(String, Vec<Value>)>,
}

impl Feature {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns every attribute with its distinct values, in mapping order.
    #[inline]
    pub fn attributes(&self) -> &[(String, Vec<Value>)] {
        &self.attributes
    }

    /// Returns the values of an attribute.
    pub fn values(&self, path: &str) -> Option<&[Value]> {
        self.attributes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, v)| v.as_slice())
    }

    /// Returns the first value of an attribute.
    pub fn value(&self, path: &str) -> Option<&Value> {
        self.values(path).and_then(|v| v.first())
    }
}

/// Groups rows into features.
///
/// Consecutive rows with the same feature id are merged; their attribute
/// values are collected without duplicates. Only attributes whose source
/// columns are all present in the layout are populated.
pub struct FeatureAssembler<'a> {
    mapping: &'a FeatureTypeMapping,
    layout: &'a RowLayout,
    attributes: Vec<&'a AttributeMapping>,
}

impl<'a> FeatureAssembler<'a> {
    pub fn new(mapping: &'a FeatureTypeMapping, layout: &'a RowLayout) -> Self {
        let attributes = mapping
            .attributes()
            .iter()
            .filter(|a| {
                a.source()
                    .attribute_names()
                    .iter()
                    .all(|name| layout.position(name).is_some())
            })
            .collect();
        Self {
            mapping,
            layout,
            attributes,
        }
    }

    /// Builds features from rows already grouped by feature id.
    pub fn assemble(&self, rows: &[Row]) -> Result<Vec<Feature>> {
        let mut features: Vec<Feature> = Vec::new();
        for row in rows {
            let view = RowRef::new(self.layout, row);
            let id = self.mapping.feature_id(view)?;
            let same = features.last().is_some_and(|f| f.id == id);
            if !same {
                features.push(Feature {
                    id,
                    type_name: self.mapping.name().to_string(),
                    attributes: self
                        .attributes
                        .iter()
                        .map(|a| (a.target_path().to_string(), Vec::new()))
                        .collect(),
                });
            }
            let Some(feature) = features.last_mut() else {
                continue;
            };
            for (slot, attribute) in feature.attributes.iter_mut().zip(&self.attributes) {
                let value = attribute.source().eval(view)?;
                if !value.is_null() && !slot.1.contains(&value) {
                    slot.1.push(value);
                }
            }
        }
        Ok(features)
    }
}
