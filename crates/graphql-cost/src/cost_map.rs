use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Cost metadata attached to one field of one type.
///
/// Every setting is optional: a missing value falls back to the defaults of the
/// calculation when the field is costed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CostSpec {
    /// Base cost of resolving one instance of the field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<f64>,
    /// Flat resource cost, multiplied only by the parent's multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<f64>,
    /// Arguments (or literal numbers) summed into the field's own multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multipliers: Option<Vec<Multiplier>>,
    /// Whether the inherited parent multiplier applies to this field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_multipliers: Option<bool>,
    /// Child fields the resolver answers without extra work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provides: Option<Vec<String>>,
    /// Base of the exponential penalty for self-referencing selections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recursion_multiplier: Option<f64>,
}

/// One entry of [`CostSpec::multipliers`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Multiplier {
    /// Name of a field argument whose value (or list length) is used.
    Argument(String),
    Literal(f64),
}

impl From<&str> for Multiplier {
    fn from(name: &str) -> Self {
        Multiplier::Argument(name.to_owned())
    }
}

impl From<f64> for Multiplier {
    fn from(value: f64) -> Self {
        Multiplier::Literal(value)
    }
}

/// The cost table of a schema: type name, then field name, to [`CostSpec`].
///
/// Built once per schema and only read afterwards, so a single instance can be
/// shared by any number of concurrent calculations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostMap {
    types: IndexMap<String, IndexMap<String, CostSpec>>,
}

impl CostMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cost of `type_name.field_name`, returning the previous one.
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        spec: CostSpec,
    ) -> Option<CostSpec> {
        self.types
            .entry(type_name.into())
            .or_default()
            .insert(field_name.into(), spec)
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&CostSpec> {
        self.types.get(type_name)?.get(field_name)
    }

    /// Number of fields with a cost entry.
    pub fn len(&self) -> usize {
        self.types.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over `(type name, field name, cost)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &CostSpec)> + '_ {
        self.types.iter().flat_map(|(type_name, fields)| {
            fields
                .iter()
                .map(move |(field_name, spec)| (type_name.as_str(), field_name.as_str(), spec))
        })
    }
}
