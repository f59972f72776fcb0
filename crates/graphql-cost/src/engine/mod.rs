mod field_cost;
mod visitor;

use cynic_parser::{ExecutableDocument, TypeSystemDocument};

use crate::{arguments::Variables, CostError, CostMap, Schema};

use self::visitor::CostVisitor;

/// Penalty base for self-referencing selections, unless a field overrides it.
pub const DEFAULT_RECURSION_MULTIPLIER: f64 = 100.0;

/// Field names that never count as a repeat in recursion detection.
pub const PAGINATION_WRAPPERS: [&str; 2] = ["node", "edges"];

/// An operation document, as text or already parsed.
#[derive(Clone, Copy)]
pub enum QuerySource<'a> {
    Text(&'a str),
    Document(&'a ExecutableDocument),
}

impl<'a> From<&'a str> for QuerySource<'a> {
    fn from(text: &'a str) -> Self {
        QuerySource::Text(text)
    }
}

impl<'a> From<&'a String> for QuerySource<'a> {
    fn from(text: &'a String) -> Self {
        QuerySource::Text(text)
    }
}

impl<'a> From<&'a ExecutableDocument> for QuerySource<'a> {
    fn from(document: &'a ExecutableDocument) -> Self {
        QuerySource::Document(document)
    }
}

/// A schema, as SDL text, a parsed document or an already built [`Schema`].
#[derive(Clone, Copy)]
pub enum SchemaSource<'a> {
    Text(&'a str),
    Document(&'a TypeSystemDocument),
    Schema(&'a Schema),
}

impl<'a> From<&'a str> for SchemaSource<'a> {
    fn from(text: &'a str) -> Self {
        SchemaSource::Text(text)
    }
}

impl<'a> From<&'a String> for SchemaSource<'a> {
    fn from(text: &'a String) -> Self {
        SchemaSource::Text(text)
    }
}

impl<'a> From<&'a TypeSystemDocument> for SchemaSource<'a> {
    fn from(document: &'a TypeSystemDocument) -> Self {
        SchemaSource::Document(document)
    }
}

impl<'a> From<&'a Schema> for SchemaSource<'a> {
    fn from(schema: &'a Schema) -> Self {
        SchemaSource::Schema(schema)
    }
}

/// Inputs of a calculation besides the query and the schema.
#[derive(Debug, Clone, Copy)]
pub struct CostOptions<'a> {
    /// Without a cost map every field costs `default_cost`.
    pub cost_map: Option<&'a CostMap>,
    pub default_cost: f64,
    pub variables: Option<&'a Variables>,
    /// Restricts the calculation to one operation of the document.
    pub operation_name: Option<&'a str>,
}

impl Default for CostOptions<'_> {
    fn default() -> Self {
        Self {
            cost_map: None,
            default_cost: 1.0,
            variables: None,
            operation_name: None,
        }
    }
}

impl<'a> CostOptions<'a> {
    #[must_use]
    pub fn with_cost_map(mut self, cost_map: &'a CostMap) -> Self {
        self.cost_map = Some(cost_map);
        self
    }

    #[must_use]
    pub fn with_default_cost(mut self, default_cost: f64) -> Self {
        self.default_cost = default_cost;
        self
    }

    #[must_use]
    pub fn with_variables(mut self, variables: &'a Variables) -> Self {
        self.variables = Some(variables);
        self
    }

    #[must_use]
    pub fn with_operation_name(mut self, operation_name: &'a str) -> Self {
        self.operation_name = Some(operation_name);
        self
    }
}

/// Computes the cost of `query` against `schema`.
///
/// Every operation of the document is costed and the costs are summed, unless
/// [`CostOptions::operation_name`] selects a single one. The calculation has no
/// side effects: the same inputs always give the same cost, and a parsed
/// document can be shared by concurrent calculations.
pub fn calculate_cost<'q, 's>(
    query: impl Into<QuerySource<'q>>,
    schema: impl Into<SchemaSource<'s>>,
    options: &CostOptions<'_>,
) -> Result<f64, CostError> {
    let built_schema;
    let schema = match schema.into() {
        SchemaSource::Text(sdl) => {
            built_schema = Schema::parse(sdl)?;
            &built_schema
        }
        SchemaSource::Document(document) => {
            built_schema = Schema::from_document(document);
            &built_schema
        }
        SchemaSource::Schema(schema) => schema,
    };

    let parsed_query;
    let document = match query.into() {
        QuerySource::Text(text) => {
            parsed_query =
                cynic_parser::parse_executable_document(text).map_err(|err| CostError::QueryParse(err.to_string()))?;
            &parsed_query
        }
        QuerySource::Document(document) => document,
    };

    CostVisitor::new(schema, options).document_cost(document)
}
