use itertools::Itertools as _;

/// Reasons a cost calculation or an extraction can fail.
///
/// None of these degrade into a cost value: a document that cannot be costed
/// must not be admitted with a low estimate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CostError {
    #[error("could not parse the query: {0}")]
    QueryParse(String),
    #[error("could not parse the schema: {0}")]
    SchemaParse(String),
    /// The schema has no root type for the kind of operation being costed.
    #[error("Unsupported operation: the schema has no root type for {operation} operations")]
    UnsupportedOperation { operation: &'static str },
    #[error("Unknown operation named '{0}'")]
    UnknownOperation(String),
    #[error("Unknown fragment named '{name}'")]
    UnknownFragment { name: String },
    #[error("Fragment cycle detected: {}", .cycle.iter().join(", "))]
    FragmentCycle { cycle: Vec<String> },
}
