use cynic_parser::{common::OperationType, type_system as ast};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::{arguments::const_value_to_json, CostError};

/// The parts of a schema the cost calculation needs: output fields of object
/// and interface types with their argument defaults, and the root types.
///
/// Type extensions are merged into the type they extend. Unions, scalars, enums
/// and input objects carry no selectable fields: only their names are kept.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    types: IndexMap<String, CompositeType>,
    other_types: IndexSet<String>,
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

#[derive(Debug, Clone)]
struct CompositeType {
    kind: TypeKind,
    fields: IndexMap<String, FieldDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Object,
    Interface,
}

/// An output field as declared in the schema.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    ty: String,
    arguments: IndexMap<String, Option<Value>>,
}

impl FieldDefinition {
    /// Name of the field's type, without list or non-null wrappers.
    pub fn ty(&self) -> &str {
        &self.ty
    }

    /// Arguments declaring a default value, with that value.
    pub fn default_values(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.arguments
            .iter()
            .filter_map(|(name, default)| Some((name.as_str(), default.as_ref()?)))
    }
}

impl Schema {
    pub fn parse(sdl: &str) -> Result<Self, CostError> {
        let document =
            cynic_parser::parse_type_system_document(sdl).map_err(|err| CostError::SchemaParse(err.to_string()))?;

        Ok(Self::from_document(&document))
    }

    pub fn from_document(document: &ast::TypeSystemDocument) -> Self {
        let mut schema = Schema::default();

        for definition in document.definitions() {
            match definition {
                ast::Definition::Schema(definition) | ast::Definition::SchemaExtension(definition) => {
                    if let Some(query) = definition.query_type() {
                        schema.query_type = Some(query.named_type().to_owned());
                    }

                    if let Some(mutation) = definition.mutation_type() {
                        schema.mutation_type = Some(mutation.named_type().to_owned());
                    }

                    if let Some(subscription) = definition.subscription_type() {
                        schema.subscription_type = Some(subscription.named_type().to_owned());
                    }
                }
                ast::Definition::Type(typedef) | ast::Definition::TypeExtension(typedef) => match &typedef {
                    ast::TypeDefinition::Object(object) => {
                        schema.ingest_fields(typedef.name(), TypeKind::Object, object.fields());
                    }
                    ast::TypeDefinition::Interface(interface) => {
                        schema.ingest_fields(typedef.name(), TypeKind::Interface, interface.fields());
                    }
                    _ => {
                        schema.other_types.insert(typedef.name().to_owned());
                    }
                },
                ast::Definition::Directive(_) => (),
            }
        }

        // Without an explicit schema definition the conventional names apply.
        for (operation_type, default_name) in [
            (OperationType::Query, "Query"),
            (OperationType::Mutation, "Mutation"),
            (OperationType::Subscription, "Subscription"),
        ] {
            let is_object = schema
                .types
                .get(default_name)
                .is_some_and(|ty| ty.kind == TypeKind::Object);

            let slot = schema.root_slot(operation_type);
            if slot.is_none() && is_object {
                *slot = Some(default_name.to_owned());
            }
        }

        schema
    }

    fn ingest_fields<'a>(
        &mut self,
        type_name: &str,
        kind: TypeKind,
        fields: impl Iterator<Item = ast::FieldDefinition<'a>>,
    ) {
        let ty = self
            .types
            .entry(type_name.to_owned())
            .or_insert_with(|| CompositeType {
                kind,
                fields: IndexMap::new(),
            });

        for field in fields {
            let arguments = field
                .arguments()
                .map(|argument| {
                    (
                        argument.name().to_owned(),
                        argument.default_value().map(const_value_to_json),
                    )
                })
                .collect();

            ty.fields.insert(
                field.name().to_owned(),
                FieldDefinition {
                    ty: field.ty().name().to_owned(),
                    arguments,
                },
            );
        }
    }

    fn root_slot(&mut self, operation_type: OperationType) -> &mut Option<String> {
        match operation_type {
            OperationType::Query => &mut self.query_type,
            OperationType::Mutation => &mut self.mutation_type,
            OperationType::Subscription => &mut self.subscription_type,
        }
    }

    /// Root type name for an operation kind, if the schema has one.
    pub fn root_type(&self, operation_type: OperationType) -> Option<&str> {
        match operation_type {
            OperationType::Query => self.query_type.as_deref(),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDefinition> {
        self.types.get(type_name)?.fields.get(field_name)
    }

    /// Whether a type of any kind is named `type_name`.
    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name) || self.other_types.contains(type_name)
    }
}

pub(crate) fn operation_kind(operation_type: OperationType) -> &'static str {
    match operation_type {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conventional_root_names() {
        let schema = Schema::parse("type Query { a: Int } type Mutation { b: Int }").unwrap();

        assert_eq!(schema.root_type(OperationType::Query), Some("Query"));
        assert_eq!(schema.root_type(OperationType::Mutation), Some("Mutation"));
        assert_eq!(schema.root_type(OperationType::Subscription), None);
    }

    #[test]
    fn explicit_schema_definition() {
        let schema = Schema::parse(
            r#"
            schema { query: RootQuery }
            type RootQuery { a: Int }
            type Query { b: Int }
            "#,
        )
        .unwrap();

        assert_eq!(schema.root_type(OperationType::Query), Some("RootQuery"));
    }

    #[test]
    fn extensions_are_merged() {
        let schema = Schema::parse(
            r#"
            type User { id: ID! }
            extend type User { deals(limit: Int = 10, after: String): [Deal!]! }
            interface Node { id: ID! }
            union Owner = User
            "#,
        )
        .unwrap();

        assert!(schema.has_type("Owner"));
        assert!(!schema.has_type("Deal"));
        assert!(schema.field("User", "id").is_some());
        assert!(schema.field("Node", "id").is_some());

        let deals = schema.field("User", "deals").unwrap();
        assert_eq!(deals.ty(), "Deal");
        assert_eq!(
            deals.default_values().collect::<Vec<_>>(),
            [("limit", &Value::from(10))]
        );
    }

    #[test]
    fn interface_named_query_is_not_a_root() {
        let schema = Schema::parse("interface Query { a: Int }").unwrap();

        assert!(schema.has_type("Query"));
        assert_eq!(schema.root_type(OperationType::Query), None);
    }

    #[test]
    fn invalid_sdl() {
        let error = Schema::parse("type Query {").unwrap_err();

        assert!(matches!(error, CostError::SchemaParse(_)), "{error:?}");
    }
}
