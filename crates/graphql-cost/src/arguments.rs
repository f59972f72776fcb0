use cynic_parser::{executable::FieldSelection, ConstValue, Value};
use indexmap::IndexMap;
use serde_json::{Map, Number, Value as JsonValue};

use crate::schema::FieldDefinition;

/// Variable values of a request, by variable name.
pub type Variables = Map<String, JsonValue>;

/// Argument values of a single field invocation, with variables bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArgumentValues {
    values: IndexMap<String, JsonValue>,
}

impl ArgumentValues {
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.values.get(name)
    }
}

/// Resolves the arguments of `field`.
///
/// Defaults declared in the schema come first and are overridden by whatever
/// the selection writes. Variables are looked up by name in `variables`; an
/// unbound variable keeps the declared default, if there is one. Fields unknown
/// to the schema still get the arguments written on the selection.
pub fn evaluate(
    field: FieldSelection<'_>,
    definition: Option<&FieldDefinition>,
    variables: Option<&Variables>,
) -> ArgumentValues {
    let mut values = IndexMap::new();

    if let Some(definition) = definition {
        values.extend(
            definition
                .default_values()
                .map(|(name, value)| (name.to_owned(), value.clone())),
        );
    }

    for argument in field.arguments() {
        let value = match argument.value() {
            Value::Variable(variable) => match variables.and_then(|variables| variables.get(variable.name())) {
                Some(value) => value.clone(),
                None => continue,
            },
            value => value_to_json(value, variables),
        };

        values.insert(argument.name().to_owned(), value);
    }

    ArgumentValues { values }
}

fn value_to_json(value: Value<'_>, variables: Option<&Variables>) -> JsonValue {
    match value {
        Value::Variable(variable) => variables
            .and_then(|variables| variables.get(variable.name()))
            .cloned()
            .unwrap_or(JsonValue::Null),
        Value::Int(int) => JsonValue::from(int.as_i64()),
        Value::Float(float) => float_to_json(float.as_f64()),
        Value::String(string) => JsonValue::from(string.as_str()),
        Value::Boolean(boolean) => JsonValue::Bool(boolean.value()),
        Value::Null(_) => JsonValue::Null,
        Value::Enum(value) => JsonValue::from(value.name()),
        Value::List(list) => JsonValue::Array(list.into_iter().map(|item| value_to_json(item, variables)).collect()),
        Value::Object(object) => JsonValue::Object(
            object
                .into_iter()
                .map(|field| (field.name().to_owned(), value_to_json(field.value(), variables)))
                .collect(),
        ),
    }
}

pub(crate) fn const_value_to_json(value: ConstValue<'_>) -> JsonValue {
    match value {
        ConstValue::Int(int) => JsonValue::from(int.as_i64()),
        ConstValue::Float(float) => float_to_json(float.as_f64()),
        ConstValue::String(string) => JsonValue::from(string.as_str()),
        ConstValue::Boolean(boolean) => JsonValue::Bool(boolean.value()),
        ConstValue::Null(_) => JsonValue::Null,
        ConstValue::Enum(value) => JsonValue::from(value.name()),
        ConstValue::List(list) => JsonValue::Array(list.items().map(const_value_to_json).collect()),
        ConstValue::Object(object) => JsonValue::Object(
            object
                .fields()
                .map(|field| (field.name().to_owned(), const_value_to_json(field.value())))
                .collect(),
        ),
    }
}

fn float_to_json(value: f64) -> JsonValue {
    Number::from_f64(value).map(JsonValue::Number).unwrap_or(JsonValue::Null)
}
