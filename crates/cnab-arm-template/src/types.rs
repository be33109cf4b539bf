//! Schema type → template parameter type mapping.
//!
//! | schema type | sensitive | parameter type |
//! |-------------|-----------|----------------|
//! | boolean     | -         | `bool`         |
//! | integer     | -         | `int`          |
//! | string      | no        | `string`       |
//! | string      | yes       | `securestring` |
//! | object      | -         | `object`       |
//! | array       | -         | `array`        |
//!
//! Templates have no exclusive bounds, so `exclusiveMinimum`/
//! `exclusiveMaximum` are normalized to the nearest inclusive integer.

use cnab_arm_core::{Definition, SchemaType};

use crate::CompileError;
use crate::template::{Parameter, ParameterType};

pub fn map_type(schema_type: SchemaType, sensitive: bool) -> ParameterType {
    match schema_type {
        SchemaType::Boolean => ParameterType::Bool,
        SchemaType::Integer => ParameterType::Int,
        SchemaType::String if sensitive => ParameterType::SecureString,
        SchemaType::String => ParameterType::String,
        SchemaType::Object => ParameterType::Object,
        SchemaType::Array => ParameterType::Array,
    }
}

/// Build the template parameter declared for a bundle parameter.
///
/// `description` overrides the definition's own description when present.
pub fn map_definition(
    key: &str,
    definition: &Definition,
    required: bool,
    description: Option<&str>,
) -> Result<Parameter, CompileError> {
    let mut parameter = Parameter::new(map_type(definition.schema_type, definition.write_only));

    parameter.allowed_values = definition.allowed_values.clone();

    parameter.default_value = match &definition.default {
        Some(value) => Some(value.clone()),
        None if !required => Some("".into()),
        None => None,
    };

    if let Some(description) = description
        .or(definition.description.as_deref())
        .filter(|d| !d.is_empty())
    {
        parameter = parameter.with_description(description);
    }

    parameter.min_value = match definition.exclusive_minimum {
        Some(bound) => Some(bound.checked_add(1).ok_or_else(|| CompileError::BoundOverflow {
            key: key.to_owned(),
            bound: "exclusiveMinimum",
        })?),
        None => definition.minimum,
    };
    parameter.max_value = match definition.exclusive_maximum {
        Some(bound) => Some(bound.checked_sub(1).ok_or_else(|| CompileError::BoundOverflow {
            key: key.to_owned(),
            bound: "exclusiveMaximum",
        })?),
        None => definition.maximum,
    };

    parameter.min_length = definition.min_length;
    parameter.max_length = definition.max_length;

    Ok(parameter)
}
