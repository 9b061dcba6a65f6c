//! Schema validation.
//!
//! Catches authoring errors before any code is generated. A schema that
//! fails validation must stop the generator; emitting bindings for an
//! inconsistent schema is never acceptable.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::model::{ChildType, EntityDef, Schema};

/// Validates a schema for internal consistency.
///
/// # Errors
/// Returns the first [`SchemaError`] found.
pub fn validate_schema(schema: &Schema) -> Result<(), SchemaError> {
    validate_entity_names(schema)?;
    for entity in &schema.entities {
        validate_members(entity)?;
        validate_children(schema, entity)?;
        validate_base(schema, entity)?;
    }
    validate_inheritance_acyclic(schema)?;
    Ok(())
}

fn validate_entity_names(schema: &Schema) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for entity in &schema.entities {
        if entity.name == "Table" || entity.name == "Matrix" {
            return Err(SchemaError::duplicate("built-in class", &entity.name));
        }
        if !seen.insert(&entity.name) {
            return Err(SchemaError::duplicate("entity", &entity.name));
        }
    }
    Ok(())
}

fn validate_members(entity: &EntityDef) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for attr in &entity.attributes {
        if !seen.insert(&attr.name) {
            return Err(SchemaError::duplicate("attribute", &attr.name));
        }
    }
    let mut seen = HashSet::new();
    for child in &entity.children {
        if !seen.insert(&child.name) {
            return Err(SchemaError::duplicate("child", &child.name));
        }
    }
    Ok(())
}

fn validate_children(schema: &Schema, entity: &EntityDef) -> Result<(), SchemaError> {
    for child in &entity.children {
        if let ChildType::Reference(name) = &child.child_type {
            if !schema.has_entity(name) {
                return Err(SchemaError::unknown_type(name, &child.name, &entity.name));
            }
        }
        if child.array && child.child_type.is_primitive() {
            return Err(SchemaError::PrimitiveArray {
                child: child.name.clone(),
                entity: entity.name.clone(),
            });
        }
    }
    Ok(())
}

fn validate_base(schema: &Schema, entity: &EntityDef) -> Result<(), SchemaError> {
    let Some(base) = &entity.extends else {
        return Ok(());
    };
    match schema.resolve_composite(base) {
        Some(ChildType::Table | ChildType::Matrix) => Ok(()),
        Some(ChildType::Reference(name)) => {
            // The construction name propagates down the base chain, so the
            // base constructor must accept one.
            let base_entity = schema.get_entity(&name).expect("resolved entity");
            if base_entity.named || base_entity.extends.is_some() {
                Ok(())
            } else {
                Err(SchemaError::UnnamedBase {
                    entity: entity.name.clone(),
                    base: name,
                })
            }
        }
        Some(ChildType::Primitive(_)) => Err(SchemaError::PrimitiveBase {
            entity: entity.name.clone(),
        }),
        None => Err(SchemaError::UnknownBase {
            base: base.clone(),
            entity: entity.name.clone(),
        }),
    }
}

fn validate_inheritance_acyclic(schema: &Schema) -> Result<(), SchemaError> {
    for entity in &schema.entities {
        let mut visited = HashSet::new();
        let mut current = entity;
        visited.insert(&current.name);
        while let Some(base) = &current.extends {
            let Some(next) = schema.get_entity(base) else {
                break; // Table/Matrix terminate the chain
            };
            if !visited.insert(&next.name) {
                return Err(SchemaError::InheritanceCycle {
                    entity: entity.name.clone(),
                });
            }
            current = next;
        }
    }
    Ok(())
}
