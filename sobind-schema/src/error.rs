//! Error types for schema resolution and validation.

use thiserror::Error;

/// Error type for schema authoring problems.
///
/// All of these are fatal at generation time: the generator stops rather
/// than emitting code for an inconsistent schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A child slot references an undeclared type.
    #[error("unknown type '{type_name}' in child '{child}' of entity '{entity}'")]
    UnknownType {
        /// Referenced type name.
        type_name: String,
        /// Child slot name.
        child: String,
        /// Declaring entity name.
        entity: String,
    },

    /// An extends clause references an undeclared type.
    #[error("unknown base type '{base}' for entity '{entity}'")]
    UnknownBase {
        /// Referenced base name.
        base: String,
        /// Declaring entity name.
        entity: String,
    },

    /// An extends target cannot accept a construction name.
    #[error("entity '{entity}' extends '{base}', which does not take a construction name")]
    UnnamedBase {
        /// Declaring entity name.
        entity: String,
        /// Base name.
        base: String,
    },

    /// The extends graph contains a cycle.
    #[error("inheritance cycle detected through entity '{entity}'")]
    InheritanceCycle {
        /// An entity on the cycle.
        entity: String,
    },

    /// Duplicate definition.
    #[error("duplicate {kind} '{name}'")]
    Duplicate {
        /// Kind of definition (entity, attribute, child).
        kind: String,
        /// Name of the duplicate.
        name: String,
    },

    /// A primitive was used where a class type is required.
    #[error("entity '{entity}' extends primitive type; bases must be classes")]
    PrimitiveBase {
        /// Declaring entity name.
        entity: String,
    },

    /// An array slot was declared with a primitive type.
    #[error("array child '{child}' of entity '{entity}' must have a class type")]
    PrimitiveArray {
        /// Child slot name.
        child: String,
        /// Declaring entity name.
        entity: String,
    },
}

impl SchemaError {
    /// Creates an unknown-type error.
    pub fn unknown_type(
        type_name: impl Into<String>,
        child: impl Into<String>,
        entity: impl Into<String>,
    ) -> Self {
        Self::UnknownType {
            type_name: type_name.into(),
            child: child.into(),
            entity: entity.into(),
        }
    }

    /// Creates a duplicate-definition error.
    pub fn duplicate(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::Duplicate {
            kind: kind.into(),
            name: name.into(),
        }
    }
}
