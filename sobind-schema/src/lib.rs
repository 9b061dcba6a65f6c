//! # sobind-schema
//!
//! Structured-output schema model and resolution.
//!
//! This crate provides:
//! - The declarative schema model (entities, attributes, child slots)
//! - Schema validation
//! - Naming and type resolution
//! - The resolved intermediate representation driving all code emitters
//! - The standard structured-output schema shipped with the generator

pub mod error;
pub mod ir;
pub mod model;
pub mod naming;
pub mod standard;
pub mod validation;

pub use error::SchemaError;
pub use ir::SchemaIr;
pub use model::{
    AttrDef, AttrKind, ChildDef, ChildType, EntityDef, FixedAttr, Primitive, Schema,
};
pub use standard::standard_output_schema;
pub use validation::validate_schema;
