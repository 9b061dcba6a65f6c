//! # sobind-codegen
//!
//! Code generation from structured-output schemas.
//!
//! This crate provides:
//! - Core C class synthesis (lifecycle, accessors, XML, SAX handlers)
//! - Public/private C header synthesis in lockstep with the sources
//! - R binding synthesis (`.Call` glue, registration table, classes)
//! - Fortran binding synthesis (interfaces and wrapper procedures)
//! - Output tree assembly, writing and cleaning

pub mod c;
pub mod error;
pub mod fortran;
pub mod output;
pub mod r;

pub use error::CodegenError;
pub use output::{clean, write_files, CodegenOptions, GeneratedFile, Generator};

use sobind_schema::{Schema, SchemaIr};

/// Generates the complete artifact set for a schema.
///
/// # Errors
/// Returns `CodegenError` if the schema fails to resolve or generation
/// fails.
pub fn generate(schema: &Schema) -> Result<Vec<GeneratedFile>, CodegenError> {
    generate_with_options(schema, CodegenOptions::default())
}

/// Generates the complete artifact set for a schema with explicit options.
///
/// # Errors
/// Returns `CodegenError` if the schema fails to resolve or generation
/// fails.
pub fn generate_with_options(
    schema: &Schema,
    options: CodegenOptions,
) -> Result<Vec<GeneratedFile>, CodegenError> {
    let ir = SchemaIr::from_schema(schema)?;
    let generator = Generator::with_options(&ir, options);
    generator.generate_files()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::model::{ChildDef, ChildType, EntityDef};
    use sobind_schema::standard_output_schema;

    #[test]
    fn test_generate_standard_schema() {
        let files = generate(&standard_output_schema()).unwrap();
        assert!(!files.is_empty());
    }

    #[test]
    fn test_generate_rejects_bad_schema() {
        let mut schema = Schema::new();
        schema.add_entity(
            EntityDef::new("Broken", "Broken")
                .child(ChildDef::new("X", ChildType::reference("Missing"))),
        );
        assert!(generate(&schema).is_err());
    }
}
