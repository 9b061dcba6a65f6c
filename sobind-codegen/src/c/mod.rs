//! C code generation modules.

pub mod header;
pub mod source;

pub use header::HeaderGenerator;
pub use source::SourceGenerator;

use sobind_schema::ir::Operation;

/// Renders an operation signature as C source text (without trailing `;`).
#[must_use]
pub fn signature(op: &Operation) -> String {
    let params = op
        .params
        .iter()
        .map(|p| format!("{}{}", p.ty.c_decl(), p.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}{}({})", op.ret.c_decl(), op.name, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::{CType, OpKind, SchemaIr};
    use sobind_schema::standard_output_schema;

    #[test]
    fn test_signature_rendering() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let so = ir.get("SO").unwrap();
        let new = so.ops.iter().find(|o| o.kind == OpKind::New).unwrap();
        assert_eq!(signature(new), "so_SO *so_SO_new()");

        let free = so.ops.iter().find(|o| o.kind == OpKind::Free).unwrap();
        assert_eq!(signature(free), "void so_SO_free(so_SO *self)");

        let external = ir.get("ExternalFile").unwrap();
        let new = external.ops.iter().find(|o| o.kind == OpKind::New).unwrap();
        assert_eq!(
            signature(new),
            "so_ExternalFile *so_ExternalFile_new(char *name)"
        );
        assert_eq!(new.ret, CType::Class("so_ExternalFile".to_string()));
    }
}
