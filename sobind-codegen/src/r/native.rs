//! Native `.Call` glue synthesis for the R binding.
//!
//! For every public operation of an entity this emits a `SEXP` wrapper that
//! unmarshals R arguments, calls the core operation and marshals the result
//! back. Absent values cross the boundary as `R_NilValue`; opaque handles
//! are tagged external pointers and setters reject a mismatched tag with an
//! R-visible error before the core is ever reached.

use sobind_schema::ir::{
    ChildIr, ChildIrKind, EntityIr, ForeignKind, OpKind, Operation, SchemaIr,
};
use sobind_schema::model::AttrKind;
use sobind_schema::naming;

/// Generator for one entity's `.Call` glue file.
pub struct NativeGenerator<'a> {
    entity: &'a EntityIr,
}

impl<'a> NativeGenerator<'a> {
    /// Creates a new native glue generator.
    #[must_use]
    pub fn new(entity: &'a EntityIr) -> Self {
        Self { entity }
    }

    /// Generates the glue file contents.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        out.push_str("#include <R.h>\n");
        out.push_str("#include <Rdefines.h>\n");
        out.push_str("#include <so.h>\n");
        out.push_str("#include \"soc.h\"\n\n");
        for op in self.entity.public_ops() {
            self.emit_wrapper(op, &mut out);
        }
        out
    }

    fn emit_wrapper(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        let class = &entity.class_name;
        out.push_str(&wrapper_signature(op));
        out.push_str("\n{\n");
        match op.kind {
            OpKind::New => {
                if entity.needs_name {
                    out.push_str(&format!(
                        "\t{class} *obj = {}((char *) CHAR(STRING_ELT(name, 0)));\n",
                        op.name
                    ));
                } else {
                    out.push_str(&format!("\t{class} *obj = {}();\n", op.name));
                }
                out.push_str(&format!(
                    "\treturn R_MakeExternalPtr(obj, Rf_install(\"{class}\"), R_NilValue);\n"
                ));
            }
            OpKind::Copy => {
                out.push_str(&format!(
                    "\t{class} *copy = {}(R_ExternalPtrAddr(self));\n",
                    op.name
                ));
                out.push_str(&format!(
                    "\treturn R_MakeExternalPtr(copy, Rf_install(\"{class}\"), R_NilValue);\n"
                ));
            }
            OpKind::Free | OpKind::Ref | OpKind::Unref => {
                out.push_str(&format!("\t{}(R_ExternalPtrAddr(self));\n", op.name));
                out.push_str("\treturn R_NilValue;\n");
            }
            OpKind::GetBase => {
                let base = entity.base.as_ref().expect("base accessor without base");
                out.push_str(&format!(
                    "\t{} *base = {}(R_ExternalPtrAddr(self));\n",
                    base.class_name, op.name
                ));
                out.push_str("\tif (!base) {\n\t\treturn R_NilValue;\n\t}\n");
                out.push_str(&format!(
                    "\treturn R_MakeExternalPtr(base, Rf_install(\"{}\"), R_NilValue);\n",
                    base.class_name
                ));
            }
            OpKind::SetBase => {
                let base = entity.base.as_ref().expect("base accessor without base");
                emit_tag_check("value", &base.class_name, out);
                out.push_str(&format!(
                    "\t{}(R_ExternalPtrAddr(self), R_ExternalPtrAddr(value));\n",
                    op.name
                ));
                out.push_str("\treturn R_NilValue;\n");
            }
            OpKind::GetAttr(i) => match entity.attributes[i].kind {
                AttrKind::Str => emit_string_getter_body(&op.name, "", out),
                AttrKind::Int => emit_scalar_getter_body(&op.name, "", "int", out),
            },
            OpKind::SetAttr(i) => match entity.attributes[i].kind {
                AttrKind::Str => emit_string_setter_body(&op.name, out),
                AttrKind::Int => emit_scalar_setter_body(&op.name, "INTEGER", out),
            },
            OpKind::GetChild(i) => self.emit_get_child(op, &entity.children[i], out),
            OpKind::SetChild(i) => self.emit_set_child(op, &entity.children[i], out),
            OpKind::NumberOf(_) => {
                out.push_str(&format!(
                    "\tint number = {}(R_ExternalPtrAddr(self));\n",
                    op.name
                ));
                out.push_str("\tSEXP r_int = PROTECT(NEW_INTEGER(1));\n");
                out.push_str("\tINTEGER(r_int)[0] = number;\n");
                out.push_str("\tUNPROTECT(1);\n");
                out.push_str("\treturn r_int;\n");
            }
            OpKind::AddChild(i) => {
                let composite = entity.children[i]
                    .composite()
                    .expect("array slots are classes");
                emit_tag_check("child", &composite.class_name, out);
                out.push_str(&format!(
                    "\t{}(R_ExternalPtrAddr(self), R_ExternalPtrAddr(child));\n",
                    op.name
                ));
                out.push_str("\treturn R_NilValue;\n");
            }
            OpKind::RemoveChild(_) => {
                out.push_str(&format!(
                    "\t{}(R_ExternalPtrAddr(self), INTEGER(index)[0]);\n",
                    op.name
                ));
                out.push_str("\treturn R_NilValue;\n");
            }
            OpKind::CreateChild(i) => {
                let composite = entity.children[i]
                    .composite()
                    .expect("create is for class slots");
                out.push_str(&format!(
                    "\t{} *child = {}(R_ExternalPtrAddr(self));\n",
                    composite.class_name, op.name
                ));
                out.push_str(&format!(
                    "\treturn R_MakeExternalPtr(child, Rf_install(\"{}\"), R_NilValue);\n",
                    composite.class_name
                ));
            }
            _ => unreachable!("private operations have no R wrapper"),
        }
        out.push_str("}\n\n");
    }

    fn emit_get_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        let index_arg = if child.array { ", INTEGER(number)[0]" } else { "" };
        match &child.kind {
            ChildIrKind::Str => emit_string_getter_body(&op.name, index_arg, out),
            ChildIrKind::Real => emit_scalar_getter_body(&op.name, index_arg, "double", out),
            ChildIrKind::Int => emit_scalar_getter_body(&op.name, index_arg, "int", out),
            ChildIrKind::Composite(c) => {
                out.push_str(&format!(
                    "\t{} *child = {}(R_ExternalPtrAddr(self){index_arg});\n",
                    c.class_name, op.name
                ));
                out.push_str("\tif (!child) {\n\t\treturn R_NilValue;\n\t}\n");
                match c.foreign_kind {
                    ForeignKind::Table => out.push_str("\treturn table2df(child);\n"),
                    ForeignKind::Matrix => out.push_str("\treturn matrix2Rmatrix(child);\n"),
                    ForeignKind::Handle => out.push_str(&format!(
                        "\treturn R_MakeExternalPtr(child, Rf_install(\"{}\"), R_NilValue);\n",
                        c.class_name
                    )),
                }
            }
        }
    }

    fn emit_set_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        match &child.kind {
            ChildIrKind::Str => emit_string_setter_body(&op.name, out),
            ChildIrKind::Real => emit_scalar_setter_body(&op.name, "REAL", out),
            ChildIrKind::Int => emit_scalar_setter_body(&op.name, "INTEGER", out),
            ChildIrKind::Composite(c) => match c.foreign_kind {
                ForeignKind::Table => {
                    out.push_str("\tif (Rf_isNull(value)) {\n");
                    out.push_str(&format!(
                        "\t\t{}(R_ExternalPtrAddr(self), NULL);\n",
                        op.name
                    ));
                    out.push_str("\t\treturn R_NilValue;\n\t}\n");
                    out.push_str(&format!(
                        "\tso_Table *table = df2table(value, \"{}\");\n",
                        child.xml_tag
                    ));
                    out.push_str(
                        "\tif (!table) {\n\t\tRf_error(\"could not convert data.frame\");\n\t}\n",
                    );
                    out.push_str(&format!(
                        "\t{}(R_ExternalPtrAddr(self), table);\n",
                        op.name
                    ));
                    out.push_str("\treturn R_NilValue;\n");
                }
                ForeignKind::Matrix => {
                    out.push_str("\tif (Rf_isNull(value)) {\n");
                    out.push_str(&format!(
                        "\t\t{}(R_ExternalPtrAddr(self), NULL);\n",
                        op.name
                    ));
                    out.push_str("\t\treturn R_NilValue;\n\t}\n");
                    out.push_str(&format!(
                        "\tso_Matrix *matrix = Rmatrix2matrix(value, \"{}\");\n",
                        child.xml_tag
                    ));
                    out.push_str(
                        "\tif (!matrix) {\n\t\tRf_error(\"could not convert matrix\");\n\t}\n",
                    );
                    out.push_str(&format!(
                        "\t{}(R_ExternalPtrAddr(self), matrix);\n",
                        op.name
                    ));
                    out.push_str("\treturn R_NilValue;\n");
                }
                ForeignKind::Handle => {
                    emit_tag_check("value", &c.class_name, out);
                    out.push_str(&format!(
                        "\t{}(R_ExternalPtrAddr(self), R_ExternalPtrAddr(value));\n",
                        op.name
                    ));
                    out.push_str("\treturn R_NilValue;\n");
                }
            },
        }
    }
}

/// Renders the `SEXP` wrapper signature for a core operation.
#[must_use]
pub fn wrapper_signature(op: &Operation) -> String {
    let params = op
        .params
        .iter()
        .map(|p| format!("SEXP {}", p.name))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SEXP {}({})", naming::r_wrapper_name(&op.name), params)
}

fn emit_tag_check(arg: &str, class: &str, out: &mut String) {
    out.push_str(&format!(
        "\tif (R_ExternalPtrTag({arg}) != Rf_install(\"{class}\")) {{\n"
    ));
    out.push_str(&format!(
        "\t\tRf_error(\"{arg} is not a {class} object\");\n\t}}\n"
    ));
}

fn emit_string_getter_body(core_name: &str, index_arg: &str, out: &mut String) {
    out.push_str(&format!(
        "\tchar *value = {core_name}(R_ExternalPtrAddr(self){index_arg});\n"
    ));
    out.push_str("\tif (!value) {\n\t\treturn R_NilValue;\n\t}\n");
    out.push_str("\tSEXP result = PROTECT(NEW_STRING(1));\n");
    out.push_str("\tSET_STRING_ELT(result, 0, mkChar(value));\n");
    out.push_str("\tUNPROTECT(1);\n");
    out.push_str("\treturn result;\n");
}

fn emit_scalar_getter_body(core_name: &str, index_arg: &str, c_type: &str, out: &mut String) {
    let (new_macro, access) = match c_type {
        "double" => ("NEW_NUMERIC", "REAL"),
        _ => ("NEW_INTEGER", "INTEGER"),
    };
    out.push_str(&format!(
        "\t{c_type} *value = {core_name}(R_ExternalPtrAddr(self){index_arg});\n"
    ));
    out.push_str("\tif (!value) {\n\t\treturn R_NilValue;\n\t}\n");
    out.push_str(&format!("\tSEXP result = PROTECT({new_macro}(1));\n"));
    out.push_str(&format!("\t{access}(result)[0] = *value;\n"));
    out.push_str("\tUNPROTECT(1);\n");
    out.push_str("\treturn result;\n");
}

fn emit_string_setter_body(core_name: &str, out: &mut String) {
    out.push_str("\tif (Rf_isNull(value)) {\n");
    out.push_str(&format!("\t\t{core_name}(R_ExternalPtrAddr(self), NULL);\n"));
    out.push_str("\t\treturn R_NilValue;\n\t}\n");
    out.push_str(&format!(
        "\t{core_name}(R_ExternalPtrAddr(self), (char *) CHAR(STRING_ELT(value, 0)));\n"
    ));
    out.push_str("\treturn R_NilValue;\n");
}

fn emit_scalar_setter_body(core_name: &str, access: &str, out: &mut String) {
    out.push_str("\tif (Rf_isNull(value)) {\n");
    out.push_str(&format!("\t\t{core_name}(R_ExternalPtrAddr(self), NULL);\n"));
    out.push_str("\t\treturn R_NilValue;\n\t}\n");
    out.push_str(&format!(
        "\t{core_name}(R_ExternalPtrAddr(self), {access}(value));\n"
    ));
    out.push_str("\treturn R_NilValue;\n");
}

/// Generator for the registration table consumed by the R dynamic loader.
pub struct RegistrationGenerator<'a> {
    ir: &'a SchemaIr,
}

impl<'a> RegistrationGenerator<'a> {
    /// Creates a new registration table generator.
    #[must_use]
    pub fn new(ir: &'a SchemaIr) -> Self {
        Self { ir }
    }

    /// Generates the registration file contents.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        out.push_str("#include <R.h>\n");
        out.push_str("#include <Rinternals.h>\n");
        out.push_str("#include <R_ext/Rdynload.h>\n\n");

        for entity in &self.ir.entities {
            for op in entity.public_ops() {
                out.push_str(&format!("{};\n", wrapper_signature(op)));
            }
        }
        out.push('\n');

        out.push_str("static const R_CallMethodDef call_methods[] = {\n");
        for entity in &self.ir.entities {
            for op in entity.public_ops() {
                let wrapper = naming::r_wrapper_name(&op.name);
                out.push_str(&format!(
                    "\t{{\"{wrapper}\", (DL_FUNC) &{wrapper}, {}}},\n",
                    op.params.len()
                ));
            }
        }
        out.push_str("\t{NULL, NULL, 0}\n};\n\n");

        out.push_str("void R_init_soc(DllInfo *info)\n{\n");
        out.push_str("\tR_registerRoutines(info, NULL, call_methods, NULL, NULL);\n");
        out.push_str("\tR_useDynamicSymbols(info, FALSE);\n");
        out.push_str("}\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::SchemaIr;
    use sobind_schema::standard_output_schema;

    fn glue_for(name: &str) -> String {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        NativeGenerator::new(ir.get(name).unwrap()).generate()
    }

    #[test]
    fn test_new_wrapper_returns_tagged_pointer() {
        let code = glue_for("SO");
        assert!(code.contains("SEXP r_so_SO_new()"));
        assert!(code.contains("R_MakeExternalPtr(obj, Rf_install(\"so_SO\"), R_NilValue)"));
    }

    #[test]
    fn test_named_new_threads_name_argument() {
        let code = glue_for("ExternalFile");
        assert!(code.contains("SEXP r_so_ExternalFile_new(SEXP name)"));
        assert!(code.contains("so_ExternalFile_new((char *) CHAR(STRING_ELT(name, 0)))"));
    }

    #[test]
    fn test_absent_values_marshal_to_nil() {
        let code = glue_for("Likelihood");
        assert!(code.contains("if (!value) {\n\t\treturn R_NilValue;\n\t}"));
        assert!(code.contains("REAL(result)[0] = *value;"));
    }

    #[test]
    fn test_table_child_marshals_as_data_frame() {
        let code = glue_for("Estimation");
        assert!(code.contains("return table2df(child);"));
        assert!(code.contains("so_Table *table = df2table(value, \"Predictions\");"));
    }

    #[test]
    fn test_matrix_child_marshals_as_matrix() {
        let code = glue_for("MLE");
        assert!(code.contains("return matrix2Rmatrix(child);"));
        assert!(code.contains("so_Matrix *matrix = Rmatrix2matrix(value, \"FIM\");"));
    }

    #[test]
    fn test_handle_setter_rejects_wrong_tag() {
        let code = glue_for("SOBlock");
        assert!(code.contains(
            "if (R_ExternalPtrTag(value) != Rf_install(\"so_Estimation\")) {\n\t\tRf_error(\"value is not a so_Estimation object\");"
        ));
    }

    #[test]
    fn test_set_base_rejects_mismatched_instance() {
        let code = glue_for("SimulationSubType");
        assert!(code.contains("SEXP r_so_SimulationSubType_set_base(SEXP self, SEXP value)"));
        assert!(code.contains("R_ExternalPtrTag(value) != Rf_install(\"so_Table\")"));
    }

    #[test]
    fn test_indexed_getter_unmarshals_index() {
        let code = glue_for("SO");
        assert!(code.contains("SEXP r_so_SO_get_SOBlock(SEXP self, SEXP number)"));
        assert!(code.contains("R_ExternalPtrAddr(self), INTEGER(number)[0]"));
    }

    #[test]
    fn test_registration_table_covers_every_public_op() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let table = RegistrationGenerator::new(&ir).generate();
        for entity in &ir.entities {
            for op in entity.public_ops() {
                let row = format!(
                    "{{\"r_{}\", (DL_FUNC) &r_{}, {}}},",
                    op.name,
                    op.name,
                    op.params.len()
                );
                assert!(table.contains(&row), "missing registration row for {}", op.name);
            }
        }
        assert!(table.contains("void R_init_soc(DllInfo *info)"));
        assert!(table.contains("{NULL, NULL, 0}"));
    }
}
