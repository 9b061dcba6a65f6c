//! R-side binding synthesis: `.Call` wrappers, field accessors, reference
//! classes and the package `NAMESPACE`.

use sobind_schema::ir::{ChildIrKind, EntityIr, ForeignKind, SchemaIr};
use sobind_schema::naming;

/// Generator for one entity's R source file.
pub struct ClassGenerator<'a> {
    entity: &'a EntityIr,
}

impl<'a> ClassGenerator<'a> {
    /// Creates a new R class generator.
    #[must_use]
    pub fn new(entity: &'a EntityIr) -> Self {
        Self { entity }
    }

    /// Generates the R source file contents.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        self.emit_call_wrappers(&mut out);
        self.emit_accessors(&mut out);
        self.emit_class(&mut out);
        out
    }

    fn emit_call_wrappers(&self, out: &mut String) {
        for op in self.entity.public_ops() {
            let args: Vec<&str> = op.params.iter().map(|p| p.name.as_str()).collect();
            out.push_str(&format!("{} <- function({}) {{\n", op.name, args.join(", ")));
            let mut call_args = vec![format!("\"{}\"", naming::r_wrapper_name(&op.name))];
            call_args.extend(args.iter().map(|a| (*a).to_string()));
            out.push_str(&format!("\t.Call({})\n", call_args.join(", ")));
            out.push_str("}\n\n");
        }
    }

    fn emit_accessors(&self, out: &mut String) {
        let entity = self.entity;
        let class = &entity.class_name;
        for attr in &entity.attributes {
            let name = &attr.name;
            out.push_str(&format!("{name}_acc <- function(value)\n{{\n"));
            out.push_str("\tif (!isnull(.self$.cobj)) {\n");
            out.push_str("\t\tif (missing(value)) {\n");
            out.push_str(&format!("\t\t\t{class}_get_{name}(.self$.cobj)\n"));
            out.push_str("\t\t} else {\n");
            out.push_str(&format!("\t\t\t{class}_set_{name}(.self$.cobj, value)\n"));
            out.push_str("\t\t}\n\t}\n}\n\n");
        }
        for child in &entity.children {
            let name = &child.name;
            out.push_str(&format!("{name}_acc <- function(value)\n{{\n"));
            out.push_str("\tif (!isnull(.self$.cobj)) {\n");
            out.push_str("\t\tif (missing(value)) {\n");
            if child.array {
                let child_class = &child.composite().expect("array slots are classes").class_name;
                out.push_str(&format!(
                    "\t\t\tn = {class}_get_number_of_{name}(.self$.cobj)\n"
                ));
                out.push_str("\t\t\tif (n > 0) {\n");
                out.push_str("\t\t\t\ta = list()\n");
                out.push_str("\t\t\t\tfor (i in seq.int(1, n)) {\n");
                out.push_str(&format!(
                    "\t\t\t\t\tchild = {class}_get_{name}(.self$.cobj, i - 1L)\n"
                ));
                out.push_str(&format!(
                    "\t\t\t\t\ta[[i]] = {child_class}$new(cobj=child)\n"
                ));
                out.push_str("\t\t\t\t}\n");
                out.push_str("\t\t\t\treturn(a)\n");
                out.push_str("\t\t\t}\n");
            } else {
                match &child.kind {
                    ChildIrKind::Composite(c) if c.foreign_kind == ForeignKind::Handle => {
                        out.push_str(&format!(
                            "\t\t\tchild = {class}_get_{name}(.self$.cobj)\n"
                        ));
                        out.push_str("\t\t\tif (!isnull(child)) {\n");
                        out.push_str(&format!("\t\t\t\t{}$new(cobj=child)\n", c.class_name));
                        out.push_str("\t\t\t}\n");
                    }
                    _ => {
                        out.push_str(&format!("\t\t\t{class}_get_{name}(.self$.cobj)\n"));
                    }
                }
            }
            out.push_str("\t\t} else {\n");
            if child.array {
                // Arrays have no bulk assignment; use the add_ method.
            } else {
                match &child.kind {
                    ChildIrKind::Composite(c) if c.foreign_kind == ForeignKind::Handle => {
                        out.push_str(&format!(
                            "\t\t\t{class}_set_{name}(.self$.cobj, value$.cobj)\n"
                        ));
                        out.push_str(&format!("\t\t\t{}_ref(value$.cobj)\n", c.class_name));
                    }
                    _ => {
                        out.push_str(&format!(
                            "\t\t\t{class}_set_{name}(.self$.cobj, value)\n"
                        ));
                    }
                }
            }
            out.push_str("\t\t}\n\t}\n}\n\n");
        }
    }

    fn emit_class(&self, out: &mut String) {
        let entity = self.entity;
        let class = &entity.class_name;
        out.push_str(&format!("{class} = setRefClass(\"{class}\",\n"));
        out.push_str("\tfields=list(\n");
        for attr in &entity.attributes {
            out.push_str(&format!("\t\t{} = {}_acc,\n", attr.name, attr.name));
        }
        for child in &entity.children {
            out.push_str(&format!("\t\t{} = {}_acc,\n", child.name, child.name));
        }
        out.push_str("\t\t.cobj = \"externalptr\"\n");
        out.push_str("\t),\n");
        out.push_str("\tmethods=list(\n");
        if entity.needs_name {
            out.push_str("\t\tinitialize = function(cobj, name) {\n");
            out.push_str("\t\t\tif (missing(cobj)) {\n");
            out.push_str(&format!("\t\t\t\t.cobj <<- {class}_new(name)\n"));
        } else {
            out.push_str("\t\tinitialize = function(cobj) {\n");
            out.push_str("\t\t\tif (missing(cobj)) {\n");
            out.push_str(&format!("\t\t\t\t.cobj <<- {class}_new()\n"));
        }
        out.push_str("\t\t\t} else {\n");
        out.push_str("\t\t\t\t.cobj <<- cobj\n");
        out.push_str("\t\t\t}\n");
        out.push_str("\t\t},\n");
        out.push_str("\t\tfinalize = function() {\n");
        out.push_str("\t\t}");
        for child in &entity.children {
            if child.array {
                let child_class = &child.composite().expect("array slots are classes").class_name;
                out.push_str(",\n");
                out.push_str(&format!("\t\tadd_{} = function(value) {{\n", child.name));
                out.push_str(&format!(
                    "\t\t\t{class}_add_{}(.self$.cobj, value$.cobj)\n",
                    child.name
                ));
                out.push_str(&format!(
                    "\t\t\tinvisible({child_class}_ref(value$.cobj))\n"
                ));
                out.push_str("\t\t}");
            }
        }
        out.push('\n');
        out.push_str("\t)\n)\n");
    }
}

/// Generator for the package `NAMESPACE` file.
pub struct NamespaceGenerator<'a> {
    ir: &'a SchemaIr,
}

impl<'a> NamespaceGenerator<'a> {
    /// Creates a new namespace generator.
    #[must_use]
    pub fn new(ir: &'a SchemaIr) -> Self {
        Self { ir }
    }

    /// Generates the `NAMESPACE` contents.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        out.push_str("useDynLib(soc)\n");
        for entity in &self.ir.entities {
            out.push_str(&format!("export({})\n", entity.class_name));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::SchemaIr;
    use sobind_schema::standard_output_schema;

    fn classes_for(name: &str) -> String {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        ClassGenerator::new(ir.get(name).unwrap()).generate()
    }

    #[test]
    fn test_call_wrappers_cover_public_ops() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let entity = ir.get("SOBlock").unwrap();
        let code = ClassGenerator::new(entity).generate();
        for op in entity.public_ops() {
            assert!(
                code.contains(&format!("{} <- function(", op.name)),
                "missing wrapper for {}",
                op.name
            );
            assert!(code.contains(&format!(".Call(\"r_{}\"", op.name)));
        }
    }

    #[test]
    fn test_array_accessor_builds_list() {
        let code = classes_for("SO");
        assert!(code.contains("n = so_SO_get_number_of_SOBlock(.self$.cobj)"));
        assert!(code.contains("a[[i]] = so_SOBlock$new(cobj=child)"));
    }

    #[test]
    fn test_handle_setter_refs_after_set() {
        let code = classes_for("SOBlock");
        assert!(code.contains("so_SOBlock_set_Estimation(.self$.cobj, value$.cobj)"));
        assert!(code.contains("so_Estimation_ref(value$.cobj)"));
    }

    #[test]
    fn test_table_accessor_passes_value_through() {
        let code = classes_for("Estimation");
        assert!(code.contains("so_Estimation_set_Predictions(.self$.cobj, value)"));
        assert!(!code.contains("so_Estimation_set_Predictions(.self$.cobj, value$.cobj)"));
    }

    #[test]
    fn test_ref_class_fields_and_initialize() {
        let code = classes_for("Message");
        assert!(code.contains("so_Message = setRefClass(\"so_Message\","));
        assert!(code.contains("\t\ttype = type_acc,"));
        assert!(code.contains("\t\t.cobj = \"externalptr\""));
        assert!(code.contains(".cobj <<- so_Message_new()"));
    }

    #[test]
    fn test_named_class_initialize_takes_name() {
        let code = classes_for("ExternalFile");
        assert!(code.contains("initialize = function(cobj, name) {"));
        assert!(code.contains(".cobj <<- so_ExternalFile_new(name)"));
    }

    #[test]
    fn test_array_slots_get_add_methods() {
        let code = classes_for("SO");
        assert!(code.contains("add_SOBlock = function(value) {"));
        assert!(code.contains("invisible(so_SOBlock_ref(value$.cobj))"));
    }

    #[test]
    fn test_namespace_exports_every_class() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let ns = NamespaceGenerator::new(&ir).generate();
        assert!(ns.starts_with("useDynLib(soc)\n"));
        for entity in &ir.entities {
            assert!(ns.contains(&format!("export({})\n", entity.class_name)));
        }
    }
}
