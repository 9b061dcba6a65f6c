//! Public and private C header synthesis.
//!
//! Both headers are rendered from the entity's operation table: the public
//! header declares every public operation, the private header carries the
//! struct layout and the parse/serialize prototypes. There is no way for a
//! declaration to exist without a matching body in the source emitter, or
//! vice versa.

use sobind_schema::ir::{ChildIrKind, EntityIr, OpKind, Operation, Visibility};
use sobind_schema::model::AttrKind;

use super::signature;

/// Generator for one entity's header pair.
pub struct HeaderGenerator<'a> {
    entity: &'a EntityIr,
}

impl<'a> HeaderGenerator<'a> {
    /// Creates a new header generator.
    #[must_use]
    pub fn new(entity: &'a EntityIr) -> Self {
        Self { entity }
    }

    /// Generates the public header contents.
    #[must_use]
    pub fn generate_public(&self) -> String {
        let entity = self.entity;
        let class = &entity.class_name;
        let guard = format!(
            "_{}_{}_H",
            entity.namespace.to_uppercase(),
            entity.name.to_uppercase()
        );
        let mut out = String::new();
        out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));

        for include in self.type_includes(false) {
            out.push_str(&include);
        }
        out.push('\n');

        out.push_str(&format!("/** \\struct {class}\n"));
        out.push_str(&format!(
            " * \\brief A structure representing a {} element\n",
            entity.xpath
        ));
        out.push_str(
            " *\n * Reference counts are plain integers; instances must not be shared\n * between threads.\n */\n",
        );
        out.push_str(&format!("typedef struct {class} {class};\n\n"));

        for op in entity.ops.iter().filter(|o| o.visibility == Visibility::Public) {
            self.emit_doc_comment(op, &mut out);
            out.push_str(&format!("{};\n", signature(op)));
        }

        out.push_str("\n#endif\n");
        out
    }

    /// Generates the private header contents.
    #[must_use]
    pub fn generate_private(&self) -> String {
        let entity = self.entity;
        let class = &entity.class_name;
        let guard = format!(
            "_{}_PRIVATE_{}_H",
            entity.namespace.to_uppercase(),
            entity.name.to_uppercase()
        );
        let mut out = String::new();
        out.push_str(&format!("#ifndef {guard}\n#define {guard}\n\n"));
        out.push_str("#include <libxml/xmlwriter.h>\n");
        for include in self.type_includes(true) {
            out.push_str(&include);
        }
        out.push('\n');

        out.push_str(&format!("struct {class} {{\n"));
        if let Some(base) = &entity.base {
            out.push_str(&format!("\t{} *base;\n", base.class_name));
        }
        if entity.needs_name {
            out.push_str("\tchar *element_name;\n");
        }
        for attr in &entity.attributes {
            match attr.kind {
                AttrKind::Str => out.push_str(&format!("\tchar *{};\n", attr.name)),
                AttrKind::Int => {
                    out.push_str(&format!("\tint *{};\n", attr.name));
                    out.push_str(&format!("\tint {}_number;\n", attr.name));
                }
            }
        }
        for child in &entity.children {
            let name = &child.name;
            match &child.kind {
                ChildIrKind::Str => out.push_str(&format!("\tchar *{name};\n")),
                ChildIrKind::Real => {
                    out.push_str(&format!("\tdouble *{name};\n"));
                    out.push_str(&format!("\tdouble {name}_number;\n"));
                }
                ChildIrKind::Int => {
                    out.push_str(&format!("\tint *{name};\n"));
                    out.push_str(&format!("\tint {name}_number;\n"));
                }
                ChildIrKind::Composite(c) => {
                    let stars = if child.array { "**" } else { "*" };
                    out.push_str(&format!("\t{} {stars}{name};\n", c.class_name));
                }
            }
        }
        for child in &entity.children {
            if child.array {
                out.push_str(&format!("\tint num_{};\n", child.name));
            }
        }
        for child in &entity.children {
            out.push_str(&format!("\tint in_{};\n", child.name));
        }
        out.push_str("\tint reference_count;\n");
        for field in &entity.extra_fields {
            out.push_str(&format!("\t{field}\n"));
        }
        out.push_str("};\n\n");

        for op in entity.ops.iter().filter(|o| o.visibility == Visibility::Private) {
            out.push_str(&format!("{};\n", signature(op)));
        }

        out.push_str("\n#endif\n");
        out
    }

    /// Collects `#include` lines for the class types this entity refers to.
    fn type_includes(&self, private: bool) -> Vec<String> {
        let entity = self.entity;
        let dir = if private {
            format!("{}/private", entity.namespace)
        } else {
            entity.namespace.clone()
        };
        let mut included: Vec<&str> = Vec::new();
        let mut out = Vec::new();
        for child in &entity.children {
            if let Some(composite) = child.composite() {
                if !included.contains(&composite.type_name.as_str()) {
                    included.push(&composite.type_name);
                    out.push(format!("#include <{dir}/{}.h>\n", composite.type_name));
                }
            }
        }
        if let Some(base) = &entity.base {
            if !included.contains(&base.type_name.as_str()) {
                out.push(format!("#include <{dir}/{}.h>\n", base.type_name));
            }
        }
        out
    }

    fn emit_doc_comment(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        let class = &entity.class_name;
        match op.kind {
            OpKind::New => {
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(" * Create a new empty {class} structure.\n"));
                if entity.needs_name {
                    out.push_str(" * \\param name - the name of the XML element\n");
                }
                out.push_str(
                    " * \\return A pointer to the newly created struct or NULL if memory allocation failed\n",
                );
                out.push_str(&format!(" * \\sa {class}_copy, {class}_free\n */\n"));
            }
            OpKind::Copy => {
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(" * Create a deep copy of a {class} structure.\n"));
                out.push_str(
                    " * \\return A pointer to the newly created struct or NULL if memory allocation failed\n",
                );
                out.push_str(&format!(" * \\sa {class}_new\n */\n"));
            }
            OpKind::Free => {
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(
                    " * Free all memory associated with a {class} structure and its children.\n"
                ));
                out.push_str(" * \\param self - a pointer to the structure to free\n");
                out.push_str(&format!(" * \\sa {class}_new\n */\n"));
            }
            OpKind::GetAttr(i) => {
                let attr = &entity.attributes[i];
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(
                    " * Get the value of the {} attribute\n",
                    attr.name
                ));
                out.push_str(
                    " * \\return A pointer to the attribute value or NULL if no value is present\n",
                );
                out.push_str(&format!(" * \\sa {class}_set_{}\n */\n", attr.name));
            }
            OpKind::SetAttr(i) => {
                let attr = &entity.attributes[i];
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(
                    " * Set the value of the {} attribute\n",
                    attr.name
                ));
                out.push_str(
                    " * \\param value - A pointer to the value to set or NULL to clear\n",
                );
                out.push_str(&format!(" * \\sa {class}_get_{}\n */\n", attr.name));
            }
            OpKind::GetChild(i) => {
                let child = &entity.children[i];
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(" * Get the {} element\n", child.name));
                if child.array {
                    out.push_str(" * \\param number - An index to the specific element\n");
                    out.push_str(&format!(" * \\sa {class}_add_{}\n */\n", child.name));
                } else {
                    out.push_str(&format!(" * \\sa {class}_set_{}\n */\n", child.name));
                }
            }
            OpKind::NumberOf(i) => {
                let child = &entity.children[i];
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(
                    " * Get the number of {} elements currently contained in the {} structure\n",
                    child.name, entity.name
                ));
                out.push_str(" */\n");
            }
            OpKind::CreateChild(i) => {
                let child = &entity.children[i];
                out.push_str(&format!("/** \\memberof {class}\n"));
                out.push_str(&format!(
                    " * Create a new {} element and insert it into the {class}\n",
                    child.name
                ));
                out.push_str(
                    " * \\return A pointer to the newly created structure or NULL if memory allocation failed\n */\n",
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::SchemaIr;
    use sobind_schema::standard_output_schema;

    fn headers_for(name: &str) -> (String, String) {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let generator = HeaderGenerator::new(ir.get(name).unwrap());
        (generator.generate_public(), generator.generate_private())
    }

    #[test]
    fn test_public_header_guard_and_typedef() {
        let (public, _) = headers_for("SOBlock");
        assert!(public.starts_with("#ifndef _SO_SOBLOCK_H\n#define _SO_SOBLOCK_H\n"));
        assert!(public.contains("typedef struct so_SOBlock so_SOBlock;"));
        assert!(public.ends_with("#endif\n"));
    }

    #[test]
    fn test_every_public_op_is_declared_once() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        for entity in &ir.entities {
            let generator = HeaderGenerator::new(entity);
            let public = generator.generate_public();
            let private = generator.generate_private();
            for op in &entity.ops {
                let decl = format!("{};", super::signature(op));
                let in_public = public.matches(&decl).count();
                let in_private = private.matches(&decl).count();
                assert_eq!(
                    in_public + in_private,
                    1,
                    "{} declared {} times",
                    op.name,
                    in_public + in_private
                );
                match op.visibility {
                    Visibility::Public => assert_eq!(in_public, 1, "{} not public", op.name),
                    Visibility::Private => assert_eq!(in_private, 1, "{} not private", op.name),
                }
            }
        }
    }

    #[test]
    fn test_private_struct_layout() {
        let (_, private) = headers_for("SO");
        assert!(private.contains("struct so_SO {"));
        assert!(private.contains("\tso_PharmMLRef *PharmMLRef;"));
        assert!(private.contains("\tso_SOBlock **SOBlock;"));
        assert!(private.contains("\tint num_SOBlock;"));
        assert!(private.contains("\tint in_PharmMLRef;"));
        assert!(private.contains("\tint in_SOBlock;"));
        assert!(private.contains("\tint reference_count;"));
        assert!(private.contains("\tint error;"));
    }

    #[test]
    fn test_private_struct_optional_scalars() {
        let (_, private) = headers_for("Likelihood");
        assert!(private.contains("\tdouble *LogLikelihood;"));
        assert!(private.contains("\tdouble LogLikelihood_number;"));
    }

    #[test]
    fn test_derived_struct_has_base_and_name() {
        let (_, private) = headers_for("SimulationSubType");
        assert!(private.contains("\tso_Table *base;"));
        assert!(private.contains("\tchar *element_name;"));
        assert!(private.contains("\tint *extFileNo;"));
        assert!(private.contains("\tint extFileNo_number;"));
    }

    #[test]
    fn test_child_type_includes() {
        let (public, private) = headers_for("Message");
        assert!(public.contains("#include <so/Toolname.h>"));
        assert!(public.contains("#include <so/Severity.h>"));
        assert!(private.contains("#include <so/private/Toolname.h>"));
    }

    #[test]
    fn test_parse_prototypes_are_private() {
        let (public, private) = headers_for("SOBlock");
        assert!(!public.contains("_start_element"));
        assert!(private.contains(
            "int so_SOBlock_start_element(so_SOBlock *self, const char *localname, int nb_attributes, const char **attributes);"
        ));
        assert!(private.contains("void so_SOBlock_end_element(so_SOBlock *self, const char *localname);"));
        assert!(private.contains("int so_SOBlock_xml(so_SOBlock *self, xmlTextWriterPtr writer);"));
        assert!(private.contains("int so_SOBlock_init_attributes(so_SOBlock *self, int nb_attributes, const char **attributes);"));
    }

    #[test]
    fn test_array_slot_declares_no_setter() {
        let (public, _) = headers_for("SO");
        assert!(!public.contains("so_SO_set_SOBlock"));
        assert!(public.contains("int so_SO_add_SOBlock(so_SO *self, so_SOBlock *child);"));
        assert!(public.contains("int so_SO_remove_SOBlock(so_SO *self, int index);"));
        assert!(public.contains("int so_SO_get_number_of_SOBlock(so_SO *self);"));
    }
}
