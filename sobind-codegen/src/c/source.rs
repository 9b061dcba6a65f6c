//! Core entity implementation synthesis.
//!
//! For one resolved entity this emits the full C implementation file:
//! lifecycle operations, accessors, XML serialization and the SAX parse
//! state machine. Emission is driven by the entity's operation table, so
//! every declared operation gets exactly one body here.

use sobind_schema::ir::{
    AttrIr, ChildIr, ChildIrKind, EntityIr, OpKind, Operation,
};
use sobind_schema::model::AttrKind;

use super::signature;

/// Generator for one entity's C implementation file.
pub struct SourceGenerator<'a> {
    entity: &'a EntityIr,
}

impl<'a> SourceGenerator<'a> {
    /// Creates a new source generator.
    #[must_use]
    pub fn new(entity: &'a EntityIr) -> Self {
        Self { entity }
    }

    /// Generates the implementation file contents.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        self.emit_includes(&mut out);
        for op in &self.entity.ops {
            match op.kind {
                OpKind::New => self.emit_new(op, &mut out),
                OpKind::Copy => self.emit_copy(op, &mut out),
                OpKind::Free => self.emit_free(op, &mut out),
                OpKind::Ref => self.emit_ref(op, &mut out),
                OpKind::Unref => self.emit_unref(op, &mut out),
                OpKind::GetBase => self.emit_get_base(op, &mut out),
                OpKind::SetBase => self.emit_set_base(op, &mut out),
                OpKind::GetAttr(i) => self.emit_get_attr(op, &self.entity.attributes[i], &mut out),
                OpKind::SetAttr(i) => self.emit_set_attr(op, &self.entity.attributes[i], &mut out),
                OpKind::GetChild(i) => self.emit_get_child(op, &self.entity.children[i], &mut out),
                OpKind::SetChild(i) => self.emit_set_child(op, &self.entity.children[i], &mut out),
                OpKind::NumberOf(i) => self.emit_number_of(op, &self.entity.children[i], &mut out),
                OpKind::AddChild(i) => self.emit_add_child(op, &self.entity.children[i], &mut out),
                OpKind::RemoveChild(i) => {
                    self.emit_remove_child(op, &self.entity.children[i], &mut out);
                }
                OpKind::CreateChild(i) => {
                    self.emit_create_child(op, &self.entity.children[i], &mut out);
                }
                OpKind::Xml => self.emit_xml(op, &mut out),
                OpKind::XmlAttributes => self.emit_xml_attributes(op, &mut out),
                OpKind::XmlChildren => self.emit_xml_children(op, &mut out),
                OpKind::StartElement => self.emit_start_element(op, &mut out),
                OpKind::EndElement => self.emit_end_element(op, &mut out),
                OpKind::Characters => self.emit_characters(op, &mut out),
                OpKind::InitAttributes => self.emit_init_attributes(op, &mut out),
            }
        }
        out
    }

    fn emit_includes(&self, out: &mut String) {
        let ns = &self.entity.namespace;
        out.push_str("#include <stdlib.h>\n");
        out.push_str("#include <string.h>\n");
        out.push_str("#include <libxml/xmlwriter.h>\n");
        out.push_str("#include <pharmml/common_types.h>\n");
        out.push_str("#include <pharmml/string.h>\n");
        out.push_str(&format!("#include <{}/{}.h>\n", ns, self.entity.name));
        out.push_str(&format!(
            "#include <{}/private/{}.h>\n\n",
            ns, self.entity.name
        ));
    }

    fn emit_new(&self, op: &Operation, out: &mut String) {
        let class = &self.entity.class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!(
            "\t{class} *object = calloc(sizeof({class}), 1);\n"
        ));
        out.push_str("\tif (!object) {\n\t\treturn NULL;\n\t}\n");
        out.push_str("\tobject->reference_count = 1;\n");
        if self.entity.needs_name {
            out.push_str("\tobject->element_name = pharmml_strdup(name);\n");
            out.push_str("\tif (!object->element_name) {\n");
            out.push_str("\t\tfree(object);\n");
            out.push_str("\t\treturn NULL;\n");
            out.push_str("\t}\n");
        }
        if let Some(base) = &self.entity.base {
            out.push_str(&format!("\tobject->base = {}_new(name);\n", base.class_name));
            out.push_str("\tif (!object->base) {\n");
            out.push_str("\t\tfree(object->element_name);\n");
            out.push_str("\t\tfree(object);\n");
            out.push_str("\t\treturn NULL;\n");
            out.push_str("\t}\n");
        }
        out.push_str("\treturn object;\n}\n\n");
    }

    fn emit_copy(&self, op: &Operation, out: &mut String) {
        let class = &self.entity.class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        if self.entity.needs_name {
            out.push_str(&format!(
                "\t{class} *dest = {class}_new(self->element_name);\n"
            ));
        } else {
            out.push_str(&format!("\t{class} *dest = {class}_new();\n"));
        }
        out.push_str("\tif (!dest) {\n\t\treturn NULL;\n\t}\n");
        if let Some(base) = &self.entity.base {
            let base_class = &base.class_name;
            out.push_str(&format!(
                "\t{base_class} *base_copy = {base_class}_copy(self->base);\n"
            ));
            out.push_str(&format!(
                "\tif (!base_copy) {{\n\t\t{class}_free(dest);\n\t\treturn NULL;\n\t}}\n"
            ));
            out.push_str(&format!("\t{base_class}_unref(dest->base);\n"));
            out.push_str("\tdest->base = base_copy;\n");
        }
        for attr in &self.entity.attributes {
            let name = &attr.name;
            match attr.kind {
                AttrKind::Str => {
                    out.push_str(&format!("\tif (self->{name}) {{\n"));
                    out.push_str(&format!(
                        "\t\tdest->{name} = pharmml_strdup(self->{name});\n"
                    ));
                    out.push_str(&format!(
                        "\t\tif (!dest->{name}) {{\n\t\t\t{class}_free(dest);\n\t\t\treturn NULL;\n\t\t}}\n"
                    ));
                    out.push_str("\t}\n");
                }
                AttrKind::Int => {
                    out.push_str(&format!("\tif (self->{name}) {{\n"));
                    out.push_str(&format!(
                        "\t\tdest->{name}_number = self->{name}_number;\n"
                    ));
                    out.push_str(&format!(
                        "\t\tdest->{name} = &(dest->{name}_number);\n"
                    ));
                    out.push_str("\t}\n");
                }
            }
        }
        for child in &self.entity.children {
            let name = &child.name;
            if child.array {
                let child_class = &child.composite().expect("array slots are classes").class_name;
                out.push_str(&format!("\tif (self->num_{name}) {{\n"));
                out.push_str(&format!(
                    "\t\tdest->{name} = calloc(self->num_{name} * sizeof({child_class} *), 1);\n"
                ));
                out.push_str(&format!(
                    "\t\tif (!dest->{name}) {{\n\t\t\t{class}_free(dest);\n\t\t\treturn NULL;\n\t\t}}\n"
                ));
                out.push_str(&format!("\t\tdest->num_{name} = self->num_{name};\n"));
                out.push_str(&format!(
                    "\t\tfor (int i = 0; i < self->num_{name}; i++) {{\n"
                ));
                out.push_str(&format!(
                    "\t\t\tdest->{name}[i] = {child_class}_copy(self->{name}[i]);\n"
                ));
                out.push_str(&format!(
                    "\t\t\tif (!dest->{name}[i]) {{\n\t\t\t\t{class}_free(dest);\n\t\t\t\treturn NULL;\n\t\t\t}}\n"
                ));
                out.push_str("\t\t}\n");
                out.push_str("\t}\n");
            } else {
                match &child.kind {
                    ChildIrKind::Str => {
                        out.push_str(&format!("\tif (self->{name}) {{\n"));
                        out.push_str(&format!(
                            "\t\tdest->{name} = pharmml_strdup(self->{name});\n"
                        ));
                        out.push_str(&format!(
                            "\t\tif (!dest->{name}) {{\n\t\t\t{class}_free(dest);\n\t\t\treturn NULL;\n\t\t}}\n"
                        ));
                        out.push_str("\t}\n");
                    }
                    ChildIrKind::Real | ChildIrKind::Int => {
                        out.push_str(&format!("\tif (self->{name}) {{\n"));
                        out.push_str(&format!(
                            "\t\tdest->{name}_number = self->{name}_number;\n"
                        ));
                        out.push_str(&format!(
                            "\t\tdest->{name} = &(dest->{name}_number);\n"
                        ));
                        out.push_str("\t}\n");
                    }
                    ChildIrKind::Composite(c) => {
                        let child_class = &c.class_name;
                        out.push_str(&format!("\tif (self->{name}) {{\n"));
                        out.push_str(&format!(
                            "\t\tdest->{name} = {child_class}_copy(self->{name});\n"
                        ));
                        out.push_str(&format!(
                            "\t\tif (!dest->{name}) {{\n\t\t\t{class}_free(dest);\n\t\t\treturn NULL;\n\t\t}}\n"
                        ));
                        out.push_str("\t}\n");
                    }
                }
            }
        }
        out.push_str("\treturn dest;\n}\n\n");
    }

    fn emit_free(&self, op: &Operation, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str("\tif (self) {\n");
        for child in &self.entity.children {
            let name = &child.name;
            if child.array {
                let child_class = &child.composite().expect("array slots are classes").class_name;
                out.push_str(&format!(
                    "\t\tfor (int i = 0; i < self->num_{name}; i++) {{\n"
                ));
                out.push_str(&format!("\t\t\t{child_class}_unref(self->{name}[i]);\n"));
                out.push_str("\t\t}\n");
                out.push_str(&format!("\t\tfree(self->{name});\n"));
            } else {
                match &child.kind {
                    ChildIrKind::Str => {
                        out.push_str(&format!("\t\tfree(self->{name});\n"));
                    }
                    ChildIrKind::Real | ChildIrKind::Int => {}
                    ChildIrKind::Composite(c) => {
                        out.push_str(&format!("\t\t{}_unref(self->{name});\n", c.class_name));
                    }
                }
            }
        }
        for attr in &self.entity.attributes {
            if attr.kind == AttrKind::Str {
                out.push_str(&format!("\t\tfree(self->{});\n", attr.name));
            }
        }
        if let Some(base) = &self.entity.base {
            out.push_str(&format!("\t\t{}_unref(self->base);\n", base.class_name));
        }
        if self.entity.needs_name {
            out.push_str("\t\tfree(self->element_name);\n");
        }
        out.push_str("\t\tfree(self);\n");
        out.push_str("\t}\n}\n\n");
    }

    fn emit_ref(&self, op: &Operation, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str("\tself->reference_count++;\n");
        out.push_str("}\n\n");
    }

    fn emit_unref(&self, op: &Operation, out: &mut String) {
        let class = &self.entity.class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str("\tif (self) {\n");
        out.push_str("\t\tself->reference_count--;\n");
        out.push_str("\t\tif (!self->reference_count) {\n");
        out.push_str(&format!("\t\t\t{class}_free(self);\n"));
        out.push_str("\t\t}\n");
        out.push_str("\t}\n}\n\n");
    }

    fn emit_get_base(&self, op: &Operation, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str("\treturn self->base;\n}\n\n");
    }

    fn emit_set_base(&self, op: &Operation, out: &mut String) {
        let base = self.entity.base.as_ref().expect("set_base without base");
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!("\t{}_unref(self->base);\n", base.class_name));
        out.push_str("\tself->base = value;\n");
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_get_attr(&self, op: &Operation, attr: &AttrIr, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!("\treturn self->{};\n}}\n\n", attr.name));
    }

    fn emit_set_attr(&self, op: &Operation, attr: &AttrIr, out: &mut String) {
        let name = &attr.name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        match attr.kind {
            AttrKind::Str => emit_string_setter_body(name, out),
            AttrKind::Int => emit_optional_scalar_setter_body(name, out),
        }
        out.push_str("}\n\n");
    }

    fn emit_get_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        if child.array {
            out.push_str(&format!("\treturn self->{}[number];\n}}\n\n", child.name));
        } else {
            out.push_str(&format!("\treturn self->{};\n}}\n\n", child.name));
        }
    }

    fn emit_set_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        let name = &child.name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        match &child.kind {
            ChildIrKind::Str => emit_string_setter_body(name, out),
            ChildIrKind::Real | ChildIrKind::Int => emit_optional_scalar_setter_body(name, out),
            ChildIrKind::Composite(c) => {
                out.push_str(&format!("\t{}_unref(self->{name});\n", c.class_name));
                out.push_str(&format!("\tself->{name} = value;\n"));
            }
        }
        out.push_str("}\n\n");
    }

    fn emit_number_of(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!("\treturn self->num_{};\n}}\n\n", child.name));
    }

    fn emit_add_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        let name = &child.name;
        let child_class = &child.composite().expect("array slots are classes").class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!(
            "\t{child_class} **new_array = realloc(self->{name}, (self->num_{name} + 1) * sizeof({child_class} *));\n"
        ));
        out.push_str("\tif (!new_array) {\n\t\treturn 1;\n\t}\n");
        out.push_str(&format!("\tself->{name} = new_array;\n"));
        out.push_str(&format!("\tself->{name}[self->num_{name}] = child;\n"));
        out.push_str(&format!("\tself->num_{name}++;\n"));
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_remove_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        let name = &child.name;
        let child_class = &child.composite().expect("array slots are classes").class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str(&format!(
            "\tif (index < 0 || index >= self->num_{name}) {{\n\t\treturn 0;\n\t}}\n"
        ));
        out.push_str(&format!("\t{child_class} *removed = self->{name}[index];\n"));
        out.push_str(&format!("\tself->num_{name}--;\n"));
        // Swap the final element into the hole; a no-op when index was last.
        out.push_str(&format!(
            "\tself->{name}[index] = self->{name}[self->num_{name}];\n"
        ));
        out.push_str(&format!("\t{child_class}_unref(removed);\n"));
        out.push_str(&format!("\tif (self->num_{name} == 0) {{\n"));
        out.push_str(&format!("\t\tfree(self->{name});\n"));
        out.push_str(&format!("\t\tself->{name} = NULL;\n"));
        out.push_str("\t\treturn 0;\n\t}\n");
        out.push_str(&format!(
            "\t{child_class} **new_array = realloc(self->{name}, self->num_{name} * sizeof({child_class} *));\n"
        ));
        out.push_str(&format!(
            "\tif (new_array) {{\n\t\tself->{name} = new_array;\n\t}}\n"
        ));
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_create_child(&self, op: &Operation, child: &ChildIr, out: &mut String) {
        let name = &child.name;
        let composite = child.composite().expect("create is for class slots");
        let child_class = &composite.class_name;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        match child.construct_name() {
            Some(element) => out.push_str(&format!(
                "\t{child_class} *obj = {child_class}_new(\"{element}\");\n"
            )),
            None => out.push_str(&format!("\t{child_class} *obj = {child_class}_new();\n")),
        }
        out.push_str("\tif (!obj) {\n\t\treturn NULL;\n\t}\n");
        if child.array {
            out.push_str(&format!(
                "\t{child_class} **new_array = realloc(self->{name}, (self->num_{name} + 1) * sizeof({child_class} *));\n"
            ));
            out.push_str(&format!(
                "\tif (!new_array) {{\n\t\t{child_class}_unref(obj);\n\t\treturn NULL;\n\t}}\n"
            ));
            out.push_str(&format!("\tself->{name} = new_array;\n"));
            out.push_str(&format!("\tself->{name}[self->num_{name}] = obj;\n"));
            out.push_str(&format!("\tself->num_{name}++;\n"));
        } else {
            out.push_str(&format!("\tself->{name} = obj;\n"));
        }
        out.push_str("\treturn obj;\n}\n\n");
    }

    fn emit_xml(&self, op: &Operation, out: &mut String) {
        let class = &self.entity.class_name;
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let emits_element = entity.has_members() || entity.base.is_some() || entity.needs_name;
        if !emits_element {
            out.push_str("\treturn 0;\n}\n\n");
            return;
        }
        out.push_str("\tint rc;\n");
        if !entity.needs_name && entity.has_members() {
            let tests: Vec<String> = entity
                .attributes
                .iter()
                .map(|a| format!("self->{}", a.name))
                .chain(entity.children.iter().map(|c| format!("self->{}", c.name)))
                .collect();
            out.push_str(&format!("\tif (!({})) {{\n", tests.join(" || ")));
            out.push_str("\t\treturn 0;\n\t}\n");
        }
        if entity.needs_name {
            out.push_str(
                "\trc = xmlTextWriterStartElement(writer, BAD_CAST self->element_name);\n",
            );
        } else {
            out.push_str(&format!(
                "\trc = xmlTextWriterStartElement(writer, BAD_CAST \"{}\");\n",
                entity.xml_tag
            ));
        }
        out.push_str("\tif (rc < 0) {\n\t\treturn 1;\n\t}\n");
        out.push_str(&format!("\trc = {class}_xml_attributes(self, writer);\n"));
        out.push_str("\tif (rc != 0) {\n\t\treturn rc;\n\t}\n");
        out.push_str(&format!("\trc = {class}_xml_children(self, writer);\n"));
        out.push_str("\tif (rc != 0) {\n\t\treturn rc;\n\t}\n");
        out.push_str("\trc = xmlTextWriterEndElement(writer);\n");
        out.push_str("\tif (rc < 0) {\n\t\treturn 1;\n\t}\n");
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_xml_attributes(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let has_work = entity.base.is_some()
            || !entity.fixed_attributes.is_empty()
            || !entity.attributes.is_empty();
        if !has_work {
            out.push_str("\treturn 0;\n}\n\n");
            return;
        }
        out.push_str("\tint rc;\n");
        if let Some(base) = &entity.base {
            out.push_str(&format!(
                "\trc = {}_xml_attributes(self->base, writer);\n",
                base.class_name
            ));
            out.push_str("\tif (rc != 0) {\n\t\treturn rc;\n\t}\n");
        }
        for attr in &entity.attributes {
            let name = &attr.name;
            out.push_str(&format!("\tif (self->{name}) {{\n"));
            match attr.kind {
                AttrKind::Str => {
                    out.push_str(&format!(
                        "\t\trc = xmlTextWriterWriteAttribute(writer, BAD_CAST \"{name}\", BAD_CAST self->{name});\n"
                    ));
                    out.push_str("\t\tif (rc < 0) {\n\t\t\treturn 1;\n\t\t}\n");
                }
                AttrKind::Int => {
                    out.push_str(&format!(
                        "\t\tchar *attr_string = pharmml_int_to_string(self->{name}_number);\n"
                    ));
                    out.push_str("\t\tif (!attr_string) {\n\t\t\treturn 1;\n\t\t}\n");
                    out.push_str(&format!(
                        "\t\trc = xmlTextWriterWriteAttribute(writer, BAD_CAST \"{name}\", BAD_CAST attr_string);\n"
                    ));
                    out.push_str("\t\tfree(attr_string);\n");
                    out.push_str("\t\tif (rc < 0) {\n\t\t\treturn 1;\n\t\t}\n");
                }
            }
            out.push_str("\t}\n");
        }
        for fixed in &entity.fixed_attributes {
            out.push_str(&format!(
                "\trc = xmlTextWriterWriteAttribute(writer, BAD_CAST \"{}\", BAD_CAST \"{}\");\n",
                fixed.name, fixed.value
            ));
            out.push_str("\tif (rc < 0) {\n\t\treturn 1;\n\t}\n");
        }
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_xml_children(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let has_work = entity.base.is_some() || !entity.children.is_empty();
        if !has_work {
            out.push_str("\treturn 0;\n}\n\n");
            return;
        }
        out.push_str("\tint rc;\n");
        if let Some(base) = &entity.base {
            out.push_str(&format!(
                "\trc = {}_xml_children(self->base, writer);\n",
                base.class_name
            ));
            out.push_str("\tif (rc != 0) {\n\t\treturn rc;\n\t}\n");
        }
        for child in &entity.children {
            let name = &child.name;
            if child.array {
                let child_class = &child.composite().expect("array slots are classes").class_name;
                out.push_str(&format!(
                    "\tfor (int i = 0; i < self->num_{name}; i++) {{\n"
                ));
                out.push_str(&format!(
                    "\t\trc = {child_class}_xml(self->{name}[i], writer);\n"
                ));
                out.push_str("\t\tif (rc != 0) {\n\t\t\treturn rc;\n\t\t}\n");
                out.push_str("\t}\n");
                continue;
            }
            out.push_str(&format!("\tif (self->{name}) {{\n"));
            match &child.kind {
                ChildIrKind::Str => {
                    out.push_str(&format!(
                        "\t\trc = xmlTextWriterWriteElement(writer, BAD_CAST \"{}\", BAD_CAST self->{name});\n",
                        child.xml_tag
                    ));
                    out.push_str("\t\tif (rc < 0) {\n\t\t\treturn 1;\n\t\t}\n");
                }
                ChildIrKind::Real | ChildIrKind::Int => {
                    let convert = match child.kind {
                        ChildIrKind::Real => "pharmml_double_to_string",
                        _ => "pharmml_int_to_string",
                    };
                    out.push_str(&format!(
                        "\t\tchar *number_string = {convert}(self->{name}_number);\n"
                    ));
                    out.push_str("\t\tif (!number_string) {\n\t\t\treturn 1;\n\t\t}\n");
                    out.push_str(&format!(
                        "\t\trc = xmlTextWriterWriteElement(writer, BAD_CAST \"{}\", BAD_CAST number_string);\n",
                        child.xml_tag
                    ));
                    out.push_str("\t\tfree(number_string);\n");
                    out.push_str("\t\tif (rc < 0) {\n\t\t\treturn 1;\n\t\t}\n");
                }
                ChildIrKind::Composite(c) => {
                    out.push_str(&format!(
                        "\t\trc = {}_xml(self->{name}, writer);\n",
                        c.class_name
                    ));
                    out.push_str("\t\tif (rc != 0) {\n\t\t\treturn rc;\n\t\t}\n");
                }
            }
            out.push_str("\t}\n");
        }
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_start_element(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let mut branches: Vec<String> = Vec::new();

        // Forward the event while inside an open complex child; at most one
        // flag is set at a time.
        for child in &entity.children {
            let Some(composite) = child.composite() else {
                continue;
            };
            let name = &child.name;
            let target = if child.array {
                format!("self->{name}[self->num_{name} - 1]")
            } else {
                format!("self->{name}")
            };
            let mut branch = format!("if (self->in_{name}) {{\n");
            branch.push_str(&format!(
                "\t\tint fail = {}_start_element({target}, localname, nb_attributes, attributes);\n",
                composite.class_name
            ));
            branch.push_str("\t\tif (fail) {\n\t\t\treturn fail;\n\t\t}\n");
            branch.push_str("\t}");
            branches.push(branch);
        }

        // Otherwise match the tag against this entity's declared children.
        for child in &entity.children {
            let name = &child.name;
            let mut branch = format!("if (strcmp(localname, \"{name}\") == 0) {{\n");
            if let Some(composite) = child.composite() {
                branch.push_str(&format!(
                    "\t\t{} *{name} = {}_create_{name}(self);\n",
                    composite.class_name, entity.class_name
                ));
                branch.push_str(&format!(
                    "\t\tif (!{name}) {{\n\t\t\treturn 1;\n\t\t}}\n"
                ));
                if composite.has_attributes {
                    branch.push_str(&format!(
                        "\t\tint fail = {}_init_attributes({name}, nb_attributes, attributes);\n",
                        composite.class_name
                    ));
                    branch.push_str("\t\tif (fail) {\n\t\t\treturn 1;\n\t\t}\n");
                }
            }
            branch.push_str(&format!("\t\tself->in_{name} = 1;\n"));
            branch.push_str("\t}");
            branches.push(branch);
        }

        match (&entity.base, branches.is_empty()) {
            (Some(base), true) => {
                out.push_str(&format!(
                    "\tint fail = {}_start_element(self->base, localname, nb_attributes, attributes);\n",
                    base.class_name
                ));
                out.push_str("\tif (fail) {\n\t\treturn fail;\n\t}\n");
            }
            (Some(base), false) => {
                let mut branch = "{\n".to_string();
                branch.push_str(&format!(
                    "\t\tint fail = {}_start_element(self->base, localname, nb_attributes, attributes);\n",
                    base.class_name
                ));
                branch.push_str("\t\tif (fail) {\n\t\t\treturn fail;\n\t\t}\n");
                branch.push_str("\t}");
                branches.push(branch);
            }
            (None, _) => {}
        }

        if !branches.is_empty() {
            out.push('\t');
            out.push_str(&branches.join(" else "));
            out.push('\n');
        }
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_end_element(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let mut branches: Vec<String> = Vec::new();

        // A closing tag matching an open immediate child closes it.
        for child in &entity.children {
            let name = &child.name;
            branches.push(format!(
                "if (strcmp(localname, \"{name}\") == 0 && self->in_{name}) {{\n\t\tself->in_{name} = 0;\n\t}}"
            ));
        }

        // Otherwise forward to whichever complex child is still open.
        for child in &entity.children {
            let Some(composite) = child.composite() else {
                continue;
            };
            let name = &child.name;
            let target = if child.array {
                format!("self->{name}[self->num_{name} - 1]")
            } else {
                format!("self->{name}")
            };
            branches.push(format!(
                "if (self->in_{name}) {{\n\t\t{}_end_element({target}, localname);\n\t}}",
                composite.class_name
            ));
        }

        match (&entity.base, branches.is_empty()) {
            (Some(base), true) => {
                out.push_str(&format!(
                    "\t{}_end_element(self->base, localname);\n",
                    base.class_name
                ));
            }
            (Some(base), false) => {
                branches.push(format!(
                    "{{\n\t\t{}_end_element(self->base, localname);\n\t}}",
                    base.class_name
                ));
            }
            (None, _) => {}
        }

        if !branches.is_empty() {
            out.push('\t');
            out.push_str(&branches.join(" else "));
            out.push('\n');
        }
        out.push_str("}\n\n");
    }

    fn emit_characters(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        let mut branches: Vec<String> = Vec::new();

        for child in &entity.children {
            let name = &child.name;
            let mut branch = format!("if (self->in_{name}) {{\n");
            match &child.kind {
                ChildIrKind::Str => {
                    branch.push_str(&format!(
                        "\t\tself->{name} = pharmml_strndup(ch, len);\n"
                    ));
                    branch.push_str(&format!(
                        "\t\tif (!self->{name}) {{\n\t\t\treturn 1;\n\t\t}}\n"
                    ));
                }
                ChildIrKind::Real => {
                    branch.push_str(&format!(
                        "\t\tself->{name}_number = pharmml_string_to_double(ch);\n"
                    ));
                    branch.push_str(&format!(
                        "\t\tself->{name} = &(self->{name}_number);\n"
                    ));
                }
                ChildIrKind::Int => {
                    branch.push_str(&format!(
                        "\t\tself->{name}_number = pharmml_string_to_int(ch);\n"
                    ));
                    branch.push_str(&format!(
                        "\t\tself->{name} = &(self->{name}_number);\n"
                    ));
                }
                ChildIrKind::Composite(c) => {
                    let target = if child.array {
                        format!("self->{name}[self->num_{name} - 1]")
                    } else {
                        format!("self->{name}")
                    };
                    branch.push_str(&format!(
                        "\t\tint fail = {}_characters({target}, ch, len);\n",
                        c.class_name
                    ));
                    branch.push_str("\t\tif (fail) {\n\t\t\treturn fail;\n\t\t}\n");
                }
            }
            branch.push_str("\t}");
            branches.push(branch);
        }

        match (&entity.base, branches.is_empty()) {
            (Some(base), true) => {
                out.push_str(&format!(
                    "\tint fail = {}_characters(self->base, ch, len);\n",
                    base.class_name
                ));
                out.push_str("\tif (fail) {\n\t\treturn fail;\n\t}\n");
            }
            (Some(base), false) => {
                let mut branch = "{\n".to_string();
                branch.push_str(&format!(
                    "\t\tint fail = {}_characters(self->base, ch, len);\n",
                    base.class_name
                ));
                branch.push_str("\t\tif (fail) {\n\t\t\treturn fail;\n\t\t}\n");
                branch.push_str("\t}");
                branches.push(branch);
            }
            (None, _) => {}
        }

        if !branches.is_empty() {
            out.push('\t');
            out.push_str(&branches.join(" else "));
            out.push('\n');
        }
        out.push_str("\treturn 0;\n}\n\n");
    }

    fn emit_init_attributes(&self, op: &Operation, out: &mut String) {
        let entity = self.entity;
        out.push_str(&format!("{}\n{{\n", signature(op)));
        out.push_str("\tunsigned int index = 0;\n");
        out.push_str("\tfor (int i = 0; i < nb_attributes; i++, index += 5) {\n");
        out.push_str("\t\tconst char *localname = attributes[index];\n");
        out.push_str("\t\tconst char *valueBegin = attributes[index + 3];\n");
        out.push_str("\t\tconst char *valueEnd = attributes[index + 4];\n");
        let mut branches: Vec<String> = Vec::new();
        for attr in &entity.attributes {
            let name = &attr.name;
            let mut branch = format!("if (strcmp(localname, \"{name}\") == 0) {{\n");
            match attr.kind {
                AttrKind::Str => {
                    branch.push_str(&format!(
                        "\t\t\tself->{name} = pharmml_strndup(valueBegin, valueEnd - valueBegin);\n"
                    ));
                    branch.push_str(&format!(
                        "\t\t\tif (!self->{name}) {{\n\t\t\t\treturn 1;\n\t\t\t}}\n"
                    ));
                }
                AttrKind::Int => {
                    branch.push_str(
                        "\t\t\tchar *value = pharmml_strndup(valueBegin, valueEnd - valueBegin);\n",
                    );
                    branch.push_str("\t\t\tif (!value) {\n\t\t\t\treturn 1;\n\t\t\t}\n");
                    branch.push_str(&format!(
                        "\t\t\tself->{name}_number = pharmml_string_to_int(value);\n"
                    ));
                    branch.push_str(&format!(
                        "\t\t\tself->{name} = &(self->{name}_number);\n"
                    ));
                    branch.push_str("\t\t\tfree(value);\n");
                }
            }
            branch.push_str("\t\t}");
            branches.push(branch);
        }
        out.push_str("\t\t");
        out.push_str(&branches.join(" else "));
        out.push('\n');
        out.push_str("\t}\n");
        out.push_str("\treturn 0;\n}\n\n");
    }
}

fn emit_string_setter_body(name: &str, out: &mut String) {
    out.push_str("\tif (!value) {\n");
    out.push_str(&format!("\t\tfree(self->{name});\n"));
    out.push_str(&format!("\t\tself->{name} = NULL;\n"));
    out.push_str("\t\treturn 0;\n\t}\n");
    out.push_str("\tchar *new_value = pharmml_strdup(value);\n");
    out.push_str("\tif (!new_value) {\n\t\treturn 1;\n\t}\n");
    out.push_str(&format!("\tfree(self->{name});\n"));
    out.push_str(&format!("\tself->{name} = new_value;\n"));
    out.push_str("\treturn 0;\n");
}

fn emit_optional_scalar_setter_body(name: &str, out: &mut String) {
    out.push_str("\tif (value) {\n");
    out.push_str(&format!("\t\tself->{name}_number = *value;\n"));
    out.push_str(&format!("\t\tself->{name} = &(self->{name}_number);\n"));
    out.push_str("\t} else {\n");
    out.push_str(&format!("\t\tself->{name} = NULL;\n"));
    out.push_str("\t}\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::SchemaIr;
    use sobind_schema::standard_output_schema;

    fn generate_for(name: &str) -> String {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        SourceGenerator::new(ir.get(name).unwrap()).generate()
    }

    #[test]
    fn test_new_sets_refcount() {
        let code = generate_for("Message");
        assert!(code.contains("so_Message *so_Message_new()"));
        assert!(code.contains("object->reference_count = 1;"));
    }

    #[test]
    fn test_named_new_duplicates_name_and_builds_base() {
        let code = generate_for("SimulationSubType");
        assert!(code.contains("so_SimulationSubType *so_SimulationSubType_new(char *name)"));
        assert!(code.contains("object->element_name = pharmml_strdup(name);"));
        assert!(code.contains("object->base = so_Table_new(name);"));
    }

    #[test]
    fn test_copy_deep_copies_arrays_in_order() {
        let code = generate_for("SO");
        assert!(code.contains("dest->num_SOBlock = self->num_SOBlock;"));
        assert!(code.contains("dest->SOBlock[i] = so_SOBlock_copy(self->SOBlock[i]);"));
        // failure mid-copy releases the partial clone
        assert!(code.contains("so_SO_free(dest);"));
    }

    #[test]
    fn test_free_is_null_safe_and_unref_based() {
        let code = generate_for("SO");
        assert!(code.contains("void so_SO_free(so_SO *self)\n{\n\tif (self) {"));
        assert!(code.contains("so_SOBlock_unref(self->SOBlock[i]);"));
        assert!(code.contains("so_PharmMLRef_unref(self->PharmMLRef);"));
    }

    #[test]
    fn test_unref_frees_at_zero() {
        let code = generate_for("Message");
        assert!(code.contains("self->reference_count--;"));
        assert!(code.contains("if (!self->reference_count) {\n\t\t\tso_Message_free(self);"));
    }

    #[test]
    fn test_string_setter_duplicates_and_releases_old() {
        let code = generate_for("SOBlock");
        assert!(code.contains("int so_SOBlock_set_blkId(so_SOBlock *self, char *value)"));
        assert!(code.contains("char *new_value = pharmml_strdup(value);"));
        assert!(code.contains("free(self->blkId);"));
    }

    #[test]
    fn test_scalar_child_setter_unrefs_old_occupant() {
        let code = generate_for("Message");
        assert!(code.contains(
            "void so_Message_set_Toolname(so_Message *self, so_Toolname *value)\n{\n\tso_Toolname_unref(self->Toolname);"
        ));
    }

    #[test]
    fn test_swap_remove_semantics() {
        let code = generate_for("SO");
        assert!(code.contains("so_SOBlock *removed = self->SOBlock[index];"));
        assert!(code.contains("self->num_SOBlock--;"));
        assert!(code.contains("self->SOBlock[index] = self->SOBlock[self->num_SOBlock];"));
        assert!(code.contains("so_SOBlock_unref(removed);"));
        assert!(code.contains("if (self->num_SOBlock == 0) {\n\t\tfree(self->SOBlock);\n\t\tself->SOBlock = NULL;"));
        // the historical shift loop must not come back
        assert!(!code.contains("[i + 1]"));
    }

    #[test]
    fn test_create_scalar_replaces_without_release() {
        let code = generate_for("Message");
        assert!(code.contains("so_Toolname *so_Message_create_Toolname(so_Message *self)"));
        assert!(code.contains("\tself->Toolname = obj;\n\treturn obj;"));
        assert!(!code.contains("so_Toolname_unref(self->Toolname);\n\tself->Toolname = obj;"));
    }

    #[test]
    fn test_create_passes_slot_name_to_named_types() {
        let code = generate_for("Estimation");
        assert!(code.contains("so_Table *obj = so_Table_new(\"Predictions\");"));
        let code = generate_for("ExternalFile");
        assert!(code.contains("so_MissingData *obj = so_MissingData_new();"));
    }

    #[test]
    fn test_xml_gates_on_populated_members() {
        let code = generate_for("Message");
        assert!(code.contains(
            "if (!(self->type || self->Toolname || self->Name || self->Content || self->Severity)) {"
        ));
        assert!(code.contains("xmlTextWriterStartElement(writer, BAD_CAST \"Message\")"));
    }

    #[test]
    fn test_named_entity_xml_always_emits_stored_name() {
        let code = generate_for("ExternalFile");
        assert!(code.contains("xmlTextWriterStartElement(writer, BAD_CAST self->element_name)"));
        assert!(!code.contains("if (!(self->oid"));
    }

    #[test]
    fn test_derived_xml_layers_onto_base_element() {
        let code = generate_for("SimulationSubType");
        // one element, attributes and children both delegate base-first
        assert!(code.contains("rc = so_Table_xml_attributes(self->base, writer);"));
        assert!(code.contains("rc = so_Table_xml_children(self->base, writer);"));
        assert!(!code.contains("so_Table_xml(self->base"));
    }

    #[test]
    fn test_element_name_override_in_xml() {
        let code = generate_for("Bayesian_PPE");
        assert!(code.contains("xmlTextWriterStartElement(writer, BAD_CAST \"Bayesian\")"));
    }

    #[test]
    fn test_prefixed_primitive_child_tags() {
        let code = generate_for("Toolname");
        assert!(code.contains("BAD_CAST \"ct:String\""));
    }

    #[test]
    fn test_fixed_attributes_always_written() {
        let code = generate_for("SO");
        assert!(code.contains(
            "xmlTextWriterWriteAttribute(writer, BAD_CAST \"writtenVersion\", BAD_CAST \"0.3.1\")"
        ));
    }

    #[test]
    fn test_start_element_forwards_into_open_child() {
        let code = generate_for("SO");
        assert!(code.contains(
            "if (self->in_SOBlock) {\n\t\tint fail = so_SOBlock_start_element(self->SOBlock[self->num_SOBlock - 1], localname, nb_attributes, attributes);"
        ));
    }

    #[test]
    fn test_start_element_inits_attributes_of_attribute_bearing_children() {
        let code = generate_for("SO");
        assert!(code.contains("so_SOBlock_init_attributes(SOBlock, nb_attributes, attributes);"));
        // PharmMLRef has attributes too
        assert!(code.contains("so_PharmMLRef_init_attributes(PharmMLRef, nb_attributes, attributes);"));
    }

    #[test]
    fn test_start_element_delegates_to_base_when_unmatched() {
        let code = generate_for("SimulationSubType");
        assert!(code.contains(
            "int fail = so_Table_start_element(self->base, localname, nb_attributes, attributes);"
        ));
    }

    #[test]
    fn test_end_element_clears_matching_flag_first() {
        let code = generate_for("Message");
        assert!(code.contains(
            "if (strcmp(localname, \"Toolname\") == 0 && self->in_Toolname) {\n\t\tself->in_Toolname = 0;"
        ));
        assert!(code.contains("else if (self->in_Toolname) {\n\t\tso_Toolname_end_element(self->Toolname, localname);"));
    }

    #[test]
    fn test_characters_captures_primitives() {
        let code = generate_for("Severity");
        assert!(code.contains("self->Int_number = pharmml_string_to_int(ch);"));
        assert!(code.contains("self->Int = &(self->Int_number);"));
        let code = generate_for("Toolname");
        assert!(code.contains("self->String = pharmml_strndup(ch, len);"));
    }

    #[test]
    fn test_init_attributes_scans_flat_list() {
        let code = generate_for("SOBlock");
        assert!(code.contains("for (int i = 0; i < nb_attributes; i++, index += 5) {"));
        assert!(code.contains("if (strcmp(localname, \"blkId\") == 0) {"));
    }

    #[test]
    fn test_init_attributes_parses_int_attrs() {
        let code = generate_for("SimulationBlock");
        assert!(code.contains("self->replicate_number = pharmml_string_to_int(value);"));
        assert!(code.contains("free(value);"));
    }

    #[test]
    fn test_every_op_has_exactly_one_body() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        for entity in &ir.entities {
            let code = SourceGenerator::new(entity).generate();
            for op in &entity.ops {
                let definition = format!("{}\n{{\n", crate::c::signature(op));
                assert_eq!(
                    code.matches(&definition).count(),
                    1,
                    "expected exactly one body for {}",
                    op.name
                );
            }
        }
    }

    #[test]
    fn test_set_base_releases_old_occupant() {
        let code = generate_for("SimulationSubType");
        assert!(code.contains(
            "int so_SimulationSubType_set_base(so_SimulationSubType *self, so_Table *value)\n{\n\tso_Table_unref(self->base);"
        ));
    }
}
