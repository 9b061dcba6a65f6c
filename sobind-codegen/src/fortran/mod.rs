//! Fortran binding synthesis.
//!
//! Emits a single module exposing every public operation to Fortran: a
//! `c_ptr`-wrapping derived type per class, a `bind(C)` interface block per
//! operation and a wrapper procedure doing the argument and result
//! conversions. Everything renders from the shared operation tables; the
//! emitted C headers are never re-parsed.

use std::collections::HashSet;

use sobind_schema::ir::{CType, Operation, SchemaIr};
use sobind_schema::naming;

use crate::error::CodegenError;

/// Fortran free-form line length limit.
const LINE_LIMIT: usize = 131;

/// Generator for the Fortran binding module.
pub struct FortranGenerator<'a> {
    ir: &'a SchemaIr,
}

impl<'a> FortranGenerator<'a> {
    /// Creates a new Fortran generator.
    #[must_use]
    pub fn new(ir: &'a SchemaIr) -> Self {
        Self { ir }
    }

    /// Generates the module contents.
    ///
    /// # Errors
    /// Returns [`CodegenError::UnmanglableName`] when shortening an
    /// over-long operation name collides with another operation.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let mut used_names = HashSet::new();
        let mut types = String::new();
        let mut interface = String::new();
        let mut contains = String::new();

        for class in self.referenced_classes() {
            types.push_str(&format!("\ttype {class}\n"));
            types.push_str("\t\ttype(c_ptr) :: ptr\n");
            types.push_str(&format!("\tend type {class}\n\n"));
        }

        interface.push_str("\tinterface\n");
        interface.push_str("\t\tfunction so_strlen(string) bind(C, name=\"strlen\")\n");
        interface.push_str("\t\t\tuse iso_c_binding\n");
        interface.push_str("\t\t\ttype(c_ptr),intent(in),value :: string\n");
        interface.push_str("\t\t\tinteger(kind = c_size_t) :: so_strlen\n");
        interface.push_str("\t\tend function so_strlen\n\n");

        for entity in &self.ir.entities {
            for op in entity.public_ops() {
                let mangled = naming::fortran_mangle(&op.name);
                if !used_names.insert(mangled.clone()) {
                    return Err(CodegenError::UnmanglableName {
                        name: op.name.clone(),
                    });
                }
                emit_interface(op, &mangled, &mut interface);
                emit_wrapper(op, &mangled, &mut contains);
            }
        }
        interface.push_str("\tend interface\n");

        let mut out = String::new();
        out.push_str("module soc\n\n");
        out.push_str("\tuse iso_c_binding\n\n");
        out.push_str("\timplicit none\n\n");
        out.push_str("\tinteger, parameter :: dp = selected_real_kind(15, 307)\n\n");
        out.push_str(&types);
        out.push_str(&line_break(&interface));
        out.push('\n');
        out.push_str("\tcontains\n\n");
        out.push_str(&line_break(&contains));
        out.push_str("end module soc\n");
        Ok(out)
    }

    /// Collects every class a derived type is needed for, built-ins first.
    fn referenced_classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !classes.contains(&name) {
                classes.push(name);
            }
        };
        for entity in &self.ir.entities {
            for child in &entity.children {
                if let Some(composite) = child.composite() {
                    if matches!(composite.type_name.as_str(), "Table" | "Matrix") {
                        push(composite.class_name.clone());
                    }
                }
            }
            if let Some(base) = &entity.base {
                push(base.class_name.clone());
            }
        }
        for entity in &self.ir.entities {
            push(entity.class_name.clone());
        }
        classes
    }
}

fn is_function(op: &Operation) -> bool {
    op.ret != CType::Void
}

fn emit_interface(op: &Operation, mangled: &str, out: &mut String) {
    let kind = if is_function(op) { "function" } else { "subroutine" };
    let args: Vec<&str> = op.params.iter().map(|p| p.name.as_str()).collect();
    let head = format!("\t\t{kind} c{mangled}({})", args.join(", "));
    let bind = format!("bind(C, name=\"{}\")", op.name);
    // Continuation keeps the bind clause intact on over-long lines.
    if head.len() + bind.len() + 1 > LINE_LIMIT {
        out.push_str(&format!("{head} &\n\t\t\t\t{bind}\n"));
    } else {
        out.push_str(&format!("{head} {bind}\n"));
    }
    out.push_str("\t\t\tuse iso_c_binding\n");
    for param in &op.params {
        out.push_str(&format!("\t\t\t{}\n", c_arg_decl(&param.ty, &param.name)));
    }
    if is_function(op) {
        out.push_str(&format!(
            "\t\t\t{}\n",
            c_result_decl(&op.ret, &format!("c{mangled}"))
        ));
    }
    out.push_str(&format!("\t\tend {kind} c{mangled}\n\n"));
}

fn emit_wrapper(op: &Operation, mangled: &str, out: &mut String) {
    let kind = if is_function(op) { "function" } else { "subroutine" };
    let args: Vec<&str> = op.params.iter().map(|p| p.name.as_str()).collect();
    out.push_str(&format!("\t\t{kind} {mangled}({})\n", args.join(", ")));

    for param in &op.params {
        out.push_str(&format!(
            "\t\t\t{}\n",
            fortran_decl(&param.ty, &param.name)
        ));
        out.push_str(&format!(
            "\t\t\t{}\n",
            conversion_decl(&param.ty, &param.name)
        ));
    }
    if is_function(op) {
        out.push_str(&format!("\t\t\t{}\n", fortran_result_decl(&op.ret, mangled)));
        out.push_str(&format!("\t\t\t{}\n", c_result_decl(&op.ret, "res")));
    }
    for param in &op.params {
        out.push_str(&format!(
            "\t\t\t{}\n",
            conversion_code(&param.ty, &param.name)
        ));
    }

    let new_args: Vec<String> = op.params.iter().map(|p| format!("new_{}", p.name)).collect();
    if is_function(op) {
        out.push_str(&format!("\t\t\tres = c{mangled}({})\n", new_args.join(", ")));
        out.push_str(&format!("\t\t\t{}\n", result_conversion(&op.ret, mangled)));
    } else {
        out.push_str(&format!(
            "\t\t\tcall c{mangled}({})\n",
            new_args.join(", ")
        ));
    }
    out.push_str(&format!("\t\tend {kind} {mangled}\n\n"));
}

fn c_arg_decl(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr | CType::ConstCharPtr => {
            format!("character(kind=c_char) :: {name}(*)")
        }
        CType::Int => format!("integer(c_int),value :: {name}"),
        _ => format!("type(c_ptr),value :: {name}"),
    }
}

fn c_result_decl(ty: &CType, name: &str) -> String {
    match ty {
        CType::Int => format!("integer(c_int) :: {name}"),
        _ => format!("type(c_ptr) :: {name}"),
    }
}

fn fortran_decl(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr | CType::ConstCharPtr => format!("character(len=*) :: {name}"),
        CType::Int => format!("integer :: {name}"),
        CType::IntPtr => format!("integer,pointer :: {name}"),
        CType::DoublePtr => format!("real(kind=dp),pointer :: {name}"),
        CType::Class(class) => format!("type({class}) :: {name}"),
        _ => format!("type(c_ptr) :: {name}"),
    }
}

fn fortran_result_decl(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr => format!("character,pointer,dimension(:) :: {name}"),
        CType::Int => format!("integer :: {name}"),
        CType::IntPtr => format!("integer,pointer :: {name}"),
        CType::DoublePtr => format!("real(kind=dp),pointer :: {name}"),
        CType::Class(class) => format!("type({class}) :: {name}"),
        _ => format!("type(c_ptr) :: {name}"),
    }
}

fn conversion_decl(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr | CType::ConstCharPtr => {
            format!("character(len=len_trim({name}) + 1) :: new_{name}")
        }
        CType::Int => format!("integer(kind=c_int) :: new_{name}"),
        _ => format!("type(c_ptr) :: new_{name}"),
    }
}

fn conversion_code(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr | CType::ConstCharPtr => {
            format!("new_{name} = trim({name}) // c_null_char")
        }
        CType::Int => format!("new_{name} = {name}"),
        CType::IntPtr | CType::DoublePtr => format!("new_{name} = c_loc({name})"),
        CType::Class(_) => format!("new_{name} = {name}%ptr"),
        _ => format!("new_{name} = {name}"),
    }
}

fn result_conversion(ty: &CType, name: &str) -> String {
    match ty {
        CType::CharPtr => format!("call c_f_pointer(res, {name}, [so_strlen(res)])"),
        CType::Int => format!("{name} = res"),
        CType::IntPtr | CType::DoublePtr => format!("call c_f_pointer(res, {name})"),
        CType::Class(_) => format!("{name}%ptr = res"),
        _ => format!("{name} = res"),
    }
}

/// Breaks lines longer than the free-form limit with a continuation.
fn line_break(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if line.len() > LINE_LIMIT {
            out.push_str(&line[..LINE_LIMIT]);
            out.push_str("&\n");
            out.push_str(&line[LINE_LIMIT..]);
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sobind_schema::ir::SchemaIr;
    use sobind_schema::standard_output_schema;

    fn module() -> String {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        FortranGenerator::new(&ir).generate().unwrap()
    }

    #[test]
    fn test_module_shape() {
        let code = module();
        assert!(code.starts_with("module soc\n"));
        assert!(code.contains("\tuse iso_c_binding\n"));
        assert!(code.contains("integer, parameter :: dp = selected_real_kind(15, 307)"));
        assert!(code.ends_with("end module soc\n"));
    }

    #[test]
    fn test_derived_types_for_every_class() {
        let code = module();
        assert!(code.contains("\ttype so_Table\n\t\ttype(c_ptr) :: ptr\n\tend type so_Table"));
        assert!(code.contains("\ttype so_Matrix\n"));
        assert!(code.contains("\ttype so_SOBlock\n"));
    }

    #[test]
    fn test_interface_binds_to_c_name() {
        let code = module();
        assert!(code.contains("function cso_SO_new() bind(C, name=\"so_SO_new\")"));
        assert!(code.contains(
            "subroutine cso_SO_free(self) bind(C, name=\"so_SO_free\")"
        ));
        assert!(code.contains("type(c_ptr),value :: self"));
    }

    #[test]
    fn test_wrapper_converts_strings() {
        let code = module();
        assert!(code.contains("character(len=len_trim(name) + 1) :: new_name"));
        assert!(code.contains("new_name = trim(name) // c_null_char"));
    }

    #[test]
    fn test_wrapper_converts_handles_and_results() {
        let code = module();
        assert!(code.contains("new_self = self%ptr"));
        assert!(code.contains("so_SO_new%ptr = res"));
    }

    #[test]
    fn test_string_result_uses_strlen() {
        let code = module();
        assert!(code.contains("call c_f_pointer(res, so_SOBlock_get_blkId, [so_strlen(res)])"));
    }

    #[test]
    fn test_optional_scalar_passes_c_loc() {
        let code = module();
        assert!(code.contains("new_value = c_loc(value)"));
        assert!(code.contains("real(kind=dp),pointer :: value"));
    }

    #[test]
    fn test_long_names_are_mangled_consistently() {
        let code = module();
        let long = "so_DiagnosticPlotsStructuralModel_create_IndivPredictionVsObserv";
        let mangled = naming::fortran_mangle(long);
        assert!(mangled.len() < long.len());
        assert!(code.contains(&format!("function {mangled}(self)")));
        assert!(code.contains(&format!("bind(C, name=\"{long}\")")));
    }

    #[test]
    fn test_every_public_op_has_interface_and_wrapper() {
        let ir = SchemaIr::from_schema(&standard_output_schema()).unwrap();
        let code = FortranGenerator::new(&ir).generate().unwrap();
        for entity in &ir.entities {
            for op in entity.public_ops() {
                let mangled = naming::fortran_mangle(&op.name);
                assert!(
                    code.contains(&format!("bind(C, name=\"{}\")", op.name)),
                    "missing interface for {}",
                    op.name
                );
                assert!(
                    code.contains(&format!("end function {mangled}"))
                        || code.contains(&format!("end subroutine {mangled}")),
                    "missing wrapper for {}",
                    op.name
                );
            }
        }
    }

    #[test]
    fn test_lines_respect_fortran_limit() {
        let code = module();
        for line in code.lines() {
            assert!(line.len() <= LINE_LIMIT + 1, "line too long: {line}");
        }
    }
}
