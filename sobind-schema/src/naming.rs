//! Naming and type resolution.
//!
//! Pure functions deriving every generated identifier from the schema:
//! qualified class names, accessor names, foreign-binding names and the
//! foreign type spelling for each slot kind. Keeping this in one place is
//! what keeps the four emitters in agreement about what things are called.

use crate::model::{ChildType, Primitive};

/// Maximum identifier length accepted by the Fortran target.
pub const FORTRAN_NAME_MAX: usize = 62;

/// Returns the qualified generated class name for an entity.
#[must_use]
pub fn class_name(namespace: &str, name: &str) -> String {
    format!("{namespace}_{name}")
}

/// Returns the getter name for a member of a class.
#[must_use]
pub fn getter_name(class: &str, member: &str) -> String {
    format!("{class}_get_{member}")
}

/// Returns the setter name for a member of a class.
#[must_use]
pub fn setter_name(class: &str, member: &str) -> String {
    format!("{class}_set_{member}")
}

/// Returns the element-count accessor name for an array slot.
#[must_use]
pub fn number_of_name(class: &str, member: &str) -> String {
    format!("{class}_get_number_of_{member}")
}

/// Returns the append accessor name for an array slot.
#[must_use]
pub fn add_name(class: &str, member: &str) -> String {
    format!("{class}_add_{member}")
}

/// Returns the removal accessor name for an array slot.
#[must_use]
pub fn remove_name(class: &str, member: &str) -> String {
    format!("{class}_remove_{member}")
}

/// Returns the in-place construction accessor name for a slot.
#[must_use]
pub fn create_name(class: &str, member: &str) -> String {
    format!("{class}_create_{member}")
}

/// Returns the scripting-runtime wrapper name for a core operation.
#[must_use]
pub fn r_wrapper_name(operation: &str) -> String {
    format!("r_{operation}")
}

/// Returns the scripting-runtime type spelling for a slot kind.
#[must_use]
pub fn r_type_name(child_type: &ChildType) -> &'static str {
    match child_type {
        ChildType::Primitive(Primitive::Str) => "character",
        ChildType::Primitive(Primitive::Real) => "numeric",
        ChildType::Primitive(Primitive::Int) => "integer",
        ChildType::Table => "data.frame",
        ChildType::Matrix => "matrix",
        ChildType::Reference(_) => "externalptr",
    }
}

/// Returns the numerical-runtime type spelling for a slot kind.
#[must_use]
pub fn fortran_type_name(namespace: &str, child_type: &ChildType) -> String {
    match child_type {
        ChildType::Primitive(Primitive::Str) => "character".to_string(),
        ChildType::Primitive(Primitive::Real) => "real(kind=dp)".to_string(),
        ChildType::Primitive(Primitive::Int) => "integer".to_string(),
        ChildType::Table => format!("type({})", class_name(namespace, "Table")),
        ChildType::Matrix => format!("type({})", class_name(namespace, "Matrix")),
        ChildType::Reference(name) => format!("type({})", class_name(namespace, name)),
    }
}

/// Shortens an operation name to fit the Fortran identifier limit.
///
/// Names within the limit pass through unchanged. Longer names are truncated
/// to [`FORTRAN_NAME_MAX`] characters; the caller is responsible for
/// rejecting a truncation that collides with an already-used name.
#[must_use]
pub fn fortran_mangle(name: &str) -> String {
    if name.len() <= FORTRAN_NAME_MAX {
        name.to_string()
    } else {
        name[..FORTRAN_NAME_MAX].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("so", "SOBlock"), "so_SOBlock");
        assert_eq!(class_name("so", "Bayesian_PPE"), "so_Bayesian_PPE");
    }

    #[test]
    fn test_accessor_names() {
        assert_eq!(getter_name("so_Message", "type"), "so_Message_get_type");
        assert_eq!(setter_name("so_Message", "type"), "so_Message_set_type");
        assert_eq!(
            number_of_name("so_SO", "SOBlock"),
            "so_SO_get_number_of_SOBlock"
        );
        assert_eq!(add_name("so_SO", "SOBlock"), "so_SO_add_SOBlock");
        assert_eq!(remove_name("so_SO", "SOBlock"), "so_SO_remove_SOBlock");
        assert_eq!(create_name("so_SO", "SOBlock"), "so_SO_create_SOBlock");
    }

    #[test]
    fn test_r_wrapper_name() {
        assert_eq!(r_wrapper_name("so_SO_new"), "r_so_SO_new");
    }

    #[test]
    fn test_r_type_name() {
        assert_eq!(r_type_name(&ChildType::Table), "data.frame");
        assert_eq!(r_type_name(&ChildType::Matrix), "matrix");
        assert_eq!(
            r_type_name(&ChildType::Primitive(Primitive::Real)),
            "numeric"
        );
        assert_eq!(r_type_name(&ChildType::reference("SOBlock")), "externalptr");
    }

    #[test]
    fn test_fortran_mangle_short_name_unchanged() {
        assert_eq!(fortran_mangle("so_SO_new"), "so_SO_new");
    }

    #[test]
    fn test_fortran_mangle_truncates() {
        let long = "so_DiagnosticPlotsStructuralModel_create_IndivPredictionVsObserv";
        assert!(long.len() > FORTRAN_NAME_MAX);
        let mangled = fortran_mangle(long);
        assert_eq!(mangled.len(), FORTRAN_NAME_MAX);
        assert!(long.starts_with(&mangled));
    }
}
