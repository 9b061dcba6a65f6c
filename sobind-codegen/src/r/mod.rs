//! R binding generation modules.

pub mod classes;
pub mod native;

pub use classes::{ClassGenerator, NamespaceGenerator};
pub use native::{NativeGenerator, RegistrationGenerator};
