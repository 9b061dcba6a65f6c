//! Schema type definitions.
//!
//! This module contains the data structures describing the structured-output
//! class tree: entities, their attributes, child slots and inheritance. The
//! schema is pure data; all behavior lives in resolution and code generation.

use std::collections::HashMap;

/// Complete structured-output schema definition.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Entity definitions in declaration order.
    pub entities: Vec<EntityDef>,
    /// Entity lookup map (built as entities are added).
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates a new empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Adds an entity definition to the schema.
    pub fn add_entity(&mut self, entity: EntityDef) {
        let name = entity.name.clone();
        let idx = self.entities.len();
        self.entities.push(entity);
        self.index.insert(name, idx);
    }

    /// Looks up an entity by name.
    #[must_use]
    pub fn get_entity(&self, name: &str) -> Option<&EntityDef> {
        self.index.get(name).map(|&idx| &self.entities[idx])
    }

    /// Returns true if an entity with the given name is declared.
    #[must_use]
    pub fn has_entity(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Resolves a type name against the schema.
    ///
    /// `Table` and `Matrix` are the built-in container classes; any other
    /// name must be a declared entity. Returns `None` for unknown names —
    /// callers treat that as a fatal schema authoring error.
    #[must_use]
    pub fn resolve_composite(&self, name: &str) -> Option<ChildType> {
        match name {
            "Table" => Some(ChildType::Table),
            "Matrix" => Some(ChildType::Matrix),
            other if self.has_entity(other) => Some(ChildType::Reference(other.to_string())),
            _ => None,
        }
    }
}

/// One schema-declared structured-output class.
#[derive(Debug, Clone)]
pub struct EntityDef {
    /// Unique entity name, also the XML tag unless overridden.
    pub name: String,
    /// Namespace tag selecting the generated class prefix.
    pub namespace: String,
    /// Documentation-only location string.
    pub xpath: String,
    /// Optional single-inheritance base type name.
    pub extends: Option<String>,
    /// True if the constructor takes an explicit element name.
    pub named: bool,
    /// Ordered attribute declarations.
    pub attributes: Vec<AttrDef>,
    /// Ordered child slot declarations.
    pub children: Vec<ChildDef>,
    /// Constant XML attributes, always emitted and never settable.
    pub fixed_attributes: Vec<FixedAttr>,
    /// Override for the emitted XML tag name.
    pub element_name: Option<String>,
    /// Extra opaque struct fields injected verbatim.
    pub fields: Vec<String>,
    /// XML namespace prefix for this entity's own tag.
    pub prefix: Option<String>,
}

impl EntityDef {
    /// Creates a new entity definition with the given name and xpath.
    #[must_use]
    pub fn new(name: &str, xpath: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: "so".to_string(),
            xpath: xpath.to_string(),
            extends: None,
            named: false,
            attributes: Vec::new(),
            children: Vec::new(),
            fixed_attributes: Vec::new(),
            element_name: None,
            fields: Vec::new(),
            prefix: None,
        }
    }

    /// Declares the inheritance base type.
    #[must_use]
    pub fn extends(mut self, base: &str) -> Self {
        self.extends = Some(base.to_string());
        self
    }

    /// Marks the entity as requiring a construction name.
    #[must_use]
    pub fn named(mut self) -> Self {
        self.named = true;
        self
    }

    /// Adds an attribute declaration.
    #[must_use]
    pub fn attr(mut self, name: &str, kind: AttrKind) -> Self {
        self.attributes.push(AttrDef {
            name: name.to_string(),
            kind,
        });
        self
    }

    /// Adds a child slot declaration.
    #[must_use]
    pub fn child(mut self, child: ChildDef) -> Self {
        self.children.push(child);
        self
    }

    /// Adds a constant XML attribute.
    #[must_use]
    pub fn fixed_attr(mut self, name: &str, value: &str) -> Self {
        self.fixed_attributes.push(FixedAttr {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Overrides the emitted XML tag name.
    #[must_use]
    pub fn element_name(mut self, name: &str) -> Self {
        self.element_name = Some(name.to_string());
        self
    }

    /// Injects a verbatim struct field.
    #[must_use]
    pub fn field(mut self, decl: &str) -> Self {
        self.fields.push(decl.to_string());
        self
    }

    /// Returns the XML tag name (override or entity name).
    #[must_use]
    pub fn xml_name(&self) -> &str {
        self.element_name.as_deref().unwrap_or(&self.name)
    }
}

/// One attribute declaration within an entity.
#[derive(Debug, Clone)]
pub struct AttrDef {
    /// Attribute name, matched exactly against document attributes.
    pub name: String,
    /// Storage kind.
    pub kind: AttrKind,
}

/// Attribute storage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrKind {
    /// Heap-duplicated string, NULL when absent.
    Str,
    /// Embedded integer with an optional-pointer shadow.
    Int,
}

/// One named child slot within an entity.
#[derive(Debug, Clone)]
pub struct ChildDef {
    /// Slot name, also the XML tag for the slot.
    pub name: String,
    /// Slot type.
    pub child_type: ChildType,
    /// True for an ordered, append-only sequence of owned children.
    pub array: bool,
    /// Optional XML namespace prefix distinct from the parent's.
    pub prefix: Option<String>,
}

impl ChildDef {
    /// Creates a new scalar child slot.
    #[must_use]
    pub fn new(name: &str, child_type: ChildType) -> Self {
        Self {
            name: name.to_string(),
            child_type,
            array: false,
            prefix: None,
        }
    }

    /// Marks the slot as an array.
    #[must_use]
    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Sets the slot's XML namespace prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    /// Returns the slot's XML tag including the namespace prefix.
    #[must_use]
    pub fn xml_tag(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}:{}", p, self.name),
            None => self.name.clone(),
        }
    }
}

/// Child slot types — a closed set; no stringly-typed dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildType {
    /// A primitive value captured directly from text content.
    Primitive(Primitive),
    /// The built-in tabular container class.
    Table,
    /// The built-in 2D numeric container class.
    Matrix,
    /// A reference to another declared entity.
    Reference(String),
}

impl ChildType {
    /// Creates an entity reference.
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self::Reference(name.to_string())
    }

    /// Returns true for primitive slots (no generated class behind them).
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}

/// Primitive slot value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Heap-duplicated string.
    Str,
    /// Double with an optional-pointer shadow.
    Real,
    /// Integer with an optional-pointer shadow.
    Int,
}

/// A constant XML attribute emitted on every serialized element.
#[derive(Debug, Clone)]
pub struct FixedAttr {
    /// Attribute name.
    pub name: String,
    /// Literal attribute value.
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lookup() {
        let mut schema = Schema::new();
        schema.add_entity(EntityDef::new("Message", "SO/SOBlock/TaskInformation/Message"));

        assert!(schema.has_entity("Message"));
        assert!(!schema.has_entity("Unknown"));
        assert_eq!(schema.get_entity("Message").unwrap().name, "Message");
    }

    #[test]
    fn test_resolve_composite() {
        let mut schema = Schema::new();
        schema.add_entity(EntityDef::new("SOBlock", "SO/SOBlock"));

        assert_eq!(schema.resolve_composite("Table"), Some(ChildType::Table));
        assert_eq!(schema.resolve_composite("Matrix"), Some(ChildType::Matrix));
        assert_eq!(
            schema.resolve_composite("SOBlock"),
            Some(ChildType::Reference("SOBlock".to_string()))
        );
        assert_eq!(schema.resolve_composite("Bogus"), None);
    }

    #[test]
    fn test_entity_builder() {
        let entity = EntityDef::new("SimulationSubType", "SimulationSubType")
            .extends("Table")
            .attr("name", AttrKind::Str)
            .attr("extFileNo", AttrKind::Int);

        assert_eq!(entity.extends.as_deref(), Some("Table"));
        assert_eq!(entity.attributes.len(), 2);
        assert_eq!(entity.attributes[1].kind, AttrKind::Int);
    }

    #[test]
    fn test_element_name_override() {
        let entity = EntityDef::new("Bayesian_PPE", "…/Bayesian").element_name("Bayesian");
        assert_eq!(entity.xml_name(), "Bayesian");

        let plain = EntityDef::new("Likelihood", "…/Likelihood");
        assert_eq!(plain.xml_name(), "Likelihood");
    }

    #[test]
    fn test_child_xml_tag() {
        let prefixed = ChildDef::new("String", ChildType::Primitive(Primitive::Str)).prefix("ct");
        assert_eq!(prefixed.xml_tag(), "ct:String");

        let bare = ChildDef::new("FIM", ChildType::Matrix);
        assert_eq!(bare.xml_tag(), "FIM");
    }
}
