//! Resolved intermediate representation for code generation.
//!
//! Resolution turns the declarative schema into per-entity records that the
//! emitters can render directly: qualified class names, resolved child kinds
//! and, crucially, the full operation table for each entity. Every emitter
//! (core C source, C headers, scripting and numerical bindings) walks the
//! same table, so the targets cannot drift apart.

use std::collections::{HashMap, HashSet};

use crate::error::SchemaError;
use crate::model::{AttrKind, ChildType, EntityDef, FixedAttr, Primitive, Schema};
use crate::naming;
use crate::validation::validate_schema;

/// Resolved schema, ready for code generation.
#[derive(Debug, Clone)]
pub struct SchemaIr {
    /// Resolved entities in schema declaration order.
    pub entities: Vec<EntityIr>,
    index: HashMap<String, usize>,
}

impl SchemaIr {
    /// Resolves a schema into its intermediate representation.
    ///
    /// Validation runs first; the need-name set is computed up front as a
    /// pure property of the schema graph before any entity is resolved.
    ///
    /// # Errors
    /// Returns a [`SchemaError`] for any authoring error.
    pub fn from_schema(schema: &Schema) -> Result<Self, SchemaError> {
        validate_schema(schema)?;
        let named = need_name_set(schema);

        let mut ir = Self {
            entities: Vec::new(),
            index: HashMap::new(),
        };
        for entity in &schema.entities {
            let resolved = EntityIr::resolve(schema, entity, &named)?;
            ir.index.insert(resolved.name.clone(), ir.entities.len());
            ir.entities.push(resolved);
        }
        Ok(ir)
    }

    /// Looks up a resolved entity by schema name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EntityIr> {
        self.index.get(name).map(|&idx| &self.entities[idx])
    }
}

/// Computes the set of entities whose constructor takes an element name.
///
/// An entity needs a name if it is declared `named` or participates in
/// inheritance (the name must propagate to the base constructor). The
/// built-in `Table` and `Matrix` classes always take a name.
#[must_use]
pub fn need_name_set(schema: &Schema) -> HashSet<String> {
    schema
        .entities
        .iter()
        .filter(|e| e.named || e.extends.is_some())
        .map(|e| e.name.clone())
        .collect()
}

fn type_needs_name(named: &HashSet<String>, child_type: &ChildType) -> bool {
    match child_type {
        ChildType::Table | ChildType::Matrix => true,
        ChildType::Reference(name) => named.contains(name),
        ChildType::Primitive(_) => false,
    }
}

/// One resolved entity.
#[derive(Debug, Clone)]
pub struct EntityIr {
    /// Schema name.
    pub name: String,
    /// Namespace tag (generated class prefix and include directory).
    pub namespace: String,
    /// Qualified generated class name (e.g. `so_SOBlock`).
    pub class_name: String,
    /// XML tag including the entity's own namespace prefix.
    pub xml_tag: String,
    /// Documentation-only location string.
    pub xpath: String,
    /// True if the constructor takes an element name.
    pub needs_name: bool,
    /// Resolved inheritance base, if any.
    pub base: Option<BaseIr>,
    /// Resolved attributes in schema order.
    pub attributes: Vec<AttrIr>,
    /// Resolved child slots in schema order.
    pub children: Vec<ChildIr>,
    /// Constant XML attributes.
    pub fixed_attributes: Vec<FixedAttr>,
    /// Verbatim extra struct fields.
    pub extra_fields: Vec<String>,
    /// The full operation table for this entity.
    pub ops: Vec<Operation>,
}

impl EntityIr {
    fn resolve(
        schema: &Schema,
        entity: &EntityDef,
        named: &HashSet<String>,
    ) -> Result<Self, SchemaError> {
        let class_name = naming::class_name(&entity.namespace, &entity.name);
        let needs_name = named.contains(&entity.name);

        let base = match &entity.extends {
            Some(name) => {
                let child_type =
                    schema
                        .resolve_composite(name)
                        .ok_or_else(|| SchemaError::UnknownBase {
                            base: name.clone(),
                            entity: entity.name.clone(),
                        })?;
                Some(BaseIr {
                    type_name: name.clone(),
                    class_name: naming::class_name(&entity.namespace, name),
                    foreign_kind: ForeignKind::of(&child_type),
                })
            }
            None => None,
        };

        let attributes = entity
            .attributes
            .iter()
            .map(|a| AttrIr {
                name: a.name.clone(),
                kind: a.kind,
            })
            .collect();

        let mut children = Vec::with_capacity(entity.children.len());
        for child in &entity.children {
            let kind = match &child.child_type {
                ChildType::Primitive(Primitive::Str) => ChildIrKind::Str,
                ChildType::Primitive(Primitive::Real) => ChildIrKind::Real,
                ChildType::Primitive(Primitive::Int) => ChildIrKind::Int,
                composite => {
                    let type_name = match composite {
                        ChildType::Table => "Table".to_string(),
                        ChildType::Matrix => "Matrix".to_string(),
                        ChildType::Reference(name) => name.clone(),
                        ChildType::Primitive(_) => unreachable!(),
                    };
                    if schema.resolve_composite(&type_name).is_none() {
                        return Err(SchemaError::unknown_type(
                            &type_name,
                            &child.name,
                            &entity.name,
                        ));
                    }
                    let has_attributes = schema
                        .get_entity(&type_name)
                        .is_some_and(|e| !e.attributes.is_empty());
                    ChildIrKind::Composite(CompositeIr {
                        class_name: naming::class_name(&entity.namespace, &type_name),
                        type_name,
                        needs_name: type_needs_name(named, composite),
                        has_attributes,
                        foreign_kind: ForeignKind::of(composite),
                    })
                }
            };
            children.push(ChildIr {
                name: child.name.clone(),
                xml_tag: child.xml_tag(),
                kind,
                array: child.array,
            });
        }

        let mut ir = Self {
            name: entity.name.clone(),
            namespace: entity.namespace.clone(),
            class_name,
            xml_tag: match &entity.prefix {
                Some(p) => format!("{}:{}", p, entity.xml_name()),
                None => entity.xml_name().to_string(),
            },
            xpath: entity.xpath.clone(),
            needs_name,
            base,
            attributes,
            children,
            fixed_attributes: entity.fixed_attributes.clone(),
            extra_fields: entity.fields.clone(),
            ops: Vec::new(),
        };
        ir.ops = build_ops(&ir);
        Ok(ir)
    }

    /// Returns true if the entity declares any attribute or child.
    #[must_use]
    pub fn has_members(&self) -> bool {
        !self.attributes.is_empty() || !self.children.is_empty()
    }

    /// Iterates the public operations (the foreign-binding surface).
    pub fn public_ops(&self) -> impl Iterator<Item = &Operation> {
        self.ops
            .iter()
            .filter(|op| op.visibility == Visibility::Public)
    }
}

/// Resolved inheritance base.
#[derive(Debug, Clone)]
pub struct BaseIr {
    /// Base type name.
    pub type_name: String,
    /// Qualified base class name.
    pub class_name: String,
    /// Foreign marshalling kind of the base.
    pub foreign_kind: ForeignKind,
}

/// Resolved attribute.
#[derive(Debug, Clone)]
pub struct AttrIr {
    /// Attribute name.
    pub name: String,
    /// Storage kind.
    pub kind: AttrKind,
}

/// Resolved child slot.
#[derive(Debug, Clone)]
pub struct ChildIr {
    /// Slot name (also the parse-time match tag).
    pub name: String,
    /// Prefixed XML tag for serialization.
    pub xml_tag: String,
    /// Resolved slot kind.
    pub kind: ChildIrKind,
    /// True for array slots.
    pub array: bool,
}

impl ChildIr {
    /// Returns the composite description, or `None` for primitive slots.
    #[must_use]
    pub fn composite(&self) -> Option<&CompositeIr> {
        match &self.kind {
            ChildIrKind::Composite(c) => Some(c),
            _ => None,
        }
    }

    /// The literal element name passed to a named child type's constructor.
    #[must_use]
    pub fn construct_name(&self) -> Option<&str> {
        match &self.kind {
            ChildIrKind::Composite(c) if c.needs_name => Some(&self.xml_tag),
            _ => None,
        }
    }
}

/// Resolved slot kinds.
#[derive(Debug, Clone)]
pub enum ChildIrKind {
    /// Heap string captured from text content.
    Str,
    /// Double with optional-pointer shadow.
    Real,
    /// Integer with optional-pointer shadow.
    Int,
    /// A class-typed slot.
    Composite(CompositeIr),
}

/// Resolved class-typed slot description.
#[derive(Debug, Clone)]
pub struct CompositeIr {
    /// Referenced type name.
    pub type_name: String,
    /// Qualified class name.
    pub class_name: String,
    /// True if the class constructor takes an element name.
    pub needs_name: bool,
    /// True if the referenced entity declares attributes.
    pub has_attributes: bool,
    /// Foreign marshalling kind.
    pub foreign_kind: ForeignKind,
}

/// How a class value crosses a foreign-binding boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKind {
    /// Converted to/from the host's tabular type.
    Table,
    /// Converted to/from the host's 2D numeric array type.
    Matrix,
    /// Passed as an opaque tagged handle.
    Handle,
}

impl ForeignKind {
    fn of(child_type: &ChildType) -> Self {
        match child_type {
            ChildType::Table => Self::Table,
            ChildType::Matrix => Self::Matrix,
            _ => Self::Handle,
        }
    }
}

/// C-level types appearing in generated signatures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CType {
    /// `void`
    Void,
    /// `int`
    Int,
    /// `int *`
    IntPtr,
    /// `double *`
    DoublePtr,
    /// `char *`
    CharPtr,
    /// `const char *`
    ConstCharPtr,
    /// `const char **`
    ConstCharPtrPtr,
    /// Pointer to a generated or built-in class.
    Class(String),
    /// `xmlTextWriterPtr`
    XmlWriter,
}

impl CType {
    /// Renders the type as it appears before a declared name.
    ///
    /// Pointer types carry their `*` so declarations concatenate directly
    /// (`"so_SO *" + "self"`).
    #[must_use]
    pub fn c_decl(&self) -> String {
        match self {
            Self::Void => "void ".to_string(),
            Self::Int => "int ".to_string(),
            Self::IntPtr => "int *".to_string(),
            Self::DoublePtr => "double *".to_string(),
            Self::CharPtr => "char *".to_string(),
            Self::ConstCharPtr => "const char *".to_string(),
            Self::ConstCharPtrPtr => "const char **".to_string(),
            Self::Class(name) => format!("{name} *"),
            Self::XmlWriter => "xmlTextWriterPtr ".to_string(),
        }
    }
}

/// One parameter of a generated operation.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: CType,
}

impl Param {
    fn new(name: &str, ty: CType) -> Self {
        Self {
            name: name.to_string(),
            ty,
        }
    }
}

/// Operation visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Declared in the public header; wrapped by every foreign binding.
    Public,
    /// Declared in the private header; parse/serialize machinery.
    Private,
}

/// What an operation does; indices point into the entity's member lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    /// Allocate a zeroed instance at refcount 1.
    New,
    /// Deep clone.
    Copy,
    /// Recursive release; idempotent on NULL.
    Free,
    /// Refcount increment.
    Ref,
    /// Refcount decrement, freeing at zero.
    Unref,
    /// Return the embedded base instance.
    GetBase,
    /// Replace the embedded base instance.
    SetBase,
    /// Attribute getter.
    GetAttr(usize),
    /// Attribute setter.
    SetAttr(usize),
    /// Child getter (indexed for arrays).
    GetChild(usize),
    /// Scalar child setter (ownership transfer).
    SetChild(usize),
    /// Array length accessor.
    NumberOf(usize),
    /// Array append (ownership transfer).
    AddChild(usize),
    /// Array swap-remove.
    RemoveChild(usize),
    /// Construct a child in place and return it.
    CreateChild(usize),
    /// Serialize to an XML writer.
    Xml,
    /// Attribute half of serialization (inheritance merging).
    XmlAttributes,
    /// Children half of serialization (inheritance merging).
    XmlChildren,
    /// SAX start-element handler.
    StartElement,
    /// SAX end-element handler.
    EndElement,
    /// SAX character-data handler.
    Characters,
    /// Assign attributes from a flat SAX attribute list.
    InitAttributes,
}

/// One generated operation: the single source of truth for its signature.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Operation kind.
    pub kind: OpKind,
    /// Full C function name.
    pub name: String,
    /// Return type.
    pub ret: CType,
    /// Parameters including `self` where applicable.
    pub params: Vec<Param>,
    /// Visibility.
    pub visibility: Visibility,
}

impl Operation {
    fn public(kind: OpKind, name: String, ret: CType, params: Vec<Param>) -> Self {
        Self {
            kind,
            name,
            ret,
            params,
            visibility: Visibility::Public,
        }
    }

    fn private(kind: OpKind, name: String, ret: CType, params: Vec<Param>) -> Self {
        Self {
            kind,
            name,
            ret,
            params,
            visibility: Visibility::Private,
        }
    }
}

fn child_value_type(child: &ChildIr) -> CType {
    match &child.kind {
        ChildIrKind::Str => CType::CharPtr,
        ChildIrKind::Real => CType::DoublePtr,
        ChildIrKind::Int => CType::IntPtr,
        ChildIrKind::Composite(c) => CType::Class(c.class_name.clone()),
    }
}

fn build_ops(entity: &EntityIr) -> Vec<Operation> {
    let class = &entity.class_name;
    let this = CType::Class(class.clone());
    let self_param = || Param::new("self", this.clone());
    let mut ops = Vec::new();

    let new_params = if entity.needs_name {
        vec![Param::new("name", CType::CharPtr)]
    } else {
        Vec::new()
    };
    ops.push(Operation::public(
        OpKind::New,
        format!("{class}_new"),
        this.clone(),
        new_params,
    ));
    ops.push(Operation::public(
        OpKind::Copy,
        format!("{class}_copy"),
        this.clone(),
        vec![self_param()],
    ));
    ops.push(Operation::public(
        OpKind::Free,
        format!("{class}_free"),
        CType::Void,
        vec![self_param()],
    ));
    ops.push(Operation::public(
        OpKind::Ref,
        format!("{class}_ref"),
        CType::Void,
        vec![self_param()],
    ));
    ops.push(Operation::public(
        OpKind::Unref,
        format!("{class}_unref"),
        CType::Void,
        vec![self_param()],
    ));

    if let Some(base) = &entity.base {
        let base_ty = CType::Class(base.class_name.clone());
        ops.push(Operation::public(
            OpKind::GetBase,
            naming::getter_name(class, "base"),
            base_ty.clone(),
            vec![self_param()],
        ));
        ops.push(Operation::public(
            OpKind::SetBase,
            naming::setter_name(class, "base"),
            CType::Int,
            vec![self_param(), Param::new("value", base_ty)],
        ));
    }

    for (i, attr) in entity.attributes.iter().enumerate() {
        let (value_ty, set_ret) = match attr.kind {
            AttrKind::Str => (CType::CharPtr, CType::Int),
            AttrKind::Int => (CType::IntPtr, CType::Void),
        };
        ops.push(Operation::public(
            OpKind::GetAttr(i),
            naming::getter_name(class, &attr.name),
            value_ty.clone(),
            vec![self_param()],
        ));
        ops.push(Operation::public(
            OpKind::SetAttr(i),
            naming::setter_name(class, &attr.name),
            set_ret,
            vec![self_param(), Param::new("value", value_ty)],
        ));
    }

    for (i, child) in entity.children.iter().enumerate() {
        let value_ty = child_value_type(child);
        let mut get_params = vec![self_param()];
        if child.array {
            get_params.push(Param::new("number", CType::Int));
        }
        ops.push(Operation::public(
            OpKind::GetChild(i),
            naming::getter_name(class, &child.name),
            value_ty.clone(),
            get_params,
        ));
        if child.array {
            ops.push(Operation::public(
                OpKind::NumberOf(i),
                naming::number_of_name(class, &child.name),
                CType::Int,
                vec![self_param()],
            ));
            ops.push(Operation::public(
                OpKind::AddChild(i),
                naming::add_name(class, &child.name),
                CType::Int,
                vec![self_param(), Param::new("child", value_ty.clone())],
            ));
            ops.push(Operation::public(
                OpKind::RemoveChild(i),
                naming::remove_name(class, &child.name),
                CType::Int,
                vec![self_param(), Param::new("index", CType::Int)],
            ));
        } else {
            let set_ret = match &child.kind {
                ChildIrKind::Str => CType::Int,
                _ => CType::Void,
            };
            ops.push(Operation::public(
                OpKind::SetChild(i),
                naming::setter_name(class, &child.name),
                set_ret,
                vec![self_param(), Param::new("value", value_ty.clone())],
            ));
        }
        if child.composite().is_some() {
            ops.push(Operation::public(
                OpKind::CreateChild(i),
                naming::create_name(class, &child.name),
                value_ty,
                vec![self_param()],
            ));
        }
    }

    let writer = Param::new("writer", CType::XmlWriter);
    ops.push(Operation::private(
        OpKind::Xml,
        format!("{class}_xml"),
        CType::Int,
        vec![self_param(), writer.clone()],
    ));
    ops.push(Operation::private(
        OpKind::XmlAttributes,
        format!("{class}_xml_attributes"),
        CType::Int,
        vec![self_param(), writer.clone()],
    ));
    ops.push(Operation::private(
        OpKind::XmlChildren,
        format!("{class}_xml_children"),
        CType::Int,
        vec![self_param(), writer],
    ));
    ops.push(Operation::private(
        OpKind::StartElement,
        format!("{class}_start_element"),
        CType::Int,
        vec![
            self_param(),
            Param::new("localname", CType::ConstCharPtr),
            Param::new("nb_attributes", CType::Int),
            Param::new("attributes", CType::ConstCharPtrPtr),
        ],
    ));
    ops.push(Operation::private(
        OpKind::EndElement,
        format!("{class}_end_element"),
        CType::Void,
        vec![self_param(), Param::new("localname", CType::ConstCharPtr)],
    ));
    ops.push(Operation::private(
        OpKind::Characters,
        format!("{class}_characters"),
        CType::Int,
        vec![
            self_param(),
            Param::new("ch", CType::ConstCharPtr),
            Param::new("len", CType::Int),
        ],
    ));
    if !entity.attributes.is_empty() {
        ops.push(Operation::private(
            OpKind::InitAttributes,
            format!("{class}_init_attributes"),
            CType::Int,
            vec![
                self_param(),
                Param::new("nb_attributes", CType::Int),
                Param::new("attributes", CType::ConstCharPtrPtr),
            ],
        ));
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildDef, EntityDef};

    fn sample_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_entity(
            EntityDef::new("SOBlock", "SO/SOBlock")
                .attr("blkId", AttrKind::Str)
                .child(ChildDef::new("Estimation", ChildType::reference("Estimation"))),
        );
        schema.add_entity(
            EntityDef::new("Estimation", "SO/SOBlock/Estimation")
                .child(ChildDef::new("Predictions", ChildType::Table)),
        );
        schema.add_entity(
            EntityDef::new("SO", "SO")
                .child(ChildDef::new("SOBlock", ChildType::reference("SOBlock")).array())
                .field("int error;"),
        );
        schema.add_entity(
            EntityDef::new("SimulationSubType", "SimulationSubType")
                .extends("Table")
                .attr("name", AttrKind::Str)
                .attr("extFileNo", AttrKind::Int),
        );
        schema
    }

    #[test]
    fn test_need_name_set() {
        let schema = sample_schema();
        let named = need_name_set(&schema);
        assert!(named.contains("SimulationSubType"));
        assert!(!named.contains("SO"));
        assert!(!named.contains("Estimation"));
    }

    #[test]
    fn test_named_new_takes_name() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let sub = ir.get("SimulationSubType").unwrap();
        let new = sub.ops.iter().find(|o| o.kind == OpKind::New).unwrap();
        assert_eq!(new.params.len(), 1);
        assert_eq!(new.params[0].ty, CType::CharPtr);

        let so = ir.get("SO").unwrap();
        let new = so.ops.iter().find(|o| o.kind == OpKind::New).unwrap();
        assert!(new.params.is_empty());
    }

    #[test]
    fn test_array_slot_has_no_setter() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let so = ir.get("SO").unwrap();
        assert!(!so.ops.iter().any(|o| matches!(o.kind, OpKind::SetChild(_))));
        assert!(so.ops.iter().any(|o| o.kind == OpKind::AddChild(0)));
        assert!(so.ops.iter().any(|o| o.kind == OpKind::RemoveChild(0)));
        assert!(so.ops.iter().any(|o| o.kind == OpKind::NumberOf(0)));
    }

    #[test]
    fn test_scalar_slot_has_no_array_ops() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let block = ir.get("SOBlock").unwrap();
        assert!(block.ops.iter().any(|o| o.kind == OpKind::SetChild(0)));
        assert!(!block.ops.iter().any(|o| matches!(o.kind, OpKind::AddChild(_))));
        assert!(!block.ops.iter().any(|o| matches!(o.kind, OpKind::RemoveChild(_))));
    }

    #[test]
    fn test_indexed_getter_for_arrays() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let so = ir.get("SO").unwrap();
        let get = so
            .ops
            .iter()
            .find(|o| o.kind == OpKind::GetChild(0))
            .unwrap();
        assert_eq!(get.params.len(), 2);
        assert_eq!(get.params[1].name, "number");
    }

    #[test]
    fn test_base_accessors_only_when_extending() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let sub = ir.get("SimulationSubType").unwrap();
        assert!(sub.ops.iter().any(|o| o.kind == OpKind::GetBase));
        assert!(sub.ops.iter().any(|o| o.kind == OpKind::SetBase));
        assert_eq!(sub.base.as_ref().unwrap().class_name, "so_Table");

        let so = ir.get("SO").unwrap();
        assert!(!so.ops.iter().any(|o| o.kind == OpKind::GetBase));
    }

    #[test]
    fn test_parse_ops_are_private() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let block = ir.get("SOBlock").unwrap();
        for kind in [OpKind::Xml, OpKind::StartElement, OpKind::InitAttributes] {
            let op = block.ops.iter().find(|o| o.kind == kind).unwrap();
            assert_eq!(op.visibility, Visibility::Private);
        }
        assert!(block.public_ops().all(|o| o.visibility == Visibility::Public));
    }

    #[test]
    fn test_init_attributes_only_with_attributes() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        assert!(ir
            .get("SOBlock")
            .unwrap()
            .ops
            .iter()
            .any(|o| o.kind == OpKind::InitAttributes));
        assert!(!ir
            .get("Estimation")
            .unwrap()
            .ops
            .iter()
            .any(|o| o.kind == OpKind::InitAttributes));
    }

    #[test]
    fn test_construct_name_for_named_child_types() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let est = ir.get("Estimation").unwrap();
        assert_eq!(est.children[0].construct_name(), Some("Predictions"));

        let block = ir.get("SOBlock").unwrap();
        assert_eq!(block.children[0].construct_name(), None);
    }

    #[test]
    fn test_foreign_kind_resolution() {
        let ir = SchemaIr::from_schema(&sample_schema()).unwrap();
        let est = ir.get("Estimation").unwrap();
        assert_eq!(
            est.children[0].composite().unwrap().foreign_kind,
            ForeignKind::Table
        );
        let block = ir.get("SOBlock").unwrap();
        assert_eq!(
            block.children[0].composite().unwrap().foreign_kind,
            ForeignKind::Handle
        );
    }

    #[test]
    fn test_ctype_decl() {
        assert_eq!(CType::Class("so_SO".to_string()).c_decl(), "so_SO *");
        assert_eq!(CType::Int.c_decl(), "int ");
        assert_eq!(CType::ConstCharPtrPtr.c_decl(), "const char **");
    }
}
