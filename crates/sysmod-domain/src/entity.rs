//! Entity module - the model objects and their relationship containers
//!
//! Relationships are stored as id sets on the holder, never as references, so the
//! object graph stays acyclic in ownership terms and serializes as-is.

use crate::{ObjectId, ObjectKind, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fields shared by every model object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Permanent identifier
    pub id: ObjectId,

    /// Display name, unique per kind
    pub name: String,

    /// Optional second name usable wherever the name is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,

    /// Declared type (base kind or user-defined Type)
    pub type_ref: TypeRef,

    /// Base object this one inherits from (same kind, single level)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived: Option<ObjectId>,
}

impl Header {
    /// Create a header for a fresh object of the given declared type
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            alias: None,
            type_ref,
            derived: None,
        }
    }

    /// Whether `name` designates this object by name or alias
    pub fn answers_to(&self, name: &str) -> bool {
        self.name == name || self.alias.as_deref() == Some(name)
    }

    /// Case-insensitive variant of [`Header::answers_to`]
    pub fn answers_to_loosely(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self.alias.as_deref().is_some_and(|a| a.eq_ignore_ascii_case(name))
    }
}

/// Position of an object in its composition tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    /// Parent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,

    /// Direct children
    #[serde(default)]
    pub children: BTreeSet<ObjectId>,
}

/// A function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Shared fields
    pub header: Header,
    /// Function decomposition
    #[serde(default)]
    pub composition: Composition,
}

/// A data flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    /// Shared fields
    pub header: Header,
    /// Data that must be available before this one (ordering, not ownership)
    #[serde(default)]
    pub predecessors: BTreeSet<ObjectId>,
}

/// A state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Shared fields
    pub header: Header,
    /// Nested states
    #[serde(default)]
    pub composition: Composition,
    /// Functions active in this state
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
}

/// A transition between two states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Shared fields
    pub header: Header,
    /// State the transition leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ObjectId>,
    /// State the transition enters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<ObjectId>,
    /// Free-text guard conditions, in declaration order
    #[serde(default)]
    pub conditions: Vec<String>,
}

/// A functional element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalElement {
    /// Shared fields
    pub header: Header,
    /// Element decomposition
    #[serde(default)]
    pub composition: Composition,
    /// Allocated functions and states
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
    /// Exposed functional interfaces
    #[serde(default)]
    pub exposed: BTreeSet<ObjectId>,
}

/// A physical element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalElement {
    /// Shared fields
    pub header: Header,
    /// Element decomposition
    #[serde(default)]
    pub composition: Composition,
    /// Allocated functional elements and activities
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
    /// Exposed physical interfaces
    #[serde(default)]
    pub exposed: BTreeSet<ObjectId>,
}

/// A functional interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalInterface {
    /// Shared fields
    pub header: Header,
    /// Data carried by the interface
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
}

/// A physical interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalInterface {
    /// Shared fields
    pub header: Header,
    /// Functional interfaces carried by the interface
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
}

/// An activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Shared fields
    pub header: Header,
}

/// An attribute and the objects it describes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Shared fields
    pub header: Header,
    /// Described object → value
    #[serde(default)]
    pub described: BTreeMap<ObjectId, String>,
}

/// A requirement or goal: free text, derivation tree and satisfying objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Shared fields
    pub header: Header,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Derivation tree (children refine the parent)
    #[serde(default)]
    pub composition: Composition,
    /// Objects satisfying this statement
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
}

/// A user-defined type
///
/// The header's `type_ref` is what this type extends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// Shared fields
    pub header: Header,
}

/// A view (chain)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Shared fields
    pub header: Header,
    /// Whether this is the activated view
    #[serde(default)]
    pub activated: bool,
    /// Objects selected by the view
    #[serde(default)]
    pub allocated: BTreeSet<ObjectId>,
}

/// Any model object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelObject {
    /// A function
    Function(Function),
    /// A data flow
    Data(Data),
    /// A state
    State(State),
    /// A transition
    Transition(Transition),
    /// A functional element
    FunctionalElement(FunctionalElement),
    /// A physical element
    PhysicalElement(PhysicalElement),
    /// A functional interface
    FunctionalInterface(FunctionalInterface),
    /// A physical interface
    PhysicalInterface(PhysicalInterface),
    /// An activity
    Activity(Activity),
    /// An attribute
    Attribute(Attribute),
    /// A requirement
    Requirement(Statement),
    /// A goal
    Goal(Statement),
    /// A user-defined type
    Type(TypeDef),
    /// A view
    View(View),
}

impl ModelObject {
    /// Build an empty object of the given kind
    pub fn new(kind: ObjectKind, header: Header) -> Self {
        match kind {
            ObjectKind::Function => ModelObject::Function(Function {
                header,
                composition: Composition::default(),
            }),
            ObjectKind::Data => ModelObject::Data(Data {
                header,
                predecessors: BTreeSet::new(),
            }),
            ObjectKind::State => ModelObject::State(State {
                header,
                composition: Composition::default(),
                allocated: BTreeSet::new(),
            }),
            ObjectKind::Transition => ModelObject::Transition(Transition {
                header,
                source: None,
                destination: None,
                conditions: Vec::new(),
            }),
            ObjectKind::FunctionalElement => ModelObject::FunctionalElement(FunctionalElement {
                header,
                composition: Composition::default(),
                allocated: BTreeSet::new(),
                exposed: BTreeSet::new(),
            }),
            ObjectKind::PhysicalElement => ModelObject::PhysicalElement(PhysicalElement {
                header,
                composition: Composition::default(),
                allocated: BTreeSet::new(),
                exposed: BTreeSet::new(),
            }),
            ObjectKind::FunctionalInterface => {
                ModelObject::FunctionalInterface(FunctionalInterface {
                    header,
                    allocated: BTreeSet::new(),
                })
            }
            ObjectKind::PhysicalInterface => ModelObject::PhysicalInterface(PhysicalInterface {
                header,
                allocated: BTreeSet::new(),
            }),
            ObjectKind::Activity => ModelObject::Activity(Activity { header }),
            ObjectKind::Attribute => ModelObject::Attribute(Attribute {
                header,
                described: BTreeMap::new(),
            }),
            ObjectKind::Requirement => ModelObject::Requirement(Statement::new(header)),
            ObjectKind::Goal => ModelObject::Goal(Statement::new(header)),
            ObjectKind::Type => ModelObject::Type(TypeDef { header }),
            ObjectKind::View => ModelObject::View(View {
                header,
                activated: false,
                allocated: BTreeSet::new(),
            }),
        }
    }

    /// The kind of this object
    pub fn kind(&self) -> ObjectKind {
        match self {
            ModelObject::Function(_) => ObjectKind::Function,
            ModelObject::Data(_) => ObjectKind::Data,
            ModelObject::State(_) => ObjectKind::State,
            ModelObject::Transition(_) => ObjectKind::Transition,
            ModelObject::FunctionalElement(_) => ObjectKind::FunctionalElement,
            ModelObject::PhysicalElement(_) => ObjectKind::PhysicalElement,
            ModelObject::FunctionalInterface(_) => ObjectKind::FunctionalInterface,
            ModelObject::PhysicalInterface(_) => ObjectKind::PhysicalInterface,
            ModelObject::Activity(_) => ObjectKind::Activity,
            ModelObject::Attribute(_) => ObjectKind::Attribute,
            ModelObject::Requirement(_) => ObjectKind::Requirement,
            ModelObject::Goal(_) => ObjectKind::Goal,
            ModelObject::Type(_) => ObjectKind::Type,
            ModelObject::View(_) => ObjectKind::View,
        }
    }

    /// Shared fields
    pub fn header(&self) -> &Header {
        match self {
            ModelObject::Function(o) => &o.header,
            ModelObject::Data(o) => &o.header,
            ModelObject::State(o) => &o.header,
            ModelObject::Transition(o) => &o.header,
            ModelObject::FunctionalElement(o) => &o.header,
            ModelObject::PhysicalElement(o) => &o.header,
            ModelObject::FunctionalInterface(o) => &o.header,
            ModelObject::PhysicalInterface(o) => &o.header,
            ModelObject::Activity(o) => &o.header,
            ModelObject::Attribute(o) => &o.header,
            ModelObject::Requirement(o) | ModelObject::Goal(o) => &o.header,
            ModelObject::Type(o) => &o.header,
            ModelObject::View(o) => &o.header,
        }
    }

    /// Shared fields, mutably
    pub fn header_mut(&mut self) -> &mut Header {
        match self {
            ModelObject::Function(o) => &mut o.header,
            ModelObject::Data(o) => &mut o.header,
            ModelObject::State(o) => &mut o.header,
            ModelObject::Transition(o) => &mut o.header,
            ModelObject::FunctionalElement(o) => &mut o.header,
            ModelObject::PhysicalElement(o) => &mut o.header,
            ModelObject::FunctionalInterface(o) => &mut o.header,
            ModelObject::PhysicalInterface(o) => &mut o.header,
            ModelObject::Activity(o) => &mut o.header,
            ModelObject::Attribute(o) => &mut o.header,
            ModelObject::Requirement(o) | ModelObject::Goal(o) => &mut o.header,
            ModelObject::Type(o) => &mut o.header,
            ModelObject::View(o) => &mut o.header,
        }
    }

    /// Identifier
    pub fn id(&self) -> ObjectId {
        self.header().id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.header().name
    }

    /// Composition tree position, for composable kinds
    pub fn composition(&self) -> Option<&Composition> {
        match self {
            ModelObject::Function(o) => Some(&o.composition),
            ModelObject::State(o) => Some(&o.composition),
            ModelObject::FunctionalElement(o) => Some(&o.composition),
            ModelObject::PhysicalElement(o) => Some(&o.composition),
            ModelObject::Requirement(o) | ModelObject::Goal(o) => Some(&o.composition),
            _ => None,
        }
    }

    /// Composition tree position, mutably
    pub fn composition_mut(&mut self) -> Option<&mut Composition> {
        match self {
            ModelObject::Function(o) => Some(&mut o.composition),
            ModelObject::State(o) => Some(&mut o.composition),
            ModelObject::FunctionalElement(o) => Some(&mut o.composition),
            ModelObject::PhysicalElement(o) => Some(&mut o.composition),
            ModelObject::Requirement(o) | ModelObject::Goal(o) => Some(&mut o.composition),
            _ => None,
        }
    }

    /// Allocated id set, for holder kinds
    pub fn allocated(&self) -> Option<&BTreeSet<ObjectId>> {
        match self {
            ModelObject::State(o) => Some(&o.allocated),
            ModelObject::FunctionalElement(o) => Some(&o.allocated),
            ModelObject::PhysicalElement(o) => Some(&o.allocated),
            ModelObject::FunctionalInterface(o) => Some(&o.allocated),
            ModelObject::PhysicalInterface(o) => Some(&o.allocated),
            ModelObject::Requirement(o) | ModelObject::Goal(o) => Some(&o.allocated),
            ModelObject::View(o) => Some(&o.allocated),
            _ => None,
        }
    }

    /// Allocated id set, mutably
    pub fn allocated_mut(&mut self) -> Option<&mut BTreeSet<ObjectId>> {
        match self {
            ModelObject::State(o) => Some(&mut o.allocated),
            ModelObject::FunctionalElement(o) => Some(&mut o.allocated),
            ModelObject::PhysicalElement(o) => Some(&mut o.allocated),
            ModelObject::FunctionalInterface(o) => Some(&mut o.allocated),
            ModelObject::PhysicalInterface(o) => Some(&mut o.allocated),
            ModelObject::Requirement(o) | ModelObject::Goal(o) => Some(&mut o.allocated),
            ModelObject::View(o) => Some(&mut o.allocated),
            _ => None,
        }
    }

    /// Exposed interface set, for element kinds
    pub fn exposed(&self) -> Option<&BTreeSet<ObjectId>> {
        match self {
            ModelObject::FunctionalElement(o) => Some(&o.exposed),
            ModelObject::PhysicalElement(o) => Some(&o.exposed),
            _ => None,
        }
    }

    /// Exposed interface set, mutably
    pub fn exposed_mut(&mut self) -> Option<&mut BTreeSet<ObjectId>> {
        match self {
            ModelObject::FunctionalElement(o) => Some(&mut o.exposed),
            ModelObject::PhysicalElement(o) => Some(&mut o.exposed),
            _ => None,
        }
    }

    /// Description text, for requirements and goals
    pub fn description(&self) -> Option<&str> {
        match self {
            ModelObject::Requirement(o) | ModelObject::Goal(o) => Some(&o.description),
            _ => None,
        }
    }
}

impl Statement {
    fn new(header: Header) -> Self {
        Self {
            header,
            description: String::new(),
            composition: Composition::default(),
            allocated: BTreeSet::new(),
        }
    }
}
