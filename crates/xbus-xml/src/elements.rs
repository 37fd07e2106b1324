/// A D-Bus node.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    /// The name of the node. The root node usually has no name, and child
    /// nodes are named relative to their parent.
    pub name: Option<&'a str>,
    /// Interfaces in the node.
    pub interfaces: Box<[Interface<'a>]>,
    /// Child nodes.
    pub nodes: Box<[Node<'a>]>,
}

/// A single interface.
#[derive(Debug, Clone)]
pub struct Interface<'a> {
    /// The name of the interface.
    pub name: &'a str,
    /// Methods associated with the interface.
    pub methods: Box<[Method<'a>]>,
    /// Signals emitted by the interface.
    pub signals: Box<[Signal<'a>]>,
    /// Properties exposed by the interface.
    pub properties: Box<[Property<'a>]>,
    /// Annotations on the interface.
    pub annotations: Box<[Annotation<'a>]>,
    /// Documentation.
    pub doc: Doc<'a>,
}

/// The direction of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Input argument.
    In,
    /// Output argument.
    Out,
}

/// A method or signal argument.
#[derive(Debug, Clone)]
pub struct Argument<'a> {
    /// The name of the argument.
    pub name: Option<&'a str>,
    /// The type of the argument. Always a single complete type.
    pub ty: &'a str,
    /// The direction of an argument.
    pub direction: Direction,
    /// Annotations on the argument.
    pub annotations: Box<[Annotation<'a>]>,
    /// Documentation.
    pub doc: Doc<'a>,
}

/// A single method.
#[derive(Debug, Clone)]
pub struct Method<'a> {
    /// The name of the method.
    pub name: &'a str,
    /// Arguments to the method.
    pub arguments: Box<[Argument<'a>]>,
    /// Annotations on the method.
    pub annotations: Box<[Annotation<'a>]>,
    /// Documentation.
    pub doc: Doc<'a>,
}

/// A single signal.
#[derive(Debug, Clone)]
pub struct Signal<'a> {
    /// The name of the signal.
    pub name: &'a str,
    /// Arguments carried by the signal.
    pub arguments: Box<[Argument<'a>]>,
    /// Annotations on the signal.
    pub annotations: Box<[Annotation<'a>]>,
    /// Documentation.
    pub doc: Doc<'a>,
}

/// How a property may be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The property can only be read.
    Read,
    /// The property can only be written.
    Write,
    /// The property can be both read and written.
    ReadWrite,
}

/// A single property.
#[derive(Debug, Clone)]
pub struct Property<'a> {
    /// The name of the property.
    pub name: &'a str,
    /// The type of the property. Always a single complete type.
    pub ty: &'a str,
    /// How the property may be accessed.
    pub access: Access,
    /// Annotations on the property.
    pub annotations: Box<[Annotation<'a>]>,
    /// Documentation.
    pub doc: Doc<'a>,
}

/// An annotation, such as `org.freedesktop.DBus.Deprecated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Annotation<'a> {
    /// The name of the annotation.
    pub name: &'a str,
    /// The value of the annotation.
    pub value: &'a str,
}

/// Documentation associated with an element.
#[derive(Debug, Clone, Default)]
pub struct Doc<'a> {
    /// Documentation summary.
    pub summary: Option<&'a str>,
    /// Description.
    pub description: Description<'a>,
}

/// The description of an element.
#[derive(Debug, Clone, Default)]
pub struct Description<'a> {
    /// Paragraph describing an element.
    pub paragraph: Option<&'a str>,
}
