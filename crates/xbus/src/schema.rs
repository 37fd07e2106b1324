use std::collections::BTreeMap;

use xbus_xml::{Argument, Direction, Node};

use crate::error::Result;
use crate::signature::TypeNode;

#[doc(inline)]
pub use xbus_xml::Access;

/// The introspected interfaces of a single object.
///
/// # Examples
///
/// ```
/// use xbus::Schema;
///
/// let schema = Schema::from_xml(r#"
/// <node>
///   <interface name="org.example.Calculator">
///     <method name="Add">
///       <arg name="a" type="i"/>
///       <arg name="b" type="i"/>
///       <arg name="sum" type="i" direction="out"/>
///     </method>
///   </interface>
/// </node>
/// "#)?;
///
/// let method = schema.interface("org.example.Calculator").and_then(|i| i.method("Add")).unwrap();
/// assert_eq!(method.input_signature(), "ii");
/// assert_eq!(method.output_signature(), "i");
/// # Ok::<_, xbus::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Schema {
    interfaces: BTreeMap<Box<str>, InterfaceSchema>,
}

impl Schema {
    /// Parse an introspection document.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let node = xbus_xml::parse_interface(xml)?;
        Self::from_node(&node)
    }

    /// Build a schema from the interfaces of a parsed node.
    ///
    /// Child nodes describe other objects and are not included.
    pub fn from_node(node: &Node<'_>) -> Result<Self> {
        let mut interfaces = BTreeMap::new();

        for interface in node.interfaces.iter() {
            let mut schema = InterfaceSchema::default();

            for m in interface.methods.iter() {
                let mut method = MethodSchema::default();

                for argument in m.arguments.iter() {
                    let argument_schema = ArgumentSchema::from_argument(argument)?;

                    match argument.direction {
                        Direction::In => {
                            method.input_signature.push_str(argument.ty);
                            method.inputs.push(argument_schema);
                        }
                        Direction::Out => {
                            method.output_signature.push_str(argument.ty);
                            method.outputs.push(argument_schema);
                        }
                    }
                }

                schema.methods.insert(m.name.into(), method);
            }

            for s in interface.signals.iter() {
                let mut signal = SignalSchema::default();

                for argument in s.arguments.iter() {
                    signal.signature.push_str(argument.ty);
                    signal
                        .arguments
                        .push(ArgumentSchema::from_argument(argument)?);
                }

                schema.signals.insert(s.name.into(), signal);
            }

            for p in interface.properties.iter() {
                let property = PropertySchema {
                    ty: TypeNode::parse_single(p.ty)?,
                    access: p.access,
                };

                schema.properties.insert(p.name.into(), property);
            }

            interfaces.insert(interface.name.into(), schema);
        }

        Ok(Self { interfaces })
    }

    /// Look up an interface by name.
    pub fn interface(&self, name: &str) -> Option<&InterfaceSchema> {
        self.interfaces.get(name)
    }

    /// Iterate over the names of all interfaces, in sorted order.
    pub fn interfaces(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(|name| &**name)
    }
}

/// The members of a single interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSchema {
    methods: BTreeMap<Box<str>, MethodSchema>,
    signals: BTreeMap<Box<str>, SignalSchema>,
    properties: BTreeMap<Box<str>, PropertySchema>,
}

impl InterfaceSchema {
    /// Look up a method by name.
    pub fn method(&self, name: &str) -> Option<&MethodSchema> {
        self.methods.get(name)
    }

    /// Look up a signal by name.
    pub fn signal(&self, name: &str) -> Option<&SignalSchema> {
        self.signals.get(name)
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    /// Iterate over methods, in sorted order.
    pub fn methods(&self) -> impl Iterator<Item = (&str, &MethodSchema)> {
        self.methods.iter().map(|(name, m)| (&**name, m))
    }

    /// Iterate over signals, in sorted order.
    pub fn signals(&self) -> impl Iterator<Item = (&str, &SignalSchema)> {
        self.signals.iter().map(|(name, s)| (&**name, s))
    }

    /// Iterate over properties, in sorted order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertySchema)> {
        self.properties.iter().map(|(name, p)| (&**name, p))
    }
}

/// The arguments of a method.
#[derive(Debug, Clone, Default)]
pub struct MethodSchema {
    inputs: Vec<ArgumentSchema>,
    outputs: Vec<ArgumentSchema>,
    input_signature: String,
    output_signature: String,
}

impl MethodSchema {
    /// Input arguments in order.
    pub fn inputs(&self) -> &[ArgumentSchema] {
        &self.inputs
    }

    /// Output arguments in order.
    pub fn outputs(&self) -> &[ArgumentSchema] {
        &self.outputs
    }

    /// The signature of a call to this method, which is the types of all
    /// input arguments concatenated.
    pub fn input_signature(&self) -> &str {
        &self.input_signature
    }

    /// The signature of a reply from this method.
    pub fn output_signature(&self) -> &str {
        &self.output_signature
    }
}

/// The arguments of a signal.
#[derive(Debug, Clone, Default)]
pub struct SignalSchema {
    arguments: Vec<ArgumentSchema>,
    signature: String,
}

impl SignalSchema {
    /// Arguments in order.
    pub fn arguments(&self) -> &[ArgumentSchema] {
        &self.arguments
    }

    /// The signature of the signal body.
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// A named and typed argument.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgumentSchema {
    name: Option<Box<str>>,
    ty: TypeNode,
}

impl ArgumentSchema {
    fn from_argument(argument: &Argument<'_>) -> Result<Self> {
        Ok(Self {
            name: argument.name.map(Box::from),
            ty: TypeNode::parse_single(argument.ty)?,
        })
    }

    /// The name of the argument, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The type of the argument.
    pub fn ty(&self) -> &TypeNode {
        &self.ty
    }
}

/// The type and access of a property.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySchema {
    ty: TypeNode,
    access: Access,
}

impl PropertySchema {
    /// The type of the property.
    pub fn ty(&self) -> &TypeNode {
        &self.ty
    }

    /// How the property may be accessed.
    pub fn access(&self) -> Access {
        self.access
    }
}
