use xbus_core::signature::TypeNode;
use xmlparser::{ElementEnd, Token};

use crate::error::ErrorKind;
use crate::{
    Access, Annotation, Argument, Description, Direction, Doc, Error, Interface, Method, Node,
    Property, Result, Signal,
};

/// Parse the contents of an introspection document.
///
/// The document must contain exactly one root `node` element.
pub fn parse_interface(interface: &str) -> Result<Node<'_>> {
    let tokenizer = xmlparser::Tokenizer::from(interface);

    let mut stack = vec![];
    let mut root = None;

    let mut path = String::new();

    macro_rules! expect_end {
        ($end:expr, $expected:literal) => {
            if let Some(end) = $end {
                if end != $expected {
                    return Err(Error::new(
                        path,
                        ErrorKind::MismatchingEnd {
                            expected: $expected.into(),
                            actual: end.into(),
                        },
                    ));
                }
            }
        };
    }

    macro_rules! build {
        ($builder:expr) => {
            $builder
                .build()
                .map_err(|kind| Error::new(path.as_str(), kind))?
        };
    }

    for token in tokenizer {
        let token = match token {
            Ok(token) => token,
            Err(error) => return Err(Error::new(path, error)),
        };

        match token {
            Token::ElementStart { local, .. } => {
                let state = match (stack.last(), local.as_str()) {
                    (None, "node") if root.is_none() => State::Node(NodeBuilder::default()),
                    (Some(State::Node(..)), "node") => State::Node(NodeBuilder::default()),
                    (Some(State::Node(..)), "interface") => {
                        State::Interface(InterfaceBuilder::default())
                    }
                    (Some(State::Interface(..)), "method") => {
                        State::Method(MemberBuilder::default())
                    }
                    (Some(State::Interface(..)), "signal") => {
                        State::Signal(MemberBuilder::default())
                    }
                    (Some(State::Interface(..)), "property") => {
                        State::Property(PropertyBuilder::default())
                    }
                    (Some(State::Method(..) | State::Signal(..)), "arg") => {
                        State::Argument(ArgumentBuilder::default())
                    }
                    (Some(parent), "annotation") if parent.is_annotated() => {
                        State::Annotation(AnnotationBuilder::default())
                    }
                    (Some(parent), "doc") if parent.is_annotated() => State::Doc(Doc::default()),
                    (Some(State::Doc(..)), "summary") => {
                        State::String("summary", StringBuilder::default())
                    }
                    (Some(State::Doc(..)), "description") => {
                        State::Description(Description::default())
                    }
                    (Some(State::Description(..)), "para") => {
                        State::String("para", StringBuilder::default())
                    }
                    (_, element) => {
                        return Err(Error::new(
                            path,
                            ErrorKind::UnsupportedElementStart(element.into()),
                        ));
                    }
                };

                stack.push(state);

                if !path.is_empty() {
                    path.push('/');
                }

                path.push_str(local.as_str());
            }
            Token::ElementEnd { end, .. } => {
                let name = match end {
                    ElementEnd::Open => {
                        continue;
                    }
                    ElementEnd::Close(_, name) => Some(name.as_str()),
                    ElementEnd::Empty => None,
                };

                let Some(top) = stack.pop() else {
                    return Err(Error::new(path, ErrorKind::UnsupportedElementEnd));
                };

                match (&mut stack[..], top) {
                    ([], State::Node(builder)) => {
                        expect_end!(name, "node");
                        root = Some(builder.build());
                    }
                    ([.., State::Node(parent)], State::Node(builder)) => {
                        expect_end!(name, "node");
                        parent.nodes.push(builder.build());
                    }
                    ([.., State::Node(node)], State::Interface(builder)) => {
                        expect_end!(name, "interface");
                        node.interfaces.push(build!(builder));
                    }
                    ([.., State::Interface(interface)], State::Method(builder)) => {
                        expect_end!(name, "method");
                        interface.methods.push(build!(builder.method()));
                    }
                    ([.., State::Interface(interface)], State::Signal(builder)) => {
                        expect_end!(name, "signal");
                        interface.signals.push(build!(builder.signal()));
                    }
                    ([.., State::Interface(interface)], State::Property(builder)) => {
                        expect_end!(name, "property");
                        interface.properties.push(build!(builder));
                    }
                    ([.., State::Method(method)], State::Argument(builder)) => {
                        expect_end!(name, "arg");
                        method.arguments.push(build!(builder.with_default(Direction::In)));
                    }
                    ([.., State::Signal(signal)], State::Argument(builder)) => {
                        expect_end!(name, "arg");
                        signal.arguments.push(build!(builder.with_default(Direction::Out)));
                    }
                    ([.., parent], State::Annotation(builder)) => {
                        expect_end!(name, "annotation");
                        let annotation = build!(builder);

                        let Some(annotations) = parent.annotations_mut() else {
                            return Err(Error::new(path, ErrorKind::UnsupportedElementEnd));
                        };

                        annotations.push(annotation);
                    }
                    ([.., parent], State::Doc(doc)) => {
                        expect_end!(name, "doc");

                        let Some(slot) = parent.doc_mut() else {
                            return Err(Error::new(path, ErrorKind::UnsupportedElementEnd));
                        };

                        *slot = doc;
                    }
                    ([.., State::Doc(doc)], State::String("summary", string)) => {
                        expect_end!(name, "summary");
                        doc.summary = string.text;
                    }
                    ([.., State::Doc(doc)], State::Description(description)) => {
                        expect_end!(name, "description");
                        doc.description = description;
                    }
                    ([.., State::Description(description)], State::String("para", string)) => {
                        expect_end!(name, "para");
                        description.paragraph = string.text;
                    }
                    _ => return Err(Error::new(path, ErrorKind::UnsupportedElementEnd)),
                }

                if let Some(index) = path.rfind('/') {
                    path.truncate(index);
                } else {
                    path.clear();
                }
            }
            Token::Attribute {
                prefix,
                local,
                value,
                ..
            } => {
                let value = value.as_str();

                match (&mut stack[..], prefix.as_str(), local.as_str()) {
                    ([.., State::Node(..)], "xmlns", _) | ([.., State::Node(..)], "", "xmlns") => {
                        // namespace declarations, usually for `doc:`, are
                        // accepted without validation.
                    }
                    ([.., State::Property(builder)], _, "type") => {
                        builder.ty = Some(value);
                    }
                    ([.., State::Property(builder)], _, "access") => {
                        builder.access = Some(match value {
                            "read" => Access::Read,
                            "write" => Access::Write,
                            "readwrite" => Access::ReadWrite,
                            other => {
                                return Err(Error::new(
                                    path,
                                    ErrorKind::UnsupportedPropertyAccess(other.into()),
                                ));
                            }
                        });
                    }
                    ([.., State::Argument(builder)], _, "type") => {
                        builder.ty = Some(value);
                    }
                    ([.., State::Argument(builder)], _, "direction") => {
                        builder.direction = Some(match value {
                            "in" => Direction::In,
                            "out" => Direction::Out,
                            other => {
                                return Err(Error::new(
                                    path,
                                    ErrorKind::UnsupportedArgumentDirection(other.into()),
                                ));
                            }
                        });
                    }
                    ([.., State::Annotation(builder)], _, "value") => {
                        builder.value = Some(value);
                    }
                    ([.., top], _, "name") => {
                        let Some(slot) = top.name_mut() else {
                            return Err(Error::new(
                                path,
                                ErrorKind::UnsupportedAttribute("name".into()),
                            ));
                        };

                        *slot = Some(value);
                    }
                    (_, _, name) => {
                        return Err(Error::new(
                            path,
                            ErrorKind::UnsupportedAttribute(name.into()),
                        ));
                    }
                }
            }
            Token::Text { text } => match stack.last_mut() {
                Some(State::String(_, string)) => {
                    string.text = Some(text.as_str().trim());
                }
                _ => {
                    if !text.as_str().trim().is_empty() {
                        return Err(Error::new(path, ErrorKind::UnsupportedText));
                    }
                }
            },
            _ => {}
        }
    }

    root.ok_or_else(|| Error::new(path, ErrorKind::MissingNode))
}

#[derive(Debug, Default)]
struct NodeBuilder<'a> {
    name: Option<&'a str>,
    interfaces: Vec<Interface<'a>>,
    nodes: Vec<Node<'a>>,
}

impl<'a> NodeBuilder<'a> {
    fn build(self) -> Node<'a> {
        Node {
            name: self.name,
            interfaces: self.interfaces.into(),
            nodes: self.nodes.into(),
        }
    }
}

#[derive(Debug, Default)]
struct InterfaceBuilder<'a> {
    name: Option<&'a str>,
    methods: Vec<Method<'a>>,
    signals: Vec<Signal<'a>>,
    properties: Vec<Property<'a>>,
    annotations: Vec<Annotation<'a>>,
    doc: Doc<'a>,
}

impl<'a> InterfaceBuilder<'a> {
    fn build(self) -> Result<Interface<'a>, ErrorKind> {
        let name = self.name.ok_or(ErrorKind::MissingInterfaceName)?;

        Ok(Interface {
            name,
            methods: self.methods.into(),
            signals: self.signals.into(),
            properties: self.properties.into(),
            annotations: self.annotations.into(),
            doc: self.doc,
        })
    }
}

/// Shared builder for methods and signals, which only differ in the default
/// direction of their arguments.
#[derive(Debug, Default)]
struct MemberBuilder<'a> {
    name: Option<&'a str>,
    arguments: Vec<Argument<'a>>,
    annotations: Vec<Annotation<'a>>,
    doc: Doc<'a>,
}

impl<'a> MemberBuilder<'a> {
    fn method(self) -> MethodBuild<'a> {
        MethodBuild(self)
    }

    fn signal(self) -> SignalBuild<'a> {
        SignalBuild(self)
    }
}

struct MethodBuild<'a>(MemberBuilder<'a>);

impl<'a> MethodBuild<'a> {
    fn build(self) -> Result<Method<'a>, ErrorKind> {
        let MemberBuilder {
            name,
            arguments,
            annotations,
            doc,
        } = self.0;

        Ok(Method {
            name: name.ok_or(ErrorKind::MissingMethodName)?,
            arguments: arguments.into(),
            annotations: annotations.into(),
            doc,
        })
    }
}

struct SignalBuild<'a>(MemberBuilder<'a>);

impl<'a> SignalBuild<'a> {
    fn build(self) -> Result<Signal<'a>, ErrorKind> {
        let MemberBuilder {
            name,
            arguments,
            annotations,
            doc,
        } = self.0;

        Ok(Signal {
            name: name.ok_or(ErrorKind::MissingSignalName)?,
            arguments: arguments.into(),
            annotations: annotations.into(),
            doc,
        })
    }
}

#[derive(Debug, Default)]
struct PropertyBuilder<'a> {
    name: Option<&'a str>,
    ty: Option<&'a str>,
    access: Option<Access>,
    annotations: Vec<Annotation<'a>>,
    doc: Doc<'a>,
}

impl<'a> PropertyBuilder<'a> {
    fn build(self) -> Result<Property<'a>, ErrorKind> {
        let name = self.name.ok_or(ErrorKind::MissingPropertyName)?;
        let ty = self.ty.ok_or(ErrorKind::MissingPropertyType)?;
        TypeNode::parse_single(ty)?;
        let access = self.access.ok_or(ErrorKind::MissingPropertyAccess)?;

        Ok(Property {
            name,
            ty,
            access,
            annotations: self.annotations.into(),
            doc: self.doc,
        })
    }
}

#[derive(Debug, Default)]
struct ArgumentBuilder<'a> {
    name: Option<&'a str>,
    ty: Option<&'a str>,
    direction: Option<Direction>,
    annotations: Vec<Annotation<'a>>,
    doc: Doc<'a>,
}

impl ArgumentBuilder<'_> {
    fn with_default(mut self, direction: Direction) -> Self {
        self.direction.get_or_insert(direction);
        self
    }
}

impl<'a> ArgumentBuilder<'a> {
    fn build(self) -> Result<Argument<'a>, ErrorKind> {
        let ty = self.ty.ok_or(ErrorKind::MissingArgumentType)?;
        TypeNode::parse_single(ty)?;

        Ok(Argument {
            name: self.name,
            ty,
            direction: self.direction.unwrap_or(Direction::In),
            annotations: self.annotations.into(),
            doc: self.doc,
        })
    }
}

#[derive(Debug, Default)]
struct AnnotationBuilder<'a> {
    name: Option<&'a str>,
    value: Option<&'a str>,
}

impl<'a> AnnotationBuilder<'a> {
    fn build(self) -> Result<Annotation<'a>, ErrorKind> {
        Ok(Annotation {
            name: self.name.ok_or(ErrorKind::MissingAnnotationName)?,
            value: self.value.ok_or(ErrorKind::MissingAnnotationValue)?,
        })
    }
}

#[derive(Debug, Default)]
struct StringBuilder<'a> {
    text: Option<&'a str>,
}

#[derive(Debug)]
enum State<'a> {
    Node(NodeBuilder<'a>),
    Interface(InterfaceBuilder<'a>),
    Method(MemberBuilder<'a>),
    Signal(MemberBuilder<'a>),
    Property(PropertyBuilder<'a>),
    Argument(ArgumentBuilder<'a>),
    Annotation(AnnotationBuilder<'a>),
    Doc(Doc<'a>),
    Description(Description<'a>),
    String(&'static str, StringBuilder<'a>),
}

impl<'a> State<'a> {
    /// Elements which accept `annotation` and `doc` children.
    fn is_annotated(&self) -> bool {
        matches!(
            self,
            State::Interface(..)
                | State::Method(..)
                | State::Signal(..)
                | State::Property(..)
                | State::Argument(..)
        )
    }

    fn annotations_mut(&mut self) -> Option<&mut Vec<Annotation<'a>>> {
        match self {
            State::Interface(builder) => Some(&mut builder.annotations),
            State::Method(builder) | State::Signal(builder) => Some(&mut builder.annotations),
            State::Property(builder) => Some(&mut builder.annotations),
            State::Argument(builder) => Some(&mut builder.annotations),
            _ => None,
        }
    }

    fn doc_mut(&mut self) -> Option<&mut Doc<'a>> {
        match self {
            State::Interface(builder) => Some(&mut builder.doc),
            State::Method(builder) | State::Signal(builder) => Some(&mut builder.doc),
            State::Property(builder) => Some(&mut builder.doc),
            State::Argument(builder) => Some(&mut builder.doc),
            _ => None,
        }
    }

    fn name_mut(&mut self) -> Option<&mut Option<&'a str>> {
        match self {
            State::Node(builder) => Some(&mut builder.name),
            State::Interface(builder) => Some(&mut builder.name),
            State::Method(builder) | State::Signal(builder) => Some(&mut builder.name),
            State::Property(builder) => Some(&mut builder.name),
            State::Argument(builder) => Some(&mut builder.name),
            State::Annotation(builder) => Some(&mut builder.name),
            _ => None,
        }
    }
}
