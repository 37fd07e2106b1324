//! Parser for D-Bus introspection documents.
//!
//! # Examples
//!
//! ```
//! use xbus_xml::{parse_interface, Access, Direction};
//!
//! let node = parse_interface(r#"
//! <node>
//!   <interface name="org.example.Counter">
//!     <method name="Add">
//!       <arg name="amount" type="u"/>
//!       <arg name="total" type="t" direction="out"/>
//!     </method>
//!     <property name="Total" type="t" access="read"/>
//!   </interface>
//!   <node name="child"/>
//! </node>
//! "#)?;
//!
//! let interface = &node.interfaces[0];
//! assert_eq!(interface.name, "org.example.Counter");
//! assert_eq!(interface.methods[0].arguments[0].direction, Direction::In);
//! assert_eq!(interface.properties[0].access, Access::Read);
//! assert_eq!(node.nodes[0].name, Some("child"));
//! # Ok::<_, xbus_xml::Error>(())
//! ```

#[cfg(test)]
mod tests;

pub use self::error::{Error, Result};
mod error;

pub use self::elements::{
    Access, Annotation, Argument, Description, Direction, Doc, Interface, Method, Node, Property,
    Signal,
};
mod elements;

pub use self::parser::parse_interface;
mod parser;
