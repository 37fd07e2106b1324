use crate::{Access, Annotation, Direction, Result, parse_interface};

const SIMPLE: &str = r#"
<!DOCTYPE node PUBLIC
    "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
    "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd" >
<node xmlns:doc="http://www.freedesktop.org/dbus/1.0/doc.dtd">
  <interface name="com.example.MyService1.InterestingInterface">
    <method name="AddContact">
      <arg name="name" direction="in" type="s">
        <doc:doc><doc:summary>Name of new contact</doc:summary></doc:doc>
      </arg>
      <arg name="email" direction="in" type="s">
        <doc:doc><doc:summary>E-mail address of new contact</doc:summary></doc:doc>
      </arg>
      <arg name="id" direction="out" type="u">
        <doc:doc><doc:summary>ID of newly added contact</doc:summary></doc:doc>
      </arg>
      <doc:doc>
        <doc:description>
          <doc:para>
            Adds a new contact to the address book with their name and
            e-mail address.
          </doc:para>
        </doc:description>
      </doc:doc>
    </method>
  </interface>
</node>
"#;

const DAEMON: &str = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
"http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <interface name="org.freedesktop.DBus.Properties">
    <method name="Get">
      <arg type="s" name="interface_name" direction="in"/>
      <arg type="s" name="property_name" direction="in"/>
      <arg type="v" name="value" direction="out"/>
    </method>
    <method name="GetAll">
      <arg type="s" name="interface_name" direction="in"/>
      <arg type="a{sv}" name="properties" direction="out"/>
    </method>
    <signal name="PropertiesChanged">
      <arg type="s" name="interface_name"/>
      <arg type="a{sv}" name="changed_properties"/>
      <arg type="as" name="invalidated_properties"/>
    </signal>
  </interface>
  <interface name="org.example.Thermostat">
    <annotation name="org.freedesktop.DBus.Deprecated" value="false"/>
    <method name="Reset">
      <annotation name="org.freedesktop.DBus.Method.NoReply" value="true"/>
    </method>
    <property name="Target" type="d" access="readwrite"/>
    <property name="Current" type="d" access="read">
      <annotation name="org.freedesktop.DBus.Property.EmitsChangedSignal" value="true"/>
    </property>
    <property name="Secret" type="s" access="write"/>
  </interface>
  <node name="sensor0"/>
  <node name="sensor1">
    <interface name="org.example.Sensor"/>
  </node>
</node>
"#;

#[test]
fn test_simple() -> Result<()> {
    let node = parse_interface(SIMPLE)?;
    let interface = &node.interfaces[0];
    assert_eq!(interface.name, "com.example.MyService1.InterestingInterface");

    let method = &interface.methods[0];
    assert_eq!(method.name, "AddContact");
    assert_eq!(method.arguments.len(), 3);
    assert_eq!(method.arguments[0].name, Some("name"));
    assert_eq!(method.arguments[2].ty, "u");
    assert_eq!(method.arguments[2].direction, Direction::Out);
    assert_eq!(
        method.arguments[1].doc.summary,
        Some("E-mail address of new contact")
    );
    assert!(
        method
            .doc
            .description
            .paragraph
            .is_some_and(|p| p.starts_with("Adds a new contact"))
    );
    Ok(())
}

#[test]
fn test_signals_properties_and_nodes() -> Result<()> {
    let node = parse_interface(DAEMON)?;
    assert_eq!(node.name, None);
    assert_eq!(node.interfaces.len(), 2);

    let properties = &node.interfaces[0];
    assert_eq!(properties.methods.len(), 2);

    let signal = &properties.signals[0];
    assert_eq!(signal.name, "PropertiesChanged");
    assert_eq!(signal.arguments.len(), 3);
    assert!(signal.arguments.iter().all(|a| a.direction == Direction::Out));
    assert_eq!(signal.arguments[1].ty, "a{sv}");

    let thermostat = &node.interfaces[1];
    assert_eq!(
        &thermostat.annotations[..],
        &[Annotation {
            name: "org.freedesktop.DBus.Deprecated",
            value: "false",
        }]
    );
    assert_eq!(thermostat.methods[0].name, "Reset");
    assert!(thermostat.methods[0].arguments.is_empty());
    assert_eq!(thermostat.methods[0].annotations.len(), 1);

    let access = thermostat
        .properties
        .iter()
        .map(|p| (p.name, p.ty, p.access))
        .collect::<Vec<_>>();

    assert_eq!(
        access,
        [
            ("Target", "d", Access::ReadWrite),
            ("Current", "d", Access::Read),
            ("Secret", "s", Access::Write),
        ]
    );
    assert_eq!(thermostat.properties[1].annotations.len(), 1);

    assert_eq!(node.nodes.len(), 2);
    assert_eq!(node.nodes[0].name, Some("sensor0"));
    assert_eq!(node.nodes[1].name, Some("sensor1"));
    assert_eq!(node.nodes[1].interfaces[0].name, "org.example.Sensor");
    Ok(())
}

#[test]
fn test_method_args_default_in() -> Result<()> {
    let node = parse_interface(
        r#"<node><interface name="a.b"><method name="M"><arg type="s"/></method></interface></node>"#,
    )?;

    let argument = &node.interfaces[0].methods[0].arguments[0];
    assert_eq!(argument.direction, Direction::In);
    assert_eq!(argument.name, None);
    Ok(())
}

#[test]
fn test_errors() {
    let error = parse_interface(
        r#"<node><interface name="a.b"><method name="M"><arg type="a{yyy}"/></method></interface></node>"#,
    )
    .unwrap_err();

    assert_eq!(error.path(), "node/interface/method/arg");

    let error = parse_interface(
        r#"<node><interface name="a.b"><property name="P" type="s" access="sometimes"/></interface></node>"#,
    )
    .unwrap_err();

    assert_eq!(error.path(), "node/interface/property");
    assert_eq!(
        error.to_string(),
        "node/interface/property: Unsupported property access `sometimes`"
    );

    let error = parse_interface(r#"<node><interface><method name="M"/></interface></node>"#)
        .unwrap_err();
    assert_eq!(error.to_string(), "node/interface: Missing interface name");

    let error = parse_interface(r#"<node><method name="M"/></node>"#).unwrap_err();
    assert_eq!(error.to_string(), "node: Unsupported element: method");

    let error = parse_interface("").unwrap_err();
    assert_eq!(error.to_string(), "Missing root node");
}
