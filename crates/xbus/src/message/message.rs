use std::os::fd::RawFd;

use tracing::trace;

use crate::buf::{MAX_ARRAY_LENGTH, MAX_BODY_LENGTH};
use crate::error::{Error, ErrorKind, Result};
use crate::proto::{Endianness, Flags, HeaderField, MessageType, PROTOCOL_VERSION};
use crate::{Reader, Value, Writer};

/// An owned D-Bus message.
///
/// # Examples
///
/// ```
/// use xbus::{Message, MessageType};
///
/// let m = Message::method_call("/org/freedesktop/DBus", "Hello", 1)
///     .with_sender(":1.42")
///     .with_destination("org.freedesktop.DBus");
///
/// let reply = m.method_return(2);
/// assert_eq!(reply.message_type(), MessageType::METHOD_RETURN);
/// assert_eq!(reply.reply_serial(), Some(1));
/// assert_eq!(reply.destination(), Some(":1.42"));
/// assert_eq!(reply.sender(), Some("org.freedesktop.DBus"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// The type of the message.
    pub(crate) message_type: MessageType,
    /// Serial of the message.
    pub(crate) serial: u32,
    /// Flags in the message.
    pub(crate) flags: Flags,
    pub(crate) path: Option<String>,
    pub(crate) interface: Option<String>,
    pub(crate) member: Option<String>,
    pub(crate) error_name: Option<String>,
    pub(crate) reply_serial: Option<u32>,
    pub(crate) destination: Option<String>,
    pub(crate) sender: Option<String>,
    /// The signature of the body, empty if there is no body.
    pub(crate) signature: String,
    pub(crate) body: Vec<Value>,
}

impl Message {
    /// Construct an empty message of the given type.
    pub fn new(message_type: MessageType, serial: u32) -> Self {
        Self {
            message_type,
            serial,
            flags: Flags::EMPTY,
            path: None,
            interface: None,
            member: None,
            error_name: None,
            reply_serial: None,
            destination: None,
            sender: None,
            signature: String::new(),
            body: Vec::new(),
        }
    }

    /// Construct a method call [`Message`].
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Message, MessageType};
    ///
    /// let m = Message::method_call("/org/freedesktop/DBus", "Hello", 1);
    /// assert_eq!(m.message_type(), MessageType::METHOD_CALL);
    /// assert_eq!(m.path(), Some("/org/freedesktop/DBus"));
    /// assert_eq!(m.member(), Some("Hello"));
    /// ```
    pub fn method_call(path: impl Into<String>, member: impl Into<String>, serial: u32) -> Self {
        Self::new(MessageType::METHOD_CALL, serial)
            .with_path(path)
            .with_member(member)
    }

    /// Construct a signal [`Message`].
    #[must_use]
    pub fn signal(
        path: impl Into<String>,
        interface: impl Into<String>,
        member: impl Into<String>,
        serial: u32,
    ) -> Self {
        Self::new(MessageType::SIGNAL, serial)
            .with_path(path)
            .with_interface(interface)
            .with_member(member)
    }

    /// Construct a method return message replying to this message, with an
    /// empty body.
    ///
    /// The sender and destination are swapped.
    #[must_use]
    pub fn method_return(&self, serial: u32) -> Self {
        Self {
            reply_serial: Some(self.serial),
            destination: self.sender.clone(),
            sender: self.destination.clone(),
            ..Self::new(MessageType::METHOD_RETURN, serial)
        }
    }

    /// Construct an error message replying to this message, with an empty
    /// body.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Message, MessageType, Value};
    ///
    /// let m = Message::method_call("/org/example", "Frobnicate", 7).with_sender(":1.7");
    ///
    /// let error = m
    ///     .error("org.freedesktop.DBus.Error.UnknownMethod", 8)
    ///     .with_body("s", vec![Value::from("no such method")]);
    ///
    /// assert_eq!(error.message_type(), MessageType::ERROR);
    /// assert_eq!(error.error_name(), Some("org.freedesktop.DBus.Error.UnknownMethod"));
    /// assert_eq!(error.reply_serial(), Some(7));
    /// assert_eq!(error.destination(), Some(":1.7"));
    /// ```
    #[must_use]
    pub fn error(&self, error_name: impl Into<String>, serial: u32) -> Self {
        Self {
            error_name: Some(error_name.into()),
            reply_serial: Some(self.serial),
            destination: self.sender.clone(),
            sender: self.destination.clone(),
            ..Self::new(MessageType::ERROR, serial)
        }
    }

    /// Get the type of the message.
    #[inline]
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// Get the serial of the message.
    #[inline]
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Modify the serial of the message.
    #[must_use]
    pub fn with_serial(self, serial: u32) -> Self {
        Self { serial, ..self }
    }

    /// Get the flags of the message.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Modify the flags of the message.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Flags, Message};
    ///
    /// let m = Message::method_call("/", "Ping", 1).with_flags(Flags::NO_REPLY_EXPECTED);
    /// assert!(m.flags() & Flags::NO_REPLY_EXPECTED);
    /// ```
    #[must_use]
    pub fn with_flags(self, flags: Flags) -> Self {
        Self { flags, ..self }
    }

    /// Get the object path of the message.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Modify the object path of the message.
    #[must_use]
    pub fn with_path(self, path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            ..self
        }
    }

    /// Get the interface of the message.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_deref()
    }

    /// Modify the interface of the message.
    #[must_use]
    pub fn with_interface(self, interface: impl Into<String>) -> Self {
        Self {
            interface: Some(interface.into()),
            ..self
        }
    }

    /// Get the member of the message.
    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// Modify the member of the message.
    #[must_use]
    pub fn with_member(self, member: impl Into<String>) -> Self {
        Self {
            member: Some(member.into()),
            ..self
        }
    }

    /// Get the error name of the message.
    pub fn error_name(&self) -> Option<&str> {
        self.error_name.as_deref()
    }

    /// Modify the error name of the message.
    #[must_use]
    pub fn with_error_name(self, error_name: impl Into<String>) -> Self {
        Self {
            error_name: Some(error_name.into()),
            ..self
        }
    }

    /// Get the serial this message is a reply to.
    pub fn reply_serial(&self) -> Option<u32> {
        self.reply_serial
    }

    /// Modify the serial this message is a reply to.
    #[must_use]
    pub fn with_reply_serial(self, reply_serial: u32) -> Self {
        Self {
            reply_serial: Some(reply_serial),
            ..self
        }
    }

    /// Get the destination of the message.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Modify the destination of the message.
    #[must_use]
    pub fn with_destination(self, destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            ..self
        }
    }

    /// Get the sender of the message.
    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    /// Modify the sender of the message.
    #[must_use]
    pub fn with_sender(self, sender: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            ..self
        }
    }

    /// Get the signature of the body.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Get the body of the message.
    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// Convert the message into its body.
    pub fn into_body(self) -> Vec<Value> {
        self.body
    }

    /// Convert a reply into the values it returned.
    ///
    /// An [`MessageType::ERROR`] reply is converted into a remote error, using
    /// the first body argument as its message if it is a string.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Message, Value};
    ///
    /// let call = Message::method_call("/", "Ping", 1);
    ///
    /// let reply = call.method_return(2).with_body("s", vec![Value::from("pong")]);
    /// assert_eq!(reply.into_reply()?, [Value::from("pong")]);
    ///
    /// let reply = call
    ///     .error("org.example.Error.Failed", 3)
    ///     .with_body("s", vec![Value::from("it broke")]);
    ///
    /// let error = reply.into_reply().unwrap_err();
    /// assert_eq!(error.remote_name(), Some("org.example.Error.Failed"));
    /// assert_eq!(error.remote_message(), Some("it broke"));
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn into_reply(self) -> Result<Vec<Value>> {
        if self.message_type != MessageType::ERROR {
            return Ok(self.body);
        }

        let message = match self.body.first() {
            Some(Value::String(message)) => message.as_str(),
            _ => "",
        };

        let name = self.error_name.as_deref().unwrap_or_default();
        Err(Error::remote(name, message))
    }

    /// Modify the body of the message.
    ///
    /// The values are checked against the signature once the message is
    /// marshaled.
    #[must_use]
    pub fn with_body(self, signature: impl Into<String>, body: Vec<Value>) -> Self {
        Self {
            signature: signature.into(),
            body,
            ..self
        }
    }

    /// Marshal the message in little endian byte order, returning the bytes
    /// and the file descriptors which must be sent alongside them.
    pub fn marshal(&self) -> Result<(Vec<u8>, Vec<RawFd>)> {
        self.marshal_with(Endianness::LITTLE)
    }

    /// Marshal the message using the given byte order.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::{Endianness, Message, Value};
    ///
    /// let m = Message::method_call("/", "Ping", 1).with_body("u", vec![Value::Uint32(1)]);
    ///
    /// let (big, _) = m.marshal_with(Endianness::BIG)?;
    /// assert_eq!(big[0], b'B');
    ///
    /// let (decoded, _, _) = Message::unmarshal(&big, &[])?;
    /// assert_eq!(decoded, m);
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn marshal_with(&self, endianness: Endianness) -> Result<(Vec<u8>, Vec<RawFd>)> {
        let mut body = Writer::with_endianness(endianness);
        body.marshal(&self.signature, &self.body)?;
        let (body, fds) = body.into_parts();

        let body_length = match u32::try_from(body.len()) {
            Ok(length) if length <= MAX_BODY_LENGTH => length,
            Ok(length) => return Err(Error::new(ErrorKind::BodyTooLong(length))),
            Err(..) => return Err(Error::new(ErrorKind::BodyTooLong(u32::MAX))),
        };

        let mut w = Writer::with_endianness(endianness);

        w.store(endianness.get());
        w.store(self.message_type.get());
        w.store(self.flags.get());
        w.store(PROTOCOL_VERSION);
        w.store(body_length);
        w.store(self.serial);

        let length = w.alloc::<u32>();
        let start = w.len();

        let fields = [
            (HeaderField::PATH, self.path.as_deref()),
            (HeaderField::INTERFACE, self.interface.as_deref()),
            (HeaderField::MEMBER, self.member.as_deref()),
            (HeaderField::ERROR_NAME, self.error_name.as_deref()),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                store_str_field(&mut w, field, value)?;
            }
        }

        if let Some(reply_serial) = self.reply_serial {
            store_u32_field(&mut w, HeaderField::REPLY_SERIAL, reply_serial)?;
        }

        let fields = [
            (HeaderField::DESTINATION, self.destination.as_deref()),
            (HeaderField::SENDER, self.sender.as_deref()),
        ];

        for (field, value) in fields {
            if let Some(value) = value {
                store_str_field(&mut w, field, value)?;
            }
        }

        if !self.signature.is_empty() {
            w.align(8);
            w.store(HeaderField::SIGNATURE.get());
            w.write_signature("g")?;
            w.write_signature(&self.signature)?;
        }

        if !fds.is_empty() {
            store_u32_field(&mut w, HeaderField::UNIX_FDS, fds.len() as u32)?;
        }

        let header_length = (w.len() - start) as u32;

        if header_length > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(header_length)));
        }

        w.store_at(length, header_length);
        w.align(8);
        w.extend_from_slice(&body);

        let (data, _) = w.into_parts();
        Ok((data, fds))
    }

    /// Unmarshal a single message from the start of `data`, where `fds` are
    /// the file descriptors received alongside it.
    ///
    /// Returns the message, the data following it and the file descriptors
    /// not claimed by it.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus::Message;
    ///
    /// let (mut data, _) = Message::method_call("/", "Ping", 1).marshal()?;
    /// data.push(0);
    ///
    /// let (m, tail, fds) = Message::unmarshal(&data, &[3])?;
    /// assert_eq!(m.member(), Some("Ping"));
    /// assert_eq!(tail, &[0]);
    /// assert_eq!(fds, &[3]);
    /// # Ok::<_, xbus::Error>(())
    /// ```
    pub fn unmarshal<'a, 'b>(
        data: &'a [u8],
        fds: &'b [RawFd],
    ) -> Result<(Message, &'a [u8], &'b [RawFd])> {
        let Some(&marker) = data.first() else {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        };

        let endianness = match Endianness::new(marker) {
            endianness @ (Endianness::LITTLE | Endianness::BIG) => endianness,
            _ => return Err(Error::new(ErrorKind::InvalidEndianness(marker))),
        };

        let mut r = Reader::new(data, fds, endianness);
        r.advance(1)?;

        let message_type = MessageType::new(r.load::<u8>()?);

        if !message_type.is_known() {
            return Err(Error::new(ErrorKind::InvalidMessageType(
                message_type.get(),
            )));
        }

        let flags = Flags::new(r.load::<u8>()?);
        let version = r.load::<u8>()?;

        if version != PROTOCOL_VERSION {
            return Err(Error::new(ErrorKind::UnsupportedVersion(version)));
        }

        let body_length = r.load::<u32>()?;

        if body_length > MAX_BODY_LENGTH {
            return Err(Error::new(ErrorKind::BodyTooLong(body_length)));
        }

        let serial = r.load::<u32>()?;
        let header_length = r.load::<u32>()?;

        if header_length > MAX_ARRAY_LENGTH {
            return Err(Error::new(ErrorKind::ArrayTooLong(header_length)));
        }

        r.align(8)?;
        let end = r.position() + header_length as usize;

        let mut message = Message::new(message_type, serial).with_flags(flags);
        let mut unix_fds = 0u32;

        while r.position() < end {
            // NB: Structs are aligned to 8 bytes.
            r.align(8)?;
            let field = HeaderField::new(r.load::<u8>()?);
            let variant = r.read_variant()?;

            let Some(expected) = field.signature() else {
                trace!(?field, "ignoring unknown header field");
                continue;
            };

            if variant.signature() != expected {
                return Err(Error::new(ErrorKind::HeaderFieldTypeMismatch {
                    field,
                    expected,
                    actual: variant.signature().into(),
                }));
            }

            match (field, variant.into_value()) {
                (HeaderField::PATH, Value::ObjectPath(path)) => message.path = Some(path),
                (HeaderField::INTERFACE, Value::String(s)) => message.interface = Some(s),
                (HeaderField::MEMBER, Value::String(s)) => message.member = Some(s),
                (HeaderField::ERROR_NAME, Value::String(s)) => message.error_name = Some(s),
                (HeaderField::REPLY_SERIAL, Value::Uint32(n)) => message.reply_serial = Some(n),
                (HeaderField::DESTINATION, Value::String(s)) => message.destination = Some(s),
                (HeaderField::SENDER, Value::String(s)) => message.sender = Some(s),
                (HeaderField::SIGNATURE, Value::Signature(s)) => message.signature = s,
                (HeaderField::UNIX_FDS, Value::Uint32(n)) => unix_fds = n,
                _ => return Err(Error::new(ErrorKind::MalformedContainer)),
            }
        }

        if r.position() != end {
            return Err(Error::new(ErrorKind::MalformedContainer));
        }

        r.align(8)?;

        let start = r.position();
        let body_end = start + body_length as usize;

        let Some(body) = data.get(start..body_end) else {
            return Err(Error::new(ErrorKind::BufferUnderflow));
        };

        let Some((message_fds, fds_tail)) = fds.split_at_checked(unix_fds as usize) else {
            return Err(Error::new(ErrorKind::MissingFileDescriptor(unix_fds)));
        };

        let mut body = Reader::new(body, message_fds, endianness);
        message.body = body.unmarshal(&message.signature)?;

        if !body.is_empty() {
            return Err(Error::new(ErrorKind::MalformedContainer));
        }

        trace!(
            message_type = ?message.message_type,
            serial = message.serial,
            member = message.member.as_deref(),
            signature = message.signature.as_str(),
            "decoded message"
        );

        Ok((message, &data[body_end..], fds_tail))
    }
}

fn store_str_field(w: &mut Writer, field: HeaderField, value: &str) -> Result<()> {
    w.align(8);
    w.store(field.get());

    match field.signature() {
        Some(signature) => w.write_signature(signature)?,
        None => return Err(Error::new(ErrorKind::MalformedContainer)),
    }

    w.write_str(value)
}

fn store_u32_field(w: &mut Writer, field: HeaderField, value: u32) -> Result<()> {
    w.align(8);
    w.store(field.get());
    w.write_signature("u")?;
    w.store(value);
    Ok(())
}
