//! Low level details for the D-Bus protocol implementation.

/// The only protocol version supported by this implementation.
pub const PROTOCOL_VERSION: u8 = 1;

raw_enum! {
    /// The endianness of a message.
    #[repr(u8)]
    pub enum Endianness {
        /// Little endian.
        LITTLE = b'l',
        /// Big endian.
        BIG = b'B',
    }
}

impl Endianness {
    /// Native endian.
    #[cfg(target_endian = "little")]
    pub const NATIVE: Self = Self::LITTLE;
    /// Native endian.
    #[cfg(target_endian = "big")]
    pub const NATIVE: Self = Self::BIG;
}

raw_enum! {
    /// The type of a message.
    #[repr(u8)]
    pub enum MessageType {
        /// Method call. This message type may prompt a reply.
        METHOD_CALL = 1,
        /// Method reply with returned data.
        METHOD_RETURN = 2,
        /// Error reply. If the first argument exists and is a string, it is an
        /// error message.
        ERROR = 3,
        /// Signal emission.
        SIGNAL = 4,
    }
}

raw_set! {
    /// Flags inside of a D-Bus message.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus_core::proto::Flags;
    ///
    /// let flags = Flags::EMPTY;
    /// assert!(!(flags & Flags::NO_REPLY_EXPECTED));
    ///
    /// let flags = Flags::EMPTY | Flags::NO_REPLY_EXPECTED;
    /// assert!(flags & Flags::NO_REPLY_EXPECTED);
    /// assert!(!(flags & Flags::NO_AUTO_START));
    /// ```
    #[repr(u8)]
    pub enum Flags {
        /// An empty set of flags.
        EMPTY = 0,
        /// This message does not expect method return replies or error replies,
        /// even if it is of a type that can have a reply; the reply should be
        /// omitted.
        NO_REPLY_EXPECTED = 1,
        /// The bus must not launch an owner for the destination name in
        /// response to this message.
        NO_AUTO_START = 2,
        /// This flag may be set on a method call message to inform the
        /// receiving side that the caller is prepared to wait for interactive
        /// authorization, which might take a considerable time to complete.
        ALLOW_INTERACTIVE_AUTHORIZATION = 4,
    }
}

raw_enum! {
    /// The code of a header field.
    #[repr(u8)]
    pub enum HeaderField {
        /// The object to send a call to, or the object a signal is emitted
        /// from.
        PATH = 1,
        /// The interface to invoke a method call on, or that a signal is
        /// emitted from.
        INTERFACE = 2,
        /// The member, either the method name or signal name.
        MEMBER = 3,
        /// The name of the error that occurred, for errors.
        ERROR_NAME = 4,
        /// The serial number of the message this message is a reply to.
        REPLY_SERIAL = 5,
        /// The name of the connection this message is intended for.
        DESTINATION = 6,
        /// Unique name of the sending connection.
        SENDER = 7,
        /// The signature of the message body. If omitted, it is assumed to be
        /// the empty signature "" (i.e. the body must be 0-length).
        SIGNATURE = 8,
        /// The number of Unix file descriptors that accompany the message.
        UNIX_FDS = 9,
    }
}

impl HeaderField {
    /// The signature a header field must be encoded with, or `None` if the
    /// field is not known.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus_core::proto::HeaderField;
    ///
    /// assert_eq!(HeaderField::PATH.signature(), Some("o"));
    /// assert_eq!(HeaderField::MEMBER.signature(), Some("s"));
    /// assert_eq!(HeaderField::new(42).signature(), None);
    /// ```
    pub const fn signature(self) -> Option<&'static str> {
        match self {
            Self::PATH => Some("o"),
            Self::REPLY_SERIAL | Self::UNIX_FDS => Some("u"),
            Self::SIGNATURE => Some("g"),
            Self::INTERFACE | Self::MEMBER | Self::ERROR_NAME | Self::DESTINATION | Self::SENDER => {
                Some("s")
            }
            _ => None,
        }
    }
}

raw_enum! {
    /// A type code inside of a signature.
    #[repr(u8)]
    pub enum Type {
        /// 8-bit unsigned integer
        BYTE = b'y',
        /// Boolean value, 0 is FALSE and 1 is TRUE. Everything else is invalid.
        BOOLEAN = b'b',
        /// 16-bit signed integer
        INT16 = b'n',
        /// 16-bit unsigned integer
        UINT16 = b'q',
        /// 32-bit signed integer
        INT32 = b'i',
        /// 32-bit unsigned integer
        UINT32 = b'u',
        /// 64-bit signed integer
        INT64 = b'x',
        /// 64-bit unsigned integer
        UINT64 = b't',
        /// IEEE 754 double
        DOUBLE = b'd',
        /// UTF-8 string (must be valid UTF-8). Must be nul terminated and
        /// contain no other nul bytes.
        STRING = b's',
        /// Name of an object instance
        OBJECT_PATH = b'o',
        /// A type signature
        SIGNATURE = b'g',
        /// Unix file descriptor, stored as an index into the out-of-band list
        /// of descriptors.
        UNIX_FD = b'h',
        /// Array.
        ARRAY = b'a',
        OPEN_PAREN = b'(',
        CLOSE_PAREN = b')',
        OPEN_BRACE = b'{',
        CLOSE_BRACE = b'}',
        /// Variant type (the type of the value is part of the value itself).
        VARIANT = b'v',
    }
}

impl Type {
    /// Test if the type code denotes a basic type, which is a type that can
    /// be used as the key of a dict entry.
    pub const fn is_basic(self) -> bool {
        matches!(
            self,
            Self::BYTE
                | Self::BOOLEAN
                | Self::INT16
                | Self::UINT16
                | Self::INT32
                | Self::UINT32
                | Self::INT64
                | Self::UINT64
                | Self::DOUBLE
                | Self::STRING
                | Self::OBJECT_PATH
                | Self::SIGNATURE
                | Self::UNIX_FD
        )
    }

    /// The alignment in bytes which a value of this type starts at.
    ///
    /// # Examples
    ///
    /// ```
    /// use xbus_core::proto::Type;
    ///
    /// assert_eq!(Type::BYTE.alignment(), 1);
    /// assert_eq!(Type::UINT16.alignment(), 2);
    /// assert_eq!(Type::STRING.alignment(), 4);
    /// assert_eq!(Type::DOUBLE.alignment(), 8);
    /// ```
    pub const fn alignment(self) -> usize {
        match self {
            Self::BYTE | Self::SIGNATURE | Self::VARIANT => 1,
            Self::INT16 | Self::UINT16 => 2,
            Self::BOOLEAN
            | Self::INT32
            | Self::UINT32
            | Self::STRING
            | Self::OBJECT_PATH
            | Self::UNIX_FD
            | Self::ARRAY => 4,
            Self::INT64 | Self::UINT64 | Self::DOUBLE => 8,
            Self::OPEN_PAREN | Self::OPEN_BRACE => 8,
            _ => 1,
        }
    }
}
