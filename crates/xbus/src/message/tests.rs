use crate::error::{ErrorKind, Result};
use crate::proto::{Endianness, Flags, HeaderField, MessageType};
use crate::{Dict, Message, Value, Variant};

fn hex(s: &str) -> Vec<u8> {
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn s(value: &str) -> Value {
    Value::from(value)
}

fn u(value: u32) -> Value {
    Value::Uint32(value)
}

fn v(signature: &str, value: Value) -> Value {
    Value::from(Variant::new(signature, value))
}

fn array<const N: usize>(values: [Value; N]) -> Value {
    Value::Array(values.into())
}

fn dict<const N: usize>(entries: [(Value, Value); N]) -> Value {
    Value::Dict(entries.into_iter().collect::<Dict>())
}

fn st<const N: usize>(values: [Value; N]) -> Value {
    Value::Struct(values.into())
}

fn hello() -> Message {
    Message::method_call("/org/freedesktop/DBus", "Hello", 1)
        .with_interface("org.freedesktop.DBus")
        .with_destination("org.freedesktop.DBus")
}

/// Fixed header and header fields shared by every `Hello` vector, up until
/// the `SIGNATURE` header field.
const HELLO_FIELDS: &str = concat!(
    "01016f00150000002f6f72672f667265",
    "656465736b746f702f4442757300000002017300140000006f72672e66726565",
    "6465736b746f702e4442757300000000030173000500000048656c6c6f000000",
    "06017300140000006f72672e667265656465736b746f702e4442757300000000",
);

const HELLO: &str = concat!(
    "6c01000100000000010000006d000000",
    "01016f00150000002f6f72672f667265",
    "656465736b746f702f4442757300000002017300140000006f72672e66726565",
    "6465736b746f702e4442757300000000030173000500000048656c6c6f000000",
    "06017300140000006f72672e667265656465736b746f702e4442757300000000",
);

fn vectors() -> Vec<(Message, Vec<u8>)> {
    let cases: Vec<(&str, Vec<Value>, &str, &str)> = vec![
        (
            "as",
            vec![array([s("hello"), s("world")])],
            "6c0100011a0000000100000078000000",
            concat!(
                "0801670002617300160000000500000068656c6c6f00000005000000776f726c",
                "6400",
            ),
        ),
        (
            "a(uu)",
            vec![array([st([u(1), u(1)]), st([u(2), u(2)])])],
            "6c01000118000000010000007b000000",
            concat!(
                "0801670005612875752900000000000010000000000000000100000001000000",
                "0200000002000000",
            ),
        ),
        (
            "a{ss}",
            vec![dict([(s("foo"), s("bar")), (s("bat"), s("baz"))])],
            "6c01000128000000010000007b000000",
            concat!(
                "0801670005617b73737d000000000000200000000000000003000000666f6f00",
                "030000006261720003000000626174000300000062617a00",
            ),
        ),
        (
            "a(as(uu(a{ss})))",
            vec![array([
                st([
                    array([s("hello"), s("there")]),
                    st([
                        u(5),
                        u(6),
                        st([dict([(s("five"), s("six")), (s("seven"), s("eight"))])]),
                    ]),
                ]),
                st([
                    array([s("to"), s("the"), s("world")]),
                    st([
                        u(7),
                        u(8),
                        st([dict([(s("seven"), s("eight")), (s("nine"), s("ten"))])]),
                    ]),
                ]),
            ])],
            "6c010001c40000000100000086000000",
            concat!(
                "08016700106128617328757528617b73737d292929000000bc00000000000000",
                "160000000500000068656c6c6f00000005000000746865726500000000000000",
                "05000000060000002e0000000000000004000000666976650000000003000000",
                "736978000000000005000000736576656e000000050000006569676874000000",
                "1a00000002000000746f0000030000007468650005000000776f726c64000000",
                "07000000080000002c0000000000000005000000736576656e00000005000000",
                "6569676874000000040000006e696e65000000000300000074656e00",
            ),
        ),
        (
            "t",
            vec![Value::Uint64(9007199254740988)],
            "6c010001080000000100000077000000",
            "0801670001740000fcffffffffff1f00",
        ),
        (
            "x",
            vec![Value::Int64(-9007199254740988)],
            "6c010001080000000100000077000000",
            "0801670001780000040000000000e0ff",
        ),
        (
            "bnqiud",
            vec![
                Value::Bool(true),
                Value::Int16(-200),
                Value::Uint16(150),
                Value::Int32(-20000),
                Value::Uint32(20000),
                Value::Double(9083492084.4444),
            ],
            "6c01000118000000010000007c000000",
            concat!(
                "0801670006626e7169756400000000000100000038ff9600e0b1ffff204e0000",
                "228ea3b758eb0042",
            ),
        ),
        (
            "v",
            vec![v("s", s("hello world"))],
            "6c010001140000000100000077000000",
            "0801670001760000017300000b00000068656c6c6f20776f726c6400",
        ),
        (
            "v",
            vec![v("v", v("s", s("hello")))],
            "6c010001120000000100000077000000",
            "080167000176000001760001730000000500000068656c6c6f00",
        ),
        (
            "a{sv}",
            vec![dict([
                (s("variant_key_1"), v("s", s("variant_val_1"))),
                (s("variant_key_2"), v("s", s("variant_val_2"))),
            ])],
            "6c01000162000000010000007b000000",
            concat!(
                "0801670005617b73767d0000000000005a000000000000000d00000076617269",
                "616e745f6b65795f31000173000000000d00000076617269616e745f76616c5f",
                "31000000000000000d00000076617269616e745f6b65795f3200017300000000",
                "0d00000076617269616e745f76616c5f3200",
            ),
        ),
        (
            "v",
            vec![v("as", array([s("foo"), s("bar")]))],
            "6c010001180000000100000077000000",
            "0801670001760000026173001000000003000000666f6f000300000062617200",
        ),
        (
            "vas",
            vec![v("v", v("s", s("world"))), array([s("bar")])],
            "6c010001200000000100000079000000",
            concat!(
                "08016700037661730000000000000000017600017300000005000000776f726c",
                "64000000080000000300000062617200",
            ),
        ),
        (
            "asbbasbb",
            vec![
                array([s("hello"), s("worl")]),
                Value::Bool(true),
                Value::Bool(false),
                array([s("hello"), s("worl")]),
                Value::Bool(true),
                Value::Bool(false),
            ],
            "6c01000148000000010000007e000000",
            concat!(
                "08016700086173626261736262000000150000000500000068656c6c6f000000",
                "04000000776f726c000000000100000000000000150000000500000068656c6c",
                "6f00000004000000776f726c000000000100000000000000",
            ),
        ),
        (
            "as",
            vec![array([s("//doesntmatter/über")])],
            "6c0100011d0000000100000078000000",
            concat!(
                "080167000261730019000000140000002f2f646f65736e746d61747465722fc3",
                "bc62657200",
            ),
        ),
        (
            "an",
            vec![array([Value::Int16(-1024)])],
            "6c010001060000000100000078000000",
            "0801670002616e000200000000fc",
        ),
    ];

    let mut vectors = vec![(hello(), hex(HELLO))];

    for (signature, body, header, rest) in cases {
        let message = hello().with_body(signature, body);
        let data = hex(&format!("{header}{HELLO_FIELDS}{rest}"));
        vectors.push((message, data));
    }

    vectors
}

#[test]
fn marshal_vectors() -> Result<()> {
    for (index, (message, data)) in vectors().into_iter().enumerate() {
        let (bytes, fds) = message.marshal()?;
        assert_eq!(bytes, data, "marshal vector {index} ({})", message.signature());
        assert!(fds.is_empty());
    }

    Ok(())
}

#[test]
fn unmarshal_vectors() -> Result<()> {
    for (index, (message, data)) in vectors().into_iter().enumerate() {
        let (decoded, tail, fds) = Message::unmarshal(&data, &[])?;
        assert_eq!(decoded, message, "unmarshal vector {index}");
        assert!(tail.is_empty());
        assert!(fds.is_empty());
    }

    Ok(())
}

#[test]
fn big_endian_round_trip() -> Result<()> {
    for (message, _) in vectors() {
        let (bytes, _) = message.marshal_with(Endianness::BIG)?;
        assert_eq!(bytes[0], b'B');
        let (decoded, _, _) = Message::unmarshal(&bytes, &[])?;
        assert_eq!(decoded, message);
    }

    Ok(())
}

#[test]
fn unmarshal_bluez_signal() -> Result<()> {
    let data = hex(concat!(
        "6c040101780000009aca0a009500000001016f00250000002f6f72672f626c75",
        "657a2f686369302f6465765f44305f43325f34455f30385f41425f3537000000",
        "020173001f0000006f72672e667265656465736b746f702e444275732e50726f",
        "7065727469657300030173001100000050726f706572746965734368616e6765",
        "6400000000000000080167000873617b73767d61730000000701730004000000",
        "3a312e3400000000110000006f72672e626c75657a2e44657669636531000000",
        "5400000000000000040000005253534900016e00aaff0000100000004d616e75",
        "6661637475726572446174610005617b71767d00240000007500026179000000",
        "180000004204010170d0c24e08ab57d2c24e08ab560100000000000000000000",
    ));

    let manufacturer = b"B\x04\x01\x01p\xd0\xc2N\x08\xabW\xd2\xc2N\x08\xabV\x01\x00\x00\x00\x00\x00\x00"
        .iter()
        .map(|&b| Value::Byte(b))
        .collect::<Vec<_>>();

    let expected = Message::signal(
        "/org/bluez/hci0/dev_D0_C2_4E_08_AB_57",
        "org.freedesktop.DBus.Properties",
        "PropertiesChanged",
        707226,
    )
    .with_flags(Flags::NO_REPLY_EXPECTED)
    .with_sender(":1.4")
    .with_body(
        "sa{sv}as",
        vec![
            s("org.bluez.Device1"),
            dict([
                (s("RSSI"), v("n", Value::Int16(-86))),
                (
                    s("ManufacturerData"),
                    v(
                        "a{qv}",
                        dict([(Value::Uint16(117), v("ay", Value::Array(manufacturer)))]),
                    ),
                ),
            ]),
            array([]),
        ],
    );

    let (message, tail, fds) = Message::unmarshal(&data, &[])?;
    assert_eq!(message, expected);
    assert_eq!(message.message_type(), MessageType::SIGNAL);
    assert!(tail.is_empty());
    assert!(fds.is_empty());
    Ok(())
}

#[rustfmt::skip]
const LE_BLOB: [u8; 36] = [
    // byte 0
    // yyyyuu fixed headers
    b'l',
    // reply (which is the simplest message)
    b'\x02',
    // no auto-starting
    b'\x02',
    // D-Bus version = 1
    b'\x01',
    // byte 4
    // bytes in body = 4
    b'\x04', b'\x00', b'\x00', b'\x00',
    // byte 8
    // serial number = 0x12345678
    b'\x78', b'\x56', b'\x34', b'\x12',
    // byte 12
    // bytes in array of variable headers = 15
    b'\x0f', b'\0', b'\0', b'\0',
    // byte 16
    // in reply to:
    b'\x05',
    // variant signature = u
    b'\x01', b'u', b'\0',
    // 0xabcdef12
    b'\x12', b'\xef', b'\xcd', b'\xab',
    // byte 24
    // signature:
    b'\x08',
    // variant signature = g
    b'\x01', b'g', b'\0',
    // 1 byte, u, NUL (no alignment needed)
    b'\x01', b'u', b'\0',
    // pad to 8-byte boundary for body
    b'\0',
    // body; byte 32
    // 0xdeadbeef
    b'\xef', b'\xbe', b'\xad', b'\xde'
];

#[rustfmt::skip]
const BE_BLOB: [u8; 36] = [
    // byte 0
    // yyyyuu fixed headers
    b'B',
    // reply (which is the simplest message)
    b'\x02',
    // no auto-starting
    b'\x02',
    // D-Bus version = 1
    b'\x01',
    // byte 4
    // bytes in body = 4
    b'\x00', b'\x00', b'\x00', b'\x04',
    // byte 8
    // serial number = 0x12345678
    b'\x12', b'\x34', b'\x56', b'\x78',
    // byte 12
    // bytes in array of variable headers = 15
    b'\0', b'\0', b'\0', b'\x0f',
    // byte 16
    // in reply to:
    b'\x05',
    // variant signature = u
    b'\x01', b'u', b'\0',
    // 0xabcdef12
    b'\xab', b'\xcd', b'\xef', b'\x12',
    // byte 24
    // signature:
    b'\x08',
    // variant signature = g
    b'\x01', b'g', b'\0',
    // 1 byte, u, NUL (no alignment needed)
    b'\x01', b'u', b'\0',
    // pad to 8-byte boundary for body
    b'\0',
    // body; byte 32
    // 0xdeadbeef
    b'\xde', b'\xad', b'\xbe', b'\xef',
];

fn blob_message() -> Message {
    Message::new(MessageType::METHOD_RETURN, 0x12345678)
        .with_flags(Flags::default() | Flags::NO_AUTO_START)
        .with_reply_serial(0xabcdef12)
        .with_body("u", vec![u(0xdeadbeef)])
}

#[test]
fn write_blobs() -> Result<()> {
    let (bytes, _) = blob_message().marshal_with(Endianness::LITTLE)?;
    assert_eq!(bytes, &LE_BLOB[..]);

    let (bytes, _) = blob_message().marshal_with(Endianness::BIG)?;
    assert_eq!(bytes, &BE_BLOB[..]);
    Ok(())
}

#[test]
fn read_blobs() -> Result<()> {
    for blob in [&LE_BLOB[..], &BE_BLOB[..]] {
        let (message, tail, _) = Message::unmarshal(blob, &[])?;
        assert_eq!(message, blob_message());
        assert!(tail.is_empty());
    }

    Ok(())
}

#[test]
fn invalid_signatures() {
    for signature in ["a(", "a{yyy}", "X"] {
        let error = hello()
            .with_body(signature, vec![Value::Byte(0)])
            .marshal()
            .unwrap_err();

        assert!(error.is_signature(), "{signature}: {error}");
    }
}

#[test]
fn arity_mismatch() {
    let error = hello().with_body("uu", vec![u(1)]).marshal().unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::ArityMismatch {
            expected: 2,
            actual: 1
        }
    ));
}

#[test]
fn wrong_version() {
    let mut data = hex(HELLO);
    data[3] = 2;

    let error = Message::unmarshal(&data, &[]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::UnsupportedVersion(2)));
}

#[test]
fn invalid_fixed_header() {
    let mut data = hex(HELLO);
    data[0] = b'x';
    let error = Message::unmarshal(&data, &[]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::InvalidEndianness(b'x')));

    let mut data = hex(HELLO);
    data[1] = 5;
    let error = Message::unmarshal(&data, &[]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::InvalidMessageType(5)));

    let data = hex(HELLO);
    let error = Message::unmarshal(&data[..100], &[]).unwrap_err();
    assert!(error.is_buffer_underflow());

    let error = Message::unmarshal(&[], &[]).unwrap_err();
    assert!(error.is_buffer_underflow());
}

#[test]
fn header_field_type_mismatch() {
    let mut data = hex(HELLO);
    // The signature of the PATH header field.
    assert_eq!(data[18], b'o');
    data[18] = b's';

    let error = Message::unmarshal(&data, &[]).unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorKind::HeaderFieldTypeMismatch {
            field: HeaderField::PATH,
            expected: "o",
            ..
        }
    ));
}

#[test]
fn unknown_header_fields_are_ignored() -> Result<()> {
    let mut data = hex(HELLO);
    // Turn the DESTINATION header field into an unknown one.
    assert_eq!(data[96], 6);
    data[96] = 42;

    let (message, _, _) = Message::unmarshal(&data, &[])?;
    assert_eq!(message.destination(), None);
    assert_eq!(message.member(), Some("Hello"));
    Ok(())
}

#[test]
fn remaining_data() -> Result<()> {
    let mut data = hex(HELLO);
    data.push(0);

    let (message, tail, fds) = Message::unmarshal(&data, &[1])?;
    assert_eq!(message, hello());
    assert_eq!(tail, &[0]);
    assert_eq!(fds, &[1]);
    Ok(())
}

#[test]
fn file_descriptors() -> Result<()> {
    let message = hello().with_body("hh", vec![Value::UnixFd(7), Value::UnixFd(8)]);

    let (bytes, fds) = message.marshal()?;
    assert_eq!(fds, [7, 8]);

    let (decoded, tail, tail_fds) = Message::unmarshal(&bytes, &[7, 8, 9])?;
    assert_eq!(decoded.body(), &[Value::UnixFd(7), Value::UnixFd(8)]);
    assert!(tail.is_empty());
    assert_eq!(tail_fds, &[9]);

    let error = Message::unmarshal(&bytes, &[7]).unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::MissingFileDescriptor(2)));
    Ok(())
}

#[test]
fn replies() {
    let call = hello().with_sender(":1.1");

    let reply = call.method_return(2);
    assert_eq!(reply.message_type(), MessageType::METHOD_RETURN);
    assert_eq!(reply.reply_serial(), Some(1));
    assert_eq!(reply.destination(), Some(":1.1"));
    assert_eq!(reply.sender(), Some("org.freedesktop.DBus"));

    let error = call.error("org.freedesktop.DBus.Error.Failed", 3);
    assert_eq!(error.message_type(), MessageType::ERROR);
    assert_eq!(error.error_name(), Some("org.freedesktop.DBus.Error.Failed"));
    assert_eq!(error.reply_serial(), Some(1));
}
