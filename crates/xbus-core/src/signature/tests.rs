use crate::proto::Type;

use super::{
    MAX_CONTAINER_DEPTH, MAX_SIGNATURE, SignatureError, SignatureErrorKind, TypeNode, padding_to,
    parse,
};

use SignatureErrorKind::*;

macro_rules! test {
    ($input:expr, $expected:pat) => {{
        let actual = parse($input).map(|types| types.len()).map_err(|e| e.kind().clone());

        assert!(
            matches!(actual, $expected),
            "{actual:?} does not match {}",
            stringify!($expected)
        );
    }};
}

#[test]
fn signature_tests() {
    test!("", Ok(0));
    test!("sss", Ok(3));
    test!("i", Ok(1));
    test!("b", Ok(1));
    test!("ai", Ok(1));
    test!("(i)", Ok(1));
    test!("sa{sv}as", Ok(3));
    test!("a(as(uu(a{ss})))", Ok(1));
    test!("asbbasbb", Ok(6));
    test!("w", Err(UnknownTypeCode(..)));
    test!("X", Err(UnknownTypeCode(..)));
    test!("a", Err(MissingArrayElementType));
    test!("aaaaaa", Err(MissingArrayElementType));
    test!("ii(ii)a", Err(MissingArrayElementType));
    test!("ia", Err(MissingArrayElementType));
    test!(&format!("{}i", "a".repeat(MAX_CONTAINER_DEPTH)), Ok(1));
    test!(
        &format!("{}i", "a".repeat(MAX_CONTAINER_DEPTH + 1)),
        Err(ExceededMaximumArrayRecursion)
    );
    test!(")", Err(StructEndedButNotStarted));
    test!("}", Err(DictEndedButNotStarted));
    test!("i)", Err(StructEndedButNotStarted));
    test!("a)", Err(MissingArrayElementType));
    test!("(", Err(StructStartedButNotEnded));
    test!("a(", Err(StructStartedButNotEnded));
    test!("(i", Err(StructStartedButNotEnded));
    test!("(iiiii", Err(StructStartedButNotEnded));
    test!("(ai", Err(StructStartedButNotEnded));
    test!("(a)", Err(MissingArrayElementType));
    test!("()", Err(StructHasNoFields));
    test!("a()", Err(StructHasNoFields));
    test!("(())", Err(StructHasNoFields));
    test!("(i())", Err(StructHasNoFields));
    test!("a{s()}", Err(StructHasNoFields));
    test!("a{ia}", Err(MissingArrayElementType));
    test!("a{}", Err(DictEntryHasNoFields));
    test!("a{", Err(DictStartedButNotEnded));
    test!("a{s", Err(DictStartedButNotEnded));
    test!("a{sv", Err(DictStartedButNotEnded));
    test!("a{aii}", Err(DictKeyMustBeBasicType));
    test!("a{vi}", Err(DictKeyMustBeBasicType));
    test!(" ", Err(UnknownTypeCode(..)));
    test!("not a valid signature", Err(UnknownTypeCode(..)));
    test!("123", Err(UnknownTypeCode(..)));
    test!(".", Err(UnknownTypeCode(..)));
    test!("a{(ii)i}", Err(DictKeyMustBeBasicType));
    test!("a{i}", Err(DictEntryHasOnlyOneField));
    test!("{is}", Err(DictEntryNotInsideArray));
    test!("a{isi}", Err(DictEntryHasTooManyFields));
    test!("a{yyy}", Err(DictEntryHasTooManyFields));
    test!(&"i".repeat(MAX_SIGNATURE), Ok(MAX_SIGNATURE));
    test!(&"i".repeat(MAX_SIGNATURE + 1), Err(SignatureTooLong));

    let depth = MAX_CONTAINER_DEPTH;
    test!(
        &format!("{}ii{}", "(".repeat(depth), ")".repeat(depth)),
        Ok(1)
    );
    test!(
        &format!("{}ii{}", "(".repeat(depth + 1), ")".repeat(depth + 1)),
        Err(ExceededMaximumStructRecursion)
    );
}

#[test]
fn test_tree() -> Result<(), SignatureError> {
    let types = parse("aaa(as)yua{yy}")?;

    let expected = [
        TypeNode::Array(Box::new(TypeNode::Array(Box::new(TypeNode::Array(
            Box::new(TypeNode::Struct(Box::new([TypeNode::Array(Box::new(
                TypeNode::Basic(Type::STRING),
            ))]))),
        ))))),
        TypeNode::Basic(Type::BYTE),
        TypeNode::Basic(Type::UINT32),
        TypeNode::Array(Box::new(TypeNode::DictEntry(
            Box::new(TypeNode::Basic(Type::BYTE)),
            Box::new(TypeNode::Basic(Type::BYTE)),
        ))),
    ];

    assert_eq!(&types[..], &expected[..]);
    Ok(())
}

#[test]
fn test_display_round_trip() -> Result<(), SignatureError> {
    for signature in ["y", "a{sv}", "a(as(uu(a{ss})))", "(y)", "v", "a{oa{sa{sv}}}"] {
        let node = TypeNode::parse_single(signature)?;
        assert_eq!(node.to_string(), signature);
    }

    Ok(())
}

#[test]
fn test_parse_single() {
    let error = TypeNode::parse_single("").unwrap_err();
    assert_eq!(*error.kind(), ExpectedSingleType(0));

    let error = TypeNode::parse_single("uu").unwrap_err();
    assert_eq!(*error.kind(), ExpectedSingleType(2));

    let error = TypeNode::parse_single("a(").unwrap_err();
    assert_eq!(*error.kind(), StructStartedButNotEnded);
}

#[test]
fn test_alignment() -> Result<(), SignatureError> {
    macro_rules! align {
        ($signature:expr, $align:expr) => {
            assert_eq!(
                TypeNode::parse_single($signature)?.alignment(),
                $align,
                "alignment of {}",
                $signature
            );
        };
    }

    align!("y", 1);
    align!("g", 1);
    align!("v", 1);
    align!("n", 2);
    align!("q", 2);
    align!("b", 4);
    align!("i", 4);
    align!("u", 4);
    align!("s", 4);
    align!("o", 4);
    align!("h", 4);
    align!("ax", 4);
    align!("x", 8);
    align!("t", 8);
    align!("d", 8);
    align!("(y)", 8);
    Ok(())
}

#[test]
fn test_padding() {
    assert_eq!(padding_to(8, 0), 0);
    assert_eq!(padding_to(8, 1), 7);
    assert_eq!(padding_to(8, 8), 0);
    assert_eq!(padding_to(4, 5), 3);
    assert_eq!(padding_to(2, 3), 1);
    assert_eq!(padding_to(1, 3), 0);
}
