use super::*;

#[test]
fn text_to_canonical_binary() {
    assert_eq!(parse_str("(module)").unwrap(), b"\0asm\x01\0\0\0");
}

#[test]
fn sniffing_accepts_both_forms() {
    let from_text = parse_bytes(b"(module (memory 1))").unwrap();
    assert_eq!(from_text, parse_str("(module (memory 1))").unwrap());
    let from_binary = parse_bytes(&from_text).unwrap();
    assert_eq!(from_binary, from_text);
}

#[test]
fn header_only_module_is_empty() {
    let header = b"\0asm\x01\0\0\0";
    assert_eq!(parse_bytes(header).unwrap(), parse_str("(module)").unwrap());
}

#[test]
fn garbage_is_neither_form() {
    match parse_bytes(&[0xff, 0xfe, 0x00]) {
        Err(Error::Decode(error)) => assert_eq!(error.offset, 0),
        other => panic!("expected a decode error, got {other:?}"),
    }
}

#[test]
fn parse_errors_pass_through() {
    match parse_bytes(b"(module") {
        Err(Error::Parse(_)) => {}
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn print_decodes_then_renders() {
    let bytes = parse_str(r#"(module (func) (export "f" (func 0)))"#).unwrap();
    let text = print_bytes(&bytes).unwrap();
    assert!(text.contains(r#"(export "f" (func 0))"#), "printed text:\n{text}");
    assert_eq!(parse_str(&text).unwrap(), bytes);
}

#[test]
fn valid_module_passes() {
    let bytes = parse_str("(module (func))").unwrap();
    assert!(validate(&bytes, &Features::none()).is_ok());
}

#[test]
fn validation_failures_keep_their_diagnostics() {
    let bytes = parse_str(r#"(module (export "f" (func 0)))"#).unwrap();
    match validate(&bytes, &Features::all()) {
        Err(Error::Validation(diagnostics)) => assert!(!diagnostics.is_empty()),
        other => panic!("expected diagnostics, got {other:?}"),
    }
}

#[test]
fn malformed_binaries_fail_as_decode_errors() {
    match validate(b"\0asm\x01\0\0", &Features::all()) {
        Err(Error::Decode(_)) => {}
        other => panic!("expected a decode error, got {other:?}"),
    }
}
