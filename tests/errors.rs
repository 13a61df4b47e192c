mod common;

use basic_6502::error::ErrorCode;
use common::interpreter_with_capture;

#[test]
fn division_by_zero_latches_the_expected_code() {
    let (mut interp, _output) = interpreter_with_capture("10 X = 1 / 0\n");
    let err = interp.run(None).unwrap_err();
    assert_eq!(err.code, ErrorCode::DivisionByZero);
    assert_eq!(err.line, Some(10));
}

#[test]
fn goto_undefined_line_is_undef_statement() {
    let (mut interp, _output) = interpreter_with_capture("10 GOTO 999\n");
    let err = interp.run(None).unwrap_err();
    assert_eq!(err.code, ErrorCode::UndefStatement);
}

#[test]
fn next_without_for_is_reported() {
    let (mut interp, _output) = interpreter_with_capture("10 NEXT I\n");
    let err = interp.run(None).unwrap_err();
    assert_eq!(err.code, ErrorCode::NextWithoutFor);
}

#[test]
fn assigning_a_string_to_a_numeric_variable_is_type_mismatch() {
    let (mut interp, _output) = interpreter_with_capture("10 X = \"HI\"\n");
    let err = interp.run(None).unwrap_err();
    assert_eq!(err.code, ErrorCode::TypeMismatch);
}

#[test]
fn error_display_includes_the_offending_line() {
    let (mut interp, _output) = interpreter_with_capture("10 X = 1 / 0\n");
    let err = interp.run(None).unwrap_err();
    assert_eq!(err.to_string(), "?DIVISION BY ZERO ERROR IN 10");
}
