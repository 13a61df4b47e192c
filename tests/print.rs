mod common;

use common::interpreter_with_capture;

#[test]
fn prints_string_literal_with_trailing_newline() {
    let (mut interp, output) = interpreter_with_capture(
        "10 PRINT \"HELLO, WORLD!\"\n20 END\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "HELLO, WORLD!\n");
}

#[test]
fn comma_separator_emits_a_tab_character() {
    let (mut interp, output) = interpreter_with_capture("10 PRINT \"A\", \"B\"\n");
    interp.run(None).unwrap();
    assert_eq!(output(), "A\tB\n");
}

#[test]
fn trailing_semicolon_suppresses_newline() {
    let (mut interp, output) = interpreter_with_capture("10 FOR I = 0 TO 9\n20 PRINT I;\n30 NEXT I\n");
    interp.run(None).unwrap();
    assert_eq!(output(), "0123456789");
}
