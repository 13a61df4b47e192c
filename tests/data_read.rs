mod common;

use common::interpreter_with_capture;

#[test]
fn read_consumes_data_in_order_across_lines() {
    let (mut interp, output) = interpreter_with_capture(
        "10 FOR I = 1 TO 3\n20 READ A$\n30 PRINT A$\n40 NEXT I\n50 DATA \"ONE\", \"TWO\", \"THREE\"\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "ONE\nTWO\nTHREE\n");
}

#[test]
fn restore_rewinds_the_read_cursor() {
    let (mut interp, output) = interpreter_with_capture(
        "10 DATA 1, 2\n20 READ A\n30 READ B\n40 RESTORE\n50 READ C\n60 PRINT A; B; C\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "121\n");
}

#[test]
fn exhausted_data_pool_is_an_error() {
    let (mut interp, _output) = interpreter_with_capture("10 DATA 1\n20 READ A\n30 READ B\n");
    interp.run(None).unwrap();
    assert!(interp.last_error().is_some());
}
