mod common;

use common::interpreter_with_capture;

#[test]
fn for_next_counts_up_inclusive_of_limit() {
    let (mut interp, output) = interpreter_with_capture(
        "10 FOR I = 1 TO 5\n20 PRINT I;\n30 NEXT I\n40 END\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "12345");
}

#[test]
fn descending_step_counts_down() {
    let (mut interp, output) = interpreter_with_capture(
        "10 FOR I = 5 TO 1 STEP -1\n20 PRINT I;\n30 NEXT I\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "54321");
}

#[test]
fn loop_with_an_empty_range_still_runs_the_body_once() {
    let (mut interp, output) = interpreter_with_capture(
        "10 FOR I = 5 TO 1\n20 PRINT \"BODY\"\n30 NEXT I\n40 PRINT \"AFTER\"\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "BODY\nAFTER\n");
}

#[test]
fn nested_loops_iterate_in_product() {
    let (mut interp, output) = interpreter_with_capture(
        "10 FOR I = 1 TO 2\n20 FOR J = 1 TO 2\n30 PRINT I; J;\n40 NEXT J\n50 NEXT I\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "11122122");
}
