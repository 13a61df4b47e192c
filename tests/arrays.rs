mod common;

use common::interpreter_with_capture;

#[test]
fn dimensioned_array_holds_squares() {
    let (mut interp, output) = interpreter_with_capture(
        "10 DIM A(4)\n20 FOR I = 0 TO 4\n30 A(I) = I * I\n40 NEXT I\n50 FOR I = 0 TO 4\n60 PRINT A(I);\n70 NEXT I\n",
    );
    interp.run(None).unwrap();
    assert_eq!(output(), "014916");
}

#[test]
fn dim_bound_is_inclusive() {
    let (mut interp, _output) = interpreter_with_capture("10 DIM A(4)\n20 A(4) = 1\n30 A(5) = 1\n");
    interp.run(None).unwrap();
    assert!(interp.last_error().is_some());
}

#[test]
fn redimensioning_an_array_is_an_error() {
    let (mut interp, _output) = interpreter_with_capture("10 DIM A(4)\n20 DIM A(9)\n");
    interp.run(None).unwrap();
    assert!(interp.last_error().is_some());
}
