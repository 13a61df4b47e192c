use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use basic_6502::interpreter::Interpreter;

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Build an `Interpreter` loaded with `source` whose `PRINT` output can be read
/// back with the returned closure once the program has run.
pub fn interpreter_with_capture(source: &str) -> (Interpreter, impl Fn() -> String) {
    let buf = SharedBuf::default();
    let reader = buf.clone();
    let mut interp = Interpreter::with_output(Box::new(buf));
    interp.load_source(source).expect("valid program source");
    (interp, move || {
        String::from_utf8(reader.0.borrow().clone()).expect("utf8 output")
    })
}
