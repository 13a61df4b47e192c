use std::io::{self, Write};

use log::{debug, error, info, trace};

use crate::data::DataPool;
use crate::error::{BasicError, ErrorCode};
use crate::eval::EvalContext;
use crate::exec;
use crate::memory::VirtualMemory;
use crate::program::{ForFrame, GosubFrame, ProgramStore};
use crate::rng::Rng;
use crate::vars::VariableStore;

/// Where execution should resume after a `STOP`, recorded so `CONT` can pick back up.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StoppedAt {
    pub line: u16,
    pub position: usize,
}

/// The full interpreter state: program text, variable/array store, DATA pool,
/// virtual memory, and the two control-flow stacks, plus the handful of scalars
/// (`current_line`, `current_position`, `running`, `error`) that the runner and
/// statement handlers share to implement mid-line resumption.
pub struct Interpreter {
    pub program: ProgramStore,
    pub vars: VariableStore,
    pub data: DataPool,
    pub memory: VirtualMemory,
    pub(crate) rng: Rng,
    pub(crate) for_stack: Vec<ForFrame>,
    pub(crate) gosub_stack: Vec<GosubFrame>,

    pub(crate) current_line: Option<u16>,
    pub(crate) current_position: usize,
    pub(crate) running: bool,
    pub(crate) stopped_at: Option<StoppedAt>,
    pub(crate) error: Option<BasicError>,

    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            program: ProgramStore::new(),
            vars: VariableStore::new(),
            data: DataPool::new(),
            memory: VirtualMemory::new(),
            rng: Rng::new(),
            for_stack: vec![],
            gosub_stack: vec![],
            current_line: None,
            current_position: 0,
            running: false,
            stopped_at: None,
            error: None,
            out: Box::new(io::stdout()),
        }
    }

    /// Build an interpreter that writes `PRINT` output to `out` instead of stdout,
    /// for tests that want to capture it.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            out,
            ..Self::new()
        }
    }

    pub(crate) fn write_out(&mut self, s: &str) -> Result<(), BasicError> {
        write!(self.out, "{s}").map_err(|_| BasicError::new(ErrorCode::OutOfMemory))
    }

    pub(crate) fn eval_ctx(&mut self) -> EvalContext<'_> {
        EvalContext {
            vars: &mut self.vars,
            memory: &mut self.memory,
            rng: &mut self.rng,
        }
    }

    /// Load program source, one `<number> <text>` line per input line, replacing
    /// whatever program was previously stored.
    pub fn load_source(&mut self, source: &str) -> Result<(), BasicError> {
        self.program.clear();
        for raw_line in source.lines() {
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let split = trimmed.find(|c: char| !c.is_ascii_digit());
            let (number_part, text_part) = match split {
                Some(idx) => trimmed.split_at(idx),
                None => (trimmed, ""),
            };
            let number: u16 = number_part
                .parse()
                .map_err(|_| BasicError::new(ErrorCode::Syntax))?;
            self.program.set_line(number, text_part.trim().to_owned());
        }
        Ok(())
    }

    /// Re-scan every `DATA` statement in the stored program, in line order, into a
    /// fresh pool. Called by `RUN` (and available standalone for tests).
    pub fn rescan_data(&mut self) {
        self.data.clear();
        let lines: Vec<(u16, String)> = self
            .program
            .iter()
            .map(|l| (l.number, l.text.clone()))
            .collect();
        for (line, text) in lines {
            exec::data_io::collect_data_literals(self, &text, line);
        }
    }

    /// Clear variables, arrays, and both control-flow stacks (what `CLEAR` and `RUN`
    /// do; `NEW` additionally clears the program and DATA pool).
    pub fn clear_runtime_state(&mut self) {
        self.vars.clear();
        self.for_stack.clear();
        self.gosub_stack.clear();
        self.error = None;
        self.stopped_at = None;
    }

    pub fn new_program(&mut self) {
        self.clear_runtime_state();
        self.program.clear();
        self.data.clear();
        self.current_line = None;
        self.current_position = 0;
        self.running = false;
    }

    /// Run the stored program from its first line (or, if given, from `from_line`).
    pub fn run(&mut self, from_line: Option<u16>) -> Result<(), BasicError> {
        self.clear_runtime_state();
        self.rescan_data();

        let start = match from_line {
            Some(n) => n,
            None => match self.program.first_line_number() {
                Some(n) => n,
                None => return Ok(()),
            },
        };
        if self.program.index_of(start).is_none() {
            return Err(BasicError::new(ErrorCode::UndefStatement));
        }

        info!("RUN starting at line {start}");
        self.running = true;
        self.current_line = Some(start);
        self.current_position = 0;
        let result = self.execute_loop();
        info!("RUN finished");
        result
    }

    /// Resume after a `STOP`. Errors with `CANT_CONTINUE` if there is a latched
    /// error, or nothing to continue from.
    pub fn cont(&mut self) -> Result<(), BasicError> {
        if self.error.is_some() {
            return Err(BasicError::new(ErrorCode::CantContinue));
        }
        let Some(stopped) = self.stopped_at.take() else {
            return Err(BasicError::new(ErrorCode::CantContinue));
        };
        debug!(
            "CONT resuming at line {} position {}",
            stopped.line, stopped.position
        );
        self.running = true;
        self.current_line = Some(stopped.line);
        self.current_position = stopped.position;
        self.execute_loop()
    }

    /// Shared driver for `RUN` and `CONT`: repeatedly dispatches the line named by
    /// `current_line`/`current_position`, advancing to the next stored line whenever
    /// a statement falls off the end of its line without a handler redirecting
    /// execution elsewhere.
    fn execute_loop(&mut self) -> Result<(), BasicError> {
        loop {
            if !self.running {
                break;
            }
            let Some(line_number) = self.current_line else {
                break;
            };
            let Some(idx) = self.program.index_of(line_number) else {
                let err = BasicError::new(ErrorCode::UndefStatement).with_line(line_number);
                self.error = Some(err.clone());
                self.running = false;
                return Err(err);
            };
            let text = self.program.line_at(idx).unwrap().text.clone();
            let start_pos = self.current_position;
            trace!("executing line {line_number} at {start_pos}: {text}");

            if let Err(err) = exec::run_line_from(self, &text, start_pos) {
                let err = err.with_line(line_number);
                error!("{err}");
                self.error = Some(err.clone());
                self.running = false;
                return Err(err);
            }

            if !self.running {
                break;
            }

            if self.current_line == Some(line_number) && self.current_position >= text.len() {
                match self
                    .program
                    .next_index_after(line_number)
                    .and_then(|i| self.program.line_at(i))
                {
                    Some(next_line) => {
                        self.current_line = Some(next_line.number);
                        self.current_position = 0;
                    }
                    None => {
                        self.running = false;
                        break;
                    }
                }
            }
            // otherwise a handler already repositioned current_line/current_position
            // (a jump, possibly back into the same line) — loop again from there.
        }
        Ok(())
    }

    /// Feed one immediate-mode line (no leading line number) straight through the
    /// statement dispatcher, without touching stored program text.
    pub fn execute_immediate(&mut self, text: &str) -> Result<(), BasicError> {
        self.current_line = None;
        self.current_position = 0;
        exec::run_line(self, text)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn last_error(&self) -> Option<&BasicError> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_source_parses_line_number_and_text() {
        let mut interp = Interpreter::new();
        interp.load_source("10 PRINT 1\n  20   PRINT 2  \n").unwrap();
        assert_eq!(interp.program.index_of(10), Some(0));
        assert_eq!(interp.program.line_at(1).unwrap().text, "PRINT 2");
    }

    #[test]
    fn run_with_no_program_is_a_no_op() {
        let mut interp = Interpreter::new();
        assert!(interp.run(None).is_ok());
        assert!(!interp.is_running());
    }

    #[test]
    fn run_from_an_undefined_line_is_an_error() {
        let mut interp = Interpreter::new();
        interp.load_source("10 PRINT 1\n").unwrap();
        assert!(interp.run(Some(999)).is_err());
    }

    #[test]
    fn execute_immediate_does_not_touch_stored_program() {
        let mut interp = Interpreter::with_output(Box::new(std::io::sink()));
        interp.load_source("10 PRINT 1\n").unwrap();
        interp.execute_immediate("X = 5").unwrap();
        assert_eq!(interp.vars.read_scalar("X").unwrap().as_number().unwrap(), 5.0);
        assert_eq!(interp.program.index_of(10), Some(0));
    }

    #[test]
    fn cont_without_a_prior_stop_cannot_continue() {
        let mut interp = Interpreter::new();
        let err = interp.cont().unwrap_err();
        assert_eq!(err.code, ErrorCode::CantContinue);
    }
}
