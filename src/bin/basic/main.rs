//! # Basic
//!
//! This binary is the interpreter front end for the BASIC engine.
extern crate basic_6502;

mod cli;

use cli::*;

use std::error::Error;
use std::process::ExitCode;

use log::error;

fn main() -> ExitCode {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into()).unwrap();

    let result = match args.command {
        Commands::Run(run_args) => run(run_args),
        Commands::List(run_args) => list(run_args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut interp = basic_6502::loader::load_file(&args.file)?;
    interp.run(None)?;
    Ok(())
}

fn list(args: RunArgs) -> Result<(), Box<dyn Error>> {
    let mut interp = basic_6502::loader::load_file(&args.file)?;
    interp.execute_immediate("LIST")?;
    Ok(())
}
