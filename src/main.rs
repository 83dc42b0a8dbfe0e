use std::fs::File;
use std::io::BufReader;

use clap::Parser;
use miette::IntoDiagnostic;
use sexp_runtime::{InputPort, Universe};

pub mod cli;
pub mod repl;

fn load(universe: &mut Universe, path: &std::path::Path) -> miette::Result<()> {
    let file = File::open(path).into_diagnostic()?;
    let mut port = InputPort::new(path.display().to_string(), BufReader::new(file));

    while let Some(value) = universe.read(&mut port)? {
        println!("{}", universe.heap.display(value));
    }

    Ok(())
}

fn main() -> miette::Result<()> {
    // Install the panic handler.
    bupropion::install(bupropion::BupropionHandlerOpts::new).into_diagnostic()?;

    // Parse the command line arguments.
    let options = cli::Options::parse();

    simple_logger::SimpleLogger::new()
        .with_level(options.log_level())
        .init()
        .into_diagnostic()?;

    let mut universe = Universe::with_options(options.universe());

    if let Some(path) = &options.load {
        load(&mut universe, path)?;
    }

    if options.repl {
        repl::run(&mut universe).into_diagnostic()?;
    }

    Ok(())
}
