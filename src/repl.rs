use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::validate::MatchingBracketValidator;
use rustyline::{Completer, Editor, Helper, Highlighter, Hinter, Validator};
use sexp_runtime::{InputPort, Universe};

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct InputValidator {
    #[rustyline(Validator)]
    brackets: MatchingBracketValidator,
}

fn get_history_path() -> Option<PathBuf> {
    let home_env = std::env::var("HOME").ok()?;
    Some(PathBuf::from(format!("{home_env}/.sexp.history")))
}

/// Echoes every datum of `line`, stopping at the first syntax error.
pub fn echo(universe: &mut Universe, line: &str) -> Vec<String> {
    let mut port = InputPort::new("<repl>", std::io::Cursor::new(line.as_bytes().to_vec()));
    let mut output = Vec::new();

    loop {
        match universe.read(&mut port) {
            Ok(None) => break,
            Ok(Some(value)) => output.push(universe.heap.display(value).to_string()),
            Err(err) => {
                output.push(format!("error: {err}"));
                break;
            }
        }
    }

    output
}

pub fn run(universe: &mut Universe) -> rustyline::Result<()> {
    let mut rl = Editor::new()?;
    let path = get_history_path();

    rl.set_helper(Some(InputValidator {
        brackets: MatchingBracketValidator::new(),
    }));

    if let Some(path) = &path {
        if rl.load_history(path).is_err() {
            println!("No previous history.");
        }
    }

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;

                for printed in echo(universe, &line) {
                    println!("{printed}");
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Bye bye...");
                break;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    if let Some(path) = path {
        rl.append_history(&path)?;
    }

    Ok(())
}
