//! Golden files: every `suite/*.scm` is read datum by datum and each datum is written back as an
//! `ok:` line, a syntax error ends the file with an `error:` line. The result must match the
//! `.expect` file next to it. A missing `.expect` file is created from the current output.

use std::fmt::Write;
use std::fs::{self, read_to_string};
use std::io::Cursor;
use std::path::Path;

use sexp_runtime::{InputPort, Universe};

fn run(code: String, file_name: String) -> String {
    let mut result = String::new();
    let mut universe = Universe::new();
    let mut port = InputPort::new(file_name, Cursor::new(code.into_bytes()));

    loop {
        match universe.read(&mut port) {
            Ok(None) => break,
            Ok(Some(value)) => writeln!(&mut result, "ok: {}", universe.heap.display(value)).unwrap(),
            Err(err) => {
                writeln!(&mut result, "error: {err}").unwrap();
                break;
            }
        }
    }

    result
}

#[test]
fn suite() {
    let directory = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/suite");
    let mut failures = Vec::new();
    let mut count = 0;

    for file in fs::read_dir(&directory).unwrap() {
        let path = file.unwrap().path();
        if path.extension().map_or(true, |extension| extension != "scm") {
            continue;
        }

        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        let result = run(read_to_string(&path).unwrap(), file_name.clone());
        let expect = path.with_extension("expect");
        count += 1;

        match read_to_string(&expect) {
            Ok(expects) if expects == result => {}
            Ok(expects) => {
                println!("{file_name}: expected:\n\n{expects}\n\ngot:\n\n{result}");
                failures.push(file_name);
            }
            Err(_) => fs::write(expect, result).unwrap(),
        }
    }

    assert!(count > 0, "no suite files found in {}", directory.display());
    assert!(failures.is_empty(), "mismatched suite files: {failures:?}");
}
