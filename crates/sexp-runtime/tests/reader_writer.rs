use sexp_runtime::{Backend, Error, InputPort, Options, SyntaxKind, Universe, Value};

fn syntax_error(universe: &mut Universe, text: &str) -> SyntaxKind {
    match universe.read_str(text) {
        Err(Error::Syntax { kind, .. }) => kind,
        other => panic!("expected a syntax error for {text:?}, got {other:?}"),
    }
}

#[test]
fn test_dotted_pair_read() {
    let mut universe = Universe::new();

    let pair = universe.read_str("(1 . 2)").unwrap();
    assert_eq!(universe.heap.car(pair).unwrap(), Value::integer(1));
    assert_eq!(universe.heap.cdr(pair).unwrap(), Value::integer(2));

    let list = universe.read_str("(1 2 . 3)").unwrap();
    let rest = universe.heap.cdr(list).unwrap();
    assert_eq!(universe.heap.car(rest).unwrap(), Value::integer(2));
    assert_eq!(universe.heap.cdr(rest).unwrap(), Value::integer(3));
    assert!(universe.heap.length(list).is_err());

    assert_eq!(syntax_error(&mut universe, "(. 1)"), SyntaxKind::MisplacedDot);
    assert_eq!(syntax_error(&mut universe, "(1 . 2 . 3)"), SyntaxKind::MisplacedDot);
}

#[test]
fn test_vector_round_trip() {
    let mut universe = Universe::new();
    let vector = universe.read_str("#(1 2 3)").unwrap();

    assert_eq!(universe.heap.vector_length(vector).unwrap(), 3);
    for i in 0..3 {
        assert_eq!(
            universe.heap.vector_ref(vector, i).unwrap(),
            Value::integer(i as i64 + 1)
        );
    }
    assert_eq!(universe.write_to_string(vector), "#(1 2 3)");
}

#[test]
fn test_string_escapes() {
    let mut universe = Universe::new();
    let string = universe.read_str(r#""a\nb""#).unwrap();

    assert_eq!(universe.heap.string(string).unwrap().data, b"a\nb");
    assert_eq!(universe.write_to_string(string), r#""a\nb""#);
}

#[test]
fn test_list_length() {
    let mut universe = Universe::new();
    let list = universe.read_str("(a b c d)").unwrap();

    assert_eq!(universe.heap.length(list).unwrap(), 4);
    assert!(matches!(
        universe.heap.length(Value::TRUE),
        Err(Error::Type { .. })
    ));
}

#[test]
fn test_compact_symbol_fallback() {
    let mut universe = Universe::new();

    let short = universe.intern("lambda");
    let long = universe.intern("a-name-that-is-too-long-to-pack");
    let odd = universe.intern("UPPER");
    assert!(short.is_immediate_symbol());
    assert!(long.is_long_symbol());
    assert!(odd.is_long_symbol());

    for symbol in [short, long, odd] {
        let text = universe.write_to_string(symbol);
        assert_eq!(universe.read_str(&text).unwrap(), symbol);
    }
}

#[test]
fn test_representation_is_invisible() {
    let text = "(define (list . args) args)";

    let mut compact = Universe::new();
    let mut long = Universe::with_options(Options {
        compact_symbols: false,
        ..Options::default()
    });

    let a = compact.read_str(text).unwrap();
    let b = long.read_str(text).unwrap();

    assert_eq!(compact.write_to_string(a), long.write_to_string(b));
    assert_eq!(compact.write_to_string(a), text);
}

#[test]
fn test_manual_backend_releases_reader_output() {
    let mut universe = Universe::with_options(Options {
        backend: Backend::Manual,
        ..Options::default()
    });
    let live = universe.heap.live();

    let value = universe.read_str("((1 2) #(\"x\" (3)) 4.5)").unwrap();
    assert!(universe.heap.live() > live);

    universe.heap.release_deep(value);
    assert_eq!(universe.heap.live(), live);
}

#[test]
fn test_multiple_datums() {
    let mut universe = Universe::new();
    let values = universe.read_all("1 two \"three\" (4)").unwrap();

    let written: Vec<String> = values
        .iter()
        .map(|value| universe.write_to_string(*value))
        .collect();
    assert_eq!(written, ["1", "two", "\"three\"", "(4)"]);
}

#[test]
fn test_deeply_nested_round_trip() {
    let depth = 100_000;
    let mut universe = Universe::new();

    for (open, close) in [("(", ")"), ("#(", ")"), ("(a ", ")")] {
        let text = format!("{}{}", open.repeat(depth), close.repeat(depth));
        let value = universe.read_str(&text).unwrap();
        assert_eq!(universe.write_to_string(value), text);
    }
}

#[test]
fn test_eof_literal_is_not_the_end() {
    let mut universe = Universe::new();
    let mut port = InputPort::from_string("1 #!eof 2");
    let mut values = Vec::new();

    while let Some(value) = universe.read(&mut port).unwrap() {
        values.push(value);
    }

    assert_eq!(values, [Value::integer(1), Value::EOF, Value::integer(2)]);
    assert_eq!(universe.read_all("1 #!eof 2").unwrap(), values);
}
