use std::io::Cursor;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use luria::{Interpreter, lexer, parser};

const WORKLOADS: &[(&str, &str)] = &[
    (
        "fib",
        r#"
function fib(n) {
    if (n < 2) return n;
    return fib(n - 1) + fib(n - 2);
}
print fib(18);
"#,
    ),
    (
        "loops",
        r#"
variable xs = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
variable round = 0;
while (round < 200) {
    variable i = 0;
    while (i < 10) {
        xs[i] = xs[i] + i * round % 7;
        i = i + 1;
    }
    round = round + 1;
}
print xs;
"#,
    ),
];

fn interpreter() -> Interpreter {
    Interpreter::with_io(
        Box::new(Cursor::new(String::new())),
        Box::new(std::io::sink()),
    )
}

fn bench_pipeline(c: &mut Criterion) {
    for (label, source) in WORKLOADS {
        let tokens = lexer::lex(source).tokens;
        let program = parser::parse(&tokens).program;

        c.bench_function(&format!("lex_{label}"), |b| {
            b.iter(|| black_box(lexer::lex(black_box(source))))
        });

        c.bench_function(&format!("parse_only_{label}"), |b| {
            b.iter(|| black_box(parser::parse(black_box(&tokens))))
        });

        c.bench_function(&format!("interpret_{label}"), |b| {
            b.iter(|| {
                let mut interp = interpreter();
                interp.run(black_box(&program)).expect("run");
                black_box(interp.output().len());
            })
        });
    }
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
