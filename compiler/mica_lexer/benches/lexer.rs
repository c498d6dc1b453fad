//! Lexer throughput benchmarks.
//!
//! Measures full tokenization: dispatch, literal parsing, interning, and
//! lookahead bookkeeping, over generated sources of increasing size.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mica_ir::{StringInterner, TokenKind};
use mica_lexer::{CompilerConfig, Lexer};
use mica_lexer_core::SourceBuffer;

/// Generate N simple functions for scaling benchmarks.
fn generate_n_functions(n: usize) -> String {
    (0..n)
        .map(|i| {
            format!(
                "int func{i}(int x) {{\n    // doubles and offsets\n    return x * 2 + {i};\n}}\n"
            )
        })
        .collect()
}

/// Tokenize-to-EOF throughput at various scales.
fn bench_lexer_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("lexer/throughput");
    let pool = StringInterner::new();
    let config = CompilerConfig::default();

    for num_functions in [10, 100, 1000, 5000] {
        let source = generate_n_functions(num_functions);
        let bytes = source.len() as u64;

        group.throughput(Throughput::Bytes(bytes));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_functions),
            &source,
            |b, src| {
                b.iter(|| {
                    let buf = SourceBuffer::from_str(src);
                    let mut lexer =
                        Lexer::new(&pool, &config, "bench.mi", &buf, 0, false, false);
                    loop {
                        let kind = lexer.next();
                        if kind == TokenKind::Eof {
                            break;
                        }
                        black_box(kind);
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_lexer_throughput);
criterion_main!(benches);
