//! Criterion benchmarks for layout resource parsing.
//!
//! Layouts are parsed on the UI thread while the keyboard is constructed, so
//! parse time adds directly to startup latency.
//!
//! Run with:
//! ```bash
//! cargo bench --package vkbd-core --bench layout_parse_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vkbd_core::parse_layout;

// ── Layout fixture builders ───────────────────────────────────────────────────

/// Builds a layout with `rows` rows of ten single-character keys each.
fn build_layout_xml(rows: usize) -> String {
    let mut xml = String::from(r#"<Layout name="bench">"#);
    for r in 0..rows {
        xml.push_str(r#"<Row type="letters">"#);
        for k in 0..10 {
            let c = char::from(b'a' + ((r * 10 + k) % 26) as u8);
            xml.push_str(&format!(r#"<Key symbol="{c}" keystroke="{c}" width="1.0"/>"#));
        }
        xml.push_str(r#"<Spacer width="0.5"/></Row>"#);
    }
    xml.push_str("</Layout>");
    xml
}

fn bench_parse_shipped_root(c: &mut Criterion) {
    let xml = include_str!("../../../layouts/en-US.xml");
    c.bench_function("parse_layout/en-US", |b| {
        b.iter(|| parse_layout(black_box(xml)).expect("shipped layout must parse"))
    });
}

fn bench_parse_by_row_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_layout/rows");
    for rows in [4usize, 16, 64] {
        let xml = build_layout_xml(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &xml, |b, xml| {
            b.iter(|| parse_layout(black_box(xml)).expect("generated layout must parse"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_shipped_root, bench_parse_by_row_count);
criterion_main!(benches);
