//! Benchmarks for the varbind enrichment path used by `Client`/`Walk`
//! callers on every returned result (name resolution + formatting).

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use async_snmp::mib::{EnrichOptions, Registry, enrich_all};
use async_snmp::oid;
use async_snmp::varbind::VarBind;
use async_snmp::{Oid, Value};

fn table_varbinds(n: usize) -> Vec<VarBind> {
    (0..n as u32)
        .map(|i| {
            VarBind::new(
                Oid::from_slice(&[1, 3, 6, 1, 2, 1, 2, 2, 1, 10, i + 1]),
                Value::Counter32(i * 1500),
            )
        })
        .collect()
}

fn bench_enrich(c: &mut Criterion) {
    let registry = Registry::builtin();
    let options = EnrichOptions::default();
    let single = vec![VarBind::new(
        oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
        Value::OctetString(bytes::Bytes::from_static(b"Linux router 6.1.0")),
    )];
    let table = table_varbinds(64);

    c.bench_function("enrich_single_sys_descr", |b| {
        b.iter(|| enrich_all(black_box(&single), &registry, options))
    });
    c.bench_function("enrich_if_table_64_rows", |b| {
        b.iter(|| enrich_all(black_box(&table), &registry, options))
    });
}

fn bench_name_lookup(c: &mut Criterion) {
    let registry = Registry::builtin();
    let instance = Oid::parse("1.3.6.1.2.1.2.2.1.2.1").unwrap();
    c.bench_function("registry_name_for_instance", |b| {
        b.iter(|| registry.name_for(black_box(&instance)))
    });
}

criterion_group!(benches, bench_enrich, bench_name_lookup);
criterion_main!(benches);
