use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use supplyhub_core::{SearchCriteria, SupplierId};
use supplyhub_infra::{InMemorySupplierStore, SupplierStore};
use supplyhub_suppliers::{
    Delivery, Manager, PredicateBuilder, PredicateOutcome, SupplierDraft, SupplierPredicate,
};

const NAMES: [&str; 6] = ["Paprika", "Pfeffer", "Wurst", "Kaese", "Brot", "Honig"];

fn seeded_store(rt: &tokio::runtime::Runtime, count: usize) -> InMemorySupplierStore {
    let store = InMemorySupplierStore::new();
    rt.block_on(async {
        for i in 0..count {
            let name = NAMES[i % NAMES.len()];
            let draft = SupplierDraft {
                name: name.to_string(),
                email: format!("{}{i}@acme.de", name.to_lowercase()),
                username: None,
                manager: Some(Manager {
                    name: "Peter".to_string(),
                    email: "peter@acme.de".to_string(),
                    salary: 10_000,
                }),
                deliveries: vec![Delivery::new("Gold")],
            };
            let new = draft.into_new().expect("seed draft is valid");
            store.insert(SupplierId::new(), new).await.expect("seed insert");
        }
    });
    store
}

fn compiled(criteria: &SearchCriteria) -> SupplierPredicate {
    match PredicateBuilder::new().build(criteria) {
        PredicateOutcome::Usable(p) => p,
        other => panic!("expected usable predicate, got {other:?}"),
    }
}

fn bench_predicate_search(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let mut group = c.benchmark_group("predicate_search");
    for count in [100usize, 1_000, 10_000] {
        let store = seeded_store(&rt, count);
        let single = compiled(&SearchCriteria::new().with("name", "pap"));
        let conjunction = compiled(&SearchCriteria::new().with("name", "pap").with("email", "acme"));

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("name_only", count), &store, |b, store| {
            b.iter(|| rt.block_on(store.find_all_matching(black_box(&single))))
        });
        group.bench_with_input(BenchmarkId::new("name_and_email", count), &store, |b, store| {
            b.iter(|| rt.block_on(store.find_all_matching(black_box(&conjunction))))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let criteria = SearchCriteria::new().with("name", "Paprika").with("email", "acme");
    c.bench_function("predicate_build", |b| {
        b.iter(|| PredicateBuilder::new().build(black_box(&criteria)))
    });
}

criterion_group!(benches, bench_predicate_search, bench_build);
criterion_main!(benches);
