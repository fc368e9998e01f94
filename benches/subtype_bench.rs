//! Solver benchmarks.
//!
//! Measures structural subtyping over deep object types, reflexivity of
//! recursive aliases, and mapped-type evaluation.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use flint::solver::{
    DefinitionInfo, DefinitionStore, KeySource, MappedType, NoopResolver, PropertyInfo,
    SubtypeChecker, TypeId, TypeInterner, TypeParamInfo, evaluate_type,
};

/// `{a: {a: ... {a: leaf, b: string} ...}, b: string}` nested `depth` times.
fn nested_object(interner: &TypeInterner, depth: usize, leaf: TypeId) -> TypeId {
    let a = interner.intern_string("a");
    let b = interner.intern_string("b");
    (0..depth).fold(leaf, |inner, _| {
        interner.object(vec![
            PropertyInfo::new(a, inner),
            PropertyInfo::new(b, TypeId::STRING),
        ])
    })
}

fn bench_deep_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_object_subtype");
    for depth in [8usize, 32, 96] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |bench, &depth| {
            let interner = TypeInterner::new();
            let source = nested_object(&interner, depth, interner.literal_number(1.0));
            let target = nested_object(&interner, depth, TypeId::NUMBER);
            bench.iter(|| {
                let mut checker = SubtypeChecker::new(&interner, &NoopResolver);
                black_box(checker.is_subtype_of(black_box(source), black_box(target)))
            });
        });
    }
    group.finish();
}

/// `type List = {head: number, tail: List | null}`, registered twice under
/// different names so the check cannot short-circuit on identity.
fn recursive_lists(interner: &TypeInterner, store: &DefinitionStore) -> (TypeId, TypeId) {
    let module = interner.intern_string("bench");
    let head = interner.intern_string("head");
    let tail = interner.intern_string("tail");
    let make = |name: &str| {
        let def = store.register(DefinitionInfo::type_alias(
            interner.intern_string(name),
            module,
            Vec::new(),
        ));
        let lazy = interner.lazy(def);
        let body = interner.object(vec![
            PropertyInfo::new(head, TypeId::NUMBER),
            PropertyInfo::new(tail, interner.union2(lazy, TypeId::NULL)),
        ]);
        store.set_body(def, body);
        lazy
    };
    (make("ListA"), make("ListB"))
}

fn bench_recursive_alias(c: &mut Criterion) {
    let interner = TypeInterner::new();
    let store = DefinitionStore::new();
    let (list_a, list_b) = recursive_lists(&interner, &store);

    c.bench_function("recursive_alias_reflexive", |bench| {
        bench.iter(|| {
            let mut checker = SubtypeChecker::new(&interner, &store);
            black_box(checker.is_subtype_of(black_box(list_a), black_box(list_a)))
        });
    });
    c.bench_function("recursive_alias_equivalent", |bench| {
        bench.iter(|| {
            let mut checker = SubtypeChecker::new(&interner, &store);
            black_box(checker.is_subtype_of(black_box(list_a), black_box(list_b)))
        });
    });
}

/// `{[K in keyof O]: O[K]}` over an object with `width` properties.
fn bench_mapped_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("mapped_type_evaluate");
    for width in [4usize, 32, 128] {
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |bench, &width| {
            bench.iter(|| {
                // A fresh interner per iteration keeps evaluation uncached.
                let interner = TypeInterner::new();
                let properties = (0..width)
                    .map(|i| PropertyInfo::new(interner.intern_string(&format!("p{i}")), TypeId::NUMBER))
                    .collect();
                let source = interner.object(properties);
                let k = interner.intern_string("K");
                let key = interner.type_param(TypeParamInfo::new(k));
                let mapped = interner.mapped(MappedType {
                    key_param: TypeParamInfo::new(k),
                    source: KeySource::KeyOf(source),
                    template: interner.index_access(source, key),
                    optional: None,
                    variance: None,
                });
                black_box(evaluate_type(&interner, &NoopResolver, mapped))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_deep_objects,
    bench_recursive_alias,
    bench_mapped_evaluation
);
criterion_main!(benches);
