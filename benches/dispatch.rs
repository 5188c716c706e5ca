use criterion::{black_box, criterion_group, criterion_main, Criterion};
use condform::{FormState, MountOptions, Propagation, RuleTableBuilder};

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for &n in &[5, 20, 50] {
        let mut builder = RuleTableBuilder::new();
        for i in 0..n {
            let target = format!("q{}", i + 1);
            builder = builder.rule(&format!("q{i}"), move |r| r.values(["True"]).target(&target));
        }
        let table = builder.compile().unwrap();

        let mut form = FormState::builder();
        for i in 0..=n {
            let name = format!("q{i}");
            form = form.field(&name, |f| f.null_boolean(&name, Some("True")));
        }
        let form = form.build();

        for propagation in [Propagation::Shallow, Propagation::Transitive] {
            let options = MountOptions::new().with_propagation(propagation);
            group.bench_function(&format!("{n}_chain_toggle_{propagation:?}"), |b| {
                let mut mounted = table.mount(form.clone(), options.clone());
                // Closing the chain resets every level; reopening shows one.
                b.iter(|| {
                    mounted.choose("q0", black_box("False"));
                    mounted.choose("q0", black_box("True"));
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
