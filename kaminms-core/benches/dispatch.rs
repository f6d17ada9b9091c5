use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use kaminms_api::{Enchantment, ServerVersion};
use kaminms_core::{default_registry, NmsConfig, NmsFacade, VersionDetector};
use kaminms_harness::{fixtures, ScriptedHost, ScriptedProbe};
use serde_json::json;
use std::hint::black_box;
use std::sync::Arc;

fn facade_for(version: &ServerVersion) -> NmsFacade {
    NmsFacade::new(
        NmsConfig::default(),
        Arc::new(ScriptedProbe::for_version(version)),
        Arc::new(ScriptedHost::permissive()),
        default_registry().expect("bundled registry"),
    )
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("detection");
    let registry = default_registry().expect("bundled registry").build();
    let config = NmsConfig::default();

    for version in registry.supported().iter().step_by(6) {
        let probe = ScriptedProbe::for_version(version);
        group.bench_with_input(
            BenchmarkId::new("detect", version.revision()),
            &probe,
            |b, probe| {
                b.iter(|| {
                    let detection = VersionDetector::new(&registry, &config).detect(probe);
                    black_box(detection)
                })
            },
        );
    }

    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let registry = default_registry().expect("bundled registry").build();
    let newest = registry.supported().last().cloned().expect("at least one version");
    let nms = facade_for(&newest);
    nms.resolve().expect("bound");

    let enchantment = Enchantment::new("DAMAGE_ALL");
    group.bench_function("typed_namespaced", |b| {
        b.iter(|| black_box(nms.namespaced(black_box(&enchantment))))
    });

    let item = fixtures::sword();
    group.bench_function("typed_set_damage", |b| {
        b.iter(|| black_box(nms.set_damage(item.clone(), 5)))
    });

    group.bench_function("invoke_entity_height", |b| {
        b.iter(|| black_box(nms.invoke("entity.height", vec![json!(7)])))
    });

    group.finish();
}

criterion_group!(benches, bench_detection, bench_dispatch);
criterion_main!(benches);
