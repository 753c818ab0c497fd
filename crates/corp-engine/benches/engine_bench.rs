use corp_core::{City, IndustryType, Job, MaterialName};
use corp_engine::{Corporation, CorpState, CycleContext};
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_corp() -> Corporation {
    let mut corp = Corporation::new("BenchCorp", 500e9);
    corp.create_division("Agro", IndustryType::Agriculture).unwrap();
    corp.create_division("Chem", IndustryType::Chemical).unwrap();
    for name in ["Agro", "Chem"] {
        let division = corp.division_mut(name).unwrap();
        let office = division.offices.get_mut(&City::Sector12).unwrap();
        office.size = 9;
        office.assign(Job::Operations, 3).unwrap();
        office.assign(Job::Engineer, 2).unwrap();
        office.assign(Job::Business, 1).unwrap();
        office.assign(Job::Management, 2).unwrap();
        office.assign(Job::ResearchDev, 1).unwrap();
    }
    corp.set_material_buy_rate("Agro", City::Sector12, MaterialName::Water, 1.0)
        .unwrap();
    corp.set_material_buy_rate("Agro", City::Sector12, MaterialName::Chemicals, 0.5)
        .unwrap();
    corp.set_material_sell(
        "Agro",
        City::Sector12,
        MaterialName::Plants,
        Some("MAX".to_string()),
        Some("MP".to_string()),
    )
    .unwrap();
    corp.add_export(
        "Agro",
        City::Sector12,
        MaterialName::Plants,
        "Chem",
        City::Sector12,
        "EPROD/2".to_string(),
    )
    .unwrap();
    corp
}

fn bench_cycles(c: &mut Criterion) {
    let mut corp = bench_corp();
    let mut ctx = CycleContext::new(42);
    c.bench_function("full_cycle", |b| {
        b.iter(|| {
            for _ in CorpState::ALL {
                corp.process(1, &mut ctx);
            }
            ctx.drain_diagnostics()
        })
    });

    let mut batch_corp = bench_corp();
    let mut batch_ctx = CycleContext::new(42);
    c.bench_function("catch_up_batch_100", |b| {
        b.iter(|| {
            for _ in CorpState::ALL {
                batch_corp.process(100, &mut batch_ctx);
            }
            batch_ctx.drain_diagnostics()
        })
    });
}

criterion_group!(benches, bench_cycles);
criterion_main!(benches);
