//! Criterion benchmarks for the hot deciders. Run with `cargo bench`.

use criterion::{criterion_group, criterion_main, Criterion};

use bb_nonhalt::{
    config::Config,
    decider::{
        decider_cycler::DeciderCycler, decider_translated_cycler::DeciderTranslatedCycler, Decider,
    },
    machine_binary::{MachineBinary, MachineId},
};

fn bench_decider_cycler(c: &mut Criterion) {
    let machines: Vec<MachineId> = [
        "0RB0RB_0LA0LA",
        "1RB1LD_1RC---_1LC0RA_0RA0RA",
        "1RB1LC_0LB1LA_1RD1LB_1RE0RD_0RA---",
    ]
    .iter()
    .map(|tm| MachineId::new_no_id(MachineBinary::try_from(*tm).unwrap()))
    .collect();
    let config = Config::builder(5)
        .step_limit_cycler(1500)
        .space_limit_cells(500)
        .build();

    c.bench_function("decider_cycler_mixed_machines", |b| {
        let mut decider = DeciderCycler::new(&config);
        b.iter(|| {
            for machine in machines.iter() {
                std::hint::black_box(decider.decide_machine(machine));
            }
        })
    });
}

fn bench_decider_translated_cycler(c: &mut Criterion) {
    let machine = MachineId::new_no_id(MachineBinary::try_from("1RB1RB_1RA1RA").unwrap());
    let config = Config::builder(2)
        .step_limit_cycler(1500)
        .space_limit_cells(500)
        .build();

    c.bench_function("decider_translated_cycler_drifting", |b| {
        let mut decider = DeciderTranslatedCycler::new(&config);
        b.iter(|| std::hint::black_box(decider.decide_machine(&machine)))
    });
}

criterion_group!(
    benches,
    bench_decider_cycler,
    bench_decider_translated_cycler
);
criterion_main!(benches);
