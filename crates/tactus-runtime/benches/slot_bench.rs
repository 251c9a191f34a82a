use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::cell::RefCell;
use std::rc::Rc;

use tactus_core::activity::{active_link, Activatable, ActivationError, ActivationPolicy};
use tactus_core::time::SimulationTick;
use tactus_runtime::scheduler::PeriodicSlot;

struct Counter {
    count: u64,
}

impl Activatable for Counter {
    fn on_activation(&mut self, _tick: SimulationTick) -> Result<(), ActivationError> {
        self.count += 1;
        black_box(self.count);
        Ok(())
    }
}

fn bench_slot(c: &mut Criterion) {
    // 256 objects spread over a 32 tick period, with uneven weights so
    // the balancer has actual work to do.
    let objects: Vec<Rc<RefCell<Counter>>> = (0..256)
        .map(|_| Rc::new(RefCell::new(Counter { count: 0 })))
        .collect();

    let mut group = c.benchmark_group("Periodic Slot");

    group.bench_function("Relaxed placement (256 objects, period 32)", |b| {
        b.iter(|| {
            let mut slot = PeriodicSlot::new(32);
            for (index, object) in objects.iter().enumerate() {
                slot.add(
                    active_link(object),
                    ActivationPolicy::Relaxed,
                    (index % 7 + 1) as u32,
                );
            }
            black_box(slot.total_weight());
        });
    });

    let mut slot = PeriodicSlot::new(32);
    for (index, object) in objects.iter().enumerate() {
        slot.add(
            active_link(object),
            ActivationPolicy::Relaxed,
            (index % 7 + 1) as u32,
        );
    }
    let mut tick: SimulationTick = 0;

    group.bench_function("Activation sweep (one full period)", |b| {
        b.iter(|| {
            for _ in 0..32 {
                slot.on_next_tick(black_box(tick));
                tick += 1;
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_slot);
criterion_main!(benches);
