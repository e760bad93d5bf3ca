use ring_traffic::{Simulation, SimulationConfig};
use std::time::Instant;

fn main() {
    let mut sim = Simulation::new(SimulationConfig::default()).expect("default config is valid");

    println!("Simulating {} on the default ring...", sim.model());
    const NUM_FRAMES: u32 = 10_000;
    for batch in 0u64.. {
        let start = Instant::now();
        sim.run(NUM_FRAMES as usize);
        let frame = start.elapsed() / NUM_FRAMES;
        let last = sim.history().last().expect("history is never empty after a step");
        println!(
            "Batch {}: avg. frame {:?} --> {:.0}x speedup, t = {:.0} s, mean speed {:.2} m/s, gap SD {:.2} m",
            batch,
            frame,
            sim.dt() / frame.as_secs_f64(),
            sim.sim_time(),
            last.mean_speed,
            last.gap_std_dev,
        );
        if batch % 10 == 9 {
            sim.apply_perturbation();
        }
        // Keep memory bounded
        sim.roll_over_window();
    }
}
