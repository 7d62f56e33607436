//! Sample a Bell pair whose second qubit occasionally leaks.

use leakiverse::{Circuit, LeakageStatus, LeakyPauliChannel, ReadoutStrategy, Sampler};

fn main() {
    let mut channel = LeakyPauliChannel::new(1);
    channel
        .add_transition(
            LeakageStatus::from_levels(&[0]),
            LeakageStatus::from_levels(&[0]),
            "I".parse().unwrap(),
            0.9,
        )
        .unwrap();
    channel
        .add_transition(
            LeakageStatus::from_levels(&[0]),
            LeakageStatus::from_levels(&[1]),
            "I".parse().unwrap(),
            0.1,
        )
        .unwrap();
    channel.safety_check().unwrap();
    println!("{channel}");

    let circuit: Circuit = "R 0 1\nH 0\nCNOT 0 1\nI[leaky<0>] 1\nM 0 1\n".parse().unwrap();
    let batch = Sampler::new(&circuit, vec![channel])
        .with_seed(2024)
        .sample(10_000, ReadoutStrategy::RawLabel)
        .unwrap();

    let mut matched = 0usize;
    let mut leaked = 0usize;
    for row in batch.rows() {
        if row[1] >= 2 {
            leaked += 1;
        } else if row[0] == row[1] {
            matched += 1;
        }
    }
    println!("shots:            {}", batch.shots());
    println!("leaked partner:   {leaked}");
    println!("intact and equal: {matched}");
}
