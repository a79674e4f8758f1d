// Entry point listing the available benchmarks

fn main() {
    println!("rental_insights benchmark suite");
    println!();
    println!("Usage:");
    println!("  cargo bench --package benchmarks");
    println!("  cargo bench --package benchmarks --bench <benchmark_name>");
    println!();
    println!("Available benchmarks:");
    println!("  - cleaning: raw CSV parsing and the cleaning stage");
    println!("  - forest: tree and forest fitting, batch prediction");
    println!("  - metrics: regression metrics and summary statistics");
    println!();
    println!("To record end-to-end timings and model quality as JSON:");
    println!("  cargo run --release --package benchmarks --bin collect_metrics");
}
