use dance_runner::prelude::{init, run, DanceResult};

fn main() -> DanceResult<()> {
    let cli = init();

    let summary = run(cli)?;
    if !summary.is_success() {
        anyhow::bail!(
            "Run failed: {} diverged, {} inconclusive, {} config error(s)",
            summary.diverged,
            summary.inconclusive,
            summary.config_errors
        );
    }

    println!("All {} test case(s) matched", summary.total_cases());
    Ok(())
}
