// PY_SOURCE: examples/basic.py
//! Reduce a list of numbers to the three that trigger a made-up failure.
//!
//! cargo run -p deltadebug --example basic

use deltadebug::{DdMin, Debugger, Outcome, TreeCache};

fn oracle(selected: &[i32]) -> Outcome {
    if !selected.contains(&5) {
        Outcome::Unresolved
    } else if selected.contains(&3) && selected.contains(&7) {
        Outcome::Fail
    } else {
        Outcome::Pass
    }
}

fn main() -> anyhow::Result<()> {
    let input: Vec<i32> = (0..10).collect();
    let mut debugger: Debugger<i32> = Debugger::new(Box::new(DdMin), Box::new(oracle))
        .with_cache(Some(Box::new(TreeCache::new())));
    let config = debugger.debug(&input)?;
    println!("{:?}", config.select(&input));
    println!("{}", debugger.summary());
    Ok(())
}
