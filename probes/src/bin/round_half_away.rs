//! Rounds a value sitting exactly halfway between two integers.
//!
//! Build:
//!   cargo build --profile probe -p valgrind-probes --bin round_half_away
//! Reproduce (valgrind bug 489338):
//!   /opt/valgrind-d97fed7/bin/valgrind --tool=memcheck target/probe/round_half_away
//!
//! `f64::round` rounds half away from zero, so the native output is `-323`.
//! Under the affected memcheck build the output is `-322`.

use std::hint::black_box;

// Kept out of line and opaque so the optimiser cannot fold the rounding.
#[inline(never)]
fn value() -> f64 {
    black_box(-322.5)
}

fn main() {
    let a = value();
    println!("{}", a.round() as i32);
}
