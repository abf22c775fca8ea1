//! Release store followed by an acquire load of one shared word.
//!
//! Build (acquire loads lower to `ldapr` on RCpc cores):
//!   RUSTFLAGS="-C target-cpu=neoverse-v1" \
//!     cargo build --profile probe -p valgrind-probes --bin atomic_acquire_release
//! Reproduce (valgrind bug 476465):
//!   /opt/valgrind-bd4db67/bin/valgrind --tool=none target/probe/atomic_acquire_release
//!
//! Prints `data is 1`.

use std::sync::atomic::{AtomicU64, Ordering};

static DATA: AtomicU64 = AtomicU64::new(0);

#[inline(never)]
fn foo() -> u64 {
    DATA.load(Ordering::Acquire)
}

fn main() {
    DATA.store(1, Ordering::Release);
    println!("data is {}", foo());
}
