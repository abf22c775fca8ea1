//! Signed 8-bit dot product through `SDOT` (Armv8.2 DotProd).
//!
//! Build:
//!   RUSTFLAGS="-C target-feature=+dotprod" \
//!     cargo build --profile probe -p valgrind-probes --bin sdot_dotprod
//! Reproduce (valgrind bug 460616):
//!   /opt/valgrind-d97fed7/bin/valgrind --tool=none target/probe/sdot_dotprod
//!
//! Prints one `index: <i>, expected: <hex>, result: <hex>` line per lane.
//! Natively the lanes read 4, 0, 12 and 36 (hex).
//!
//! Loads and the store keep the post-index `#0x10` forms of the upstream
//! reproducer. The accumulator is zeroed with `movi` first, which upstream
//! leaves to chance; that adds one instruction ahead of the `sdot`.

#[cfg(target_arch = "aarch64")]
const OP0: [i8; 16] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];
#[cfg(target_arch = "aarch64")]
const OP1: [i8; 16] = [0, 1, 0, 1, 0, 0, 0, 0, 1, 0, 1, 0, 1, 1, 1, 1];
#[cfg(target_arch = "aarch64")]
const EXPECTED: [i32; 4] = [0x4, 0x0, 0x12, 0x36];

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon,dotprod")]
unsafe fn sdot(a: &[i8; 16], b: &[i8; 16], result: &mut [i32; 4]) {
    core::arch::asm!(
        "ld1 {{v0.16b}}, [{a}], #0x10",
        "ld1 {{v1.16b}}, [{b}], #0x10",
        "movi v2.4s, #0",
        "sdot v2.4s, v0.16b, v1.16b",
        "st1 {{v2.4s}}, [{r}], #0x10",
        a = inout(reg) a.as_ptr() => _,
        b = inout(reg) b.as_ptr() => _,
        r = inout(reg) result.as_mut_ptr() => _,
        out("v0") _,
        out("v1") _,
        out("v2") _,
        options(nostack),
    );
}

#[cfg(target_arch = "aarch64")]
fn main() {
    let mut result: [i32; 4] = [0xDE, 0xAD, 0xBE, 0xEF];
    // SAFETY: the point of the probe is to execute SDOT; on a core without
    // DotProd this faults with SIGILL, which is an accepted outcome.
    unsafe { sdot(&OP0, &OP1, &mut result) };
    for (i, (expected, got)) in EXPECTED.iter().zip(result.iter()).enumerate() {
        println!("index: {i}, expected: {expected:x}, result: {got:x}");
    }
}

#[cfg(not(target_arch = "aarch64"))]
fn main() {
    eprintln!("sdot_dotprod: requires an aarch64 target");
    std::process::exit(2);
}
