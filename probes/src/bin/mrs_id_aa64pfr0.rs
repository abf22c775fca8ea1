//! Reads `ID_AA64PFR0_EL1` from EL0 and reports the AdvSIMD bits 23:21.
//!
//! Build:
//!   cargo build --profile probe -p valgrind-probes --bin mrs_id_aa64pfr0
//! Reproduce (valgrind bug 392146):
//!   /opt/valgrind-bd4db67/bin/valgrind --tool=none target/probe/mrs_id_aa64pfr0
//!
//! Exit status is 1 when the masked bits are clear, 0 otherwise. The kernel
//! traps and emulates the `mrs`; the instrumented run must not SIGILL.

use std::process::ExitCode;

#[cfg(target_arch = "aarch64")]
fn main() -> ExitCode {
    let reg: u64;
    // SAFETY: reads an ID register into a scratch GPR; no memory is touched.
    unsafe {
        core::arch::asm!(
            "mrs {reg}, ID_AA64PFR0_EL1",
            reg = out(reg) reg,
            options(nomem, nostack, preserves_flags),
        );
    }
    ExitCode::from(((reg & 0xE0_0000) == 0) as u8)
}

#[cfg(not(target_arch = "aarch64"))]
fn main() -> ExitCode {
    eprintln!("mrs_id_aa64pfr0: requires an aarch64 target");
    ExitCode::from(2)
}
