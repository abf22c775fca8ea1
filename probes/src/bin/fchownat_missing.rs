//! `fchownat` on a path that does not exist.
//!
//! Build:
//!   cargo build --profile probe -p valgrind-probes --bin fchownat_missing
//! Reproduce (valgrind bug 508154):
//!   /opt/valgrind-49dccaf/bin/valgrind --tool=memcheck target/probe/fchownat_missing
//!
//! Prints `fchownat: <error>` to stderr and exits with status 255 when the
//! call fails, which it should whenever `non_existent_file` is absent.

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // SAFETY: the path is a NUL-terminated literal and no buffers are passed.
    let rc = unsafe { libc::fchownat(libc::AT_FDCWD, c"non_existent_file".as_ptr(), 0, 0, 0) };
    if rc == -1 {
        eprintln!("fchownat: {}", io::Error::last_os_error());
        return ExitCode::from(255);
    }
    ExitCode::SUCCESS
}
