use std::path::{Component, Path};

use deltadebug::BugManifest;

fn shipped() -> BugManifest {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../probes/valgrind/bugs.json");
    BugManifest::load(&path).expect("valgrind manifest")
}

// Binaries come from the stripped profile, not `release`.
#[test]
fn valgrind_bugs_use_the_stripped_profile() {
    let manifest = shipped();
    assert!(!manifest.bugs.is_empty());
    for bug in &manifest.bugs {
        let dirs: Vec<_> = bug
            .file
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => name.to_str(),
                _ => None,
            })
            .collect();
        assert!(
            dirs.windows(2).any(|w| w == ["target", "probe"]),
            "{} is not under target/probe",
            bug.file.display()
        );
        assert!(!dirs.contains(&"release"), "{}", bug.file.display());
    }
}
