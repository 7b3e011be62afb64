//! The client crate is versioned together with the rest of the workspace.

const WORKSPACE_MANIFEST: &str = include_str!("../../../Cargo.toml");

#[test]
fn version_follows_workspace() {
    let workspace_version = WORKSPACE_MANIFEST
        .split("[workspace.package]")
        .nth(1)
        .and_then(|section| {
            section
                .lines()
                .find_map(|line| line.trim().strip_prefix("version = "))
        })
        .map(|value| value.trim_matches('"'))
        .expect("workspace.package.version is set");

    assert_eq!(env!("CARGO_PKG_VERSION"), workspace_version);
}
