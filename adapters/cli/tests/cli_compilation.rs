use std::process::Command;

#[test]
fn cli_compiles_without_warnings() {
    let status = Command::new(env!("CARGO"))
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .args(["check", "--quiet", "--bin", "dread"])
        .status()
        .expect("failed to invoke cargo check for dread CLI binary");

    assert!(status.success(), "cargo check --bin dread should succeed");
}
