//! Build script for SDR_DEV firmware
//!
//! Handles:
//! - Linker search path for the target memory layout
//! - defmt linker script for embedded builds

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (tests) have nothing to link
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
