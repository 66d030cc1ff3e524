//! Build script for the link firmware
//!
//! Handles:
//! - Linker scripts for the firmware binary (cortex-m-rt and defmt)
//! - Exposing the selected role to the firmware banner

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host test builds (`--features std`) link no firmware binary
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // memory.x comes from embassy-stm32's `memory-x` feature
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    let role = if std::env::var_os("CARGO_FEATURE_RECEIVER").is_some() {
        "receiver"
    } else {
        "transmitter"
    };
    println!("cargo:rustc-env=NRF24_LINK_ROLE={role}");
}
