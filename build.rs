use std::env;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds run the sequencer tests against stub peripherals
    let target = env::var("TARGET").unwrap_or_default();
    if !target.contains("avr") {
        return;
    }

    // Configure for ATmega128
    println!("cargo:rustc-link-arg=-mmcu=atmega128");

    // Pass CPU frequency for timing calculations
    println!("cargo:rustc-env=MCU_FREQ_HZ=16000000");

    // Debug firmware builds get debug-level log lines
    if env::var("PROFILE").map(|p| p == "debug").unwrap_or(false) {
        println!("cargo:rustc-cfg=feature=\"debug\"");
    }

    println!("cargo:warning=Building self-test firmware for ATmega128 at 16MHz");
}
