use std::env;

fn main() {
    // Pre compile header file for rust interface.
    // Header saved to target/cxxbridge/db4nfv-bridge/src/external/ffi.rs.h
    let mut bridge = cxx_build::bridge("src/external/ffi.rs");
    bridge
        .flag_if_supported("-std=c++14")
        .flag_if_supported("-Wno-deprecated-declarations");

    if env::var_os("CARGO_FEATURE_DEMO_RUNTIME").is_some() {
        // Stand-in vnf runtime, compiled together with the bridge.
        bridge.file("runtime/demo.cc");
        println!("cargo:rerun-if-changed=runtime/demo.cc");
    } else {
        // Link the real vnf runtime built elsewhere.
        let lib = env::var("DB4NFV_RUNTIME_LIB").unwrap_or_else(|_| String::from("vnfruntime"));
        if let Ok(dir) = env::var("DB4NFV_RUNTIME_LIB_DIR") {
            println!("cargo:rustc-link-search=native={}", dir);
        }
        println!("cargo:rustc-link-lib={}", lib);
        println!("cargo:rerun-if-env-changed=DB4NFV_RUNTIME_LIB");
        println!("cargo:rerun-if-env-changed=DB4NFV_RUNTIME_LIB_DIR");
    }

    bridge.compile("db4nfv-bridge");

    println!("cargo:rerun-if-changed=src/external/ffi.rs");
    println!("cargo:rerun-if-changed=include/ffi.h");
}
