//! Build script for rdd2-codegen
//!
//! Exposes the target triple to the tests that compile the generated C.

use std::env;

fn main() {
    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=RDD2_TARGET={target}");
    }
    println!("cargo:rerun-if-changed=build.rs");
}
