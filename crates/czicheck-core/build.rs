//! Build script for czicheck-core.
//!
//! With the `native` feature, adds `CZICHECK_LIB_DIR` (if set) to the native
//! library search path so `libczicheckc` can be linked.

use std::env;
use std::path::Path;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CZICHECK_LIB_DIR");

    if env::var_os("CARGO_FEATURE_NATIVE").is_none() {
        return;
    }

    match env::var("CZICHECK_LIB_DIR") {
        Ok(dir) if Path::new(&dir).is_dir() => {
            println!("cargo:rustc-link-search=native={dir}");
        }
        Ok(dir) => {
            println!("cargo:warning=CZICHECK_LIB_DIR={dir} is not a directory");
        }
        Err(_) => {
            println!(
                "cargo:warning=CZICHECK_LIB_DIR not set - relying on the default linker search path for libczicheckc"
            );
        }
    }
}
