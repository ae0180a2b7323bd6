//! Bakes an optional packages-root hint into the binary.

use std::env;
use std::path::Path;

const HINT_VAR: &str = "ICONPACK_ROOT_HINT";

fn main() {
    println!("cargo:rerun-if-env-changed={HINT_VAR}");

    let Some(raw) = env::var_os(HINT_VAR).filter(|raw| !raw.is_empty()) else {
        return;
    };
    let hint = Path::new(&raw);
    let resolved = hint.canonicalize().unwrap_or_else(|_| hint.to_path_buf());
    println!("cargo:rustc-env={HINT_VAR}={}", resolved.display());
}
