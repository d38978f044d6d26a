fn main() {
    println!("cargo:rerun-if-env-changed=RHVOICE_LIB_DIR");
    if std::env::var_os("CARGO_FEATURE_RHVOICE").is_none() {
        return;
    }
    if let Some(dir) = std::env::var_os("RHVOICE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=RHVoice");
}
