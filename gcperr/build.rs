fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    let (os_display, arch_display) = match target.as_str() {
        "x86_64-pc-windows-msvc" => ("Windows", "x64"),
        "i686-pc-windows-msvc" => ("Windows", "x86"),
        "aarch64-pc-windows-msvc" => ("Windows", "ARM64"),

        "i686-unknown-linux-gnu" => ("Linux", "x86"),
        "x86_64-unknown-linux-gnu" => ("Linux", "x64"),
        "x86_64-unknown-linux-musl" => ("Linux", "x64"),
        "aarch64-unknown-linux-gnu" => ("Linux", "ARM64"),

        "x86_64-apple-darwin" => ("Darwin", "Intel"),
        "aarch64-apple-darwin" => ("Darwin", "Apple Silicon"),

        _ => ("Unknown", "unknown"),
    };
    println!("cargo:rustc-env=GCPERR_TARGET_OS_DISPLAY={os_display}");
    println!("cargo:rustc-env=GCPERR_TARGET_ARCH_DISPLAY={arch_display}");
    println!("cargo:rerun-if-changed=build.rs");
}
