fn main() {
    // Reported by `cellview` at startup
    let built = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!("cargo:rustc-env=BUILD_DATE={}", built);
}
