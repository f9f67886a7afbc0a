fn main() {
    // Emits built.rs into OUT_DIR with the git commit hash and build metadata.
    built::write_built_file().expect("Failed to acquire build-time information");
}
