use std::env;

fn main() {
    // Only the firmware build links against ESP-IDF.
    if env::var_os("CARGO_FEATURE_ESP").is_some() {
        embuild::espidf::sysenv::output();
    }
}
