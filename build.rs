fn main() {
    println!("cargo:rerun-if-env-changed=FILADRY_WIFI_SSID");
    println!("cargo:rerun-if-env-changed=FILADRY_WIFI_PASSWORD");
    println!("cargo:rerun-if-env-changed=FILADRY_BROKER_URL");
    println!("cargo:rerun-if-env-changed=FILADRY_BROKER_USER");
    println!("cargo:rerun-if-env-changed=FILADRY_BROKER_PASSWORD");

    // Host builds (tests, fuzzing) never touch the ESP-IDF toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
