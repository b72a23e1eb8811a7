fn main() {
    // No-op on host builds; emits the ESP-IDF link/env configuration when
    // building for the espidf target.
    embuild::espidf::sysenv::output();
}
