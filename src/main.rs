fn main() {
    aces_up::cli::run();
}
