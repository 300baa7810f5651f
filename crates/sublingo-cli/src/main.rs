fn main() {
    if let Err(error) = sublingo_cli::run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
