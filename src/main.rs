fn main() {
    if let Err(e) = nanofiler_lib::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
