fn main() {
    if let Err(err) = ant_kernel::cli::run_cli() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
