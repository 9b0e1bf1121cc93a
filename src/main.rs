fn main() {
    if let Err(e) = guild_log_analysis::cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
