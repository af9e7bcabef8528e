mod cli;
mod executor;
#[cfg(feature = "tui")]
mod interactive;
mod logging;
mod run_once;

fn main() {
    if let Err(e) = cli::run() {
        if zdx_core::core::interrupt::is_interrupted() {
            std::process::exit(130);
        }
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
