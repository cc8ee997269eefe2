use gemfetch::cli::CliCommand;
use gemfetch::logging;

fn main() {
    // Initialize logging as early as possible.
    logging::init_logging_or_stderr();

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("gemfetch error: {:#}", err);
        std::process::exit(1);
    }
}
