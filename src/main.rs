use colored::Colorize;
use tracing_subscriber::EnvFilter;
use validgen::cli::CommandLineInterface;
use validgen::TracingDiagnostics;

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let command_line_interface = CommandLineInterface::load();
    init_tracing(command_line_interface.debug);
    if let Err(error) = command_line_interface.run(&TracingDiagnostics) {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
