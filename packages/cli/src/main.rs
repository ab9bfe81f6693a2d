use clap::Parser;
use tracing::Level;

use typed_settings_cli::Cli;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut stdout = std::io::stdout().lock();
    if let Err(e) = typed_settings_cli::execute(cli, &mut stdout) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
