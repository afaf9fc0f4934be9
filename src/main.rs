use clap::Parser;
use checklist::cli::commands::Cli;
use checklist::cli::handlers;
use checklist::io::config_io::resolve_data_dir;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        // No subcommand → launch TUI
        None => checklist::tui::run(&resolve_data_dir(cli.data_dir.as_deref())),
        Some(_) => handlers::dispatch(cli),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
