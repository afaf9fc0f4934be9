use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ck", about = concat!("[x] checklist v", env!("CARGO_PKG_VERSION"), " - a fresh list every day"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a title, or a subtitle/item under one
    Add(AddArgs),
    /// Toggle completion of a title, subtitle or checklist item
    Toggle(PathArgs),
    /// Delete a title, subtitle or checklist item (and everything under it)
    Rm(PathArgs),
    /// Show the checklist tree
    List,
    /// Show recent daily history
    History(HistoryArgs),
    /// Run the daily reset check now
    Rollover,
}

#[derive(Args)]
pub struct AddArgs {
    /// Text of the new entry
    pub text: String,
    /// Add under this title (as a subtitle)
    #[arg(long = "title", short = 't')]
    pub title: Option<String>,
    /// Add under this subtitle (as a checklist item); requires --title
    #[arg(long = "sub", short = 's', requires = "title")]
    pub sub: Option<String>,
}

/// Addresses one node: a title, a subtitle within it, or an item within that
#[derive(Args)]
pub struct PathArgs {
    /// Title ID
    pub title: String,
    /// Subtitle ID
    pub sub: Option<String>,
    /// Checklist item ID
    pub item: Option<String>,
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Number of days to show (default: ui.recent_days from config)
    #[arg(long)]
    pub days: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_add() {
        let cli = Cli::try_parse_from(["ck", "add", "Dishes", "--title", "a", "--sub", "b"]).unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.text, "Dishes");
                assert_eq!(args.title.as_deref(), Some("a"));
                assert_eq!(args.sub.as_deref(), Some("b"));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn sub_without_title_is_rejected() {
        assert!(Cli::try_parse_from(["ck", "add", "Dishes", "--sub", "b"]).is_err());
    }
}
