use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{read_config, resolve_data_dir};
use crate::io::store_io::FileStore;
use crate::logging;
use crate::model::config::Config;
use crate::ops::rollover::SystemClock;
use crate::ops::store_ops::normalize_text;
use crate::session::{RolloverReport, Session};

type CliSession = Session<FileStore, SystemClock>;
type CliResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let json = cli.json;
    let data_dir = resolve_data_dir(cli.data_dir.as_deref());
    let config = read_config(&data_dir)?;
    logging::init_stderr(&config.log.level);

    let store = FileStore::new(&data_dir);
    // Held until the command returns: load, startup rollover and the write
    // happen as one unit against other ck processes.
    let _guard = store.lock()?;
    let mut session = Session::open(store, SystemClock);
    // Every invocation counts as an application start
    let startup = session.check_rollover();

    let Some(cmd) = cli.command else {
        return Ok(());
    };
    if !matches!(cmd, Commands::Rollover)
        && let Some(report) = &startup
    {
        eprintln!("{}", format_rollover(Some(report)));
    }

    match cmd {
        Commands::Add(args) => cmd_add(&mut session, args, json),
        Commands::Toggle(args) => cmd_toggle(&mut session, args, json),
        Commands::Rm(args) => cmd_rm(&mut session, args),
        Commands::List => cmd_list(&session, json),
        Commands::History(args) => cmd_history(&session, &config, args, json),
        Commands::Rollover => cmd_rollover(startup.as_ref(), json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(args: &PathArgs) -> String {
    let mut path = args.title.clone();
    for part in [&args.sub, &args.item].into_iter().flatten() {
        path.push('/');
        path.push_str(part);
    }
    format!("not found: {}", path)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(session: &mut CliSession, args: AddArgs, json: bool) -> CliResult {
    if normalize_text(&args.text).is_none() {
        return Err("text must not be empty".into());
    }

    let id = match (&args.title, &args.sub) {
        (None, _) => session.add_title(&args.text),
        (Some(title), None) => session.add_subtitle(title, &args.text),
        (Some(title), Some(sub)) => session.add_checklist_item(title, sub, &args.text),
    };
    let id = id.ok_or_else(|| {
        let parent = match (&args.title, &args.sub) {
            (Some(t), Some(s)) => format!("{}/{}", t, s),
            (Some(t), None) => t.clone(),
            (None, _) => String::new(),
        };
        format!("not found: {}", parent)
    })?;

    if json {
        println!("{}", serde_json::to_string(&AddedJson { id })?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_toggle(session: &mut CliSession, args: PathArgs, json: bool) -> CliResult {
    let changed = match (&args.sub, &args.item) {
        (None, _) => session.toggle_title(&args.title),
        (Some(sub), None) => session.toggle_subtitle(&args.title, sub),
        (Some(sub), Some(item)) => session.toggle_checklist_item(&args.title, sub, item),
    };
    if !changed {
        return Err(not_found(&args).into());
    }

    let tree = session.tree();
    let completed = match (&args.sub, &args.item) {
        (None, _) => tree.title(&args.title).map(|t| t.completed),
        (Some(sub), None) => tree.subtitle(&args.title, sub).map(|s| s.completed),
        (Some(sub), Some(item)) => tree.item(&args.title, sub, item).map(|c| c.completed),
    }
    .unwrap_or_default();

    if json {
        println!("{}", serde_json::json!({ "completed": completed }));
    } else {
        println!("{}", if completed { "done" } else { "not done" });
    }
    Ok(())
}

fn cmd_rm(session: &mut CliSession, args: PathArgs) -> CliResult {
    let changed = match (&args.sub, &args.item) {
        (None, _) => session.delete_title(&args.title),
        (Some(sub), None) => session.delete_subtitle(&args.title, sub),
        (Some(sub), Some(item)) => session.delete_checklist_item(&args.title, sub, item),
    };
    if !changed {
        return Err(not_found(&args).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(session: &CliSession, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string_pretty(session.tree())?);
    } else {
        print!("{}", format_tree(session.tree()));
    }
    Ok(())
}

fn cmd_history(session: &CliSession, config: &Config, args: HistoryArgs, json: bool) -> CliResult {
    let days = args.days.unwrap_or(config.ui.recent_days);
    let entries = session.recent_history(days);
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
    } else {
        print!("{}", format_history(entries));
    }
    Ok(())
}

fn cmd_rollover(report: Option<&RolloverReport>, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(&RolloverJson::from_report(report))?);
    } else {
        println!("{}", format_rollover(report));
    }
    Ok(())
}
