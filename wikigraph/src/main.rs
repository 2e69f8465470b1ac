use colored::Colorize;
use wikigraph::commands::command_argument_builder;
use wikigraph::handlers::{
    GlobalOptions, handle_graph, handle_init, handle_page, handle_path, handle_rank, handle_stats,
    init_tracing,
};

#[tokio::main]
async fn main() {
    let matches = command_argument_builder().get_matches();
    let global = GlobalOptions::from_matches(&matches);
    init_tracing(global.quiet);

    let result = match matches.subcommand() {
        Some(("init", args)) => handle_init(&global, args),
        Some(("page", args)) => handle_page(&global, args).await,
        Some(("graph", args)) => handle_graph(&global, args).await,
        Some(("rank", args)) => handle_rank(&global, args),
        Some(("path", args)) => handle_path(&global, args),
        Some(("stats", _)) => handle_stats(&global),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}
