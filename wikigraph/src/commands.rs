use clap::{ArgGroup, arg, command};
use wikigraph_scanner::client::DEFAULT_API_URL;

pub const DEFAULT_DB_PATH: &str = "~/.config/wikigraph/wikigraph.db";

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("wikigraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("wikigraph")
        .about("Crawl an encyclopedia into a link graph, rank its pages and find paths between them")
        .styles(CLAP_STYLING)
        .arg(
            arg!(--"db" <PATH>)
                .required(false)
                .global(true)
                .help("Location of the graph database")
                .default_value(DEFAULT_DB_PATH),
        )
        .arg(
            arg!(--"api-url" <URL>)
                .required(false)
                .global(true)
                .help(format!("MediaWiki API endpoint (default: {})", DEFAULT_API_URL)),
        )
        .arg(
            arg!(-q --"quiet" "Only log warnings and hide progress output")
                .required(false)
                .global(true),
        )
        .arg(
            arg!(--"format" <FORMAT>)
                .required(false)
                .global(true)
                .help("Output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("init")
                .about("Creates the graph database")
                .arg(
                    arg!(-f --"force")
                        .help("Delete any existing database at the same location first")
                        .required(false),
                ),
        )
        .subcommand(
            command!("page")
                .about("Show one page; title lookups crawl the page when it is not stored yet")
                .arg(
                    arg!(--"id" <ID>)
                        .required(false)
                        .help("Page id")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(--"title" <TITLE>)
                        .required(false)
                        .help("Page title"),
                )
                .group(
                    ArgGroup::new("lookup")
                        .args(["id", "title"])
                        .required(true),
                ),
        )
        .subcommand(
            command!("graph")
                .about("Crawl outward from a seed page and print the resulting graph")
                .arg(arg!(<SEED> "Title of the seed page"))
                .arg(
                    arg!(-d --"depth" <N>)
                        .required(false)
                        .help("Number of hops to crawl from the seed")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("1"),
                )
                .arg(
                    arg!(-n --"max-neighbors" <N>)
                        .required(false)
                        .help("Links followed per page")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("50"),
                )
                .arg(
                    arg!(--"include-years")
                        .required(false)
                        .help("Also expand bare year pages such as \"1998\"")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(
            command!("rank")
                .about("Compute PageRank over every stored page and save the scores")
                .arg(
                    arg!(--"damping" <D>)
                        .required(false)
                        .help("Damping factor")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.85"),
                )
                .arg(
                    arg!(--"max-iter" <N>)
                        .required(false)
                        .help("Maximum number of power iterations")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"tolerance" <TOL>)
                        .required(false)
                        .help("Stop once the L1 change between rounds drops below this")
                        .value_parser(clap::value_parser!(f64))
                        .default_value("0.000001"),
                )
                .arg(
                    arg!(--"top" <N>)
                        .required(false)
                        .help("Number of top-ranked pages to list")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                ),
        )
        .subcommand(
            command!("path")
                .about("Find the shortest and the rank-weighted path between two stored pages")
                .arg(
                    arg!(<SOURCE_ID> "Id of the start page")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(<TARGET_ID> "Id of the destination page")
                        .value_parser(clap::value_parser!(i64)),
                )
                .arg(
                    arg!(--"max-depth" <N>)
                        .required(false)
                        .help("Longest rank-weighted path considered, in links")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                ),
        )
        .subcommand(command!("stats").about("Show database counts and the most recent pages and links"))
}
