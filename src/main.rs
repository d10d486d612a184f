mod classify;
mod cli;
mod eutils;
mod matcher;
mod pipeline;
mod query;
mod record;
mod render;

pub const USER_AGENT: &str = concat!("microbe-scout/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use cli::Cli;
use eutils::EutilsClient;
use pipeline::PipelineRequest;
use query::SearchQuery;
use render::Mode;
use render::graph::{GraphOutcome, NO_REGULATED_MESSAGE};

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout covering DNS + connect + response body.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// Maximum redirect hops before aborting.
const MAX_REDIRECTS: usize = 5;
const DEFAULT_GRAPH_FILE: &str = "bacteria_network.html";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("microbe_scout=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    let client = EutilsClient::from_env(http);

    let today = chrono::Local::now().date_naive();
    let query = SearchQuery::new(&cli.keyword_1, &cli.keyword_2, today);
    let matcher = cli.matcher.build(cli.lexicon.as_deref());

    let request = PipelineRequest {
        query: &query,
        max_results: cli.max_results,
        sort: cli.sort.as_deref(),
    };
    let report = pipeline::run(&client, matcher.as_ref(), &request)
        .await
        .inspect_err(|e| tracing::error!("search failed: {e}"))?;

    match cli.mode {
        Mode::List => {
            let text = render::list::format_list(&report, query.keywords());
            match cli.output {
                Some(path) => {
                    std::fs::write(&path, text)?;
                    info!(path = %path.display(), "report written");
                }
                None => print!("{text}"),
            }
        }
        Mode::Graph => {
            println!("{}", render::found_line(&report));
            match render::graph::graph_output(&report)? {
                GraphOutcome::NoPapers => {}
                GraphOutcome::NoRegulated => {
                    println!("{}", render::summary_line(&report));
                    println!("{NO_REGULATED_MESSAGE}");
                }
                GraphOutcome::Html(html) => {
                    println!("{}", render::summary_line(&report));
                    let path = cli
                        .output
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH_FILE));
                    std::fs::write(&path, html)?;
                    println!(
                        "Graph with {} entities written to {}",
                        report.buckets.len(),
                        path.display()
                    );
                }
            }
        }
    }

    Ok(())
}
