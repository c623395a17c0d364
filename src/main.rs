//! # Story Intake CLI (`story-intake`)
//!
//! ## Usage
//!
//! ```bash
//! story-intake --config ./config/intake.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `story-intake serve` | Start the HTTP API |
//! | `story-intake probe` | Verify Jira credentials |
//! | `story-intake search` | List stories matching a JQL query |
//! | `story-intake import <KEY>` | Print a generation form pre-filled from one story |
//!
//! Credentials are read from `--base-url`, `--email` and `--api-key`, or
//! from `JIRA_BASE_URL`, `JIRA_EMAIL` and `JIRA_API_KEY`.

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use story_intake::config;
use story_intake::logging;
use story_intake::models::{GenerateRequest, SearchQuery, TrackerCredentials};
use story_intake::server;
use story_intake::tracker::TrackerClient;

/// Import Jira user stories as plain text.
#[derive(Parser)]
#[command(name = "story-intake", version, about)]
struct Cli {
    /// Path to configuration file (TOML). Built-in defaults are used when
    /// the file does not exist.
    #[arg(long, global = true, default_value = "./config/intake.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API on `[server].bind`.
    Serve,

    /// Check that the credentials can reach Jira.
    Probe {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Search Jira and print the matching stories.
    Search {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// JQL query. Defaults to `[tracker].default_jql`.
        #[arg(long)]
        jql: Option<String>,

        /// Maximum number of issues. Defaults to `[tracker].default_max_results`.
        #[arg(long)]
        max_results: Option<u64>,

        /// Print stories as JSON instead of a text listing.
        #[arg(long)]
        json: bool,
    },

    /// Print a generation form pre-filled from the story with this key.
    ///
    /// Probes the connection first, then searches and selects the issue.
    Import {
        /// Issue key, e.g. `GEN-42`.
        key: String,

        #[command(flatten)]
        credentials: CredentialArgs,

        /// JQL query used to find the story. Defaults to `[tracker].default_jql`.
        #[arg(long)]
        jql: Option<String>,
    },
}

#[derive(Args)]
struct CredentialArgs {
    /// Jira base URL, e.g. `https://acme.atlassian.net`.
    #[arg(long, env = "JIRA_BASE_URL", default_value = "")]
    base_url: String,

    /// Jira account email.
    #[arg(long, env = "JIRA_EMAIL", default_value = "")]
    email: String,

    /// Jira API token.
    #[arg(long, env = "JIRA_API_KEY", default_value = "", hide_env_values = true)]
    api_key: String,
}

impl CredentialArgs {
    fn credentials(&self) -> TrackerCredentials {
        TrackerCredentials::new(&self.base_url, &self.email, &self.api_key).trimmed()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let cfg = config::load_config_or_default(&cli.config)?;
    let tracker = TrackerClient::new(cfg.tracker.clone());

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Probe { credentials } => {
            let result = tracker.probe_connection(&credentials.credentials()).await;
            match (result.success, result.message, result.error) {
                (true, Some(message), _) => println!("{}", message),
                (_, _, error) => bail!(error.unwrap_or_else(|| "Jira connection failed".into())),
            }
        }
        Commands::Search {
            credentials,
            jql,
            max_results,
            json,
        } => {
            let query = SearchQuery {
                jql,
                max_results: max_results.map(Into::into),
            };
            let result = tracker
                .search_issues(&credentials.credentials(), &query)
                .await;
            let Some(stories) = result.issues else {
                bail!(result
                    .error
                    .unwrap_or_else(|| "Jira search failed".into()));
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&stories)?);
            } else if stories.is_empty() {
                println!("No stories found.");
            } else {
                for story in &stories {
                    println!("{}  {}", story.key, story.summary);
                }
                println!("\n{} stories", stories.len());
            }
        }
        Commands::Import {
            key,
            credentials,
            jql,
        } => {
            let credentials = credentials.credentials();

            let probe = tracker.probe_connection(&credentials).await;
            if !probe.success {
                bail!(probe
                    .error
                    .unwrap_or_else(|| "Jira connection failed".into()));
            }
            if let Some(message) = probe.message {
                eprintln!("{}", message);
            }

            let query = SearchQuery {
                jql,
                max_results: None,
            };
            let result = tracker.search_issues(&credentials, &query).await;
            let Some(stories) = result.issues else {
                bail!(result
                    .error
                    .unwrap_or_else(|| "Jira search failed".into()));
            };

            let Some(story) = stories.iter().find(|s| s.key == key) else {
                bail!("story not found: {} ({} stories searched)", key, stories.len());
            };

            let form = GenerateRequest::from_story(story);
            println!("{}", serde_json::to_string_pretty(&form)?);
        }
    }

    Ok(())
}
