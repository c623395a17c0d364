//! # Story Intake
//!
//! Imports user stories from Jira so they can seed a test-case generation
//! form.
//!
//! The crate authenticates against the Jira REST API, searches issues, and
//! flattens each issue's Atlassian Document Format description into plain
//! text. The same operations are exposed as a CLI and as a small JSON HTTP
//! API for the browser form.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌──────────────┐
//! │  CLI /   │──▶│ TrackerClient │──▶│  Jira REST   │
//! │  HTTP    │   │ probe/search  │   │  API (v3)    │
//! └──────────┘   └───────┬───────┘   └──────────────┘
//!                        │ description
//!                        ▼
//!                 ┌─────────────┐
//!                 │ adf → text  │──▶ NormalizedStory
//!                 └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export JIRA_BASE_URL=https://acme.atlassian.net
//! export JIRA_EMAIL=me@acme.io
//! export JIRA_API_KEY=...
//!
//! story-intake probe                     # verify credentials
//! story-intake search --max-results 20   # list stories
//! story-intake import GEN-42             # print a pre-filled form
//! story-intake serve                     # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`adf`] | Document tree to plain text |
//! | [`config`] | TOML configuration parsing |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`models`] | Request and response types |
//! | [`server`] | HTTP API |
//! | [`tracker`] | Jira REST client and error normalization |

pub mod adf;
pub mod config;
pub mod logging;
pub mod models;
pub mod server;
pub mod tracker;
