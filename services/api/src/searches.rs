use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Args, Subcommand};
use jobboard::config::AppConfig;
use jobboard::error::AppError;
use jobboard::workflows::posting::ContractType;
use jobboard::workflows::search::{
    search_jobs, FileKeyValueStore, JobListing, JobSearchQuery, KeyValueStore, NotInterested,
    RecentSearches,
};

use crate::infra::sample_job_listings;

#[derive(Args, Debug)]
pub(crate) struct SearchesArgs {
    /// Directory holding the storage document (defaults to APP_DATA_DIR)
    #[arg(long, global = true)]
    pub(crate) data_dir: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: SearchesCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum SearchesCommand {
    /// Run a job search, remember it, and print the matching listings
    Record(RecordArgs),
    /// Print the remembered searches, most recent first
    List,
    /// Forget one remembered search
    Remove { id: String },
    /// Forget every remembered search
    Clear,
    /// Hide a job from future results
    Hide { job_id: String },
    /// Show a previously hidden job again
    Unhide { job_id: String },
}

#[derive(Args, Debug, Default)]
pub(crate) struct RecordArgs {
    /// Free text matched against job title and company
    #[arg(long)]
    pub(crate) text: Option<String>,
    /// City to restrict results to
    #[arg(long)]
    pub(crate) city: Option<String>,
    /// Contract type filter, repeatable (e.g. full_time, internship)
    #[arg(long = "contract", value_parser = parse_contract)]
    pub(crate) contracts: Vec<ContractType>,
}

fn parse_contract(raw: &str) -> Result<ContractType, String> {
    ContractType::parse(raw).ok_or_else(|| {
        let known: Vec<&str> = ContractType::ordered()
            .into_iter()
            .map(ContractType::id)
            .collect();
        format!("unknown contract type '{raw}' (expected one of {})", known.join(", "))
    })
}

pub(crate) fn run_searches(args: SearchesArgs) -> Result<(), AppError> {
    let data_dir = match args.data_dir {
        Some(dir) => dir,
        None => AppConfig::load()?.storage.data_dir,
    };
    let store = Arc::new(FileKeyValueStore::new(data_dir));
    let listings = sample_job_listings();

    for line in execute(store, &listings, args.command, Utc::now().timestamp_millis())? {
        println!("{line}");
    }
    Ok(())
}

/// Applies one command and returns the lines to print.
pub(crate) fn execute<S: KeyValueStore>(
    store: Arc<S>,
    listings: &[JobListing],
    command: SearchesCommand,
    now_millis: i64,
) -> Result<Vec<String>, AppError> {
    let mut lines = Vec::new();
    match command {
        SearchesCommand::Record(record) => {
            let mut recent = RecentSearches::load(store.clone())?;
            recent.record(record.text.as_deref(), record.city.as_deref(), now_millis)?;

            let hidden = NotInterested::load(store)?;
            let query = JobSearchQuery {
                search_text: record.text,
                city: record.city,
                contract_types: record.contracts.into_iter().collect::<BTreeSet<_>>(),
            };
            let results = search_jobs(listings, &query, hidden.ids());
            lines.push(format!("{} matching job(s)", results.len()));
            for listing in results {
                let contracts: Vec<&str> = listing
                    .contract_types
                    .iter()
                    .map(|contract| contract.label())
                    .collect();
                lines.push(format!(
                    "- [{}] {} at {} ({}) | {} | posted {}",
                    listing.id,
                    listing.title,
                    listing.company,
                    listing.city,
                    contracts.join(", "),
                    listing.posted_on
                ));
            }
        }
        SearchesCommand::List => {
            let recent = RecentSearches::load(store)?;
            if recent.is_empty() {
                lines.push("No recent searches".to_string());
            }
            for entry in recent.entries() {
                lines.push(format!("- [{}] {}", entry.id, entry.describe()));
            }
        }
        SearchesCommand::Remove { id } => {
            let mut recent = RecentSearches::load(store)?;
            if recent.remove(&id)? {
                lines.push(format!("Removed search {id}"));
            } else {
                lines.push(format!("No recent search with id {id}"));
            }
        }
        SearchesCommand::Clear => {
            RecentSearches::load(store)?.clear()?;
            lines.push("Cleared recent searches".to_string());
        }
        SearchesCommand::Hide { job_id } => {
            let mut hidden = NotInterested::load(store)?;
            hidden.mark(&job_id)?;
            lines.push(format!("{job_id} marked as not interested"));
        }
        SearchesCommand::Unhide { job_id } => {
            let mut hidden = NotInterested::load(store)?;
            if hidden.unmark(&job_id)? {
                lines.push(format!("{job_id} is visible again"));
            } else {
                lines.push(format!("{job_id} was not hidden"));
            }
        }
    }
    Ok(lines)
}
