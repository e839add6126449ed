use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::posting::ContractType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    pub company: String,
    pub city: String,
    pub contract_types: BTreeSet<ContractType>,
    pub posted_on: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSearchQuery {
    #[serde(default)]
    pub search_text: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub contract_types: BTreeSet<ContractType>,
}

impl JobSearchQuery {
    pub fn matches(&self, listing: &JobListing) -> bool {
        let text_matches = match non_blank(self.search_text.as_deref()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                listing.title.to_lowercase().contains(&needle)
                    || listing.company.to_lowercase().contains(&needle)
            }
            None => true,
        };

        let city_matches = non_blank(self.city.as_deref())
            .map(|city| listing.city.trim().eq_ignore_ascii_case(city))
            .unwrap_or(true);

        let contract_matches = self.contract_types.is_empty()
            || !self.contract_types.is_disjoint(&listing.contract_types);

        text_matches && city_matches && contract_matches
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Matching listings, newest first, with dismissed ids removed.
pub fn search_jobs<'a>(
    listings: &'a [JobListing],
    query: &JobSearchQuery,
    hidden: &BTreeSet<String>,
) -> Vec<&'a JobListing> {
    let mut results: Vec<&JobListing> = listings
        .iter()
        .filter(|listing| !hidden.contains(&listing.id))
        .filter(|listing| query.matches(listing))
        .collect();
    results.sort_by(|left, right| {
        right
            .posted_on
            .cmp(&left.posted_on)
            .then_with(|| left.id.cmp(&right.id))
    });
    results
}
