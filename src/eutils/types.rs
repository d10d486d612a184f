use std::collections::HashMap;

use serde::Deserialize;

/// Response from `esearch.fcgi?retmode=json`.
#[derive(Debug, Deserialize, Default)]
pub struct ESearchResponse {
    #[serde(default)]
    pub esearchresult: Option<ESearchResult>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ESearchResult {
    #[serde(default)]
    pub idlist: Option<Vec<String>>,
}

impl ESearchResponse {
    /// Identifier list, empty when either level of nesting is absent.
    pub fn into_ids(self) -> Vec<String> {
        self.esearchresult
            .and_then(|r| r.idlist)
            .unwrap_or_default()
    }
}

/// Response from `esummary.fcgi?retmode=json`.
///
/// `result` mixes a `uids` array with one object per identifier, so entries
/// stay as raw JSON until looked up.
#[derive(Debug, Deserialize, Default)]
pub struct ESummaryResponse {
    #[serde(default)]
    pub result: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DocSummary {
    pub title: Option<String>,
    /// Set by E-utilities for identifiers it cannot resolve.
    pub error: Option<String>,
}

impl ESummaryResponse {
    /// `Ok(None)` when the identifier is absent; an entry of the wrong shape is an error.
    pub fn into_summary(mut self, pmid: &str) -> Result<Option<DocSummary>, serde_json::Error> {
        match self.result.as_mut().and_then(|r| r.remove(pmid)) {
            Some(entry) => serde_json::from_value(entry).map(Some),
            None => Ok(None),
        }
    }
}

/// Response from `elink.fcgi?retmode=json`.
#[derive(Debug, Deserialize, Default)]
pub struct ELinkResponse {
    #[serde(default)]
    pub linksets: Vec<LinkSet>,
}

#[derive(Debug, Deserialize)]
pub struct LinkSet {
    #[serde(default)]
    pub linksetdbs: Vec<LinkSetDb>,
}

#[derive(Debug, Deserialize)]
pub struct LinkSetDb {
    pub linkname: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
}

impl ELinkResponse {
    /// Linked identifiers under `linkname`, in response order.
    pub fn links_named<'a>(&'a self, linkname: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.linksets
            .iter()
            .flat_map(|set| set.linksetdbs.iter())
            .filter(move |db| db.linkname.as_deref() == Some(linkname))
            .flat_map(|db| db.links.iter().map(String::as_str))
    }
}
