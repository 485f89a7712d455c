// Channel discovery for `add`

use crate::error::Result;
use std::collections::HashSet;

/// A channel found by a search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub id: String,
    pub name: String,
    pub url: String,
}

/// Lazy iterator over search results
pub type SearchIter<'a> = Box<dyn Iterator<Item = Result<SearchResult>> + 'a>;

/// Service that finds channels matching a free-text term
pub trait ChannelSearch {
    fn search(&self, term: &str) -> Result<SearchIter<'_>>;
}

/// Up to `max_results` distinct channels for `term`, in service order
///
/// Stops pulling from the service as soon as enough channels were seen.
pub fn channel_search(
    service: &dyn ChannelSearch,
    term: &str,
    max_results: usize,
) -> Result<Vec<SearchResult>> {
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    if max_results == 0 {
        return Ok(results);
    }

    for result in service.search(term)? {
        let result = result?;
        if !seen.insert(result.id.clone()) {
            continue;
        }
        results.push(result);
        if results.len() == max_results {
            break;
        }
    }

    log::debug!("Search '{}' returned {} channel(s)", term, results.len());
    Ok(results)
}
