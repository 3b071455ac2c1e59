/// Reasons a search page could not be fetched.
///
/// Every variant ends pagination for the query that hit it; results from
/// earlier pages are kept.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
