use std::collections::BTreeSet;

use {
    async_trait::async_trait,
    pocharvest_config::{QueryConfig, QueryKind, SearchConfig},
    reqwest::header::{ACCEPT, AUTHORIZATION},
    secrecy::{ExposeSecret, SecretString},
    tracing::{debug, info, warn},
};

use crate::{error::SearchError, types::SearchPage};

/// Source of candidate repository URLs.
#[async_trait]
pub trait RepoSearch: Send + Sync {
    /// Run one query across all of its pages and return the repository URLs found.
    async fn search(&self, query: &QueryConfig) -> BTreeSet<String>;

    /// Union of [`RepoSearch::search`] over several queries.
    async fn search_all(&self, queries: &[QueryConfig]) -> BTreeSet<String> {
        let mut found = BTreeSet::new();
        for query in queries {
            found.extend(self.search(query).await);
        }
        found
    }
}

/// GitHub REST search client.
pub struct GithubSearch {
    settings: SearchConfig,
    token: SecretString,
    client: reqwest::Client,
}

impl GithubSearch {
    /// Build a client. An empty token is sent as-is and the API will most
    /// likely answer with rate-limit or auth errors.
    pub fn new(settings: SearchConfig, token: SecretString) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .build()?;
        Ok(Self {
            settings,
            token,
            client,
        })
    }

    fn endpoint(&self, kind: QueryKind) -> String {
        let path = match kind {
            QueryKind::Code => "search/code",
            QueryKind::Repositories => "search/repositories",
        };
        format!("{}/{path}", self.settings.api_base.trim_end_matches('/'))
    }

    async fn fetch_page(&self, query: &QueryConfig, page: u32) -> Result<SearchPage, SearchError> {
        let resp = self
            .client
            .get(self.endpoint(query.kind))
            .query(&[("q", query.q.as_str())])
            .query(&[("page", page), ("per_page", self.settings.per_page)])
            .header(ACCEPT, &self.settings.accept)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<SearchPage>().await?)
    }
}

#[async_trait]
impl RepoSearch for GithubSearch {
    async fn search(&self, query: &QueryConfig) -> BTreeSet<String> {
        let mut repos = BTreeSet::new();

        for page in 1..=self.settings.max_pages {
            let result = match self.fetch_page(query, page).await {
                Ok(r) => r,
                Err(e) => {
                    warn!(q = %query.q, page, error = %e, "search failed, keeping partial results");
                    break;
                },
            };
            if result.items.is_empty() {
                debug!(q = %query.q, page, "no more results");
                break;
            }
            for item in &result.items {
                match item.repo_url() {
                    Some(url) => {
                        repos.insert(url.to_string());
                    },
                    None => debug!(q = %query.q, page, "search item without repository url"),
                }
            }
        }

        info!(q = %query.q, kind = ?query.kind, repos = repos.len(), "search finished");
        repos
    }
}
