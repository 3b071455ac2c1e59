use serde::Deserialize;

/// One page of search results.
#[derive(Debug, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

/// A search hit. Code search nests the repository; repository search does not.
#[derive(Debug, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryRef>,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryRef {
    pub html_url: String,
}

impl SearchItem {
    /// The repository URL this hit belongs to.
    pub fn repo_url(&self) -> Option<&str> {
        match &self.repository {
            Some(repo) => Some(repo.html_url.as_str()),
            None => self.html_url.as_deref(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_item_prefers_nested_repository() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "name": "poc.py",
            "html_url": "https://github.com/a/b/blob/main/poc.py",
            "repository": { "html_url": "https://github.com/a/b" }
        }))
        .unwrap();
        assert_eq!(item.repo_url(), Some("https://github.com/a/b"));
    }

    #[test]
    fn test_repository_item_uses_own_url() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({
            "full_name": "a/b",
            "html_url": "https://github.com/a/b"
        }))
        .unwrap();
        assert_eq!(item.repo_url(), Some("https://github.com/a/b"));
    }

    #[test]
    fn test_item_without_urls() {
        let item: SearchItem = serde_json::from_value(serde_json::json!({ "id": 1 })).unwrap();
        assert_eq!(item.repo_url(), None);
    }

    #[test]
    fn test_page_without_items_is_empty() {
        let page: SearchPage = serde_json::from_str(r#"{"total_count": 0}"#).unwrap();
        assert!(page.items.is_empty());
    }
}
