use sha2::{Digest, Sha256};

/// Stable, filesystem-safe name for a repository URL.
///
/// Used to name clone directories so the cloner and the scanner agree on
/// where a given repository lives without sharing any state.
pub fn url_digest(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let a = url_digest("https://github.com/owner/repo");
        let b = url_digest("https://github.com/owner/repo");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_differs_per_url() {
        assert_ne!(
            url_digest("https://github.com/owner/repo"),
            url_digest("https://github.com/owner/repo2")
        );
    }
}
