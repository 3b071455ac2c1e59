use std::collections::BTreeSet;

/// Build the candidate link set: known links plus discovered ones, minus
/// the exclusion list.
pub fn merge<'a>(
    known: impl IntoIterator<Item = &'a str>,
    discovered: impl IntoIterator<Item = String>,
    exclude: &[String],
) -> BTreeSet<String> {
    known
        .into_iter()
        .map(str::to_string)
        .chain(discovered)
        .filter(|url| !exclude.iter().any(|e| e == url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_unions_and_dedups() {
        let known = ["https://github.com/a/one", "https://github.com/a/two"];
        let discovered = vec![
            "https://github.com/a/two".to_string(),
            "https://github.com/a/three".to_string(),
        ];
        let set = merge(known, discovered, &[]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("https://github.com/a/three"));
    }

    #[test]
    fn test_excluded_urls_never_appear() {
        let exclude = vec![
            "https://github.com/20142995/pocs".to_string(),
            "https://github.com/Natto97/pocsuite3".to_string(),
        ];
        // Excluded URLs arrive from both sources.
        let known = ["https://github.com/20142995/pocs", "https://github.com/a/one"];
        let discovered = vec![
            "https://github.com/Natto97/pocsuite3".to_string(),
            "https://github.com/a/two".to_string(),
        ];
        let set = merge(known, discovered, &exclude);
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            vec!["https://github.com/a/one", "https://github.com/a/two"]
        );
    }
}
