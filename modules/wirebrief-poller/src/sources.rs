//! Ranking of candidate article links found in a mail body.

/// Financial news domains in preference order. Links on these hosts are
/// tried before anything else in the mail.
pub const NEWS_DOMAINS: [&str; 5] = [
    "seekingalpha.com",
    "finance.yahoo.com",
    "cnbc.com",
    "bloomberg.com",
    "reuters.com",
];

fn domain_rank(url: &str) -> i32 {
    let lower = url.to_lowercase();
    for (i, domain) in NEWS_DOMAINS.iter().enumerate() {
        if lower.contains(domain) {
            return -(10 - i as i32);
        }
    }
    0
}

/// Order candidate urls by domain preference. The sort is stable, so links
/// on unranked hosts keep their order of appearance in the mail.
pub fn rank_article_urls(urls: &[String]) -> Vec<String> {
    let mut ranked = urls.to_vec();
    ranked.sort_by_key(|url| domain_rank(url));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_known_domains_rank_by_preference() {
        let input = urls(&[
            "https://www.cnbc.com/2025/11/04/tsla.html",
            "https://seekingalpha.com/news/tsla-q3",
            "https://www.reuters.com/business/tsla/",
        ]);
        let ranked = rank_article_urls(&input);
        assert_eq!(
            ranked,
            urls(&[
                "https://seekingalpha.com/news/tsla-q3",
                "https://www.cnbc.com/2025/11/04/tsla.html",
                "https://www.reuters.com/business/tsla/",
            ])
        );
    }

    #[test]
    fn test_ranked_hosts_come_before_unranked() {
        let input = urls(&[
            "https://example.com/a",
            "https://finance.yahoo.com/news/tsla",
            "https://example.org/b",
        ]);
        let ranked = rank_article_urls(&input);
        assert_eq!(ranked[0], "https://finance.yahoo.com/news/tsla");
        // Stable sort keeps unranked links in arrival order.
        assert_eq!(ranked[1], "https://example.com/a");
        assert_eq!(ranked[2], "https://example.org/b");
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_article_urls(&[]).is_empty());
    }
}
