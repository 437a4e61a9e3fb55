use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::HashSet;

use crate::config::Config;
use crate::data_models::{PageAddress, ResultCount};
use crate::error::LemmacloudError;
use crate::notice::Notifier;

/// A web search backend returning result URLs in its own ranking order.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>>;
}

/// Scrapes the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: Url,
    region: String,
}

impl DuckDuckGoProvider {
    pub fn new(client: reqwest::Client, endpoint: &str, region: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid search endpoint {endpoint:?}"))?;
        Ok(Self {
            client,
            endpoint,
            region: region.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fetch_timeout)
            .build()?;
        Self::new(client, &config.search_url, &config.search_region)
    }

    /// Result links in page order, redirect wrappers decoded, ads and
    /// non-http links dropped.
    pub fn parse_results(html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let Ok(selector) = Selector::parse("a.result__a") else {
            return Vec::new();
        };
        document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(clean_result_url)
            .collect()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<String>> {
        let res = self
            .client
            .get(self.endpoint.clone())
            .query(&[("q", query), ("kl", self.region.as_str())])
            .send()
            .await
            .context("search request failed")?
            .error_for_status()?;
        let html = res.text().await?;
        let mut urls = Self::parse_results(&html);
        urls.truncate(limit);
        Ok(urls)
    }
}

/// DuckDuckGo wraps results as `//duckduckgo.com/l/?uddg=<target>`; ads go through `/y.js`.
pub fn clean_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{href}")
    } else {
        href.to_string()
    };
    let url = Url::parse(&absolute).ok()?;

    let target = if url.domain().is_some_and(|d| d.ends_with("duckduckgo.com")) {
        if url.path() != "/l/" {
            return None;
        }
        let (_, target) = url.query_pairs().find(|(k, _)| k == "uddg")?;
        Url::parse(&target).ok()?
    } else {
        url
    };

    if target.domain().is_some_and(|d| d.ends_with("duckduckgo.com")) {
        return None;
    }
    match target.scheme() {
        "http" | "https" => Some(target.to_string()),
        _ => None,
    }
}

/// Up to `limit` distinct result addresses for `query`, in provider order.
/// Any provider failure becomes a notice and an empty list.
pub async fn discover(
    provider: &dyn SearchProvider,
    query: &str,
    limit: ResultCount,
    notifier: &Notifier,
) -> Vec<PageAddress> {
    if query.trim().is_empty() {
        notifier.notify(LemmacloudError::discovery(query, "query is empty"));
        return Vec::new();
    }

    let urls = match provider.search(query.trim(), limit.get()).await {
        Ok(urls) => urls,
        Err(e) => {
            notifier.notify(LemmacloudError::discovery(query, e));
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let addresses: Vec<PageAddress> = urls
        .into_iter()
        .filter(|url| seen.insert(url.clone()))
        .take(limit.get())
        .map(PageAddress::new)
        .collect();

    if addresses.is_empty() {
        notifier.notify(LemmacloudError::discovery(query, "no results"));
    }
    tracing::info!("discovered {} pages for {query:?}", addresses.len());
    addresses
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_result_url() {
        assert_eq!(
            clean_result_url(
                "//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.ru%2Ftury%3Fp%3D1&rut=abc"
            ),
            Some("https://example.ru/tury?p=1".to_string())
        );
        assert_eq!(
            clean_result_url("/l/?uddg=https%3A%2F%2Fexample.ru%2F"),
            Some("https://example.ru/".to_string())
        );
        assert_eq!(
            clean_result_url("https://travel.example.ru/sochi"),
            Some("https://travel.example.ru/sochi".to_string())
        );
        assert_eq!(
            clean_result_url("https://duckduckgo.com/y.js?ad_provider=bing"),
            None
        );
        assert_eq!(clean_result_url("javascript:void(0)"), None);
    }

    #[test]
    fn test_parse_results() {
        let html = r#"<html><body>
            <div class="result results_links"><h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fa.example.ru%2F">A</a></h2></div>
            <div class="result result--ad"><h2 class="result__title">
              <a class="result__a" href="https://duckduckgo.com/y.js?ad_domain=ads.example">Ad</a></h2></div>
            <div class="result"><h2 class="result__title">
              <a class="result__a" href="https://b.example.ru/page">B</a></h2></div>
            <a class="result__url" href="https://c.example.ru/">not a title link</a>
            </body></html>"#;
        assert_eq!(
            DuckDuckGoProvider::parse_results(html),
            vec!["https://a.example.ru/", "https://b.example.ru/page"]
        );
    }
}
