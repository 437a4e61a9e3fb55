use crate::analyzer::HTMLTagFilter;
use crate::crawler::PageFetcher;
use crate::data_models::PageAddress;
use crate::error::LemmacloudError;
use crate::notice::Notifier;

/// Visible body text of the page at `address`.
///
/// Fetch and parse failures are reported through `notifier` and yield an
/// empty string, so one bad page never takes the batch down with it.
pub async fn extract(
    fetcher: &dyn PageFetcher,
    address: &PageAddress,
    notifier: &Notifier,
) -> String {
    let url = address.as_str();
    let html = match fetcher.fetch(url).await {
        Ok(html) => html,
        Err(e) => {
            notifier.notify(LemmacloudError::extraction(url, e));
            return String::new();
        }
    };

    match HTMLTagFilter::body_text(&html) {
        Ok(text) => {
            tracing::debug!("extracted {} chars from {url}", text.chars().count());
            text.trim().to_string()
        }
        Err(e) => {
            notifier.notify(LemmacloudError::extraction(url, e));
            String::new()
        }
    }
}
