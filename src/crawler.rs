use anyhow::{Result, bail};
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1251};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

use crate::config::Config;

/// How far into the document we look for a `<meta charset>` declaration.
const META_SNIFF_BYTES: usize = 1024;

/// Fetches a page and returns it decoded to UTF-8.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<HttpFetcher> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(HttpFetcher { client })
    }

    pub fn from_config(config: &Config) -> Result<HttpFetcher> {
        Self::new(config.fetch_timeout, &config.user_agent)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let res = self.client.get(url).send().await?.error_for_status()?;

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase());
        if let Some(ct) = &content_type {
            if !is_html_content_type(ct) {
                bail!("unsupported content type {ct}");
            }
        }

        let body = res.bytes().await?;
        let encoding = detect_encoding(&body, content_type.as_deref());
        let (text, _, had_errors) = encoding.decode(&body);
        if had_errors {
            tracing::debug!("{url}: malformed {} sequences replaced", encoding.name());
        }
        Ok(text.into_owned())
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim();
    mime.is_empty() || mime.contains("html")
}

/// Picks the encoding from the bytes themselves where possible:
/// BOM, then `<meta>` declaration, then the `Content-Type` charset,
/// then UTF-8 if the bytes are valid UTF-8, otherwise windows-1251.
pub fn detect_encoding(body: &[u8], content_type: Option<&str>) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(body) {
        return encoding;
    }
    let head = &body[..body.len().min(META_SNIFF_BYTES)];
    if let Some(encoding) = sniff_meta_charset(head) {
        return encoding;
    }
    if let Some(encoding) = content_type.and_then(charset_param) {
        return encoding;
    }
    if std::str::from_utf8(body).is_ok() {
        UTF_8
    } else {
        WINDOWS_1251
    }
}

fn charset_param(content_type: &str) -> Option<&'static Encoding> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Encoding::for_label(value.trim().trim_matches(|c| c == '"' || c == '\'').as_bytes())
        } else {
            None
        }
    })
}

/// Finds `charset=` inside a `<meta ...>` tag, covering both
/// `<meta charset="...">` and `<meta http-equiv content="text/html; charset=...">`.
fn sniff_meta_charset(head: &[u8]) -> Option<&'static Encoding> {
    let lower = head.to_ascii_lowercase();
    let mut rest = lower.as_slice();
    while let Some(start) = find(rest, b"<meta") {
        let tag = &rest[start..];
        let end = tag.iter().position(|&b| b == b'>').unwrap_or(tag.len());
        let tag = &tag[..end];
        if let Some(idx) = find(tag, b"charset=") {
            let value = &tag[idx + b"charset=".len()..];
            let value = value
                .iter()
                .skip_while(|&&b| b == b'"' || b == b'\'' || b == b' ')
                .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
                .copied()
                .collect::<Vec<u8>>();
            if let Some(encoding) = Encoding::for_label(&value) {
                // a page that reached us as bytes cannot really be UTF-16
                if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
                    return Some(UTF_8);
                }
                return Some(encoding);
            }
        }
        rest = &rest[start + end.max(1)..];
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
