//! Company-logo lookup.
//!
//! Logos are cosmetic: a failed lookup is reported as
//! [`AnalysisError::AuxiliaryLookupFailed`] and callers degrade the field to
//! an empty string instead of failing the request.

use crate::error::Result;
use crate::AnalysisError;
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use tracing::debug;

/// Public Bing host.
pub const DEFAULT_BING_URL: &str = "https://www.bing.com";

/// Resolves an image query to a single image URL.
#[async_trait]
pub trait LogoLookup: Send + Sync {
    /// Return the URL of the best image for `query`.
    async fn lookup(&self, query: &str) -> Result<String>;
}

/// Scrapes the first result of Bing's asynchronous image search page.
#[derive(Debug, Clone)]
pub struct BingImageLookup {
    client: Client,
    base_url: String,
}

impl BingImageLookup {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BING_URL)
    }

    /// Point the lookup at another host (used by tests).
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn failed(query: &str, message: impl Into<String>) -> AnalysisError {
        AnalysisError::AuxiliaryLookupFailed {
            query: query.to_string(),
            message: message.into(),
        }
    }
}

/// First `murl` (media URL) embedded in a Bing image results page.
fn first_media_url(page: &str) -> std::result::Result<Option<String>, regex::Error> {
    let re = Regex::new(r#"murl&quot;:&quot;(.*?)&quot;|"murl":"(.*?)""#)?;
    Ok(re.captures(page).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
            .filter(|url| !url.is_empty())
    }))
}

#[async_trait]
impl LogoLookup for BingImageLookup {
    async fn lookup(&self, query: &str) -> Result<String> {
        let url = format!("{}/images/async", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("q", query), ("first", "0"), ("count", "1"), ("adlt", "off")])
            .header("User-Agent", "Mozilla/5.0 (X11; Linux x86_64)")
            .send()
            .await
            .map_err(|e| Self::failed(query, e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Self::failed(query, format!("HTTP {}", resp.status().as_u16())));
        }

        let page = resp.text().await.map_err(|e| Self::failed(query, e.to_string()))?;
        let found = first_media_url(&page)
            .map_err(|e| Self::failed(query, format!("media URL pattern: {}", e)))?
            .ok_or_else(|| Self::failed(query, "no image results"))?;
        debug!(query, url = %found, "logo resolved");
        Ok(found)
    }
}

/// Lookup used when logo resolution is switched off: every logo is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogos;

#[async_trait]
impl LogoLookup for NoLogos {
    async fn lookup(&self, _query: &str) -> Result<String> {
        Ok(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_first_media_url_html_escaped() {
        let page = r#"<a class="iusc" m="{&quot;murl&quot;:&quot;https://cdn.example.com/logo.png&quot;,&quot;turl&quot;:&quot;x&quot;}">"#;
        assert_eq!(
            first_media_url(page).unwrap().as_deref(),
            Some("https://cdn.example.com/logo.png")
        );
    }

    #[test]
    fn test_first_media_url_plain_json() {
        let page = r#"{"murl":"https://a.example/1.png"} {"murl":"https://a.example/2.png"}"#;
        assert_eq!(first_media_url(page).unwrap().as_deref(), Some("https://a.example/1.png"));
    }

    #[test]
    fn test_first_media_url_none() {
        assert_eq!(first_media_url("<html>nothing here</html>").unwrap(), None);
    }

    #[tokio::test]
    async fn test_lookup_sends_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/images/async")
                    .query_param("q", "Coursera Company Logo");
                then.status(200)
                    .body(r#"m="{&quot;murl&quot;:&quot;https://img.example/coursera.png&quot;}""#);
            })
            .await;

        let lookup = BingImageLookup::with_base_url(Client::new(), server.base_url());
        let url = lookup.lookup("Coursera Company Logo").await.unwrap();
        mock.assert_async().await;
        assert_eq!(url, "https://img.example/coursera.png");
    }

    #[tokio::test]
    async fn test_empty_page_is_auxiliary_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/images/async");
                then.status(200).body("<html></html>");
            })
            .await;

        let lookup = BingImageLookup::with_base_url(Client::new(), server.base_url());
        let err = lookup.lookup("Nobody Company Logo").await.unwrap_err();
        assert!(matches!(err, AnalysisError::AuxiliaryLookupFailed { .. }));
    }

    #[tokio::test]
    async fn test_no_logos_is_empty() {
        assert_eq!(NoLogos.lookup("anything").await.unwrap(), "");
    }
}
