//! Remote album listing.
//!
//! [`PhotoSource`] is the seam the pipeline lists through; [`FlickrSource`]
//! walks every page of `flickr.photosets.getPhotos`.

use std::time::Duration;

use serde::Deserialize;

use tinker_core::{config::FrameConfig, RemoteItem, SecretProvider};

use crate::error::MirrorError;

/// Page size requested from the service (its maximum).
pub const PER_PAGE: u32 = 500;

/// Lists every item of a remote collection.
pub trait PhotoSource {
    fn list_items(&self, collection_id: &str) -> Result<Vec<RemoteItem>, MirrorError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// The service is inconsistent about quoting numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(u64),
}

impl StrOrNum {
    fn into_string(self) -> String {
        match self {
            StrOrNum::Str(s) => s,
            StrOrNum::Num(n) => n.to_string(),
        }
    }

    fn as_u32(&self) -> Option<u32> {
        match self {
            StrOrNum::Str(s) => s.parse().ok(),
            StrOrNum::Num(n) => u32::try_from(*n).ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    stat: String,
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    photoset: Option<Photoset>,
}

#[derive(Debug, Deserialize)]
struct Photoset {
    #[serde(default)]
    photo: Vec<WirePhoto>,
    page: StrOrNum,
    pages: StrOrNum,
}

#[derive(Debug, Deserialize)]
struct WirePhoto {
    id: String,
    secret: String,
    server: String,
    farm: StrOrNum,
    #[serde(default)]
    title: Option<String>,
}

/// One decoded page of a photoset listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoPage {
    pub items: Vec<RemoteItem>,
    pub page: u32,
    pub pages: u32,
}

/// Decode a `photosets.getPhotos` body, mapping service error codes.
pub fn parse_page(body: &str) -> Result<PhotoPage, MirrorError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| MirrorError::Network(format!("malformed listing: {e}")))?;

    if envelope.stat != "ok" {
        let message = envelope.message.unwrap_or_else(|| "unknown error".to_string());
        return Err(match envelope.code {
            Some(1) | Some(2) => MirrorError::NotFound(message),
            Some(96..=100) => MirrorError::Auth(message),
            Some(code) => MirrorError::Network(format!("service error {code}: {message}")),
            None => MirrorError::Network(message),
        });
    }

    let photoset = envelope
        .photoset
        .ok_or_else(|| MirrorError::Network("listing has no photoset".to_string()))?;
    let page = photoset.page.as_u32().unwrap_or(1);
    let pages = photoset.pages.as_u32().unwrap_or(1);
    let items = photoset
        .photo
        .into_iter()
        .map(|p| RemoteItem {
            id: p.id,
            secret: p.secret,
            farm: p.farm.into_string(),
            server: p.server,
            title: p.title.filter(|t| !t.is_empty()),
        })
        .collect();

    Ok(PhotoPage { items, page, pages })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Blocking REST client for one API key.
pub struct FlickrSource {
    api_base: String,
    api_key: String,
    user_id: Option<String>,
    agent: ureq::Agent,
}

impl FlickrSource {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        user_id: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            user_id,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// Resolve `frame.api_key_secret` through `secrets` and build the client.
    pub fn from_config(
        config: &FrameConfig,
        secrets: &dyn SecretProvider,
    ) -> Result<Self, MirrorError> {
        let api_key = secrets.get_secret(&config.api_key_secret)?;
        Ok(Self::new(
            config.api_base.clone(),
            api_key,
            config.user_id.clone(),
            Duration::from_secs(config.timeout_secs),
        ))
    }

    fn fetch_page(&self, photoset_id: &str, page: u32) -> Result<PhotoPage, MirrorError> {
        let page_str = page.to_string();
        let per_page = PER_PAGE.to_string();
        let mut request = self
            .agent
            .get(&self.api_base)
            .query("method", "flickr.photosets.getPhotos")
            .query("api_key", &self.api_key)
            .query("photoset_id", photoset_id)
            .query("format", "json")
            .query("nojsoncallback", "1")
            .query("per_page", &per_page)
            .query("page", &page_str);
        if let Some(user_id) = &self.user_id {
            request = request.query("user_id", user_id);
        }

        match request.call() {
            Ok(response) => {
                let body = response
                    .into_string()
                    .map_err(|e| MirrorError::Network(format!("failed to read listing: {e}")))?;
                parse_page(&body)
            }
            Err(ureq::Error::Status(code @ (401 | 403), _)) => {
                Err(MirrorError::Auth(format!("HTTP {code}")))
            }
            Err(ureq::Error::Status(404, _)) => {
                Err(MirrorError::NotFound(photoset_id.to_string()))
            }
            Err(ureq::Error::Status(code, _)) => Err(MirrorError::Network(format!("HTTP {code}"))),
            Err(ureq::Error::Transport(t)) => Err(MirrorError::Network(t.to_string())),
        }
    }
}

impl PhotoSource for FlickrSource {
    fn list_items(&self, collection_id: &str) -> Result<Vec<RemoteItem>, MirrorError> {
        let mut items = Vec::new();
        // Counted locally; the echoed `page` field is not trusted to advance.
        let mut page = 1;
        loop {
            let listing = self.fetch_page(collection_id, page)?;
            tracing::debug!(page, pages = listing.pages, count = listing.items.len(), "listed page");
            if listing.items.is_empty() {
                break;
            }
            items.extend(listing.items);
            if page >= listing.pages {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinker_core::testing::serve;

    const PAGE_ONE: &str = r#"{"photoset":{"id":"721","photo":[
        {"id":"1","secret":"a","server":"100","farm":8,"title":"Beach"},
        {"id":"2","secret":"b","server":"200","farm":"3","title":""}
    ],"page":1,"pages":"2","total":"3"},"stat":"ok"}"#;

    const PAGE_TWO: &str = r#"{"photoset":{"id":"721","photo":[
        {"id":"3","secret":"c","server":"300","farm":5}
    ],"page":"2","pages":2,"total":"3"},"stat":"ok"}"#;

    #[test]
    fn parse_page_accepts_numeric_and_string_fields() {
        let page = parse_page(PAGE_ONE).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, 2);
        assert_eq!(page.items[0].farm, "8");
        assert_eq!(page.items[0].title.as_deref(), Some("Beach"));
        assert_eq!(page.items[1].farm, "3");
        assert_eq!(page.items[1].title, None);
    }

    #[test]
    fn parse_page_maps_service_error_codes() {
        let not_found = r#"{"stat":"fail","code":1,"message":"Photoset not found"}"#;
        assert!(matches!(parse_page(not_found), Err(MirrorError::NotFound(_))));

        let bad_key = r#"{"stat":"fail","code":100,"message":"Invalid API Key"}"#;
        assert!(matches!(parse_page(bad_key), Err(MirrorError::Auth(_))));

        let other = r#"{"stat":"fail","code":105,"message":"Service currently unavailable"}"#;
        assert!(matches!(parse_page(other), Err(MirrorError::Network(_))));
    }

    #[test]
    fn list_items_walks_all_pages() {
        let (url, server) = serve(vec![
            ("200 OK", PAGE_ONE.to_string()),
            ("200 OK", PAGE_TWO.to_string()),
        ]);
        let source = FlickrSource::new(url, "key", None, Duration::from_secs(5));
        let items = source.list_items("721").unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].line.contains("method=flickr.photosets.getPhotos"));
        assert!(requests[0].line.contains("photoset_id=721"));
        assert!(requests[1].line.contains("page=2"));
    }

    #[test]
    fn list_items_advances_even_if_page_field_does_not() {
        let stuck = r#"{"photoset":{"photo":[
            {"id":"1","secret":"a","server":"100","farm":8}
        ],"page":"x","pages":2},"stat":"ok"}"#;
        let (url, server) = serve(vec![
            ("200 OK", stuck.to_string()),
            ("200 OK", stuck.to_string()),
        ]);
        let source = FlickrSource::new(url, "key", None, Duration::from_secs(5));
        assert_eq!(source.list_items("721").unwrap().len(), 2);

        let requests = server.join().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].line.contains("page=1"));
        assert!(requests[1].line.contains("page=2"));
    }

    #[test]
    fn list_items_stops_at_empty_page() {
        let empty = r#"{"photoset":{"photo":[],"page":1,"pages":40},"stat":"ok"}"#;
        let (url, server) = serve(vec![("200 OK", empty.to_string())]);
        let source = FlickrSource::new(url, "key", None, Duration::from_secs(5));
        assert!(source.list_items("721").unwrap().is_empty());
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn list_items_surfaces_http_auth_failure() {
        let (url, server) = serve(vec![("403 Forbidden", "{}".to_string())]);
        let source = FlickrSource::new(url, "key", None, Duration::from_secs(5));
        assert!(matches!(source.list_items("721"), Err(MirrorError::Auth(_))));
        server.join().unwrap();
    }
}
