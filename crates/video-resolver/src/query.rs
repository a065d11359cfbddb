//! Request query classification

/// URL prefixes accepted as direct video links
pub const ACCEPTED_URL_PREFIXES: [&str; 3] = [
    "https://youtube.com/watch?v=",
    "https://www.youtube.com/watch?v=",
    "https://youtu.be/",
];

const ID_PREFIX: &str = "id=";
const WATCH_URL: &str = "https://youtube.com/watch";

/// How a raw `q` parameter should be resolved to a video page URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoQuery {
    /// A video URL, used as-is
    Url(String),
    /// `id=<video id>`, holding the id with the prefix stripped
    Id(String),
    /// Free text that needs a search
    Search(String),
}

impl VideoQuery {
    pub fn parse(q: &str) -> Self {
        if ACCEPTED_URL_PREFIXES.iter().any(|p| q.starts_with(p)) {
            return VideoQuery::Url(q.to_string());
        }
        if let Some(id) = q.strip_prefix(ID_PREFIX) {
            return VideoQuery::Id(id.to_string());
        }
        VideoQuery::Search(q.to_string())
    }

    /// The page URL when no search is needed
    pub fn direct_url(&self) -> Option<String> {
        match self {
            VideoQuery::Url(url) => Some(url.clone()),
            VideoQuery::Id(id) => Some(watch_url(id)),
            VideoQuery::Search(_) => None,
        }
    }
}

/// Build the watch page URL for a video id
pub fn watch_url(id: &str) -> String {
    match url::Url::parse_with_params(WATCH_URL, &[("v", id)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}?v={}", WATCH_URL, id),
    }
}
