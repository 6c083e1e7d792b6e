use std::collections::BTreeMap;

pub const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Primary,
    Alternate,
}

/// One remote execution service instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDescriptor {
    pub url: String,
    pub auth_headers: BTreeMap<String, String>,
    pub role: EndpointRole,
}

impl EndpointDescriptor {
    pub fn primary(url: impl Into<String>, auth_headers: BTreeMap<String, String>) -> Self {
        Self {
            url: trim_url(url.into()),
            auth_headers,
            role: EndpointRole::Primary,
        }
    }

    /// Alternates carry no credentials.
    pub fn alternate(url: impl Into<String>) -> Self {
        Self {
            url: trim_url(url.into()),
            auth_headers: BTreeMap::new(),
            role: EndpointRole::Alternate,
        }
    }

    pub fn is_primary(&self) -> bool {
        self.role == EndpointRole::Primary
    }

    /// Headers sent on every call to this endpoint, submit and poll alike.
    pub fn request_headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert(CONTENT_TYPE_JSON.0.to_string(), CONTENT_TYPE_JSON.1.to_string());
        if self.is_primary() {
            for (name, value) in &self.auth_headers {
                headers.insert(name.clone(), value.clone());
            }
        }
        headers
    }

    pub fn submit_url(&self) -> String {
        format!("{}/submissions?wait=true", self.url)
    }

    pub fn poll_url(&self, token: &str) -> String {
        format!("{}/submissions/{}", self.url, token)
    }

    pub fn languages_url(&self) -> String {
        format!("{}/languages", self.url)
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        headers.insert("X-RapidAPI-Key".to_string(), "demo".to_string());
        headers
    }

    #[test]
    fn test_primary_sends_auth_headers() {
        let endpoint = EndpointDescriptor::primary("https://judge.example.com/", auth());
        let headers = endpoint.request_headers();
        assert_eq!(headers.get("X-RapidAPI-Key").map(String::as_str), Some("demo"));
        assert_eq!(
            headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(
            endpoint.submit_url(),
            "https://judge.example.com/submissions?wait=true"
        );
    }

    #[test]
    fn test_alternate_sends_content_type_only() {
        let mut endpoint = EndpointDescriptor::alternate("https://alt.example.com");
        endpoint.auth_headers = auth();
        let headers = endpoint.request_headers();
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("Content-Type"));
        assert_eq!(endpoint.poll_url("abc"), "https://alt.example.com/submissions/abc");
    }
}
