// HTTP client for the remote intent/expansion documents.
//
// Documents are plain YAML files living under a common base URL
// (the home-assistant intents repository by default). This client only
// moves bytes; parsing happens in satvox-core.

use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for the intent source.
pub struct IntentsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl IntentsClient {
    /// Create a client rooted at `base_url`.
    ///
    /// A trailing slash is appended when missing so that document names
    /// resolve relative to the directory rather than replacing its last
    /// path segment.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        Ok(Self { http, base_url })
    }

    /// The directory URL documents are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch a single document by file name and return its body.
    ///
    /// Any non-2xx status is an error; there are no retries here.
    pub async fn fetch_document(&self, name: &str) -> Result<String, Error> {
        let url = self.base_url.join(name)?;
        debug!(url = %url, "fetching intent document");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                document: name.to_owned(),
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        debug!(document = name, bytes = body.len(), "intent document fetched");
        Ok(body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let client =
            IntentsClient::from_reqwest("https://example.com/sentences/en", reqwest::Client::new())
                .unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/sentences/en/");
        assert_eq!(
            client.base_url().join("_common.yaml").unwrap().as_str(),
            "https://example.com/sentences/en/_common.yaml"
        );
    }

    #[test]
    fn invalid_base_url_rejected() {
        let result = IntentsClient::from_reqwest("not a url", reqwest::Client::new());
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }
}
