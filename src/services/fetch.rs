use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Downloads an exported image.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Plain HTTP GET with a bounded timeout.
pub struct HttpAssetFetcher {
    http: Client,
}

impl HttpAssetFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.http.get(url).send().await.map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Asset download timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Asset download failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Asset server returned {0}")]
    Status(StatusCode),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout(err)
        } else {
            FetchError::Http(err)
        }
    }
}
