use crate::core::error::{Error, RecordKind, Result};
use crate::core::store::VoteStore;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// API path of a local IPFS desktop node.
pub const DEFAULT_IPFS_API: &str = "http://127.0.0.1:5001/api/v0/";

/// Reads JSON documents from an IPFS node through its HTTP API.
pub struct IpfsVoteStore {
    client: reqwest::Client,
    api_url: String,
}

impl IpfsVoteStore {
    pub fn new(api_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("chaindata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| Error::Transport {
                key: api_url.to_string(),
                source,
            })?;
        let api_url = if api_url.ends_with('/') {
            api_url.to_string()
        } else {
            format!("{api_url}/")
        };
        Ok(Self { client, api_url })
    }
}

#[async_trait]
impl VoteStore for IpfsVoteStore {
    async fn get(&self, cid: &str, timeout: Duration) -> Result<Value> {
        let url = format!("{}cat", self.api_url);
        debug!("Requesting {} from {} (timeout {:?})", cid, url, timeout);

        let transport = |source| Error::Transport {
            key: cid.to_string(),
            source,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("arg", cid)])
            .timeout(timeout)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "IPFS node refused cat");
            return Err(Error::not_found(RecordKind::Record, cid));
        }

        let text = response.text().await.map_err(transport)?;
        serde_json::from_str(&text).map_err(|source| Error::Decode {
            key: cid.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CID: &str = "QmVotesCid";

    async fn create_mock_server(response: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .and(query_param("arg", CID))
            .respond_with(response)
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_cat() {
        let body = r#"{"votes": [{"address": "dgb1qvote", "label": "Yes"}]}"#;
        let mock_server = create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
        let store = IpfsVoteStore::new(&format!("{}/api/v0", mock_server.uri())).unwrap();

        let document = store.get(CID, Duration::from_secs(5)).await.unwrap();
        assert_eq!(document["votes"][0]["label"], "Yes");
    }

    #[tokio::test]
    async fn test_slow_node_times_out() {
        let response = ResponseTemplate::new(200)
            .set_body_string("{}")
            .set_delay(Duration::from_millis(500));
        let mock_server = create_mock_server(response).await;
        let store = IpfsVoteStore::new(&format!("{}/api/v0/", mock_server.uri())).unwrap();

        let err = store.get(CID, Duration::from_millis(50)).await.unwrap_err();
        match err {
            Error::Transport { source, .. } => assert!(source.is_timeout()),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_cid() {
        let mock_server = create_mock_server(ResponseTemplate::new(500)).await;
        let store = IpfsVoteStore::new(&format!("{}/api/v0/", mock_server.uri())).unwrap();

        let err = store.get(CID, Duration::from_secs(5)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
