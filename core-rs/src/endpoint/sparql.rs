//! SparqlHttpEndpoint: SPARQL 1.1 protocol over HTTP (reqwest)

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use crate::config::{Credentials, ServiceConfig};
use crate::endpoint::results::QueryResponse;
use crate::endpoint::traits::{GraphQueryEndpoint, Transport};
use crate::errors::{GrontopiError, Result};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Remote SPARQL endpoint
#[derive(Debug, Clone)]
pub struct SparqlHttpEndpoint {
    url: String,
    user_agent: String,
    credentials: Option<Credentials>,
    client: Client,
}

impl SparqlHttpEndpoint {
    /// Create an endpoint client
    ///
    /// # Example
    ///
    /// ```
    /// use grontopi_core::endpoint::SparqlHttpEndpoint;
    ///
    /// let endpoint = SparqlHttpEndpoint::new("https://query.wikidata.org/sparql", "grontopi-docs");
    /// assert_eq!(endpoint.url(), "https://query.wikidata.org/sparql");
    /// ```
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user_agent: user_agent.into(),
            credentials: None,
            client: Client::new(),
        }
    }

    /// Add HTTP basic-auth credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        if !config.sparql_endpoint.starts_with("http://")
            && !config.sparql_endpoint.starts_with("https://")
        {
            return Err(GrontopiError::Config(format!(
                "sparql_endpoint must be an http(s) URL: {}",
                config.sparql_endpoint
            )));
        }

        let mut endpoint = Self::new(config.sparql_endpoint.clone(), config.user_agent.clone());
        if let Some(credentials) = &config.sparql_credentials {
            endpoint = endpoint.with_credentials(credentials.clone());
        }
        Ok(endpoint)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraphQueryEndpoint for SparqlHttpEndpoint {
    async fn query(&self, query: &str, transport: Transport) -> Result<QueryResponse> {
        let request = match transport {
            Transport::Get => self.client.get(&self.url).query(&[("query", query)]),
            Transport::Post => self.client.post(&self.url).form(&[("query", query)]),
        };
        let mut request = request
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .header(USER_AGENT, &self.user_agent);
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        debug!(endpoint = %self.url, %transport, bytes = query.len(), "sending query");
        let response = request.send().await?.error_for_status()?;
        let body = response.json::<QueryResponse>().await?;
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
