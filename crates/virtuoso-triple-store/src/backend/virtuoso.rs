use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use digest_auth::{AuthContext, WwwAuthenticateHeader};
use reqwest::{
    Client, Method, Request, RequestBuilder, Response, StatusCode,
    header::{AUTHORIZATION, HeaderValue, WWW_AUTHENTICATE},
};

use super::{IsqlClient, TripleStoreBackend};
use crate::{
    config::TripleStoreManagerConfig,
    error::{Result, TripleStoreError},
    rdf::RdfFormat,
};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Virtuoso triple store backend implementation
///
/// SPARQL goes to the HTTP SPARQL endpoint, graph uploads and downloads to the
/// Graph Store protocol endpoint, and SQL procedures through `isql`.
///
/// Requests carry Basic credentials up front. The `-auth` endpoints of a stock
/// Virtuoso answer those with a Digest challenge; the challenge is kept and
/// every later request is signed with Digest instead.
pub struct VirtuosoBackend {
    client: Client,
    isql: IsqlClient,
    config: TripleStoreManagerConfig,
    username: String,
    password: String,
    digest: Mutex<Option<WwwAuthenticateHeader>>,
}

impl VirtuosoBackend {
    /// Create a new Virtuoso backend
    pub fn new(config: TripleStoreManagerConfig) -> Result<Self> {
        let username = config.username.clone().ok_or_else(|| {
            TripleStoreError::MissingCredentials("username is required for Virtuoso".to_string())
        })?;
        let password = config.password.clone().ok_or_else(|| {
            TripleStoreError::MissingCredentials("password is required for Virtuoso".to_string())
        })?;

        let client = Client::builder()
            // Connection pooling: keep up to 4 idle connections per host
            .pool_max_idle_per_host(4)
            // Close idle connections after 30 seconds
            .pool_idle_timeout(Duration::from_secs(30))
            // TCP keepalive to detect dead connections
            .tcp_keepalive(Duration::from_secs(60))
            // Timeout for establishing new connections
            .connect_timeout(Duration::from_secs(10))
            // Default request timeout (overridden per-request)
            .timeout(Duration::from_millis(config.timeouts.query_ms))
            .build()?;

        let isql = IsqlClient::new(&config, &username, &password);

        Ok(Self {
            client,
            isql,
            config,
            username,
            password,
            digest: Mutex::new(None),
        })
    }

    /// Sends the request built by `builder`, answering one Digest challenge.
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder
            .basic_auth(&self.username, Some(&self.password))
            .build()?;
        // Bodies here are buffered, so the clone only fails for streams
        let retry = request.try_clone();

        let response = self.client.execute(self.sign(request)?).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let (Some(challenge), Some(retry)) = (digest_challenge(&response), retry) else {
            return Ok(response);
        };

        tracing::debug!(url = %retry.url(), "Answering Virtuoso Digest challenge");
        *self.digest.lock().unwrap_or_else(PoisonError::into_inner) = Some(challenge);
        Ok(self.client.execute(self.sign(retry)?).await?)
    }

    /// Replaces the Basic header with a Digest response once a challenge is known.
    fn sign(&self, mut request: Request) -> Result<Request> {
        let mut digest = self.digest.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(challenge) = digest.as_mut() else {
            return Ok(request);
        };

        let url = request.url();
        let uri = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        let context = if request.method() == Method::POST {
            AuthContext::new_post(
                self.username.as_str(),
                self.password.as_str(),
                uri,
                None::<&[u8]>,
            )
        } else {
            AuthContext::new(self.username.as_str(), self.password.as_str(), uri)
        };

        let header = challenge
            .respond(&context)
            .map_err(|e| TripleStoreError::Other(format!("Digest authentication failed: {e}")))?
            .to_header_string();
        let value = HeaderValue::from_str(&header)
            .map_err(|e| TripleStoreError::Other(format!("invalid Authorization header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(request)
    }

    async fn sparql_post(&self, query: &str, timeout: Duration) -> Result<Response> {
        let timeout_ms = timeout.as_millis().to_string();
        let builder = self
            .client
            .post(self.config.sparql_endpoint())
            .header("Accept", SPARQL_RESULTS_JSON)
            .form(&[("query", query), ("timeout", timeout_ms.as_str())])
            .timeout(timeout + Duration::from_secs(5));
        let response = self.send(builder).await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from_response(response).await)
        }
    }
}

/// First `Digest` challenge in the `WWW-Authenticate` headers of `response`.
fn digest_challenge(response: &Response) -> Option<WwwAuthenticateHeader> {
    response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| {
            value
                .get(..6)
                .is_some_and(|scheme| scheme.eq_ignore_ascii_case("digest"))
        })
        .and_then(|value| digest_auth::parse(value).ok())
}

async fn error_from_response(response: Response) -> TripleStoreError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return TripleStoreError::Authentication {
            status: status.as_u16(),
        };
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    TripleStoreError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl TripleStoreBackend for VirtuosoBackend {
    fn name(&self) -> &'static str {
        "virtuoso"
    }

    async fn health_check(&self) -> Result<bool> {
        match self
            .sparql_post("ASK { ?s ?p ?o }", Duration::from_secs(10))
            .await
        {
            Ok(_) => Ok(true),
            Err(TripleStoreError::Backend { status, message }) => {
                tracing::debug!(status, message = %message, "Virtuoso health check rejected");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn supports_sql(&self) -> bool {
        true
    }

    async fn update(&self, query: &str, timeout: Duration) -> Result<()> {
        self.sparql_post(query, timeout).await?;
        Ok(())
    }

    async fn select(&self, query: &str, timeout: Duration) -> Result<String> {
        let response = self.sparql_post(query, timeout).await?;
        Ok(response.text().await?)
    }

    async fn execute_sql(&self, statement: &str, timeout: Duration) -> Result<()> {
        let output = self.isql.run(statement, timeout).await?;
        tracing::trace!(output = %output.trim(), "isql session finished");
        Ok(())
    }

    async fn load_document(
        &self,
        data: Vec<u8>,
        format: RdfFormat,
        graph: &str,
        timeout: Duration,
    ) -> Result<()> {
        let builder = self
            .client
            .post(self.config.graph_store_endpoint())
            .query(&[("graph-uri", graph)])
            .header("Content-Type", format.media_type())
            .body(data)
            .timeout(timeout);
        let response = self.send(builder).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn export_graph(
        &self,
        graph: &str,
        format: RdfFormat,
        timeout: Duration,
    ) -> Result<Vec<u8>> {
        let builder = self
            .client
            .get(self.config.graph_store_endpoint())
            .query(&[("graph-uri", graph)])
            .header("Accept", format.media_type())
            .timeout(timeout);
        let response = self.send(builder).await?;

        if response.status() == StatusCode::NOT_FOUND {
            // Graph Store protocol answers 404 for a graph without triples
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn close(&self) -> Result<()> {
        // Pooled HTTP connections are released when the client is dropped and
        // every isql session ends with its statement.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    use super::*;

    const EMPTY_RESULTS: &str = r#"{"head":{"vars":["s"]},"results":{"bindings":[]}}"#;
    const CHALLENGE: &str =
        r#"Digest realm="SPARQL", domain="/sparql-auth", nonce="9a1b2c3d4e5f", qop="auth""#;

    fn backend_for(server: &MockServer) -> VirtuosoBackend {
        let mut config = TripleStoreManagerConfig::virtuoso("127.0.0.1", 1111, "dba", "dba");
        config.http_port = server.address().port();
        VirtuosoBackend::new(config).unwrap()
    }

    fn signed_with_digest(request: &wiremock::Request) -> bool {
        request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                value.starts_with("Digest ")
                    && value.contains(r#"username="dba""#)
                    && value.contains(r#"nonce="9a1b2c3d4e5f""#)
            })
    }

    fn challenge() -> ResponseTemplate {
        ResponseTemplate::new(401).insert_header("WWW-Authenticate", CHALLENGE)
    }

    /// Accepts Digest responses for `dba` on `route`, challenges everything else.
    async fn mount_digest_endpoint(server: &MockServer, verb: &str, route: &str, body: &str) {
        Mock::given(method(verb))
            .and(path(route))
            .and(signed_with_digest)
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .with_priority(1)
            .mount(server)
            .await;
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(challenge())
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn digest_challenge_is_answered() {
        let server = MockServer::start().await;
        mount_digest_endpoint(&server, "POST", "/sparql-auth", EMPTY_RESULTS).await;
        let backend = backend_for(&server);

        assert!(backend.health_check().await.unwrap());
        let body = backend
            .select("SELECT ?s WHERE { ?s ?p ?o }", Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(body, EMPTY_RESULTS);
    }

    #[tokio::test]
    async fn known_challenge_signs_later_requests_directly() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sparql-auth"))
            .and(signed_with_digest)
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
            .with_priority(1)
            .expect(3)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/sparql-auth"))
            .respond_with(challenge())
            .expect(1)
            .mount(&server)
            .await;
        let backend = backend_for(&server);

        for _ in 0..3 {
            backend
                .update("CLEAR GRAPH <http://example.org/g>", Duration::from_secs(5))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn graph_store_requests_answer_the_challenge() {
        let server = MockServer::start().await;
        mount_digest_endpoint(&server, "POST", "/sparql-graph-crud-auth", "").await;
        mount_digest_endpoint(
            &server,
            "GET",
            "/sparql-graph-crud-auth",
            "<http://example.org/a> <http://example.org/p> \"x\" .\n",
        )
        .await;
        let backend = backend_for(&server);
        let data = b"<http://example.org/a> <http://example.org/p> \"x\" .\n".to_vec();

        backend
            .load_document(
                data.clone(),
                RdfFormat::NTriples,
                "http://example.org/g",
                Duration::from_secs(5),
            )
            .await
            .unwrap();
        let exported = backend
            .export_graph(
                "http://example.org/g",
                RdfFormat::NTriples,
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert_eq!(exported, data);
    }

    #[tokio::test]
    async fn basic_only_server_accepts_the_first_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sparql-auth"))
            // base64("dba:dba")
            .and(header("authorization", "Basic ZGJhOmRiYQ=="))
            .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
            .expect(1)
            .mount(&server)
            .await;
        let backend = backend_for(&server);

        assert!(backend.health_check().await.unwrap());
    }

    #[tokio::test]
    async fn rejected_digest_is_an_authentication_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sparql-auth"))
            .respond_with(challenge())
            .expect(2)
            .mount(&server)
            .await;
        let backend = backend_for(&server);

        let result = backend
            .select("SELECT ?s WHERE { ?s ?p ?o }", Duration::from_secs(5))
            .await;

        assert!(matches!(
            result,
            Err(TripleStoreError::Authentication { status: 401 })
        ));
    }

    #[tokio::test]
    async fn missing_graph_exports_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sparql-graph-crud-auth"))
            .and(query_param("graph-uri", "http://example.org/empty"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        let backend = backend_for(&server);

        let exported = backend
            .export_graph(
                "http://example.org/empty",
                RdfFormat::NTriples,
                Duration::from_secs(5),
            )
            .await
            .unwrap();

        assert!(exported.is_empty());
    }

    #[test]
    fn credentials_are_required() {
        let mut config = TripleStoreManagerConfig::virtuoso("localhost", 1111, "dba", "dba");
        config.password = None;

        assert!(matches!(
            VirtuosoBackend::new(config),
            Err(TripleStoreError::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_host_fails_health_check() {
        let mut config = TripleStoreManagerConfig::virtuoso("127.0.0.1", 1111, "dba", "dba");
        // Reserved port with nothing listening
        config.http_port = 9;
        let Ok(backend) = VirtuosoBackend::new(config) else {
            panic!("backend construction should not touch the network");
        };

        let result = backend.health_check().await;

        assert!(matches!(result, Err(TripleStoreError::Http(_))));
    }
}
