use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};
use ureq::Agent;
use ureq::http::{Response, StatusCode, header::WWW_AUTHENTICATE};
use url::Url;

use crate::DEFAULT_HTTP_TIMEOUT;
use crate::digest::{DigestChallenge, new_cnonce};
use crate::errors::UpnpError;

pub const TEXT_XML: &str = r#"text/xml; charset="utf-8""#;

/// Username and password used for digest-authenticated action calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection context shared by every node of a discovered model.
///
/// Holds the device base URL, the optional credentials and one HTTP agent
/// whose connection pool is shared by all requests.
#[derive(Clone)]
pub struct Connection {
    base_url: String,
    credentials: Option<Credentials>,
    timeout: Duration,
    agent: Agent,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Connection {
    /// Connection to `http://address:port` with the default timeout.
    ///
    /// An empty `username` means action calls are sent unauthenticated.
    pub fn new(address: &str, port: u16, username: &str, password: &str) -> Self {
        Self::with_base_url(&format!("http://{}:{}", address, port), username, password)
    }

    pub fn with_base_url(base_url: &str, username: &str, password: &str) -> Self {
        let credentials = if username.is_empty() {
            None
        } else {
            Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            })
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            timeout: DEFAULT_HTTP_TIMEOUT,
            agent: build_agent(DEFAULT_HTTP_TIMEOUT),
        }
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.agent = build_agent(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Absolute URL for a path advertised by the device.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Fetch a description document with an unauthenticated GET.
    pub fn fetch(&self, path: &str) -> Result<String, UpnpError> {
        let url = self.url_for(path);
        debug!(url = %url, "Fetching description document");

        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| fetch_failed(&url, e))?;

        ensure_ok(&url, response.status())?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| fetch_failed(&url, e))
    }

    /// POST a SOAP envelope to a control URL and return the response body.
    ///
    /// With credentials, a 401 digest challenge is answered once.
    pub fn post_soap(
        &self,
        control_path: &str,
        soap_action: &str,
        body: &str,
    ) -> Result<String, UpnpError> {
        let url = self.url_for(control_path);
        debug!(url = %url, soap_action = %soap_action, "Sending SOAP request");

        let mut response = self.send_soap(&url, soap_action, body, None)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(credentials) = &self.credentials {
                let challenge = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(DigestChallenge::parse);

                match challenge {
                    Some(challenge) => {
                        trace!(realm = %challenge.realm, "Answering digest challenge");
                        let authorization = challenge.authorization(
                            "POST",
                            &request_uri(&url),
                            &credentials.username,
                            &credentials.password,
                            &new_cnonce(),
                        );
                        response = self.send_soap(&url, soap_action, body, Some(&authorization))?;
                    }
                    None => {
                        warn!(url = %url, "401 without a digest challenge");
                    }
                }
            }
        }

        ensure_ok(&url, response.status())?;

        response
            .body_mut()
            .read_to_string()
            .map_err(|e| fetch_failed(&url, e))
    }

    fn send_soap(
        &self,
        url: &str,
        soap_action: &str,
        body: &str,
        authorization: Option<&str>,
    ) -> Result<Response<ureq::Body>, UpnpError> {
        let soap_action_header = format!(r#""{}""#, soap_action);

        let mut request = self
            .agent
            .post(url)
            .header("Content-Type", TEXT_XML)
            .header("SoapAction", &soap_action_header);

        if let Some(authorization) = authorization {
            request = request.header("Authorization", authorization);
        }

        request.send(body).map_err(|e| fetch_failed(url, e))
    }
}

fn build_agent(timeout: Duration) -> Agent {
    // Status codes are checked by the caller.
    let config = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();

    config.into()
}

fn fetch_failed(url: &str, err: ureq::Error) -> UpnpError {
    UpnpError::FetchFailed {
        url: url.to_string(),
        source: Box::new(err),
    }
}

fn ensure_ok(url: &str, status: StatusCode) -> Result<(), UpnpError> {
    if status == StatusCode::OK {
        Ok(())
    } else {
        Err(UpnpError::ResponseError {
            uri: url.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Join a path advertised by the device to the base URL.
///
/// Absolute URLs (http:// or https://) are returned as-is.
pub fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Request-URI (path and query) used in the digest computation.
fn request_uri(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        let base = "http://fritz.box:49000";
        assert_eq!(join_url(base, "/igddesc.xml"), "http://fritz.box:49000/igddesc.xml");
        assert_eq!(join_url(base, "tr64desc.xml"), "http://fritz.box:49000/tr64desc.xml");
        assert_eq!(
            join_url("http://fritz.box:49000/", "/any.xml"),
            "http://fritz.box:49000/any.xml"
        );
        assert_eq!(
            join_url(base, "http://192.168.178.1:49000/x.xml"),
            "http://192.168.178.1:49000/x.xml"
        );
    }

    #[test]
    fn test_request_uri() {
        assert_eq!(
            request_uri("http://fritz.box:49000/upnp/control/deviceinfo"),
            "/upnp/control/deviceinfo"
        );
        assert_eq!(request_uri("http://fritz.box:49000/a?b=c"), "/a?b=c");
    }

    #[test]
    fn test_empty_username_means_no_credentials() {
        let conn = Connection::new("fritz.box", 49000, "", "secret");
        assert!(conn.credentials().is_none());
        assert_eq!(conn.base_url(), "http://fritz.box:49000");

        let conn = Connection::new("fritz.box", 49000, "admin", "secret");
        assert_eq!(conn.credentials().unwrap().username, "admin");
        assert!(!format!("{:?}", conn).contains("secret"));
    }

    #[test]
    fn test_with_timeout() {
        let conn = Connection::new("fritz.box", 49000, "", "").with_timeout(Duration::from_secs(3));
        assert_eq!(conn.timeout(), Duration::from_secs(3));
        assert_eq!(Connection::new("fritz.box", 49000, "", "").timeout(), DEFAULT_HTTP_TIMEOUT);
    }
}
