//! Betfair Authentication - Non-interactive Certificate Login
//!
//! Credentials come from environment variables (BETFAIR_USERNAME,
//! BETFAIR_PASSWORD, BETFAIR_APP_KEY, BETFAIR_CERTIFICATE, BETFAIR_KEY).
//! The certificate and key are written to a private temporary directory
//! for the lifetime of the session and removed when it is dropped.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::{Client, Identity};
use tempfile::TempDir;
use tracing::{debug, info};

use super::types::LoginResponse;
use crate::ports::ExchangeError;

const CERT_FILE: &str = "client-2048.crt";
const KEY_FILE: &str = "client-2048.key";

/// Account credentials and client certificate material.
pub struct Credentials {
    username: String,
    password: String,
    app_key: String,
    /// PEM-encoded client certificate.
    certificate: String,
    /// PEM-encoded private key.
    key: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        app_key: impl Into<String>,
        certificate: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            app_key: app_key.into(),
            certificate: certificate.into(),
            key: key.into(),
        }
    }

    /// Load credentials from environment variables.
    ///
    /// These MUST be set in the environment or `.env` (never committed to git).
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| std::env::var(name).with_context(|| format!("{name} not set"));

        Ok(Self::new(
            var("BETFAIR_USERNAME")?,
            var("BETFAIR_PASSWORD")?,
            var("BETFAIR_APP_KEY")?,
            var("BETFAIR_CERTIFICATE")?,
            var("BETFAIR_KEY")?,
        ))
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("app_key", &"[REDACTED]")
            .field("certificate", &"[REDACTED]")
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Certificate and key written to a private temporary directory.
///
/// The directory and both files are deleted on drop, on every exit path.
pub struct CertificateFiles {
    dir: TempDir,
    cert_path: PathBuf,
    key_path: PathBuf,
}

impl CertificateFiles {
    /// Write the PEM material to a fresh temporary directory.
    pub fn materialize(certificate: &str, key: &str) -> Result<Self, ExchangeError> {
        if certificate.trim().is_empty() || key.trim().is_empty() {
            return Err(ExchangeError::Auth(
                "client certificate and key must not be empty".to_string(),
            ));
        }

        let dir = tempfile::Builder::new()
            .prefix("betfair-cert-")
            .tempdir()
            .map_err(|e| ExchangeError::Auth(format!("failed to create certificate directory: {e}")))?;

        let cert_path = dir.path().join(CERT_FILE);
        let key_path = dir.path().join(KEY_FILE);
        for (path, contents) in [(&cert_path, certificate), (&key_path, key)] {
            fs::write(path, contents).map_err(|e| {
                ExchangeError::Auth(format!("failed to write {}: {e}", path.display()))
            })?;
        }

        debug!(dir = %dir.path().display(), "Certificate material written");
        Ok(Self {
            dir,
            cert_path,
            key_path,
        })
    }

    #[cfg(test)]
    fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Build a TLS client identity from the written files.
    pub fn identity(&self) -> Result<Identity, ExchangeError> {
        let read = |path: &Path| {
            fs::read(path)
                .map_err(|e| ExchangeError::Auth(format!("failed to read {}: {e}", path.display())))
        };

        let mut pem = read(&self.cert_path)?;
        pem.push(b'\n');
        pem.extend(read(&self.key_path)?);

        Identity::from_pem(&pem)
            .map_err(|e| ExchangeError::Auth(format!("unusable client certificate: {e}")))
    }
}

/// Log in with the client certificate and return the session token.
///
/// `http` must already carry the identity from [`CertificateFiles::identity`].
pub async fn cert_login(
    http: &Client,
    identity_url: &str,
    credentials: &Credentials,
) -> Result<String, ExchangeError> {
    let url = format!("{}/api/certlogin", identity_url.trim_end_matches('/'));

    let response = http
        .post(&url)
        .header("X-Application", &credentials.app_key)
        .form(&[
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
        ])
        .send()
        .await
        .map_err(|e| ExchangeError::Auth(format!("certificate login request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExchangeError::Auth(format!(
            "certificate login returned {status}"
        )));
    }

    let login: LoginResponse = response
        .json()
        .await
        .map_err(|e| ExchangeError::Auth(format!("unreadable login response: {e}")))?;

    let token = session_token(login)?;
    info!(username = %credentials.username, "Certificate login succeeded");
    Ok(token)
}

/// Extract the session token from a login response.
pub(crate) fn session_token(login: LoginResponse) -> Result<String, ExchangeError> {
    if login.login_status != "SUCCESS" {
        return Err(ExchangeError::Auth(login.login_status));
    }
    login
        .session_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ExchangeError::Auth("login succeeded without a session token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("punter", "hunter2", "app-key-123", "CERT", "KEY")
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", creds());
        assert!(debug.contains("punter"));
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("app-key-123"));
    }

    #[test]
    fn test_materialize_writes_and_cleans_up() {
        let files = CertificateFiles::materialize("-----CERT-----", "-----KEY-----").unwrap();
        let dir = files.dir().to_path_buf();

        assert_eq!(
            fs::read_to_string(dir.join(CERT_FILE)).unwrap(),
            "-----CERT-----"
        );
        assert_eq!(fs::read_to_string(dir.join(KEY_FILE)).unwrap(), "-----KEY-----");

        drop(files);
        assert!(!dir.exists());
    }

    #[test]
    fn test_materialize_rejects_empty_material() {
        let err = CertificateFiles::materialize("  ", "KEY").err().unwrap();
        assert!(matches!(err, ExchangeError::Auth(_)));
    }

    #[test]
    fn test_identity_rejects_garbage_pem() {
        let files = CertificateFiles::materialize("not a certificate", "not a key").unwrap();
        assert!(matches!(files.identity(), Err(ExchangeError::Auth(_))));
    }

    #[test]
    fn test_session_token_success() {
        let login = LoginResponse {
            session_token: Some("token".to_string()),
            login_status: "SUCCESS".to_string(),
        };
        assert_eq!(session_token(login).unwrap(), "token");
    }

    #[test]
    fn test_session_token_failure_status() {
        let login = LoginResponse {
            session_token: None,
            login_status: "CERT_AUTH_REQUIRED".to_string(),
        };
        match session_token(login) {
            Err(ExchangeError::Auth(reason)) => assert_eq!(reason, "CERT_AUTH_REQUIRED"),
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[test]
    fn test_session_token_missing_token() {
        let login = LoginResponse {
            session_token: None,
            login_status: "SUCCESS".to_string(),
        };
        assert!(session_token(login).is_err());
    }
}
