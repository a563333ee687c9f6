//! Betfair HTTP Client - Session-backed JSON-RPC over REST
//!
//! Wraps reqwest with the client certificate identity and the session
//! headers every Betfair betting and account call needs. One attempt
//! per call; failures surface as typed `ExchangeError`s.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::auth::{CertificateFiles, Credentials, cert_login};
use crate::config::ApiConfig;
use crate::ports::ExchangeError;

/// Authenticated client for the Betfair Exchange API.
pub struct BetfairClient {
  /// Underlying HTTP client, carrying the certificate identity.
  http: Client,
  /// Endpoint configuration.
  config: ApiConfig,
  /// Application key sent as `X-Application`.
  app_key: String,
  /// Session token sent as `X-Authentication`.
  session_token: String,
  /// Keeps the temporary certificate files alive for the session.
  _certificates: CertificateFiles,
}

impl BetfairClient {
  /// Log in with the client certificate and open a session.
  ///
  /// # Errors
  /// `ExchangeError::Auth` on unusable certificate material or a
  /// rejected login.
  pub async fn authenticate(
    config: &ApiConfig,
    credentials: &Credentials,
  ) -> Result<Self, ExchangeError> {
    let certificates =
      CertificateFiles::materialize(credentials.certificate(), credentials.key())?;

    let mut builder = Client::builder()
      .identity(certificates.identity()?)
      .pool_max_idle_per_host(5);
    if let Some(secs) = config.timeout_seconds {
      builder = builder.timeout(Duration::from_secs(secs));
    }
    let http = builder
      .build()
      .map_err(|e| ExchangeError::Auth(format!("failed to build TLS client: {e}")))?;

    let session_token = cert_login(&http, &config.identity_url, credentials).await?;
    info!(identity_url = %config.identity_url, "Betfair session established");

    Ok(Self {
      http,
      config: config.clone(),
      app_key: credentials.app_key().to_string(),
      session_token,
      _certificates: certificates,
    })
  }

  /// Call a betting API operation (e.g. `listMarketCatalogue`).
  pub async fn betting<T: DeserializeOwned>(
    &self,
    operation: &str,
    body: &serde_json::Value,
  ) -> Result<T, ExchangeError> {
    self.post(&self.config.betting_url, operation, body).await
  }

  /// Call an account API operation (e.g. `getAccountFunds`).
  pub async fn account<T: DeserializeOwned>(
    &self,
    operation: &str,
    body: &serde_json::Value,
  ) -> Result<T, ExchangeError> {
    self.post(&self.config.account_url, operation, body).await
  }

  async fn post<T: DeserializeOwned>(
    &self,
    base_url: &str,
    operation: &str,
    body: &serde_json::Value,
  ) -> Result<T, ExchangeError> {
    let url = format!("{}/{operation}/", base_url.trim_end_matches('/'));
    debug!(operation, "Betfair API request");

    let response = self
      .http
      .post(&url)
      .header("X-Application", &self.app_key)
      .header("X-Authentication", &self.session_token)
      .header("Accept", "application/json")
      .json(body)
      .send()
      .await
      .map_err(|source| ExchangeError::Transport {
        operation: operation.to_string(),
        source,
      })?;

    decode(operation, response).await
  }
}

/// Turn a response into `T` or a typed error.
async fn decode<T: DeserializeOwned>(
  operation: &str,
  response: Response,
) -> Result<T, ExchangeError> {
  let status = response.status();
  let text = response
    .text()
    .await
    .map_err(|source| ExchangeError::Transport {
      operation: operation.to_string(),
      source,
    })?;

  if !status.is_success() {
    warn!(operation, status = %status, "Betfair API error");
    return Err(classify_failure(operation, status, text));
  }

  serde_json::from_str(&text).map_err(|e| ExchangeError::Malformed {
    operation: operation.to_string(),
    reason: e.to_string(),
  })
}

/// Session problems are reported as auth failures, everything else as
/// a plain API error.
pub(crate) fn classify_failure(
  operation: &str,
  status: StatusCode,
  body: String,
) -> ExchangeError {
  let session_rejected = status == StatusCode::UNAUTHORIZED
    || body.contains("INVALID_SESSION_INFORMATION")
    || body.contains("NO_SESSION");

  if session_rejected {
    ExchangeError::Auth(format!("{operation}: session rejected ({status})"))
  } else {
    ExchangeError::Api {
      operation: operation.to_string(),
      status: status.as_u16(),
      body,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_classify_session_errors_as_auth() {
    let err = classify_failure(
      "listMarketBook",
      StatusCode::BAD_REQUEST,
      r#"{"detail":{"APINGException":{"errorCode":"INVALID_SESSION_INFORMATION"}}}"#
        .to_string(),
    );
    assert!(matches!(err, ExchangeError::Auth(_)));

    let err = classify_failure("listMarketBook", StatusCode::UNAUTHORIZED, String::new());
    assert!(matches!(err, ExchangeError::Auth(_)));
  }

  #[test]
  fn test_classify_other_errors_as_api() {
    let err = classify_failure(
      "listMarketBook",
      StatusCode::BAD_REQUEST,
      r#"{"detail":{"APINGException":{"errorCode":"TOO_MUCH_DATA"}}}"#.to_string(),
    );
    match err {
      ExchangeError::Api {
        operation, status, ..
      } => {
        assert_eq!(operation, "listMarketBook");
        assert_eq!(status, 400);
      }
      other => panic!("expected api error, got {other:?}"),
    }
  }
}
