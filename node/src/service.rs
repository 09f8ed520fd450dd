//! Request-response facade over the lifecycle engine.
//!
//! This is the seam a transport layer (HTTP router, CLI, test harness)
//! calls. Routing, status codes, and serialization of these DTOs onto the
//! wire belong to that layer, not here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use wardpass_store::CredentialStore;
use wardpass_token::{Token, TokenService};
use wardpass_types::{GeoPoint, Identity, PassParams, Timestamp};
use wardpass_verification::{Issuer, VerificationEngine, VerificationResult};

use crate::NodeError;

/// Fallback reason for failures that are not a classified deny (store
/// unreachable, audit row not persisted). Transports surface it as a
/// generic server error.
pub const GENERIC_FAILURE_REASON: &str = "SERVER_ERROR";

#[derive(Clone, Debug, Deserialize)]
pub struct IssueRequest {
    pub name: String,
    pub role: String,
    pub email: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct IssueResponse {
    pub identity: Identity,
    pub token: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
    pub geo_lat: Option<f64>,
    pub geo_long: Option<f64>,
}

impl VerifyRequest {
    /// Geo is only meaningful when both coordinates arrived.
    fn geo(&self) -> Option<GeoPoint> {
        match (self.geo_lat, self.geo_long) {
            (Some(lat), Some(long)) => Some(GeoPoint { lat, long }),
            _ => None,
        }
    }
}

/// Identity fields exposed to the checkpoint operator on success.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GrantedIdentity {
    pub name: String,
    pub role: String,
    pub email: String,
    /// Token expiry rendered for display.
    pub expires_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status")]
pub enum VerifyResponse {
    #[serde(rename = "GRANTED")]
    Granted { identity: GrantedIdentity },
    #[serde(rename = "DENIED")]
    Denied { reason: String },
}

/// The facade: issuance and verification as plain request-response calls.
pub struct PassService<S> {
    issuer: Issuer<S>,
    engine: VerificationEngine<S>,
}

impl<S: CredentialStore> PassService<S> {
    pub fn new(tokens: Arc<TokenService>, store: Arc<S>, params: PassParams) -> Self {
        Self {
            issuer: Issuer::new(tokens.clone(), store.clone(), params.validity_window_secs),
            engine: VerificationEngine::new(tokens, store),
        }
    }

    pub fn issue(&self, request: IssueRequest) -> Result<IssueResponse, NodeError> {
        self.issue_at(request, Timestamp::now())
    }

    /// Issue with an explicit clock, for deterministic tests.
    pub fn issue_at(
        &self,
        request: IssueRequest,
        now: Timestamp,
    ) -> Result<IssueResponse, NodeError> {
        let issued = self
            .issuer
            .issue(request.name, request.role, request.email, now)?;
        Ok(IssueResponse {
            identity: issued.identity,
            token: issued.token.as_str().to_string(),
        })
    }

    pub fn verify(&self, request: VerifyRequest) -> Result<VerifyResponse, NodeError> {
        self.verify_at(request, Timestamp::now())
    }

    /// Verify with an explicit clock, for deterministic tests.
    ///
    /// An `Err` here means the store itself failed; the decision DTO for
    /// that case is [`VerifyResponse::server_error`].
    pub fn verify_at(
        &self,
        request: VerifyRequest,
        now: Timestamp,
    ) -> Result<VerifyResponse, NodeError> {
        let geo = request.geo();
        let token = Token::from_raw(request.token);
        let result = self.engine.verify(&token, geo, now)?;
        Ok(match result {
            VerificationResult::Granted {
                identity,
                token_expires_at,
            } => VerifyResponse::Granted {
                identity: GrantedIdentity {
                    name: identity.name,
                    role: identity.role,
                    email: identity.email,
                    expires_at: wardpass_utils::format_timestamp(token_expires_at),
                },
            },
            VerificationResult::Denied { reason } => VerifyResponse::Denied {
                reason: reason.as_str().to_string(),
            },
        })
    }
}

impl VerifyResponse {
    /// The generic denial a transport should send when the service itself
    /// errored.
    pub fn server_error() -> Self {
        VerifyResponse::Denied {
            reason: GENERIC_FAILURE_REASON.to_string(),
        }
    }
}
