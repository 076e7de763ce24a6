use std::net::{IpAddr, SocketAddr};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use formwell_core::{AccountId, AccountIdentity, AppError};
use ipnet::IpNet;
use tracing::warn;

use crate::error::ApiResult;
use crate::state::AppState;

/// Account id forwarded by the authenticating gateway.
pub const ACCOUNT_ID_HEADER: &str = "x-formwell-account-id";
/// Optional account email forwarded by the gateway.
pub const ACCOUNT_EMAIL_HEADER: &str = "x-formwell-account-email";
/// Shared secret proving the request came through the gateway.
pub const GATEWAY_SECRET_HEADER: &str = "x-formwell-gateway-secret";

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Client address resolved for the current request.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

pub async fn require_gateway_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = gateway_identity(request.headers(), state.gateway_shared_secret.as_str())?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn throttle_public_submissions(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| address.ip());
    let client_ip = resolve_client_ip(request.headers(), peer, &state.trusted_proxies);
    let identifier = client_ip
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_owned());

    match state
        .rate_limit_service
        .check_rate_limit(&state.public_submit_rule, identifier.as_str())
        .await
    {
        Ok(()) => {}
        Err(error @ AppError::RateLimited(_)) => return Err(error.into()),
        // Throttle store failures fail open.
        Err(error) => warn!(error = %error, "public submit rate limit check failed"),
    }

    request.extensions_mut().insert(ClientIp(client_ip));
    Ok(next.run(request).await)
}

fn gateway_identity(headers: &HeaderMap, shared_secret: &str) -> Result<AccountIdentity, AppError> {
    let provided_secret = header_str(headers, GATEWAY_SECRET_HEADER).unwrap_or_default();
    if !secrets_match(provided_secret.as_bytes(), shared_secret.as_bytes()) {
        return Err(AppError::Unauthorized("authentication required".to_owned()));
    }

    let account_id = header_str(headers, ACCOUNT_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?
        .parse::<AccountId>()
        .map_err(|_| AppError::Unauthorized("invalid account identity".to_owned()))?;
    let email = header_str(headers, ACCOUNT_EMAIL_HEADER)
        .filter(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned);

    Ok(AccountIdentity::new(account_id, email))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn secrets_match(provided: &[u8], expected: &[u8]) -> bool {
    provided.len() == expected.len()
        && provided
            .iter()
            .zip(expected)
            .fold(0_u8, |difference, (left, right)| difference | (left ^ right))
            == 0
}

/// Resolves the client address, honoring `X-Forwarded-For` only when the
/// direct peer is a trusted proxy. The rightmost untrusted hop wins.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<IpAddr>,
    trusted_proxies: &[IpNet],
) -> Option<IpAddr> {
    let peer = peer?;
    let is_trusted = |address: &IpAddr| trusted_proxies.iter().any(|net| net.contains(address));
    if !is_trusted(&peer) {
        return Some(peer);
    }

    let hops: Vec<IpAddr> = headers
        .get_all(FORWARDED_FOR_HEADER)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .collect();

    hops.iter()
        .rev()
        .find(|hop| !is_trusted(*hop))
        .or_else(|| hops.first())
        .copied()
        .or(Some(peer))
}
