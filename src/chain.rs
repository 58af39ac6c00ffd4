//! End-of-chain handlers.
//!
//! A [`SubIpResponder`](crate::SubIpResponder) always hands queries it does
//! not answer to the next handler in the chain. Deployments with nothing
//! stacked behind the responder terminate the chain with one of these.

use async_trait::async_trait;
use hickory_proto::op::{Header, ResponseCode};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use tracing::error;

/// Send a header-only response carrying `code`, falling back to a synthetic
/// SERVFAIL `ResponseInfo` when the transport write fails.
pub(crate) async fn respond_with_code<R: ResponseHandler>(
    request: &Request,
    mut response_handle: R,
    code: ResponseCode,
) -> ResponseInfo {
    let response =
        MessageResponseBuilder::from_message_request(request).error_msg(request.header(), code);
    match response_handle.send_response(response).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, code = ?code, "failed to send response");
            let mut header = Header::new();
            header.set_response_code(ResponseCode::ServFail);
            ResponseInfo::from(header)
        }
    }
}

/// Chain terminal that refuses every query it receives.
///
/// This is what a strictly authoritative deployment wants behind the
/// responder: names outside the configured zones are answered REFUSED, the
/// same way hickory's own catalog treats zones it does not carry.
#[derive(Debug, Default, Clone, Copy)]
pub struct Refused;

#[async_trait]
impl RequestHandler for Refused {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        respond_with_code(request, response_handle, ResponseCode::Refused).await
    }
}

/// Chain terminal that fails every query it receives with SERVFAIL.
///
/// Mirrors the behavior of handler chains where reaching the end of the
/// chain without an answer is a hard failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct ServeFailed;

#[async_trait]
impl RequestHandler for ServeFailed {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
    ) -> ResponseInfo {
        respond_with_code(request, response_handle, ResponseCode::ServFail).await
    }
}
