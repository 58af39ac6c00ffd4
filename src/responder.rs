//! The query responder: zone matching, decoding, record synthesis, and the
//! handoff to the next handler in the chain.

use async_trait::async_trait;
use hickory_proto::op::{Header, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{DNSClass, LowerName, Name, RData, Record, RecordType};
use hickory_server::authority::MessageResponseBuilder;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};
use std::net::IpAddr;
use tracing::{debug, error, trace};

use crate::chain::respond_with_code;
use crate::config::DnsConfig;
use crate::decode::decode_address;
use crate::error::DnsError;
use crate::metrics::{self, QueryOutcome, Timer};
use crate::zone::{Fallthrough, ZoneSet};

/// Build an A or AAAA record for `name`, picking the record type from the
/// address family of `addr` rather than from the question that produced it.
/// A AAAA question whose subdomain decodes as IPv4 therefore receives an A
/// record, matching the original wire behavior of the format.
pub fn synthesize_record(name: &LowerName, addr: IpAddr, ttl: u32) -> Record {
    let name = Name::from(name.clone());
    let rdata = match addr {
        IpAddr::V4(v4) => RData::A(A::from(v4)),
        IpAddr::V6(v6) => RData::AAAA(AAAA::from(v6)),
    };
    let mut record = Record::from_rdata(name, ttl, rdata);
    record.set_dns_class(DNSClass::IN);
    record
}

/// Query responder that synthesizes address records from the query name
/// itself.
///
/// Sits in a chain of handlers: queries outside the configured zones, and
/// unanswered owned-zone queries covered by the fallthrough policy, are
/// handed to `next`; unanswered owned-zone queries outside the policy are
/// failed with SERVFAIL.
///
/// The responder holds no mutable state. Every query is handled
/// independently, and the outcome is fully determined by the query and the
/// configuration captured at construction.
pub struct SubIpResponder<N> {
    zones: ZoneSet,
    fall: Fallthrough,
    ttl: u32,
    next: N,
}

impl<N: RequestHandler> SubIpResponder<N> {
    /// Build a responder from its configuration and the next handler in the
    /// chain. Configuration problems surface here, before the responder can
    /// be installed.
    pub fn new(config: &DnsConfig, next: N) -> Result<Self, DnsError> {
        config.validate()?;
        Ok(Self {
            zones: ZoneSet::from_strs(&config.zones)?,
            fall: Fallthrough::from_config(&config.fallthrough)?,
            ttl: config.ttl,
            next,
        })
    }

    /// Zones this responder is authoritative for.
    pub fn zones(&self) -> &ZoneSet {
        &self.zones
    }

    async fn delegate<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
        timer: Timer,
    ) -> ResponseInfo {
        metrics::record_query(QueryOutcome::Delegated, timer.elapsed());
        self.next.handle_request(request, response_handle).await
    }

    async fn fail<R: ResponseHandler>(
        &self,
        request: &Request,
        response_handle: R,
        timer: Timer,
    ) -> ResponseInfo {
        metrics::record_query(QueryOutcome::Failed, timer.elapsed());
        respond_with_code(request, response_handle, ResponseCode::ServFail).await
    }
}

#[async_trait]
impl<N: RequestHandler> RequestHandler for SubIpResponder<N> {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        let timer = Timer::start();

        // Only plain queries are candidates for synthesis; everything else
        // belongs to whatever sits behind us in the chain.
        if request.header().message_type() != MessageType::Query
            || request.header().op_code() != OpCode::Query
        {
            trace!("not a plain query, delegating");
            return self.delegate(request, response_handle, timer).await;
        }

        let Some(primary) = request.queries().first() else {
            return self.delegate(request, response_handle, timer).await;
        };

        // One zone match per message; the result is threaded through
        // decoding so the suffix strip always uses the same normalized zone.
        let Some(zone) = self.zones.matches(primary.name()) else {
            trace!(name = %primary.name(), "query outside configured zones, delegating");
            return self.delegate(request, response_handle, timer).await;
        };

        let mut answers = Vec::new();
        for query in request.queries() {
            if query.query_class() != DNSClass::IN {
                continue;
            }
            if !matches!(query.query_type(), RecordType::A | RecordType::AAAA) {
                continue;
            }
            // Extra questions outside the matched zone are skipped; the
            // suffix strip is only meaningful inside it.
            if !zone.zone_of(query.name()) {
                continue;
            }

            match decode_address(query.name(), zone) {
                Some(addr) => {
                    debug!(name = %query.name(), addr = %addr, "decoded address from query name");
                    answers.push(synthesize_record(query.name(), addr, self.ttl));
                }
                None => {
                    trace!(name = %query.name(), "no address encoded in query name");
                }
            }
        }

        if !answers.is_empty() {
            metrics::record_answers_synthesized(answers.len());
            metrics::record_query(QueryOutcome::Answered, timer.elapsed());

            let mut header = Header::response_from_request(request.header());
            header.set_authoritative(true);
            let response = MessageResponseBuilder::from_message_request(request).build(
                header,
                &answers,
                &[],
                &[],
                &[],
            );
            return match response_handle.send_response(response).await {
                Ok(info) => info,
                Err(e) => {
                    error!(error = %e, "failed to send response");
                    let mut header = Header::new();
                    header.set_response_code(ResponseCode::ServFail);
                    ResponseInfo::from(header)
                }
            };
        }

        // Nothing decoded: the fallthrough policy decides between handing
        // the query on and failing it here. Never NXDOMAIN, never an empty
        // answer set.
        if self.fall.through(primary.name()) {
            debug!(name = %primary.name(), "no address encoding, falling through");
            return self.delegate(request, response_handle, timer).await;
        }

        debug!(name = %primary.name(), "owned zone without address encoding, failing");
        self.fail(request, response_handle, timer).await
    }
}
