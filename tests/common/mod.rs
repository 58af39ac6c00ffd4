//! Shared test infrastructure for responder integration tests.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hickory_proto::op::{Header, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{DNSClass, Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinDecoder, BinEncoder};
use hickory_server::authority::{MessageRequest, MessageResponse, MessageResponseBuilder};
use hickory_server::proto::rr::Record;
use hickory_server::proto::xfer::Protocol;
use hickory_server::server::{Request, RequestHandler, ResponseHandler, ResponseInfo};

use subip_dns::chain::ServeFailed;
use subip_dns::config::{DnsConfig, FallthroughConfig};
use subip_dns::SubIpResponder;

// --- Constants ---

pub const ZONE: &str = "example.com";
pub const TTL: u32 = 30;

/// Address the `NextProbe` chain handler answers with (TEST-NET-1), so tests
/// can tell a delegated answer from a synthesized one.
pub const NEXT_MARKER: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 53);

// --- TestResponseHandler ---

/// Captures the serialized DNS response for inspection in tests.
///
/// Implements `ResponseHandler` so it can be passed to
/// `RequestHandler::handle_request()`. The response is serialized via
/// `MessageResponse::destructive_emit()` and stored as raw wire-format
/// bytes, which can then be parsed with `Message::from_vec()`.
#[derive(Clone)]
pub struct TestResponseHandler {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl TestResponseHandler {
    pub fn new() -> Self {
        Self {
            buf: Arc::new(Mutex::new(Vec::with_capacity(512))),
        }
    }

    /// Parse the captured wire bytes into a `Message` for assertions.
    pub fn into_message(self) -> Message {
        let buf = self.buf.lock().unwrap();
        assert!(!buf.is_empty(), "no response was captured");
        Message::from_vec(&buf).expect("failed to parse captured DNS response")
    }
}

#[async_trait]
impl ResponseHandler for TestResponseHandler {
    async fn send_response<'a>(
        &mut self,
        response: MessageResponse<
            '_,
            'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
            impl Iterator<Item = &'a Record> + Send + 'a,
        >,
    ) -> io::Result<ResponseInfo> {
        let mut buf = self.buf.lock().unwrap();
        buf.clear();
        let mut encoder = BinEncoder::new(&mut *buf);
        encoder.set_max_size(u16::MAX);
        let info = response
            .destructive_emit(&mut encoder)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        Ok(info)
    }
}

// --- NextProbe ---

/// Chain handler standing in for "whatever comes next": counts invocations
/// and answers every question with the `NEXT_MARKER` A record.
#[derive(Clone)]
pub struct NextProbe {
    hits: Arc<AtomicUsize>,
}

impl NextProbe {
    pub fn new() -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many requests reached this handler.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RequestHandler for NextProbe {
    async fn handle_request<R: ResponseHandler>(
        &self,
        request: &Request,
        mut response_handle: R,
    ) -> ResponseInfo {
        self.hits.fetch_add(1, Ordering::SeqCst);

        let records: Vec<Record> = request
            .queries()
            .iter()
            .map(|q| {
                Record::from_rdata(
                    Name::from(q.name().clone()),
                    TTL,
                    RData::A(A::from(NEXT_MARKER)),
                )
            })
            .collect();

        let response = MessageResponseBuilder::from_message_request(request).build(
            Header::response_from_request(request.header()),
            &records,
            &[],
            &[],
            &[],
        );
        match response_handle.send_response(response).await {
            Ok(info) => info,
            Err(_) => ResponseInfo::from(request.header().clone()),
        }
    }
}

// --- Config builders ---

pub fn test_config() -> DnsConfig {
    DnsConfig {
        listen_addr: "127.0.0.1:5353".parse().unwrap(),
        zones: vec![ZONE.to_string()],
        ttl: TTL,
        fallthrough: FallthroughConfig::default(),
    }
}

pub fn test_config_with_fallthrough() -> DnsConfig {
    DnsConfig {
        fallthrough: FallthroughConfig {
            enabled: true,
            zones: Vec::new(),
        },
        ..test_config()
    }
}

// --- Responder builders ---

/// Responder whose chain ends in SERVFAIL, for tests that never delegate.
pub fn build_responder(config: DnsConfig) -> SubIpResponder<ServeFailed> {
    SubIpResponder::new(&config, ServeFailed).expect("failed to build responder")
}

/// Responder chained to a `NextProbe`, for tests asserting delegation.
pub fn build_probed_responder(config: DnsConfig) -> (SubIpResponder<NextProbe>, NextProbe) {
    let probe = NextProbe::new();
    let responder =
        SubIpResponder::new(&config, probe.clone()).expect("failed to build responder");
    (responder, probe)
}

// --- Query/Request construction ---

/// Build wire-format bytes for a DNS query.
pub fn build_query_bytes(name: &str, record_type: RecordType, id: u16) -> Vec<u8> {
    build_query_bytes_with_class(name, record_type, DNSClass::IN, id)
}

/// Build wire-format bytes for a DNS query with an explicit class.
pub fn build_query_bytes_with_class(
    name: &str,
    record_type: RecordType,
    class: DNSClass,
    id: u16,
) -> Vec<u8> {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    msg.set_recursion_desired(true);
    let mut query = Query::new();
    query.set_name(Name::from_ascii(name).unwrap());
    query.set_query_type(record_type);
    query.set_query_class(class);
    msg.add_query(query);
    msg.to_vec().unwrap()
}

/// Build wire-format bytes for a query carrying several questions.
pub fn build_multi_query_bytes(questions: &[(&str, RecordType)], id: u16) -> Vec<u8> {
    let mut msg = Message::new();
    msg.set_id(id);
    msg.set_message_type(MessageType::Query);
    msg.set_op_code(OpCode::Query);
    for (name, record_type) in questions {
        let mut query = Query::new();
        query.set_name(Name::from_ascii(name).unwrap());
        query.set_query_type(*record_type);
        query.set_query_class(DNSClass::IN);
        msg.add_query(query);
    }
    msg.to_vec().unwrap()
}

/// Parse wire bytes into a MessageRequest.
pub fn parse_message_request(bytes: &[u8]) -> MessageRequest {
    let mut decoder = BinDecoder::new(bytes);
    MessageRequest::read(&mut decoder).expect("failed to parse MessageRequest")
}

/// Build a full `Request` from wire bytes.
pub fn build_request_from_bytes(bytes: &[u8]) -> Request {
    let msg = parse_message_request(bytes);
    Request::new(msg, test_src(), Protocol::Udp)
}

/// Build a full `Request` for a single question.
pub fn build_request(name: &str, record_type: RecordType, id: u16) -> Request {
    build_request_from_bytes(&build_query_bytes(name, record_type, id))
}

pub fn test_src() -> SocketAddr {
    "127.0.0.1:12345".parse().unwrap()
}

// --- Response helpers ---

/// Execute a query through the handler and return the parsed response.
pub async fn execute_query<H: RequestHandler>(
    handler: &H,
    name: &str,
    record_type: RecordType,
    id: u16,
) -> Message {
    execute_request(handler, build_request(name, record_type, id)).await
}

/// Execute an already-built request and return the parsed response.
pub async fn execute_request<H: RequestHandler>(handler: &H, request: Request) -> Message {
    let response_handle = TestResponseHandler::new();
    handler
        .handle_request(&request, response_handle.clone())
        .await;
    response_handle.into_message()
}

/// Extract A addresses from a response.
pub fn extract_a_ips(msg: &Message) -> Vec<Ipv4Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::A(a) => Some(Ipv4Addr::from(*a)),
            _ => None,
        })
        .collect()
}

/// Extract AAAA addresses from a response.
pub fn extract_aaaa_ips(msg: &Message) -> Vec<Ipv6Addr> {
    msg.answers()
        .iter()
        .filter_map(|r| match r.data() {
            RData::AAAA(aaaa) => Some(Ipv6Addr::from(*aaaa)),
            _ => None,
        })
        .collect()
}

/// Assert response code.
pub fn assert_response_code(msg: &Message, expected: ResponseCode) {
    assert_eq!(
        msg.response_code(),
        expected,
        "expected {:?}, got {:?}",
        expected,
        msg.response_code()
    );
}

/// Assert response is successful with exactly the expected A addresses.
pub fn assert_a_response(msg: &Message, expected_ips: &[Ipv4Addr]) {
    assert_response_code(msg, ResponseCode::NoError);
    let mut actual = extract_a_ips(msg);
    actual.sort();
    let mut expected: Vec<Ipv4Addr> = expected_ips.to_vec();
    expected.sort();
    assert_eq!(
        actual, expected,
        "A records mismatch.\nactual:   {:?}\nexpected: {:?}",
        actual, expected
    );
}

/// Assert response is successful with exactly the expected AAAA addresses.
pub fn assert_aaaa_response(msg: &Message, expected_ips: &[Ipv6Addr]) {
    assert_response_code(msg, ResponseCode::NoError);
    let mut actual = extract_aaaa_ips(msg);
    actual.sort();
    let mut expected: Vec<Ipv6Addr> = expected_ips.to_vec();
    expected.sort();
    assert_eq!(
        actual, expected,
        "AAAA records mismatch.\nactual:   {:?}\nexpected: {:?}",
        actual, expected
    );
}
