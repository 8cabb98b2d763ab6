mod helpers;

use ferrous_doh_application::dns::decode_message;
use ferrous_doh_application::use_cases::{HandleDnsQueryUseCase, ResolveQueryUseCase};
use ferrous_doh_domain::{ClientContext, TransportKind};
use helpers::{a_query, edns_query, MockDohDispatcher};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use std::sync::Arc;

fn make_use_case(
    primary: Arc<MockDohDispatcher>,
    fallback: Arc<MockDohDispatcher>,
) -> HandleDnsQueryUseCase {
    HandleDnsQueryUseCase::new(Arc::new(ResolveQueryUseCase::new(primary, fallback, 2)))
}

async fn answer(
    use_case: &HandleDnsQueryUseCase,
    query: &Message,
    transport: TransportKind,
) -> Message {
    let wire = use_case
        .execute(query, &ClientContext::default(), transport)
        .await
        .unwrap();
    decode_message(&wire).unwrap()
}

// ── header rules ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_response_keeps_query_id() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::answering(1).with_response_id(0)),
        Arc::new(MockDohDispatcher::answering(1)),
    );
    let query = a_query(0x4242, "example.com.", true);

    let response = answer(&use_case, &query, TransportKind::Udp).await;

    assert_eq!(response.id(), 0x4242);
    assert_eq!(response.answers().len(), 1);
}

#[tokio::test]
async fn test_recursion_available_mirrors_recursion_desired() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::answering(1)),
        Arc::new(MockDohDispatcher::answering(1)),
    );

    let with_rd = answer(&use_case, &a_query(1, "example.com.", true), TransportKind::Tcp).await;
    let without_rd =
        answer(&use_case, &a_query(2, "example.com.", false), TransportKind::Tcp).await;

    assert!(with_rd.recursion_available());
    assert!(!without_rd.recursion_available());
}

// ── truncation per transport ───────────────────────────────────────────────

#[tokio::test]
async fn test_udp_without_edns_truncates_to_512() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::answering(60)),
        Arc::new(MockDohDispatcher::answering(1)),
    );
    let query = a_query(9, "example.com.", true);

    let wire = use_case
        .execute(&query, &ClientContext::default(), TransportKind::Udp)
        .await
        .unwrap();
    let response = decode_message(&wire).unwrap();

    assert!(wire.len() <= 512);
    assert!(response.truncated());
    assert!(response.answers().len() < 60);
    assert!(!response.answers().is_empty());
}

#[tokio::test]
async fn test_udp_with_edns_4096_is_not_truncated() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::answering(60)),
        Arc::new(MockDohDispatcher::answering(1)),
    );
    let query = edns_query(9, "example.com.", 4096);

    let wire = use_case
        .execute(&query, &ClientContext::default(), TransportKind::Udp)
        .await
        .unwrap();
    let response = decode_message(&wire).unwrap();

    assert!(wire.len() > 512);
    assert!(!response.truncated());
    assert_eq!(response.answers().len(), 60);
}

#[tokio::test]
async fn test_tcp_ignores_small_edns_payload() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::answering(60)),
        Arc::new(MockDohDispatcher::answering(1)),
    );
    let query = edns_query(9, "example.com.", 512);

    let response = answer(&use_case, &query, TransportKind::Tcp).await;

    assert!(!response.truncated());
    assert_eq!(response.answers().len(), 60);
}

// ── failure path ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_exhausted_upstreams_answer_servfail() {
    let primary = Arc::new(MockDohDispatcher::failing());
    let fallback = Arc::new(MockDohDispatcher::failing());
    let use_case = make_use_case(primary.clone(), fallback.clone());
    let query = a_query(0x1234, "example.com.", true);

    for transport in [TransportKind::Udp, TransportKind::Tcp, TransportKind::Tls] {
        let response = answer(&use_case, &query, transport).await;

        assert_eq!(response.id(), 0x1234);
        assert_eq!(response.response_code(), ResponseCode::ServFail);
        assert_eq!(response.message_type(), MessageType::Response);
        assert!(response.recursion_desired());
        assert_eq!(response.queries(), query.queries());
        assert!(response.answers().is_empty());
    }

    assert_eq!(primary.calls(), 6);
    assert_eq!(fallback.calls(), 3);
}

#[tokio::test]
async fn test_fallback_answer_is_post_processed() {
    let use_case = make_use_case(
        Arc::new(MockDohDispatcher::failing()),
        Arc::new(MockDohDispatcher::answering(60).with_response_id(1)),
    );
    let query = a_query(77, "example.com.", true);

    let response = answer(&use_case, &query, TransportKind::Udp).await;

    assert_eq!(response.id(), 77);
    assert_eq!(response.response_code(), ResponseCode::NoError);
    assert!(response.recursion_available());
    assert!(response.truncated());
}
