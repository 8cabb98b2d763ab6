use ferrous_doh_domain::{derive_client_id, matches_service_domain, ClientContext};
use std::net::{IpAddr, Ipv4Addr};

#[test]
fn test_client_id_from_subdomain() {
    assert_eq!(derive_client_id(Some("abc.example.com"), "example.com"), "abc");
}

#[test]
fn test_client_id_empty_for_bare_service_domain() {
    assert_eq!(derive_client_id(Some("example.com"), "example.com"), "");
}

#[test]
fn test_client_id_empty_without_server_name() {
    assert_eq!(derive_client_id(None, "example.com"), "");
}

#[test]
fn test_client_id_strips_every_separator() {
    assert_eq!(
        derive_client_id(Some("kids.laptop.example.com"), "example.com"),
        "kidslaptop"
    );
}

#[test]
fn test_client_id_suffix_match_ignores_case() {
    assert_eq!(derive_client_id(Some("Phone.EXAMPLE.com"), "example.com"), "Phone");
}

#[test]
fn test_client_id_keeps_name_without_matching_suffix() {
    assert_eq!(derive_client_id(Some("dns.other.org"), "example.com"), "dnsotherorg");
}

#[test]
fn test_service_domain_match() {
    assert!(matches_service_domain("abc.example.com", "example.com"));
    assert!(matches_service_domain("ABC.Example.COM", "example.com"));
    assert!(matches_service_domain("example.com", "example.com"));
    assert!(!matches_service_domain("example.org", "example.com"));
    assert!(!matches_service_domain("com", "example.com"));
    assert!(!matches_service_domain("", "example.com"));
}

#[test]
fn test_context_from_plain_transport_has_no_client_id() {
    let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 100));
    let ctx = ClientContext::from_transport(Some(ip), None, "example.com");

    assert_eq!(ctx.client_ip, Some(ip));
    assert!(ctx.client_id.is_empty());
}

#[test]
fn test_context_from_tls_transport() {
    let ctx = ClientContext::from_transport(None, Some("abc.example.com"), "example.com");

    assert_eq!(ctx.client_ip, None);
    assert_eq!(ctx.client_id, "abc");
}
