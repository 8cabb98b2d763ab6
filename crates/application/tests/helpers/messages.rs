use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;

pub fn a_query(id: u16, domain: &str, recursion_desired: bool) -> Message {
    let mut message = Message::new();
    message
        .set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(recursion_desired);
    message.add_query(Query::query(
        Name::from_ascii(domain).unwrap(),
        RecordType::A,
    ));
    message
}

pub fn edns_query(id: u16, domain: &str, payload: u16) -> Message {
    let mut message = a_query(id, domain, true);
    let mut edns = Edns::new();
    edns.set_max_payload(payload);
    message.set_edns(edns);
    message
}

/// Upstream-style answer carrying `count` A records for the queried name.
pub fn answer_with_records(query: &Message, count: usize) -> Message {
    let mut response = Message::new();
    response
        .set_id(query.id())
        .set_message_type(MessageType::Response)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(query.recursion_desired());
    response.add_queries(query.queries().iter().cloned());

    let name = query
        .queries()
        .first()
        .map(|q| q.name().clone())
        .unwrap_or_else(Name::root);

    for i in 0..count {
        let ip = Ipv4Addr::new(10, 0, (i / 256) as u8, (i % 256) as u8);
        response.add_answer(Record::from_rdata(name.clone(), 300, RData::A(A(ip))));
    }
    response
}
