use hickory_proto::op::{Message, OpCode, ResponseCode};

/// SERVFAIL answer echoing the query header and question section.
pub fn server_failure(query: &Message) -> Message {
    let mut reply = Message::error_msg(query.id(), query.op_code(), ResponseCode::ServFail);
    reply.set_recursion_desired(query.recursion_desired());
    reply.set_checking_disabled(query.checking_disabled());
    reply.add_queries(query.queries().iter().cloned());
    reply
}

/// FORMERR for a message whose body could not be decoded.
pub fn format_error(id: u16) -> Message {
    Message::error_msg(id, OpCode::Query, ResponseCode::FormErr)
}

/// UDP payload size advertised by the query's OPT record.
pub fn edns_payload(query: &Message) -> Option<u16> {
    query.extensions().as_ref().map(|edns| edns.max_payload())
}
