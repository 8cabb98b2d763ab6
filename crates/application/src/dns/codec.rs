use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;

pub fn decode_message(bytes: &[u8]) -> Result<Message, DomainError> {
    Message::from_vec(bytes).map_err(|e| DomainError::Decode(e.to_string()))
}

/// Encodes to wire format. Owner names are always compressed by the encoder.
pub fn encode_message(message: &Message) -> Result<Vec<u8>, DomainError> {
    message
        .to_vec()
        .map_err(|e| DomainError::Encode(e.to_string()))
}

/// Transaction id of a raw message, if the buffer holds a full header.
pub fn peek_message_id(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < 12 {
        return None;
    }
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
