//! Response truncation
//!
//! Records are kept in section order (answer, authority, additional) for as
//! long as the encoded message fits. A later section is only considered when
//! every record of the earlier one fit. The TC flag is raised when answer or
//! authority records were dropped; dropping additional records alone does not
//! set it, since that section is optional (RFC 2181 section 9). The OPT
//! pseudo-record is carried in the EDNS slot and is never dropped.

use super::codec::encode_message;
use ferrous_doh_domain::transport::MIN_UDP_MESSAGE_SIZE;
use ferrous_doh_domain::DomainError;
use hickory_proto::op::Message;
use hickory_proto::rr::Record;

#[derive(Clone, Copy)]
enum Section {
    Answer,
    Authority,
    Additional,
}

impl Section {
    fn push(self, message: &mut Message, record: Record) {
        match self {
            Self::Answer => message.add_answer(record),
            Self::Authority => message.add_name_server(record),
            Self::Additional => message.add_additional(record),
        };
    }

    fn pop(self, message: &mut Message) {
        match self {
            Self::Answer => {
                let mut records = message.take_answers();
                records.pop();
                message.insert_answers(records);
            }
            Self::Authority => {
                let mut records = message.take_name_servers();
                records.pop();
                message.insert_name_servers(records);
            }
            Self::Additional => {
                let mut records = message.take_additionals();
                records.pop();
                message.insert_additionals(records);
            }
        }
    }
}

/// Shrinks `message` so its wire form fits in `max_size` bytes.
///
/// Returns true when records had to be removed. Sizes below 512 are raised
/// to 512.
pub fn truncate_to(message: &mut Message, max_size: usize) -> Result<bool, DomainError> {
    let max_size = max_size.max(MIN_UDP_MESSAGE_SIZE);
    if encode_message(message)?.len() <= max_size {
        return Ok(false);
    }

    let answers = message.take_answers();
    let authorities = message.take_name_servers();
    let additionals = message.take_additionals();
    let (answer_total, authority_total) = (answers.len(), authorities.len());

    let kept_answers = fill(message, Section::Answer, answers, max_size)?;
    let mut kept_authorities = 0;
    if kept_answers == answer_total {
        kept_authorities = fill(message, Section::Authority, authorities, max_size)?;
        if kept_authorities == authority_total {
            fill(message, Section::Additional, additionals, max_size)?;
        }
    }

    let dropped_required = kept_answers < answer_total || kept_authorities < authority_total;
    if dropped_required {
        message.set_truncated(true);
    }
    Ok(true)
}

fn fill(
    message: &mut Message,
    section: Section,
    records: Vec<Record>,
    max_size: usize,
) -> Result<usize, DomainError> {
    let mut kept = 0;
    for record in records {
        section.push(message, record);
        if encode_message(message)?.len() > max_size {
            section.pop(message);
            break;
        }
        kept += 1;
    }
    Ok(kept)
}
