//! Wire codec for DNS messages.
//!
//! The single authoritative decode/encode path in the proxy. Decoding pulls
//! the transaction id and question out of a raw query buffer; encoding
//! reconstructs responses that preserve the original id and question section
//! byte for byte, whichever resolver produced the answer.

use crate::errors::RelayError;

/// Fixed DNS header length (RFC 1035 §4.1.1).
pub const HEADER_LEN: usize = 12;

/// Maximum length of one label in a QNAME.
const MAX_LABEL_LEN: usize = 63;

/// SERVFAIL flag word: QR=1, RD=1, RA=1, RCODE=2.
const SERVFAIL_FLAGS: [u8; 2] = [0x81, 0x82];

/// Result of successfully decoding the question section of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionInfo {
    pub id: u16,
    /// Lowercased dot-form name, no trailing dot.
    pub name: String,
    pub qtype: u16,
    pub qclass: u16,
    /// Byte offset in the original buffer where the question section ends
    /// (past QTYPE and QCLASS).
    pub question_end: usize,
}

/// Response header flags carried over from an upstream answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseFlags {
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: u8,
}

/// One resource record ready for serialization into a response.
#[derive(Debug, Clone)]
pub struct ResourceRecord {
    /// Owner name in dot form; may differ from the query name (CNAME chains).
    pub name: String,
    pub rtype: u16,
    pub ttl: u32,
    pub rdata: Vec<u8>,
}

/// Decodes the header and first question of a raw DNS query.
///
/// Label walk starts at offset 12: length-prefixed labels terminated by a
/// zero length, then big-endian QTYPE and QCLASS. Truncation at any read is
/// an error, as are compression pointers in the QNAME — a query's own
/// question has nothing earlier to point at. Decode failure is non-fatal for
/// the caller: raw bytes are still forwarded verbatim to the UDP upstream.
pub fn decode_query(buf: &[u8]) -> Result<QuestionInfo, RelayError> {
    if buf.len() < HEADER_LEN {
        return Err(RelayError::TooShort);
    }

    let id = u16::from_be_bytes([buf[0], buf[1]]);

    let mut pos = HEADER_LEN;
    let mut name_buf: Vec<u8> = Vec::new();

    loop {
        let len = *buf
            .get(pos)
            .ok_or_else(|| RelayError::MalformedQuery("truncated at label length".into()))?
            as usize;
        pos += 1;

        if len == 0 {
            break;
        }
        if len & 0xC0 != 0 {
            return Err(RelayError::MalformedQuery(
                "compression pointer in question name".into(),
            ));
        }

        let label = buf
            .get(pos..pos + len)
            .ok_or_else(|| RelayError::MalformedQuery("truncated label".into()))?;
        if !name_buf.is_empty() {
            name_buf.push(b'.');
        }
        name_buf.extend(label.iter().map(|b| b.to_ascii_lowercase()));
        pos += len;
    }

    let type_bytes = buf
        .get(pos..pos + 2)
        .ok_or_else(|| RelayError::MalformedQuery("truncated at type code".into()))?;
    let qtype = u16::from_be_bytes([type_bytes[0], type_bytes[1]]);
    pos += 2;

    let class_bytes = buf
        .get(pos..pos + 2)
        .ok_or_else(|| RelayError::MalformedQuery("truncated at class code".into()))?;
    let qclass = u16::from_be_bytes([class_bytes[0], class_bytes[1]]);
    pos += 2;

    Ok(QuestionInfo {
        id,
        name: String::from_utf8_lossy(&name_buf).into_owned(),
        qtype,
        qclass,
        question_end: pos,
    })
}

/// Synthesizes a minimal SERVFAIL from the raw original request.
///
/// Header: original id (bytes 0-1), fixed flag word 0x8182, original QDCOUNT
/// (bytes 4-5), zeroed AN/NS/AR counts; then the original question section
/// (bytes 12 onward) verbatim. Fails closed: an original shorter than the
/// header yields an empty buffer, never a panic.
pub fn encode_servfail(original: &[u8]) -> Vec<u8> {
    if original.len() < HEADER_LEN {
        return Vec::new();
    }

    let mut buf = Vec::with_capacity(original.len());
    buf.extend_from_slice(&original[0..2]);
    buf.extend_from_slice(&SERVFAIL_FLAGS);
    buf.extend_from_slice(&original[4..6]);
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    buf.extend_from_slice(&original[HEADER_LEN..]);
    buf
}

/// Serializes a response that preserves the original id and question section
/// and carries the given flags and answer records.
///
/// Records are emitted in the order given, owner names uncompressed. QDCOUNT
/// is copied verbatim from the original header.
pub fn encode_response(
    original: &[u8],
    question: &QuestionInfo,
    flags: ResponseFlags,
    answers: &[ResourceRecord],
) -> Result<Vec<u8>, RelayError> {
    if question.question_end < HEADER_LEN || original.len() < question.question_end {
        return Err(RelayError::MalformedQuery(
            "question end outside the original buffer".into(),
        ));
    }

    let mut buf = Vec::with_capacity(question.question_end + answers.len() * 32);

    buf.extend_from_slice(&question.id.to_be_bytes());

    // QR=1, opcode 0, AA=0; TC/RD in byte 2, RA/AD/CD and rcode in byte 3.
    let b2 = 0x80 | ((flags.tc as u8) << 1) | (flags.rd as u8);
    let b3 = ((flags.ra as u8) << 7)
        | ((flags.ad as u8) << 5)
        | ((flags.cd as u8) << 4)
        | (flags.rcode & 0x0F);
    buf.push(b2);
    buf.push(b3);

    buf.extend_from_slice(&original[4..6]);
    buf.extend_from_slice(&(answers.len() as u16).to_be_bytes());
    buf.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

    buf.extend_from_slice(&original[HEADER_LEN..question.question_end]);

    for record in answers {
        encode_name(&record.name, &mut buf)?;
        buf.extend_from_slice(&record.rtype.to_be_bytes());
        buf.extend_from_slice(&1u16.to_be_bytes()); // class IN
        buf.extend_from_slice(&record.ttl.to_be_bytes());
        buf.extend_from_slice(&(record.rdata.len() as u16).to_be_bytes());
        buf.extend_from_slice(&record.rdata);
    }

    Ok(buf)
}

/// Appends a dot-form name as length-prefixed labels plus the root byte.
pub fn encode_name(name: &str, buf: &mut Vec<u8>) -> Result<(), RelayError> {
    let trimmed = name.trim_end_matches('.');
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            let bytes = label.as_bytes();
            if bytes.is_empty() || bytes.len() > MAX_LABEL_LEN {
                return Err(RelayError::MalformedQuery(format!(
                    "invalid label length {} in '{}'",
                    bytes.len(),
                    name
                )));
            }
            buf.push(bytes.len() as u8);
            buf.extend_from_slice(bytes);
        }
    }
    buf.push(0x00);
    Ok(())
}
