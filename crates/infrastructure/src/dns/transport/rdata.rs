//! Presentation-format record data → RDATA bytes.
//!
//! DoH JSON answers carry record data as text; this module converts it into
//! wire RDATA for the record types the proxy reconstructs. Anything else
//! returns `None` and the record is skipped by the caller.

use relay_dns_domain::{wire, RecordType};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Longest single character-string inside a TXT record.
const TXT_SEGMENT_LEN: usize = 255;

pub fn from_presentation(rtype: u16, data: &str) -> Option<Vec<u8>> {
    let record_type = RecordType::from_u16(rtype)?;
    let data = data.trim();

    match record_type {
        RecordType::A => data
            .parse::<Ipv4Addr>()
            .ok()
            .map(|ip| ip.octets().to_vec()),

        RecordType::AAAA => data
            .parse::<Ipv6Addr>()
            .ok()
            .map(|ip| ip.octets().to_vec()),

        RecordType::CNAME | RecordType::NS | RecordType::PTR | RecordType::DNAME => {
            let mut buf = Vec::new();
            wire::encode_name(data, &mut buf).ok()?;
            Some(buf)
        }

        RecordType::MX => {
            let (preference, exchange) = data.split_once(' ')?;
            let preference: u16 = preference.parse().ok()?;
            let mut buf = preference.to_be_bytes().to_vec();
            wire::encode_name(exchange.trim(), &mut buf).ok()?;
            Some(buf)
        }

        RecordType::TXT => {
            let text = data
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(data);
            let bytes = text.as_bytes();
            if bytes.is_empty() {
                return Some(vec![0x00]);
            }
            let mut buf = Vec::with_capacity(bytes.len() + bytes.len() / TXT_SEGMENT_LEN + 1);
            for segment in bytes.chunks(TXT_SEGMENT_LEN) {
                buf.push(segment.len() as u8);
                buf.extend_from_slice(segment);
            }
            Some(buf)
        }

        _ => None,
    }
}
