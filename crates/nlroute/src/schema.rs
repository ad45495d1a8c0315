//! Declarative attribute schemas and the generic message decoder.
//!
//! Each wire message kind declares a [`Schema`]: a fixed-header copier
//! plus a table of [`AttrRule`]s mapping attribute kinds to typed
//! setters on the target record. One generic interpreter walks the
//! attribute list against the table, so adding a field to a message is
//! a one-line table entry rather than a new match arm.
//!
//! Decode contract: unknown attribute kinds are ignored; a failing
//! rule (length/type mismatch) rejects the whole message so no partial
//! record escapes.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::attr::{AttrIter, nla_align};
use super::error::{Error, Result};
use super::types::af;

/// One attribute decode rule: wire attribute kind -> typed setter.
pub struct AttrRule<R> {
    /// Attribute kind (RTA_*/IFLA_*/RTAX_* value).
    pub kind: u16,
    /// Setter: validates the payload and writes the field.
    pub decode: fn(&mut R, &[u8]) -> Result<()>,
}

/// Schema for one message kind.
///
/// The record type is `'static` because rule tables live in statics.
pub struct Schema<R: 'static> {
    /// Copies fixed header fields into the record; returns the header
    /// size consumed from the front of the payload.
    pub header: fn(&mut R, &[u8]) -> Result<usize>,
    /// Attribute rule table.
    pub attrs: &'static [AttrRule<R>],
}

impl<R: 'static> Schema<R> {
    /// Decode one message payload into a fresh record.
    pub fn decode(&self, payload: &[u8]) -> Result<R>
    where
        R: Default,
    {
        let mut record = R::default();
        self.decode_into(payload, &mut record)?;
        Ok(record)
    }

    /// Decode one message payload into an existing record.
    ///
    /// Used directly for nested sub-records that must be seeded with
    /// context (e.g. the address family) before decoding.
    pub fn decode_into(&self, payload: &[u8], record: &mut R) -> Result<()> {
        let consumed = (self.header)(record, payload)?;
        let consumed = nla_align(consumed);
        if consumed > payload.len() {
            return Err(Error::Truncated {
                expected: consumed,
                actual: payload.len(),
            });
        }
        for (kind, data) in AttrIter::new(&payload[consumed..]) {
            if let Some(rule) = self.attrs.iter().find(|r| r.kind == kind) {
                (rule.decode)(record, data)?;
            }
        }
        Ok(())
    }
}

/// Header copier for attribute-only blobs (nested metrics and the
/// like): consumes nothing.
pub fn no_header<R>(_record: &mut R, _payload: &[u8]) -> Result<usize> {
    Ok(0)
}

/// Decode an IP address payload for the given address family,
/// validating the payload width.
pub fn ip_addr(data: &[u8], family: u8) -> Result<IpAddr> {
    match family {
        af::INET => {
            let octets: [u8; 4] = data.try_into().map_err(|_| {
                Error::InvalidAttribute(format!("IPv4 address of {} bytes", data.len()))
            })?;
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        af::INET6 => {
            let octets: [u8; 16] = data.try_into().map_err(|_| {
                Error::InvalidAttribute(format!("IPv6 address of {} bytes", data.len()))
            })?;
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        other => Err(Error::InvalidAttribute(format!(
            "address for unknown family {}",
            other
        ))),
    }
}

/// Decode an RTA_VIA payload: a one-byte family selector followed by
/// the address in that family, which may differ from the route's own.
pub fn ip_via(data: &[u8]) -> Result<IpAddr> {
    let (family, addr) = data
        .split_first()
        .ok_or_else(|| Error::InvalidAttribute("empty via attribute".into()))?;
    ip_addr(addr, *family)
}
