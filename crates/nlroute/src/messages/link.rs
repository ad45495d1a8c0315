//! RTM_NEWLINK decoding: interface index, name and MTU.

use crate::attr::get;
use crate::error::Result;
use crate::schema::{AttrRule, Schema};
use crate::types::{IfInfoMsg, ifla};

/// One decoded interface from a link dump.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkRecord {
    /// Interface index.
    pub index: i32,
    /// Interface name (IFLA_IFNAME).
    pub name: String,
    /// Interface MTU (IFLA_MTU), 0 if absent.
    pub mtu: u32,
}

fn link_header(r: &mut LinkRecord, data: &[u8]) -> Result<usize> {
    let ifi = IfInfoMsg::from_bytes(data)?;
    r.index = ifi.ifi_index;
    Ok(IfInfoMsg::SIZE)
}

fn link_name(r: &mut LinkRecord, data: &[u8]) -> Result<()> {
    r.name = get::string(data)?.to_string();
    Ok(())
}

fn link_mtu(r: &mut LinkRecord, data: &[u8]) -> Result<()> {
    r.mtu = get::u32_ne(data)?;
    Ok(())
}

/// Schema for RTM_NEWLINK payloads.
pub static LINK_SCHEMA: Schema<LinkRecord> = Schema {
    header: link_header,
    attrs: &[
        AttrRule {
            kind: ifla::IFNAME,
            decode: link_name,
        },
        AttrRule {
            kind: ifla::MTU,
            decode: link_mtu,
        },
    ],
};

impl LinkRecord {
    /// Decode one RTM_NEWLINK payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        LINK_SCHEMA.decode(payload)
    }
}
