//! Fixed-size rtnetlink headers and wire constants.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::error::{Error, Result};

/// Address families.
pub mod af {
    pub const UNSPEC: u8 = 0;
    pub const INET: u8 = 2;
    pub const INET6: u8 = 10;
}

/// Link attributes (IFLA_*).
pub mod ifla {
    pub const IFNAME: u16 = 3;
    pub const MTU: u16 = 4;
}

/// Route attributes (RTA_*).
pub mod rta {
    pub const DST: u16 = 1;
    pub const OIF: u16 = 4;
    pub const GATEWAY: u16 = 5;
    pub const METRICS: u16 = 8;
    pub const MULTIPATH: u16 = 9;
    pub const TABLE: u16 = 15;
    pub const VIA: u16 = 18;
    pub const EXPIRES: u16 = 23;

    // OS-specific route attributes (base 512): kernel next-hop id and
    // the classic RTF_* flag word carried alongside the route.
    pub const KNH_ID: u16 = 512;
    pub const RTFLAGS: u16 = 514;
}

/// Route metrics attributes (RTAX_*), nested under RTA_METRICS.
pub mod rtax {
    pub const MTU: u16 = 2;
}

/// Classic route flags (RTF_*), as carried by the RTA_RTFLAGS word.
pub mod rtf {
    pub const UP: u32 = 0x1;
    pub const GATEWAY: u32 = 0x2;
    pub const HOST: u32 = 0x4;
    pub const REJECT: u32 = 0x8;
    pub const DYNAMIC: u32 = 0x10;
    pub const STATIC: u32 = 0x800;
    pub const BLACKHOLE: u32 = 0x1000;
    pub const PROTO2: u32 = 0x4000;
    pub const PROTO1: u32 = 0x8000;
    pub const PROTO3: u32 = 0x40000;
    pub const FIXEDMTU: u32 = 0x80000;
    pub const PINNED: u32 = 0x100000;
}

/// Link message header (mirrors struct ifinfomsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct IfInfoMsg {
    /// Address family (AF_UNSPEC).
    pub ifi_family: u8,
    /// Padding.
    pub _pad: u8,
    /// Device type (ARPHRD_*).
    pub ifi_type: u16,
    /// Interface index.
    pub ifi_index: i32,
    /// Device flags (IFF_*).
    pub ifi_flags: u32,
    /// Change mask.
    pub ifi_change: u32,
}

impl IfInfoMsg {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Parse from the start of a message payload.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }
}

/// Route message header (mirrors struct rtmsg).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtMsg {
    /// Address family.
    pub rtm_family: u8,
    /// Destination prefix length.
    pub rtm_dst_len: u8,
    /// Source prefix length.
    pub rtm_src_len: u8,
    /// TOS filter.
    pub rtm_tos: u8,
    /// Routing table ID.
    pub rtm_table: u8,
    /// Routing protocol (RTPROT_*).
    pub rtm_protocol: u8,
    /// Route scope (RT_SCOPE_*).
    pub rtm_scope: u8,
    /// Route type (RTN_*).
    pub rtm_type: u8,
    /// Route flags.
    pub rtm_flags: u32,
}

impl RtMsg {
    /// Size of this structure.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Parse from the start of a message payload.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }
}

/// Multipath next-hop sub-record header (mirrors struct rtnexthop).
///
/// Each sub-record is `rtnh_len` bytes (header plus its own attribute
/// list) and is aligned to [`RTNH_ALIGNTO`] independently of the
/// enclosing attribute container.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
pub struct RtNextHop {
    /// Length of this sub-record including nested attributes.
    pub rtnh_len: u16,
    /// Next-hop flags (RTNH_F_*).
    pub rtnh_flags: u8,
    /// Next-hop weight.
    pub rtnh_hops: u8,
    /// Output interface index.
    pub rtnh_ifindex: i32,
}

/// Next-hop record alignment unit.
pub const RTNH_ALIGNTO: usize = 4;

/// Align a next-hop record length to RTNH_ALIGNTO.
#[inline]
pub const fn rtnh_align(len: usize) -> usize {
    (len + RTNH_ALIGNTO - 1) & !(RTNH_ALIGNTO - 1)
}

impl RtNextHop {
    /// Size of the fixed header alone.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Parse from the start of a sub-record.
    pub fn from_bytes(data: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: Self::SIZE,
                actual: data.len(),
            })
    }
}
