//! RTM_NEWROUTE decoding: route records, multipath next-hops and the
//! merged per-next-hop view.

use std::net::IpAddr;

use crate::attr::{AttrIter, get};
use crate::error::{Error, Result};
use crate::schema::{AttrRule, Schema, ip_addr, ip_via};
use crate::types::{RtMsg, RtNextHop, af, rta, rtax, rtnh_align};

/// One decoded route from a route dump.
///
/// A multipath route carries its next-hops in `hops`; a plain route
/// has an empty `hops` and its forwarding fields at the top level.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteRecord {
    /// Address family of the destination.
    pub family: u8,
    /// Destination prefix length.
    pub plen: u8,
    /// Route type (RTN_*).
    pub rtype: u8,
    /// Routing protocol (RTPROT_*).
    pub protocol: u8,
    /// Routing table ID (RTA_TABLE if present, else the header byte).
    pub table: u32,
    /// Destination prefix address; None for the default route.
    pub dst: Option<IpAddr>,
    /// Gateway address (RTA_GATEWAY or RTA_VIA).
    pub gateway: Option<IpAddr>,
    /// Output interface index.
    pub oif: u32,
    /// Path MTU (RTAX_MTU under RTA_METRICS), 0 if unset.
    pub mtu: u32,
    /// Classic RTF_* flag word.
    pub rtflags: u32,
    /// Kernel next-hop object ID.
    pub knh_id: u32,
    /// Seconds until expiry, 0 if the route does not expire.
    pub expires: u32,
    /// Multipath next-hops, empty for single-path routes.
    pub hops: Vec<NextHop>,
}

/// One next-hop of a multipath route.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NextHop {
    /// Address family, seeded from the parent route so gateway
    /// attributes decode with the right width.
    pub family: u8,
    /// Gateway address for this hop.
    pub gateway: Option<IpAddr>,
    /// Output interface index for this hop.
    pub oif: u32,
    /// Relative weight (raw rtnh_hops byte).
    pub weight: u8,
    /// Next-hop flags (RTNH_F_*).
    pub flags: u8,
    /// Per-hop path MTU, 0 if unset.
    pub mtu: u32,
    /// Per-hop RTF_* flag word.
    pub rtflags: u32,
    /// Per-hop kernel next-hop object ID.
    pub knh_id: u32,
}

/// Extract RTAX_MTU from a nested RTA_METRICS attribute list.
fn metrics_mtu(data: &[u8]) -> Result<u32> {
    let mut mtu = 0;
    for (kind, payload) in AttrIter::new(data) {
        if kind == rtax::MTU {
            mtu = get::u32_ne(payload)?;
        }
    }
    Ok(mtu)
}

fn route_header(r: &mut RouteRecord, data: &[u8]) -> Result<usize> {
    let rtm = RtMsg::from_bytes(data)?;
    let max_plen = match rtm.rtm_family {
        af::INET6 => 128,
        _ => 32,
    };
    if rtm.rtm_dst_len > max_plen {
        return Err(Error::InvalidMessage(format!(
            "prefix length {} for family {}",
            rtm.rtm_dst_len, rtm.rtm_family
        )));
    }
    r.family = rtm.rtm_family;
    r.plen = rtm.rtm_dst_len;
    r.rtype = rtm.rtm_type;
    r.protocol = rtm.rtm_protocol;
    r.table = rtm.rtm_table as u32;
    Ok(RtMsg::SIZE)
}

fn route_dst(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.dst = Some(ip_addr(data, r.family)?);
    Ok(())
}

fn route_oif(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.oif = get::u32_ne(data)?;
    Ok(())
}

fn route_gateway(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.gateway = Some(ip_addr(data, r.family)?);
    Ok(())
}

fn route_via(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.gateway = Some(ip_via(data)?);
    Ok(())
}

fn route_metrics(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.mtu = metrics_mtu(data)?;
    Ok(())
}

fn route_multipath(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.hops = parse_multipath(r.family, data)?;
    Ok(())
}

fn route_table(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.table = get::u32_ne(data)?;
    Ok(())
}

fn route_expires(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.expires = get::u32_ne(data)?;
    Ok(())
}

fn route_knh_id(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.knh_id = get::u32_ne(data)?;
    Ok(())
}

fn route_rtflags(r: &mut RouteRecord, data: &[u8]) -> Result<()> {
    r.rtflags = get::u32_ne(data)?;
    Ok(())
}

/// Schema for RTM_NEWROUTE payloads.
pub static ROUTE_SCHEMA: Schema<RouteRecord> = Schema {
    header: route_header,
    attrs: &[
        AttrRule {
            kind: rta::DST,
            decode: route_dst,
        },
        AttrRule {
            kind: rta::OIF,
            decode: route_oif,
        },
        AttrRule {
            kind: rta::GATEWAY,
            decode: route_gateway,
        },
        AttrRule {
            kind: rta::METRICS,
            decode: route_metrics,
        },
        AttrRule {
            kind: rta::MULTIPATH,
            decode: route_multipath,
        },
        AttrRule {
            kind: rta::TABLE,
            decode: route_table,
        },
        AttrRule {
            kind: rta::VIA,
            decode: route_via,
        },
        AttrRule {
            kind: rta::EXPIRES,
            decode: route_expires,
        },
        AttrRule {
            kind: rta::KNH_ID,
            decode: route_knh_id,
        },
        AttrRule {
            kind: rta::RTFLAGS,
            decode: route_rtflags,
        },
    ],
};

fn nexthop_header(h: &mut NextHop, data: &[u8]) -> Result<usize> {
    let rtnh = RtNextHop::from_bytes(data)?;
    h.flags = rtnh.rtnh_flags;
    h.weight = rtnh.rtnh_hops;
    h.oif = rtnh.rtnh_ifindex as u32;
    Ok(RtNextHop::SIZE)
}

fn nexthop_gateway(h: &mut NextHop, data: &[u8]) -> Result<()> {
    h.gateway = Some(ip_addr(data, h.family)?);
    Ok(())
}

fn nexthop_via(h: &mut NextHop, data: &[u8]) -> Result<()> {
    h.gateway = Some(ip_via(data)?);
    Ok(())
}

fn nexthop_metrics(h: &mut NextHop, data: &[u8]) -> Result<()> {
    h.mtu = metrics_mtu(data)?;
    Ok(())
}

fn nexthop_knh_id(h: &mut NextHop, data: &[u8]) -> Result<()> {
    h.knh_id = get::u32_ne(data)?;
    Ok(())
}

fn nexthop_rtflags(h: &mut NextHop, data: &[u8]) -> Result<()> {
    h.rtflags = get::u32_ne(data)?;
    Ok(())
}

/// Schema for one rtnexthop sub-record (header plus nested attributes).
pub static NEXTHOP_SCHEMA: Schema<NextHop> = Schema {
    header: nexthop_header,
    attrs: &[
        AttrRule {
            kind: rta::GATEWAY,
            decode: nexthop_gateway,
        },
        AttrRule {
            kind: rta::METRICS,
            decode: nexthop_metrics,
        },
        AttrRule {
            kind: rta::VIA,
            decode: nexthop_via,
        },
        AttrRule {
            kind: rta::KNH_ID,
            decode: nexthop_knh_id,
        },
        AttrRule {
            kind: rta::RTFLAGS,
            decode: nexthop_rtflags,
        },
    ],
};

/// Parse an RTA_MULTIPATH payload into its next-hop sub-records.
///
/// The sub-records must tile the payload exactly: each advances by its
/// aligned `rtnh_len`, and the walk must land on the payload end with
/// at least one hop parsed. Anything else is a malformed attribute and
/// rejects the containing route.
pub fn parse_multipath(family: u8, data: &[u8]) -> Result<Vec<NextHop>> {
    let mut hops = Vec::with_capacity(data.len() / RtNextHop::SIZE + 1);
    let mut consumed = 0;

    while consumed < data.len() {
        let rest = &data[consumed..];
        if rest.len() < RtNextHop::SIZE {
            return Err(Error::MultipathIntegrity(format!(
                "{}-byte tail shorter than a next-hop header",
                rest.len()
            )));
        }
        let rtnh = RtNextHop::from_bytes(rest)?;
        let len = rtnh.rtnh_len as usize;
        if len < RtNextHop::SIZE || len > rest.len() {
            return Err(Error::MultipathIntegrity(format!(
                "next-hop length {} outside [{}, {}]",
                len,
                RtNextHop::SIZE,
                rest.len()
            )));
        }

        let mut hop = NextHop {
            family,
            ..Default::default()
        };
        NEXTHOP_SCHEMA.decode_into(&rest[..len], &mut hop)?;
        hops.push(hop);

        consumed += rtnh_align(len);
    }

    if consumed != data.len() || hops.is_empty() {
        return Err(Error::MultipathIntegrity(format!(
            "{} hops covering {} of {} bytes",
            hops.len(),
            consumed,
            data.len()
        )));
    }
    Ok(hops)
}

impl RouteRecord {
    /// Decode one RTM_NEWROUTE payload.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        ROUTE_SCHEMA.decode(payload)
    }

    /// Iterate the printable views of this route: one per next-hop for
    /// a multipath route, or a single view of the route itself.
    pub fn views(&self) -> impl Iterator<Item = RouteView<'_>> {
        let count = self.hops.len().max(1);
        (0..count).map(move |i| RouteView {
            route: self,
            hop: self.hops.get(i),
        })
    }
}

/// A printable route row: either a plain route, or one next-hop of a
/// multipath route merged over the parent.
///
/// Forwarding fields resolve per field: the next-hop's value when it
/// carries one, else the parent route's.
#[derive(Debug, Clone, Copy)]
pub struct RouteView<'a> {
    route: &'a RouteRecord,
    hop: Option<&'a NextHop>,
}

impl<'a> RouteView<'a> {
    pub fn family(&self) -> u8 {
        self.route.family
    }

    pub fn plen(&self) -> u8 {
        self.route.plen
    }

    pub fn dst(&self) -> Option<IpAddr> {
        self.route.dst
    }

    pub fn table(&self) -> u32 {
        self.route.table
    }

    pub fn expires(&self) -> u32 {
        self.route.expires
    }

    pub fn gateway(&self) -> Option<IpAddr> {
        self.hop
            .and_then(|h| h.gateway)
            .or(self.route.gateway)
    }

    pub fn oif(&self) -> u32 {
        match self.hop {
            Some(h) if h.oif != 0 => h.oif,
            _ => self.route.oif,
        }
    }

    pub fn mtu(&self) -> u32 {
        match self.hop {
            Some(h) if h.mtu != 0 => h.mtu,
            _ => self.route.mtu,
        }
    }

    pub fn rtflags(&self) -> u32 {
        match self.hop {
            Some(h) if h.rtflags != 0 => h.rtflags,
            _ => self.route.rtflags,
        }
    }

    pub fn knh_id(&self) -> u32 {
        match self.hop {
            Some(h) if h.knh_id != 0 => h.knh_id,
            _ => self.route.knh_id,
        }
    }

    /// Next-hop weight; only present for multipath rows.
    pub fn weight(&self) -> Option<u8> {
        self.hop.map(|h| h.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::types::{af, rtf};

    #[test]
    fn test_decode_simple_route() {
        let payload = fixtures::route_payload_v4(
            Some([192, 168, 1, 0]),
            24,
            Some([10, 0, 0, 1]),
            2,
            rtf::UP | rtf::GATEWAY | rtf::STATIC,
        );
        let route = RouteRecord::decode(&payload).unwrap();
        assert_eq!(route.family, af::INET);
        assert_eq!(route.plen, 24);
        assert_eq!(route.dst, Some("192.168.1.0".parse().unwrap()));
        assert_eq!(route.gateway, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(route.oif, 2);
        assert_eq!(route.rtflags, rtf::UP | rtf::GATEWAY | rtf::STATIC);
        assert!(route.hops.is_empty());
    }

    #[test]
    fn test_decode_default_route() {
        let payload =
            fixtures::route_payload_v4(None, 0, Some([10, 0, 0, 1]), 2, rtf::UP | rtf::GATEWAY);
        let route = RouteRecord::decode(&payload).unwrap();
        assert_eq!(route.plen, 0);
        assert_eq!(route.dst, None);
    }

    #[test]
    fn test_oversized_prefix_rejected() {
        let mut payload = fixtures::route_payload_v4(Some([10, 0, 0, 0]), 24, None, 2, rtf::UP);
        payload[1] = 40; // rtm_dst_len beyond 32
        let err = RouteRecord::decode(&payload).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_metrics_mtu_extracted() {
        let mut payload = fixtures::route_payload_v4(
            Some([10, 1, 0, 0]),
            16,
            None,
            3,
            rtf::UP | rtf::FIXEDMTU,
        );
        // RTA_METRICS { RTAX_MTU = 1400 }
        payload.extend_from_slice(&[0x0c, 0x00, 0x08, 0x00]);
        payload.extend_from_slice(&[0x08, 0x00, 0x02, 0x00]);
        payload.extend_from_slice(&1400u32.to_ne_bytes());
        let route = RouteRecord::decode(&payload).unwrap();
        assert_eq!(route.mtu, 1400);
    }

    #[test]
    fn test_multipath_exact_tiling() {
        let hop1 = fixtures::nexthop(8, 1, Some([10, 0, 0, 1]), 0);
        let hop2 = fixtures::nexthop(8, 3, Some([10, 0, 0, 2]), 0);
        let mut data = hop1.clone();
        data.extend_from_slice(&hop2);

        let hops = parse_multipath(af::INET, &data).unwrap();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].oif, 8);
        assert_eq!(hops[0].weight, 1);
        assert_eq!(hops[0].gateway, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(hops[1].weight, 3);

        // A trailing byte breaks the exact-cover requirement.
        data.push(0);
        let err = parse_multipath(af::INET, &data).unwrap_err();
        assert!(matches!(err, Error::MultipathIntegrity(_)));
    }

    #[test]
    fn test_multipath_empty_rejected() {
        let err = parse_multipath(af::INET, &[]).unwrap_err();
        assert!(matches!(err, Error::MultipathIntegrity(_)));
    }

    #[test]
    fn test_multipath_short_nexthop_rejected() {
        // rtnh_len below the fixed header size.
        let mut data = vec![0u8; 8];
        data[0] = 4;
        let err = parse_multipath(af::INET, &data).unwrap_err();
        assert!(matches!(err, Error::MultipathIntegrity(_)));
    }

    #[test]
    fn test_view_per_field_fallback() {
        let route = RouteRecord {
            family: af::INET,
            plen: 24,
            dst: Some("10.2.0.0".parse().unwrap()),
            gateway: Some("10.0.0.254".parse().unwrap()),
            oif: 7,
            mtu: 9000,
            rtflags: rtf::UP | rtf::GATEWAY,
            hops: vec![NextHop {
                family: af::INET,
                gateway: None, // falls back to parent
                oif: 3,        // overrides parent
                weight: 2,
                ..Default::default()
            }],
            ..Default::default()
        };

        let views: Vec<_> = route.views().collect();
        assert_eq!(views.len(), 1);
        let v = &views[0];
        assert_eq!(v.gateway(), Some("10.0.0.254".parse().unwrap()));
        assert_eq!(v.oif(), 3);
        assert_eq!(v.mtu(), 9000);
        assert_eq!(v.rtflags(), rtf::UP | rtf::GATEWAY);
        assert_eq!(v.weight(), Some(2));
    }

    #[test]
    fn test_singlepath_view() {
        let route = RouteRecord {
            family: af::INET,
            oif: 7,
            ..Default::default()
        };
        let views: Vec<_> = route.views().collect();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].oif(), 7);
        assert_eq!(views[0].weight(), None);
    }
}
