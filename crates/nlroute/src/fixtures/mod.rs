//! Hand-built wire messages for decoder and printer tests.

use crate::attr::{NLA_HDRLEN, nla_align};
use crate::message::{NLMSG_HDRLEN, nlmsg_align};
use crate::types::{IfInfoMsg, RtMsg, RtNextHop, af, ifla, rta};
use zerocopy::IntoBytes;

/// Build one netlink attribute (header + payload + pad).
pub fn attr(kind: u16, data: &[u8]) -> Vec<u8> {
    let len = NLA_HDRLEN + data.len();
    let mut buf = Vec::with_capacity(nla_align(len));
    buf.extend_from_slice(&(len as u16).to_ne_bytes());
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(data);
    buf.resize(nla_align(len), 0);
    buf
}

/// Frame a payload as one complete netlink message.
pub fn frame(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
    let len = NLMSG_HDRLEN + payload.len();
    let mut buf = Vec::with_capacity(nlmsg_align(len));
    buf.extend_from_slice(&(len as u32).to_ne_bytes());
    buf.extend_from_slice(&msg_type.to_ne_bytes());
    buf.extend_from_slice(&0u16.to_ne_bytes()); // flags
    buf.extend_from_slice(&seq.to_ne_bytes());
    buf.extend_from_slice(&0u32.to_ne_bytes()); // pid
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(len), 0);
    buf
}

/// RTM_NEWLINK payload: ifinfomsg + IFLA_IFNAME + IFLA_MTU.
pub fn link_payload(index: i32, name: &str, mtu: u32) -> Vec<u8> {
    let ifi = IfInfoMsg {
        ifi_index: index,
        ..Default::default()
    };
    let mut buf = ifi.as_bytes().to_vec();
    let mut name_z = name.as_bytes().to_vec();
    name_z.push(0);
    buf.extend(attr(ifla::IFNAME, &name_z));
    buf.extend(attr(ifla::MTU, &mtu.to_ne_bytes()));
    buf
}

/// RTM_NEWROUTE payload for an IPv4 route.
pub fn route_payload_v4(
    dst: Option<[u8; 4]>,
    plen: u8,
    gateway: Option<[u8; 4]>,
    oif: u32,
    rtflags: u32,
) -> Vec<u8> {
    let rtm = RtMsg {
        rtm_family: af::INET,
        rtm_dst_len: plen,
        rtm_table: 254,
        ..Default::default()
    };
    let mut buf = rtm.as_bytes().to_vec();
    if let Some(d) = dst {
        buf.extend(attr(rta::DST, &d));
    }
    if let Some(g) = gateway {
        buf.extend(attr(rta::GATEWAY, &g));
    }
    if oif != 0 {
        buf.extend(attr(rta::OIF, &oif.to_ne_bytes()));
    }
    if rtflags != 0 {
        buf.extend(attr(rta::RTFLAGS, &rtflags.to_ne_bytes()));
    }
    buf
}

/// RTM_NEWROUTE payload for an IPv6 route.
pub fn route_payload_v6(
    dst: Option<[u8; 16]>,
    plen: u8,
    gateway: Option<[u8; 16]>,
    oif: u32,
    rtflags: u32,
) -> Vec<u8> {
    let rtm = RtMsg {
        rtm_family: af::INET6,
        rtm_dst_len: plen,
        rtm_table: 254,
        ..Default::default()
    };
    let mut buf = rtm.as_bytes().to_vec();
    if let Some(d) = dst {
        buf.extend(attr(rta::DST, &d));
    }
    if let Some(g) = gateway {
        buf.extend(attr(rta::GATEWAY, &g));
    }
    if oif != 0 {
        buf.extend(attr(rta::OIF, &oif.to_ne_bytes()));
    }
    if rtflags != 0 {
        buf.extend(attr(rta::RTFLAGS, &rtflags.to_ne_bytes()));
    }
    buf
}

/// One rtnexthop sub-record with optional nested gateway and flags.
pub fn nexthop(oif: i32, weight: u8, gateway: Option<[u8; 4]>, rtflags: u32) -> Vec<u8> {
    let mut nested = Vec::new();
    if let Some(g) = gateway {
        nested.extend(attr(rta::GATEWAY, &g));
    }
    if rtflags != 0 {
        nested.extend(attr(rta::RTFLAGS, &rtflags.to_ne_bytes()));
    }

    let len = RtNextHop::SIZE + nested.len();
    let mut buf = Vec::with_capacity(len);
    buf.extend_from_slice(&(len as u16).to_ne_bytes());
    buf.push(0); // rtnh_flags
    buf.push(weight);
    buf.extend_from_slice(&oif.to_ne_bytes());
    buf.extend(nested);
    buf
}
