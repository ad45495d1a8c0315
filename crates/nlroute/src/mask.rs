//! Netmask generation from prefix lengths.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{Error, Result};
use crate::types::af;

/// Build an IPv4 netmask from a prefix length (0..=32).
pub fn v4(plen: u8) -> Result<Ipv4Addr> {
    if plen > 32 {
        return Err(Error::InvalidMessage(format!(
            "IPv4 prefix length {plen}"
        )));
    }
    let bits = if plen == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(plen))
    };
    Ok(Ipv4Addr::from(bits))
}

/// Build an IPv6 netmask from a prefix length (0..=128).
pub fn v6(plen: u8) -> Result<Ipv6Addr> {
    if plen > 128 {
        return Err(Error::InvalidMessage(format!(
            "IPv6 prefix length {plen}"
        )));
    }
    let bits = if plen == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(plen))
    };
    Ok(Ipv6Addr::from(bits))
}

/// Mask an address down to its network prefix.
pub fn apply(addr: IpAddr, plen: u8) -> Result<IpAddr> {
    match addr {
        IpAddr::V4(a) => {
            let masked = u32::from(a) & u32::from(v4(plen)?);
            Ok(IpAddr::V4(Ipv4Addr::from(masked)))
        }
        IpAddr::V6(a) => {
            let masked = u128::from(a) & u128::from(v6(plen)?);
            Ok(IpAddr::V6(Ipv6Addr::from(masked)))
        }
    }
}

/// Build a netmask for the given address family.
pub fn for_family(family: u8, plen: u8) -> Result<IpAddr> {
    match family {
        af::INET => Ok(IpAddr::V4(v4(plen)?)),
        af::INET6 => Ok(IpAddr::V6(v6(plen)?)),
        other => Err(Error::InvalidMessage(format!(
            "netmask for unknown family {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v4_masks() {
        assert_eq!(v4(0).unwrap(), Ipv4Addr::new(0, 0, 0, 0));
        assert_eq!(v4(8).unwrap(), Ipv4Addr::new(255, 0, 0, 0));
        assert_eq!(v4(24).unwrap(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(v4(31).unwrap(), Ipv4Addr::new(255, 255, 255, 254));
        assert_eq!(v4(32).unwrap(), Ipv4Addr::new(255, 255, 255, 255));
        assert!(v4(33).is_err());
    }

    #[test]
    fn test_v4_contiguous_high_bits() {
        for plen in 0..=32u8 {
            let mask = u32::from(v4(plen).unwrap());
            assert_eq!(mask.leading_ones(), u32::from(plen), "plen {plen}");
            assert_eq!(
                mask.count_ones(),
                u32::from(plen),
                "mask must be contiguous for plen {plen}"
            );
        }
    }

    #[test]
    fn test_v6_masks() {
        assert_eq!(v6(0).unwrap(), Ipv6Addr::UNSPECIFIED);
        assert_eq!(v6(64).unwrap(), "ffff:ffff:ffff:ffff::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(
            v6(128).unwrap(),
            "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff".parse::<Ipv6Addr>().unwrap()
        );
        assert!(v6(129).is_err());
    }

    #[test]
    fn test_v6_contiguous_high_bits() {
        for plen in 0..=128u8 {
            let mask = u128::from_be_bytes(v6(plen).unwrap().octets());
            assert_eq!(mask.leading_ones(), u32::from(plen), "plen {plen}");
            assert_eq!(mask.count_ones(), u32::from(plen));
        }
    }

    #[test]
    fn test_apply() {
        let addr: IpAddr = "192.168.1.77".parse().unwrap();
        assert_eq!(apply(addr, 24).unwrap(), "192.168.1.0".parse::<IpAddr>().unwrap());
        assert_eq!(apply(addr, 32).unwrap(), addr);
        let v6: IpAddr = "fd00::1234:5678".parse().unwrap();
        assert_eq!(apply(v6, 64).unwrap(), "fd00::".parse::<IpAddr>().unwrap());
        assert!(apply(addr, 40).is_err());
    }

    #[test]
    fn test_for_family() {
        assert!(for_family(af::INET, 24).unwrap().is_ipv4());
        assert!(for_family(af::INET6, 64).unwrap().is_ipv6());
        assert!(for_family(af::UNSPEC, 0).is_err());
    }
}
