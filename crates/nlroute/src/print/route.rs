//! Formatting of a single route row.

use std::io::Write;

use crate::error::Result;
use crate::ifmap::IfMap;
use crate::mask;
use crate::messages::route::RouteView;
use crate::output::Emitter;
use crate::types::{af, rtf};

/// Flag bits in display order, with their single-letter codes.
const FLAG_BITS: &[(u32, char)] = &[
    (rtf::UP, 'U'),
    (rtf::GATEWAY, 'G'),
    (rtf::HOST, 'H'),
    (rtf::REJECT, 'R'),
    (rtf::DYNAMIC, 'D'),
    (rtf::STATIC, 'S'),
    (rtf::BLACKHOLE, 'B'),
    (rtf::PROTO2, '2'),
    (rtf::PROTO1, '1'),
    (rtf::PROTO3, '3'),
    (rtf::FIXEDMTU, 'M'),
    (rtf::PINNED, 'P'),
];

/// Render a flag word as its letter string.
pub fn fmt_flags(flags: u32) -> String {
    FLAG_BITS
        .iter()
        .filter(|(bit, _)| flags & bit != 0)
        .map(|&(_, letter)| letter)
        .collect()
}

/// Column widths for one family section.
#[derive(Debug, Clone, Copy)]
pub struct Widths {
    pub dst: usize,
    pub gw: usize,
    pub flags: usize,
    pub nhop: usize,
    pub mtu: usize,
    pub iface: usize,
    pub expire: usize,
}

impl Widths {
    /// IPv6 addresses need wider destination and gateway columns.
    pub fn for_family(family: u8) -> Self {
        let (dst, gw, iface) = match family {
            af::INET6 => (33, 29, 8),
            _ => (18, 18, 6),
        };
        Self {
            dst,
            gw,
            flags: 6,
            nhop: 8,
            mtu: 6,
            iface,
            expire: 6,
        }
    }
}

/// Render the destination column: `default` for the all-zero prefix,
/// a bare address for host routes, `addr/plen` otherwise.
pub fn fmt_dst(view: &RouteView<'_>) -> String {
    if view.plen() == 0 {
        return "default".to_string();
    }
    let host_plen = if view.family() == af::INET6 { 128 } else { 32 };
    let dst = match view.dst() {
        // The kernel is not obliged to zero host bits; mask them off.
        Some(addr) => mask::apply(addr, view.plen()).unwrap_or(addr).to_string(),
        None => {
            if view.family() == af::INET6 {
                "::".to_string()
            } else {
                "0.0.0.0".to_string()
            }
        }
    };
    if view.plen() == host_plen {
        dst
    } else {
        format!("{}/{}", dst, view.plen())
    }
}

/// Render the gateway column: the gateway address, or a `link#N`
/// placeholder for directly connected routes.
pub fn fmt_gateway(view: &RouteView<'_>) -> String {
    match view.gateway() {
        Some(addr) => addr.to_string(),
        None => format!("link#{}", view.oif()),
    }
}

/// Emit one route row: a text line and the matching JSON fields.
///
/// The caller brackets this in a `rt-entry` list instance.
pub fn print_row<W: Write>(
    out: &mut Emitter<W>,
    view: &RouteView<'_>,
    ifmap: &IfMap,
    widths: &Widths,
    wide: bool,
) -> Result<()> {
    let dst = fmt_dst(view);
    let gateway = fmt_gateway(view);
    let flags = fmt_flags(view.rtflags() | rtf::UP);

    let mut iface = ifmap.name(view.oif()).unwrap_or("---").to_string();
    // Fit the name to its column in narrow mode; wide mode keeps it
    // whole. Names are UTF-8, so cut on a character boundary.
    if !wide {
        if let Some((idx, _)) = iface.char_indices().nth(widths.iface) {
            iface.truncate(idx);
        }
    }

    out.field_str("destination", &dst)?;
    out.field_str("gateway", &gateway)?;
    out.field_str("flags", &flags)?;
    out.field_str("interface-name", &iface)?;

    let mut line = format!(
        "{:<dw$} {:<gw$} {:<fw$} ",
        dst,
        gateway,
        flags,
        dw = widths.dst,
        gw = widths.gw,
        fw = widths.flags,
    );

    if wide {
        // A route without its own path MTU inherits the interface MTU;
        // if that is unknown too the column stays blank.
        let mtu = if view.mtu() != 0 {
            view.mtu()
        } else {
            ifmap.mtu(view.oif())
        };
        out.field_u32("nhop", view.knh_id())?;
        let mtu_col = if mtu != 0 {
            out.field_u32("mtu", mtu)?;
            mtu.to_string()
        } else {
            String::new()
        };
        line.push_str(&format!(
            "{:>nw$} {:>mw$} ",
            view.knh_id(),
            mtu_col,
            nw = widths.nhop,
            mw = widths.mtu,
        ));
    }

    line.push_str(&format!("{:<iw$}", iface, iw = widths.iface));

    if view.expires() > 0 {
        out.field_u32("expire-time", view.expires())?;
        line.push_str(&format!("{:>ew$}", view.expires(), ew = widths.expire));
    }

    // Weight is carried in the structured output only; single-path
    // rows report 0.
    out.field_u32("weight", u32::from(view.weight().unwrap_or(0)))?;

    while line.ends_with(' ') {
        line.pop();
    }
    line.push('\n');
    out.text(&line)
}

/// Emit the column header line for one family section.
pub fn print_header<W: Write>(out: &mut Emitter<W>, widths: &Widths, wide: bool) -> Result<()> {
    let mut line = format!(
        "{:<dw$} {:<gw$} {:<fw$} ",
        "Destination",
        "Gateway",
        "Flags",
        dw = widths.dst,
        gw = widths.gw,
        fw = widths.flags,
    );
    if wide {
        line.push_str(&format!(
            "{:>nw$} {:>mw$} ",
            "Nhop#",
            "Mtu",
            nw = widths.nhop,
            mw = widths.mtu,
        ));
    }
    line.push_str(&format!(
        "{:<iw$}{:>ew$}\n",
        "Netif",
        "Expire",
        iw = widths.iface,
        ew = widths.expire,
    ));
    out.text(&line)
}
