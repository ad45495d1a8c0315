//! Whole-table rendering: family sections, headers and the dump
//! driver.

use std::io::Write;

use crate::connection::Connection;
use crate::error::Result;
use crate::ifmap::IfMap;
use crate::message::NlMsgType;
use crate::messages::route::RouteRecord;
use crate::output::{Emitter, OutputFormat, OutputOptions};
use crate::print::route::{Widths, print_header, print_row};
use crate::types::af;

fn family_name(family: u8) -> String {
    match family {
        af::INET => "Internet".to_string(),
        af::INET6 => "Internet6".to_string(),
        other => format!("Protocol Family {other}"),
    }
}

/// Streams decoded routes into family sections.
///
/// The dump is assumed to arrive sorted by address family; a family
/// change closes the open section and opens a new one with that
/// family's column widths. A mis-sorted stream therefore yields one
/// section per contiguous run, never a reordered table. Undecodable
/// route messages are skipped.
pub struct RouteTablePrinter<'a, W: Write> {
    ifmap: &'a IfMap,
    /// Family filter: AF_UNSPEC renders all families.
    family: u8,
    emitter: Emitter<W>,
    wide: bool,
    /// Family of the open section, with its column widths.
    section: Option<(u8, Widths)>,
}

impl<'a, W: Write> RouteTablePrinter<'a, W> {
    /// Create a printer writing to `writer`.
    pub fn new(
        ifmap: &'a IfMap,
        family: u8,
        writer: W,
        format: OutputFormat,
        options: OutputOptions,
    ) -> Self {
        let mut emitter = Emitter::new(writer, format, options);
        emitter.open_container("route-table");
        emitter.open_list("rt-family");
        Self {
            ifmap,
            family,
            emitter,
            wide: options.wide,
            section: None,
        }
    }

    fn close_section(&mut self) -> Result<()> {
        if self.section.take().is_some() {
            self.emitter.close_list("rt-entry")?;
            self.emitter.close_instance()?;
        }
        Ok(())
    }

    fn open_section(&mut self, family: u8) -> Result<()> {
        let widths = Widths::for_family(family);
        let name = family_name(family);

        self.emitter.open_instance()?;
        self.emitter.field_str("address-family", &name)?;
        self.emitter.text(&format!("\n{name}:\n"))?;
        print_header(&mut self.emitter, &widths, self.wide)?;
        self.emitter.open_list("rt-entry");

        self.section = Some((family, widths));
        Ok(())
    }

    /// Consume one dump message.
    pub fn push(&mut self, msg_type: u16, payload: &[u8]) -> Result<()> {
        if msg_type != NlMsgType::RTM_NEWROUTE {
            tracing::debug!(msg_type, "unexpected message type in route dump");
            return Ok(());
        }
        let route = match RouteRecord::decode(payload) {
            Ok(route) => route,
            Err(e) if e.is_decode() => {
                tracing::warn!(error = %e, "skipping undecodable route message");
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        if self.family != af::UNSPEC && route.family != self.family {
            return Ok(());
        }

        if self.section.map(|(family, _)| family) != Some(route.family) {
            self.close_section()?;
            self.open_section(route.family)?;
        }
        let widths = match self.section {
            Some((_, widths)) => widths,
            None => Widths::for_family(route.family),
        };
        for view in route.views() {
            self.emitter.open_instance()?;
            print_row(&mut self.emitter, &view, self.ifmap, &widths, self.wide)?;
            self.emitter.close_instance()?;
        }
        Ok(())
    }

    /// Close the open section and flush the output.
    pub fn finish(mut self) -> Result<()> {
        self.close_section()?;
        self.emitter.close_list("rt-family")?;
        self.emitter.close_container("route-table")?;
        self.emitter.finish()
    }
}

/// Dump the routing table and render it.
///
/// Builds the interface index table first, then streams the route
/// dump through a [`RouteTablePrinter`]. `fib` selects the routing
/// table (0 for the default) and `family` filters the output
/// (AF_UNSPEC for all families).
pub async fn dump_routes<W: Write>(
    conn: &Connection,
    fib: u32,
    family: u8,
    writer: W,
    format: OutputFormat,
    options: OutputOptions,
) -> Result<()> {
    let ifmap = conn.link_map().await?;
    let mut printer = RouteTablePrinter::new(&ifmap, family, writer, format, options);

    let mut dump = conn.route_dump(fib, family).await?;
    while let Some((msg_type, payload)) = dump.next_msg().await? {
        printer.push(msg_type, &payload)?;
    }
    printer.finish()
}
