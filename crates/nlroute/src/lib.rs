//! Async netlink route-table dumper for Linux.
//!
//! This crate queries the kernel over NETLINK_ROUTE for its interface
//! and routing tables, decodes the attribute-based wire messages into
//! typed records through declarative schemas, expands multipath routes
//! into per-next-hop rows, and renders the result in a netstat-style
//! tabular or JSON form.
//!
//! # Example
//!
//! ```ignore
//! use nlroute::{Connection, OutputFormat, OutputOptions, dump_routes};
//!
//! #[tokio::main]
//! async fn main() -> nlroute::Result<()> {
//!     let conn = Connection::new()?;
//!     let stdout = std::io::stdout().lock();
//!     dump_routes(
//!         &conn,
//!         0,                      // fib / routing table id
//!         0,                      // AF_UNSPEC: all families
//!         stdout,
//!         OutputFormat::Text,
//!         OutputOptions::default(),
//!     )
//!     .await
//! }
//! ```

pub mod attr;
pub mod builder;
pub mod connection;
mod error;
#[cfg(test)]
mod fixtures;
pub mod ifmap;
pub mod mask;
pub mod message;
pub mod messages;
pub mod output;
pub mod print;
pub mod schema;
mod socket;
pub mod types;

pub use connection::{Connection, Dump};
pub use error::{Error, Result};
pub use ifmap::IfMap;
pub use output::{Emitter, OutputFormat, OutputOptions};
pub use print::table::{RouteTablePrinter, dump_routes};
pub use socket::NetlinkSocket;
