//! netstat-style route table viewer backed by NETLINK_ROUTE.

use std::io::stdout;

use anyhow::Result;
use clap::Parser;
use nlroute::types::af;
use nlroute::{Connection, OutputFormat, OutputOptions, dump_routes};

#[derive(Parser, Debug)]
#[command(name = "rtstat", version, about = "Show the kernel routing tables")]
struct Cli {
    /// Show IPv4 routes only
    #[arg(short = '4', conflicts_with = "inet6")]
    inet: bool,

    /// Show IPv6 routes only
    #[arg(short = '6')]
    inet6: bool,

    /// Wide output with next-hop id and MTU columns
    #[arg(short = 'W', long)]
    wide: bool,

    /// Emit JSON instead of text
    #[arg(short = 'j', long)]
    json: bool,

    /// Pretty-print JSON (implies --json)
    #[arg(short = 'p', long)]
    pretty: bool,

    /// Numeric output, never resolve addresses to names
    #[arg(short = 'n', long)]
    numeric: bool,

    /// Routing table (fib) to dump
    #[arg(short = 'F', long = "fib", default_value_t = 0)]
    fib: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let family = if cli.inet {
        af::INET
    } else if cli.inet6 {
        af::INET6
    } else {
        af::UNSPEC
    };
    let format = if cli.json || cli.pretty {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let options = OutputOptions {
        wide: cli.wide,
        numeric: cli.numeric,
        pretty: cli.pretty,
    };

    let conn = Connection::new()?;
    dump_routes(&conn, cli.fib, family, stdout().lock(), format, options).await?;
    Ok(())
}
