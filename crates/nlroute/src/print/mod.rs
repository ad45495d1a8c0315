//! netstat-style route table rendering.

pub mod route;
pub mod table;
