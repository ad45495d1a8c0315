//! Typed records and schemas for the rtnetlink message kinds we dump.

pub mod link;
pub mod route;
