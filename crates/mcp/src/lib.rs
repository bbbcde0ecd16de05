//! Model Context Protocol (MCP) server for the Prefect orchestration API.
//!
//! The server exposes Prefect flows, flow runs and deployments as MCP tools.
//! Each tool validates its parameters, translates them into a Prefect REST
//! call through [`prefect_mcp_api::PrefectClient`], and returns the response
//! as structured content.

pub mod server;

pub use server::{PrefectMcpCore, serve_stdio};
