mod core;
mod errors;
mod queries;
mod schemas;
mod stdio;

pub use core::PrefectMcpCore;
pub use stdio::serve_stdio;
