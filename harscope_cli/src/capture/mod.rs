//! Live capture listener: accepts HAR entries over loopback HTTP and feeds
//! them into the viewer

mod server;

pub use server::{router, start_server};
