//! Gantry Storage
//!
//! [`StorageStrategy`](gantry_transfer::StorageStrategy) implementations.
//! Each variant covers one locator scheme family and delegates the wire
//! protocol to an external capability (OpenDAL operators for object stores,
//! HTTP, and SFTP; `tokio::fs` for the local filesystem).
//!
//! All download paths go through the atomic sink in [`sink`]: data is
//! streamed into a hidden `.part` file next to the destination and renamed
//! into place only once the stream completed, so a failed or cancelled
//! download never leaves a partial file visible under the final name.

mod http;
mod local;
mod object_store;
mod operator;
mod remote_host;
pub mod sink;

pub use http::{HttpConfig, HttpStrategy};
pub use local::LocalStrategy;
pub use object_store::{ObjectStoreConfig, ObjectStoreStrategy};
pub use remote_host::{RemoteHostConfig, RemoteHostStrategy};
pub use sink::ByteStream;
