//! Generic cursor-based pagination over the ordered index.

mod cursor;
mod loaders;
mod pager;

pub use cursor::{decode_cursor, encode_cursor, Position};
pub use loaders::{BackupListLoader, OperationListLoader};
pub use pager::{exec_query, ListLoader, ListRequest, ListResponse, DEFAULT_PAGE_SIZE};
