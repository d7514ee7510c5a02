//! Field names the crate reads or writes itself, in their normalized lowercase form.

pub const CONTENT_LENGTH: &str = "content-length";
pub const CONTENT_TYPE: &str = "content-type";
pub const CONNECTION: &str = "connection";
pub const TRANSFER_ENCODING: &str = "transfer-encoding";
pub const TRAILER: &str = "trailer";

pub const X_CONTENT_SHA256: &str = "x-content-sha256";
pub const X_CONTENT_LENGTH: &str = "x-content-length";
