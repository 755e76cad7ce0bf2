//! Response post-processing for model replies

pub mod json_reply;

pub use json_reply::{parse_json_reply, strip_code_fences};
