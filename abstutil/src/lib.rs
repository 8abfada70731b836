//! Small utilities shared by the street graph crates: an attribute map for raw tags, a
//! multimap, a hierarchical timer that reports through `log`, and serde helpers.

#[macro_use]
extern crate log;

mod collections;
mod io;
mod tags;
mod time;
mod utils;

pub use crate::collections::MultiMap;
pub use crate::io::{deserialize_btreemap, from_json, serialize_btreemap, to_json};
pub use crate::tags::Tags;
pub use crate::time::Timer;
pub use crate::utils::prettyprint_usize;

// Thanks https://stackoverflow.com/a/49806368
#[macro_export]
macro_rules! skip_fail {
    ($res:expr) => {
        match $res {
            Some(val) => val,
            None => {
                continue;
            }
        }
    };
}
