pub mod key_list;

pub use key_list::{load_key_list, parse_key_list};
