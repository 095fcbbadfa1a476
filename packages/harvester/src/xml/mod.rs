//! XML helpers for reading OAI-PMH responses.

mod utils;

pub use utils::{
    find_by_path, find_child, find_children, get_attribute, get_tag_name, get_text,
    standalone_fragment,
};
