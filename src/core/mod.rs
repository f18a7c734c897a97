pub mod bytes;
pub mod list;
pub mod math;
pub mod rand;
pub mod search;

pub use crate::utils::error::Result;
pub use list::{DoublyLinkedList, ListError, NodeId, SinglyLinkedList};
pub use search::bsearch_len;
