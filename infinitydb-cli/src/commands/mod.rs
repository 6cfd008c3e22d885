pub mod cursor;
pub mod get;
pub mod head;
pub mod item;
pub mod put;
pub mod query;
