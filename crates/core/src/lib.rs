pub mod selection;

pub use selection::{Cursor, Selection};
