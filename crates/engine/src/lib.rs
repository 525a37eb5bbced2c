pub mod board;
pub mod cell;
pub mod column;
pub mod history;
pub mod path;
pub mod series;
