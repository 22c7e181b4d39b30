mod entry;
pub mod forms;
pub mod public;
pub mod route_list;
pub mod todos;

pub use entry::{app, router};
