pub mod all;
pub mod export;
pub mod list;

pub use all::{AllCommand, AllOptions};
pub use export::{ExportCommand, ExportOptions};
pub use list::ListCommand;
