pub mod command;
pub mod week;

pub use command::{apply, complete_entry, PlanCommand};
