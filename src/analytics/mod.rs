pub mod aggregate;
pub mod calendar;
pub mod history;
pub mod range;

pub use aggregate::Insights;
pub use history::LogFilter;
pub use range::{DateMode, RangeError, RangeKind};
