pub mod category;
pub mod date;
pub mod models;

pub use category::Category;
pub use date::{normalize_date, today};
pub use models::{Message, MessageRecord, TimelineEvent, TimelineRecord};
