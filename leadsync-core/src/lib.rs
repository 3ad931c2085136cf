pub mod errors;
pub mod models;
pub mod notes;
pub mod reminders;

pub use errors::*;
pub use models::*;
pub use notes::*;
pub use reminders::*;
