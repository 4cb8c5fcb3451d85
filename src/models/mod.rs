pub mod lenient;
mod chat;
mod feedback;
mod faq;
mod reminder;
mod profile;
mod stats;

pub use chat::*;
pub use feedback::*;
pub use faq::*;
pub use reminder::*;
pub use profile::*;
pub use stats::*;
