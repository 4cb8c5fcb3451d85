pub mod api_client;
pub mod backend;
pub mod config_service;
pub mod cooldown;
pub mod dashboard_service;
pub mod dates;
pub mod faq_service;
pub mod feedback_dialogue;
pub mod local_store;
pub mod markdown;
pub mod profile_service;
pub mod reminder_service;
pub mod sensitive_topics;
pub mod session_service;
pub mod student_portal;

#[cfg(test)]
pub(crate) mod testing;
