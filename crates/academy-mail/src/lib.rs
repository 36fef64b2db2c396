//! # academy-mail
//!
//! HTTP mail relay implementation of [`academy_core::Notifier`].
//!
//! When `MAIL_API_URL` / `MAIL_API_KEY` / `MAIL_FROM` are unset the server
//! falls back to [`academy_core::LogNotifier`] instead.

pub mod config;
pub mod relay;

pub use config::MailConfig;
pub use relay::MailRelayNotifier;
