//! # Notifications
//!
//! Email is a best-effort side channel. The `Notifier` trait is the seam;
//! `academy-mail` provides the HTTP relay transport and [`LogNotifier`] stands
//! in when no transport is configured.
//!
//! Payment confirmations are sent from a detached task so a slow or broken
//! mail transport can never affect the verification response.

use crate::catalog::CourseCatalog;
use crate::meeting::{select_link_for_course, MeetingLink};
use crate::store::StoreHandle;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A rendered email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Transport refused or could not be reached
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Relay accepted the request but rejected the message
    #[error("Mail rejected [{status}]: {message}")]
    Rejected { status: u16, message: String },
}

pub type NotifyResult = Result<(), NotifyError>;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: EmailMessage) -> NotifyResult;

    /// Transport name for logs and health output
    fn transport_name(&self) -> &'static str;

    /// False when messages are only logged
    fn delivers(&self) -> bool {
        true
    }
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Logs messages instead of sending them (email demo mode)
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: EmailMessage) -> NotifyResult {
        info!(
            "Demo mode - email would be sent to {}: {}",
            message.to, message.subject
        );
        debug!("Email content: {}", message.html);
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "log"
    }

    fn delivers(&self) -> bool {
        false
    }
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub async fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> NotifyResult {
        self.sent.lock().await.push(message);
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Escape text for inclusion in HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const SIGNATURE: &str = r#"<p style="color: #666; line-height: 1.6;">Best regards,<br><strong>Gangadhar Nagarjuna</strong><br>Business Academy</p>"#;

fn layout(heading: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background-color: #f8f9fa; padding: 20px; text-align: center;">
    <h1 style="color: #333; margin: 0;">{heading}</h1>
  </div>
  <div style="padding: 30px; background-color: white;">
{body}
    {SIGNATURE}
  </div>
</div>"#
    )
}

/// Data for a payment confirmation
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub email: String,
    pub name: String,
    pub course_id: String,
    pub course_name: String,
    /// Rupees
    pub course_price: i64,
    pub registration_id: String,
}

fn meeting_block(link: &MeetingLink, catalog: &CourseCatalog) -> String {
    let mut block = format!(
        r#"    <div style="background-color: #e8f5e8; padding: 20px; border-radius: 8px; margin: 20px 0;">
      <h3 style="color: #2d5a2d; margin-top: 0;">Workshop Meeting Link:</h3>
      <p><strong>{}</strong></p>
"#,
        escape_html(&link.heading(catalog))
    );
    if let Some(description) = &link.description {
        block.push_str(&format!(
            "      <p style=\"color: #666;\">{}</p>\n",
            escape_html(description)
        ));
    }
    if let Some(date) = link.date {
        block.push_str(&format!(
            "      <p><strong>Date:</strong> {}</p>\n",
            date.format("%d/%m/%Y")
        ));
    }
    let url = escape_html(&link.link);
    block.push_str(&format!(
        r#"      <a href="{url}" style="background-color: #28a745; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block; margin-top: 10px;">Join Meeting</a>
    </div>
"#
    ));
    block
}

/// Render the payment confirmation email
pub fn confirmation_email(
    confirmation: &Confirmation,
    meeting: Option<&MeetingLink>,
    catalog: &CourseCatalog,
) -> EmailMessage {
    let course = escape_html(&confirmation.course_name);
    let mut body = format!(
        r#"    <h2 style="color: #333;">Hello {name},</h2>
    <p style="color: #666; line-height: 1.6;">Thank you for your payment! Your registration for <strong>{course}</strong> has been confirmed.</p>
    <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px; margin: 20px 0;">
      <h3 style="color: #333; margin-top: 0;">Registration Details:</h3>
      <p><strong>Course:</strong> {course}</p>
      <p><strong>Amount Paid:</strong> ₹{price}</p>
      <p><strong>Registration ID:</strong> {id}</p>
    </div>
"#,
        name = escape_html(&confirmation.name),
        price = confirmation.course_price,
        id = escape_html(&confirmation.registration_id),
    );
    if let Some(link) = meeting {
        body.push_str(&meeting_block(link, catalog));
    }
    body.push_str(
        r#"    <p style="color: #666; line-height: 1.6;">We're excited to have you join us! If you have any questions, please don't hesitate to reach out.</p>"#,
    );

    EmailMessage {
        to: confirmation.email.clone(),
        subject: format!("Payment Confirmed - {}", confirmation.course_name),
        html: layout("Payment Confirmed!", &body),
    }
}

/// Render the admin password reset email
pub fn password_reset_email(to: &str, reset_url: &str) -> EmailMessage {
    let url = escape_html(reset_url);
    let body = format!(
        r#"    <h2 style="color: #333;">Hello,</h2>
    <p style="color: #666; line-height: 1.6;">You requested a password reset for your admin account. Click the button below to reset your password:</p>
    <div style="text-align: center; margin: 30px 0;">
      <a href="{url}" style="background-color: #007bff; color: white; padding: 12px 24px; text-decoration: none; border-radius: 5px; display: inline-block;">Reset Password</a>
    </div>
    <p style="color: #666; line-height: 1.6;">If the button doesn't work, copy and paste this link into your browser:</p>
    <p style="color: #007bff; word-break: break-all;">{url}</p>
    <p style="color: #666; line-height: 1.6;">This link will expire in 10 minutes for security reasons.</p>
    <p style="color: #666; line-height: 1.6;">If you didn't request this password reset, please ignore this email.</p>
"#
    );

    EmailMessage {
        to: to.to_string(),
        subject: "Password Reset Request - Admin Panel".to_string(),
        html: layout("Password Reset Request", &body),
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Sends payment confirmations in the background
#[derive(Clone)]
pub struct ConfirmationDispatcher {
    notifier: SharedNotifier,
    store: StoreHandle,
    catalog: Arc<CourseCatalog>,
}

impl ConfirmationDispatcher {
    pub fn new(notifier: SharedNotifier, store: StoreHandle, catalog: Arc<CourseCatalog>) -> Self {
        Self {
            notifier,
            store,
            catalog,
        }
    }

    /// Spawn a detached delivery task.
    ///
    /// The caller may drop the handle; the task logs its own outcome. Awaiting
    /// the handle yields the delivery result.
    pub fn dispatch(&self, confirmation: Confirmation) -> JoinHandle<NotifyResult> {
        let this = self.clone();
        tokio::spawn(async move {
            let registration_id = confirmation.registration_id.clone();
            let result = this.deliver(confirmation).await;
            match &result {
                Ok(()) => info!("Confirmation email sent for registration {}", registration_id),
                Err(e) => error!(
                    "Confirmation email failed for registration {}: {}",
                    registration_id, e
                ),
            }
            result
        })
    }

    async fn deliver(&self, confirmation: Confirmation) -> NotifyResult {
        let meeting = self.meeting_link(&confirmation.course_id).await;
        let message = confirmation_email(&confirmation, meeting.as_ref(), &self.catalog);
        self.notifier.send(message).await
    }

    /// A missing link only drops the meeting block from the email
    async fn meeting_link(&self, course: &str) -> Option<MeetingLink> {
        let store = self.store.get()?;
        match store.list_meeting_links(true).await {
            Ok(links) => select_link_for_course(&links, course).cloned(),
            Err(e) => {
                warn!("Could not load meeting links for confirmation: {}", e);
                None
            }
        }
    }
}
