//! HTML bodies for outgoing email.
//!
//! Templates only accept already-escaped input (`Sanitized*` types) or
//! escape on the way in, so no raw user text reaches the markup.

use site_core::{escape_html, SanitizedContact, SanitizedSubscriber, Transcript};

const SITE_NAME: &str = "Agency";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:Arial,sans-serif;color:#1f2937;\">\
         <div style=\"max-width:600px;margin:0 auto;padding:24px;\">\
         <h2 style=\"color:#111827;\">{title}</h2>{body}\
         <p style=\"color:#6b7280;font-size:12px;margin-top:32px;\">{SITE_NAME}</p>\
         </div></body></html>"
    )
}

fn row(label: &str, value: &str) -> String {
    format!("<p><strong>{label}:</strong> {value}</p>")
}

/// Notification to the site owners about a contact submission.
pub fn contact_notification(contact: &SanitizedContact) -> String {
    let mut body = String::new();
    body.push_str(&row("Name", &contact.name));
    body.push_str(&row("Email", &contact.email));
    if let Some(phone) = &contact.phone {
        body.push_str(&row("Phone", phone));
    }
    if let Some(service) = &contact.service {
        body.push_str(&row("Service", service));
    }
    body.push_str(&row("Subject", &contact.subject));
    body.push_str(&format!(
        "<p><strong>Message:</strong></p><div style=\"padding:12px;background:#f3f4f6;\">{}</div>",
        contact.message
    ));
    layout("New contact form submission", &body)
}

/// Confirmation to the person who submitted the contact form.
pub fn contact_confirmation(contact: &SanitizedContact) -> String {
    let body = format!(
        "<p>Hi {},</p>\
         <p>Thanks for reaching out. We received your message about \
         <em>{}</em> and will get back to you within one business day.</p>",
        contact.name, contact.subject
    );
    layout("We received your message", &body)
}

/// Notification to the site owners about a new subscriber.
pub fn subscribe_notification(subscriber: &SanitizedSubscriber) -> String {
    let mut body = row("Email", &subscriber.email);
    if let Some(phone) = &subscriber.phone {
        body.push_str(&row("Phone", phone));
    }
    layout("New newsletter subscriber", &body)
}

/// Welcome message to a new subscriber.
pub fn subscribe_confirmation(_subscriber: &SanitizedSubscriber) -> String {
    let body = "<p>Thanks for subscribing. You will hear from us when we publish \
                new articles and case studies.</p>";
    layout("You're subscribed", body)
}

/// Chat transcript rendered for email.
pub fn transcript(transcript: &Transcript) -> String {
    let body = match transcript {
        Transcript::Text(text) => format!(
            "<div style=\"white-space:pre-wrap;\">{}</div>",
            escape_html(text.trim())
        ),
        Transcript::Messages(messages) => messages
            .iter()
            .filter(|m| !m.content.trim().is_empty())
            .map(|m| {
                format!(
                    "<p><strong>{}:</strong> {}</p>",
                    escape_html(&role_label(&m.role)),
                    escape_html(m.content.trim()).replace('\n', "<br>")
                )
            })
            .collect(),
    };
    layout("Your conversation transcript", &body)
}

fn role_label(role: &str) -> String {
    match role.to_lowercase().as_str() {
        "user" => "You".to_string(),
        "assistant" | "bot" => "Assistant".to_string(),
        _ => role.to_string(),
    }
}
