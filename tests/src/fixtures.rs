//! Test fixtures and payload generators.

pub const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 \
                              (KHTML, like Gecko) Version/17.2 Safari/605.1.15";
pub const GOOGLEBOT_UA: &str =
    "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
pub const HEADLESS_UA: &str = "Mozilla/5.0 (X11; Linux x86_64) HeadlessChrome/120.0.0.0";

/// A complete, valid contact form submission.
pub fn contact_payload() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "phone": "+1 555 0100",
        "subject": "New website",
        "message": "We need a redesign.\nBudget is flexible.",
        "service": "Web Development",
        "website": "",
        "formElapsedMs": 24000
    })
}

pub fn subscribe_payload(email: &str) -> serde_json::Value {
    serde_json::json!({ "email": email })
}

pub fn booking_payload() -> serde_json::Value {
    serde_json::json!({
        "date": "2026-11-03",
        "time": "10:30 AM",
        "name": "Ada Lovelace",
        "email": "ada@example.com"
    })
}

pub fn transcript_payload() -> serde_json::Value {
    serde_json::json!({
        "email": "ada@example.com",
        "transcript": [
            { "role": "user", "content": "Do you build <b>Shopify</b> stores?" },
            { "role": "assistant", "content": "Yes, we do." }
        ]
    })
}
