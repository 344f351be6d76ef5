use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use models::FieldErrors;

const NAME_MAX: usize = 100;
const SERVICE_MAX: usize = 100;
const MESSAGE_MAX: usize = 1000;
/// Minimum time between rendering the form and submitting it.
const MIN_FILL_MS: i64 = 3000;

/// Contact form payload as posted by the site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub message: String,
    /// Hidden field; humans leave it empty.
    #[serde(default)]
    pub honeypot: Option<String>,
    /// Client clock (ms since epoch) when the form was rendered.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

fn blank(s: &str) -> bool { s.trim().is_empty() }

impl ContactForm {
    /// Check the submission at `now_ms`.
    ///
    /// Bot signals (filled honeypot, too-fast submission) short-circuit with a
    /// single error; otherwise every failing field is reported.
    pub fn validate(self, now_ms: i64) -> Result<Self, FieldErrors> {
        if self.honeypot.as_deref().is_some_and(|h| !blank(h)) {
            return Err(FieldErrors::single("honeypot", "Bot detected"));
        }
        if let Some(ts) = self.timestamp.filter(|t| *t > 0) {
            if now_ms - ts < MIN_FILL_MS {
                return Err(FieldErrors::single("timestamp", "Form submitted too quickly"));
            }
        }

        let mut errs = FieldErrors::new();
        if blank(&self.name) {
            errs.insert("name", "Name is required");
        } else if self.name.chars().count() > NAME_MAX {
            errs.insert("name", "Name must be 100 characters or less");
        }

        if blank(&self.email) {
            errs.insert("email", "Email is required");
        } else if !is_valid_email(&self.email) {
            errs.insert("email", "Please enter a valid email address");
        }

        if blank(&self.message) {
            errs.insert("message", "Message is required");
        } else if self.message.chars().count() > MESSAGE_MAX {
            errs.insert("message", "Message must be 1000 characters or less");
        }

        if let Some(phone) = self.phone.as_deref().filter(|p| !blank(p)) {
            if !is_valid_phone(phone) {
                errs.insert("phone", "Please enter a valid phone number");
            }
        }

        if self.service.as_deref().is_some_and(|s| s.chars().count() > SERVICE_MAX) {
            errs.insert("service", "Service selection is too long");
        }
        errs.finish(self)
    }

    /// Strip markup and script fragments from every free-text field.
    pub fn sanitized(self) -> Self {
        let opt = |v: Option<String>| v.map(|s| sanitize_input(&s)).filter(|s| !s.is_empty());
        Self {
            name: sanitize_input(&self.name),
            email: self.email.trim().to_string(),
            phone: opt(self.phone),
            service: opt(self.service),
            message: sanitize_input(&self.message),
            honeypot: None,
            timestamp: self.timestamp,
        }
    }
}

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{0,15}$").expect("phone pattern"));
static PHONE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-().]").expect("separator pattern"));
static ANGLE_BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<>]").expect("bracket pattern"));
static JS_PROTOCOL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)javascript:").expect("protocol pattern"));
static EVENT_HANDLER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)on[[:word:]]+=").expect("handler pattern"));

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// Optional `+`, a non-zero leading digit, at most 16 digits and at least 10
/// characters, after stripping spaces, dashes, dots and parentheses.
pub fn is_valid_phone(phone: &str) -> bool {
    let cleaned = PHONE_SEPARATORS.replace_all(phone, "");
    PHONE.is_match(&cleaned) && cleaned.len() >= 10
}

/// Drop angle brackets, `javascript:` and `on…=` handlers, then trim.
pub fn sanitize_input(input: &str) -> String {
    let out = ANGLE_BRACKETS.replace_all(input, "");
    let out = JS_PROTOCOL.replace_all(&out, "");
    EVENT_HANDLER.replace_all(&out, "").trim().to_string()
}

/// `jane@example.com` becomes `ja***@example.com` for logs.
pub fn mask_email(email: &str) -> String {
    match email.rsplit_once('@') {
        Some((local, domain)) if local.chars().count() > 2 => {
            let head: String = local.chars().take(2).collect();
            format!("{head}***@{domain}")
        }
        _ => email.to_string(),
    }
}
