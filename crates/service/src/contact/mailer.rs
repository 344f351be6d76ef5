use async_trait::async_trait;
use tracing::info;

use super::form::{mask_email, ContactForm};
use super::ContactSettings;

/// A rendered plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub text: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> anyhow::Result<()>;
}

/// Development mailer: logs what would be sent.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        let preview: String = email.text.chars().take(100).collect();
        info!(
            to = %mask_email(&email.to),
            from = %email.from,
            subject = %email.subject,
            preview = %preview,
            "email would be sent"
        );
        Ok(())
    }
}

/// Message to the company inbox describing the inquiry.
pub fn company_notification(form: &ContactForm, settings: &ContactSettings) -> Email {
    let mut text = String::from("New Contact Form Submission - EXPO 2025 Construction\n\n");
    text.push_str(&format!("Name: {}\nEmail: {}\n", form.name, form.email));
    if let Some(phone) = &form.phone {
        text.push_str(&format!("Phone: {phone}\n"));
    }
    if let Some(service) = &form.service {
        text.push_str(&format!("Service: {service}\n"));
    }
    text.push_str(&format!(
        "\nMessage:\n{}\n\n---\nThis email was sent from the EXPO 2025 Construction contact form.\n",
        form.message
    ));
    let subject = match &form.service {
        Some(service) => format!("New Contact Form - {} ({service})", form.name),
        None => format!("New Contact Form - {}", form.name),
    };
    Email { to: settings.company_email.clone(), from: settings.from_email.clone(), subject, text }
}

/// Auto-reply to the customer.
pub fn customer_confirmation(form: &ContactForm, settings: &ContactSettings) -> Email {
    let text = format!(
        "Hi {name},\n\n\
         Thank you for reaching out to EXPO 2025 Construction Inc! We've received your message \
         and will get back to you within 24 hours.\n\n\
         Your Message:\n{message}\n\n\
         We look forward to working with you!\n\n\
         Best regards,\nThe EXPO 2025 Construction Team\n",
        name = form.name,
        message = form.message,
    );
    Email {
        to: form.email.clone(),
        from: settings.from_email.clone(),
        subject: "Thank you for contacting EXPO 2025 Construction Inc".into(),
        text,
    }
}
