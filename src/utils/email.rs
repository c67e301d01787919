use async_trait::async_trait;
use resend_rs::{Resend, types::CreateEmailBaseOptions};

use crate::errors::AppError;

/// Outbound notification channel.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a password reset link.
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<(), AppError>;
}

/// [`Mailer`] backed by Resend.
pub struct ResendMailer {
    resend: Resend,
    from: String,
}

impl ResendMailer {
    pub fn new(api_key: &str, from: impl Into<String>) -> Self {
        Self {
            resend: Resend::new(api_key),
            from: from.into(),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_password_reset(&self, to_email: &str, reset_link: &str) -> Result<(), AppError> {
        let to = [to_email];
        let subject = "Reset your Folio password";
        let html = reset_email_html(reset_link);

        let email = CreateEmailBaseOptions::new(&self.from, to, subject).with_html(&html);

        self.resend.emails.send(email).await.map_err(|e| {
            tracing::error!("Failed to send reset email: {:?}", e);
            AppError::Upstream("Failed to send password reset email".to_string())
        })?;

        tracing::info!("Password reset email sent to {}", to_email);
        Ok(())
    }
}

fn reset_email_html(reset_link: &str) -> String {
    format!(
        r#"
        <!DOCTYPE html>
        <html>
        <head>
            <style>
                body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
                .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
                .header {{ background: #1f2937; color: white; padding: 30px; text-align: center; border-radius: 10px 10px 0 0; }}
                .content {{ background: #f9f9f9; padding: 30px; border-radius: 0 0 10px 10px; }}
                .button {{ display: inline-block; padding: 12px 24px; background: #2563eb; color: white; text-decoration: none; border-radius: 6px; }}
                .footer {{ text-align: center; margin-top: 20px; color: #666; font-size: 12px; }}
            </style>
        </head>
        <body>
            <div class="container">
                <div class="header">
                    <h1>Folio</h1>
                </div>
                <div class="content">
                    <h2>Reset your password</h2>
                    <p>We received a request to reset the password for your account.</p>
                    <p><a class="button" href="{link}">Choose a new password</a></p>
                    <p>This link will expire in <strong>1 hour</strong>.</p>
                    <p>If you didn't request a reset, you can safely ignore this email.</p>
                </div>
                <div class="footer">
                    <p>If the button does not work, paste this link into your browser: {link}</p>
                </div>
            </div>
        </body>
        </html>
        "#,
        link = reset_link
    )
}
