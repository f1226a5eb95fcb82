/// Email sending functionality
use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
};
use lettre::{
    message::{header::ContentType, Attachment, Body, Message, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
};

/// Email mailer service
#[derive(Clone)]
pub struct Mailer {
    config: Option<EmailConfig>,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl Mailer {
    /// Create a new mailer
    ///
    /// Without email configuration the mailer stays inert: sends are skipped
    /// with a warning and reported as success.
    pub fn new(config: Option<EmailConfig>) -> AppResult<Self> {
        let transport = if let Some(ref email_config) = config {
            let creds = Credentials::new(
                email_config.sender_address.clone(),
                email_config.sender_password.clone(),
            );

            let transport =
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&email_config.smtp_host)
                    .map_err(|e| AppError::Internal(format!("SMTP setup failed: {}", e)))?
                    .port(email_config.smtp_port)
                    .credentials(creds)
                    .build();

            Some(transport)
        } else {
            None
        };

        Ok(Self { config, transport })
    }

    /// Send the signup confirmation message carrying the token and a
    /// confirmation link embedding username and token
    pub async fn send_confirmation_email(
        &self,
        to_email: &str,
        username: &str,
        token: &str,
        base_url: &str,
    ) -> AppResult<()> {
        if self.config.is_none() {
            tracing::warn!(
                "Email not configured, skipping confirmation email to {}",
                to_email
            );
            return Ok(());
        }

        let confirmation_url = format!(
            "{}/api/signup/confirm?username={}&token={}",
            base_url,
            urlencoding::encode(username),
            urlencoding::encode(token)
        );

        let body = format!(
            r#"
Hello {},

Thank you for creating a Clinia account!

Please confirm your account by opening the link below:

{}

Or enter this confirmation token in the app: {}

This token will expire in 24 hours.

If you did not request this account, please ignore this email.

Best regards,
Clinia
"#,
            username, confirmation_url, token
        );

        let config = self.config.as_ref().unwrap();
        let email = Message::builder()
            .from(self.parse_mailbox(&config.sender_address)?)
            .to(self.parse_mailbox(to_email)?)
            .subject("Confirm your Clinia account")
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AppError::Collaborator(format!("Failed to build email: {}", e)))?;

        self.dispatch(email, to_email).await
    }

    /// Send the diagnosis notification with both generated reports attached
    pub async fn send_diagnosis_email(
        &self,
        to_email: &str,
        username: &str,
        disease: &str,
        symptoms: &[String],
        treatment_pdf: &[u8],
        illness_pdf: &[u8],
    ) -> AppResult<()> {
        if self.config.is_none() {
            tracing::warn!(
                "Email not configured, skipping diagnosis email to {}",
                to_email
            );
            return Ok(());
        }

        let symptom_list = if symptoms.is_empty() {
            "None reported".to_string()
        } else {
            symptoms
                .iter()
                .map(|s| format!("  - {}", s))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let body = format!(
            r#"
Dear {},

Your recent Clinia assessment results:

Condition: {}

Symptoms:
{}

Attached: treatment plan and illness information reports.

Consult a healthcare provider for medical advice.

Best regards,
Clinia
"#,
            username, disease, symptom_list
        );

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| AppError::Internal(format!("Invalid attachment type: {}", e)))?;

        let multipart = MultiPart::mixed()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(body),
            )
            .singlepart(
                Attachment::new(format!("Clinia_Treatment_Plan_{}.pdf", disease))
                    .body(Body::new(treatment_pdf.to_vec()), pdf_type.clone()),
            )
            .singlepart(
                Attachment::new(format!("Clinia_Illness_Info_{}.pdf", disease))
                    .body(Body::new(illness_pdf.to_vec()), pdf_type),
            );

        let config = self.config.as_ref().unwrap();
        let email = Message::builder()
            .from(self.parse_mailbox(&config.sender_address)?)
            .to(self.parse_mailbox(to_email)?)
            .subject(format!("Clinia Diagnosis: {}", disease))
            .multipart(multipart)
            .map_err(|e| AppError::Collaborator(format!("Failed to build email: {}", e)))?;

        self.dispatch(email, to_email).await
    }

    fn parse_mailbox(&self, address: &str) -> AppResult<lettre::message::Mailbox> {
        address
            .parse()
            .map_err(|e| AppError::Collaborator(format!("Invalid address {}: {}", address, e)))
    }

    async fn dispatch(&self, email: Message, to: &str) -> AppResult<()> {
        if let Some(transport) = &self.transport {
            transport
                .send(email)
                .await
                .map_err(|e| AppError::Collaborator(format!("Failed to send email: {}", e)))?;
            tracing::info!("Sent email to {}", to);
            Ok(())
        } else {
            tracing::warn!("Email transport not configured, cannot send email");
            Ok(())
        }
    }

    /// Check if email is configured
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }
}
