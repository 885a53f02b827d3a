use async_trait::async_trait;
use rand::Rng;
use tracing::{debug, info};

/// Six-digit numeric passcode.
pub fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Delivers a registration passcode to the account owner.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    async fn send_otp(&self, email: &str, otp: &str) -> anyhow::Result<()>;
}

/// Mailer that only records the delivery in the log stream.
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, email: &str, otp: &str) -> anyhow::Result<()> {
        info!(%email, "otp issued");
        debug!(%email, %otp, "otp value");
        Ok(())
    }
}
