use async_trait::async_trait;
use tracing::debug;

/// Delivery seam for password reset codes.
///
/// The actual mail/SMS relay lives outside this service; deployments
/// provide their own implementation. The code must never travel back in
/// an HTTP response, only through this channel.
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send_reset_code(
        &self,
        email: &str,
        first_name: &str,
        code: &str,
    ) -> anyhow::Result<()>;
}

/// Development sender that surfaces the code in the logs instead of
/// delivering it.
pub struct DevMailSender;

#[async_trait]
impl CodeSender for DevMailSender {
    async fn send_reset_code(
        &self,
        email: &str,
        first_name: &str,
        code: &str,
    ) -> anyhow::Result<()> {
        debug!(%email, %first_name, %code, "reset code issued (dev sender)");
        Ok(())
    }
}
