use std::future::Future;

use tracing::warn;

/// Vendor calls rejected as unauthenticated are retried at most once.
pub const AUTH_RETRY_BUDGET: u32 = 1;

/// Result of one attempt: either final, or rejected and eligible for a retry.
#[derive(Debug)]
pub enum Attempt<T> {
    Accepted(T),
    Rejected(T),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryBudget {
    pub retries: u32,
}

impl Default for RetryBudget {
    fn default() -> Self {
        Self { retries: AUTH_RETRY_BUDGET }
    }
}

impl RetryBudget {
    /// Run `operation` until it is accepted or the budget is spent.
    ///
    /// `operation` receives the 1-based attempt number. Once the budget is
    /// exhausted the last rejected value is returned as-is. Errors end the
    /// loop immediately.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Attempt<T>, E>>,
    {
        let attempts = self.retries + 1;
        let mut attempt = 1;
        loop {
            match operation(attempt).await? {
                Attempt::Accepted(value) => return Ok(value),
                Attempt::Rejected(value) if attempt >= attempts => {
                    warn!("attempt {attempt}/{attempts} rejected, retry budget spent");
                    return Ok(value);
                }
                Attempt::Rejected(_) => {
                    warn!("attempt {attempt}/{attempts} rejected, retrying");
                    attempt += 1;
                }
            }
        }
    }
}
