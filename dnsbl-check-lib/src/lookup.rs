//! Single (address, provider) evaluation.

use crate::providers::DnsblProvider;
use crate::types::LookupOutcome;
use std::time::Instant;
use tracing::debug;

/// Check one address against one provider.
///
/// The listing check always completes before the reason is fetched. A
/// failed listing check yields an `Error` outcome. A failed reason fetch
/// still yields `Listed`, with the failure kept as `reason_error`.
///
/// No retries happen here and no shared state is touched, so any number
/// of lookups may run concurrently.
pub async fn lookup(address: &str, provider: &dyn DnsblProvider) -> LookupOutcome {
    let start = Instant::now();
    let name = provider.name();

    let outcome = match provider.is_blacklisted(address).await {
        Err(err) => {
            debug!(address, provider = name, error = %err, "listing check failed");
            LookupOutcome::error(address, name, err)
        }
        Ok(false) => LookupOutcome::clean(address, name),
        Ok(true) => match provider.reason(address).await {
            Ok(reason) => LookupOutcome::listed(address, name, reason, None),
            Err(err) => {
                debug!(address, provider = name, error = %err, "reason fetch failed");
                LookupOutcome::listed(address, name, String::new(), Some(err))
            }
        },
    };

    debug!(address, provider = name, kind = %outcome.kind(), "lookup finished");
    outcome.with_duration(start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DnsblError;
    use crate::types::OutcomeStatus;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        listed: Result<bool>,
        reason: Result<String>,
        reason_calls: AtomicUsize,
    }

    impl Fixed {
        fn new(listed: Result<bool>, reason: Result<String>) -> Self {
            Self {
                listed,
                reason,
                reason_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl DnsblProvider for Fixed {
        fn name(&self) -> &str {
            "stubProvider"
        }

        async fn is_blacklisted(&self, _address: &str) -> Result<bool> {
            self.listed.clone()
        }

        async fn reason(&self, _address: &str) -> Result<String> {
            self.reason_calls.fetch_add(1, Ordering::SeqCst);
            self.reason.clone()
        }
    }

    #[tokio::test]
    async fn test_clean_skips_reason() {
        let provider = Fixed::new(Ok(false), Ok("never".into()));
        let outcome = lookup("1.2.3.4", &provider).await;

        assert_eq!(outcome.status, OutcomeStatus::Clean);
        assert_eq!(outcome.address, "1.2.3.4");
        assert_eq!(outcome.provider, "stubProvider");
        assert!(outcome.duration.is_some());
        assert_eq!(provider.reason_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_listed_with_reason() {
        let provider = Fixed::new(Ok(true), Ok("spam source".into()));
        let outcome = lookup("5.6.7.8", &provider).await;

        assert_eq!(
            outcome.status,
            OutcomeStatus::Listed {
                reason: "spam source".into(),
                reason_error: None
            }
        );
        assert_eq!(provider.reason_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reason_failure_keeps_listing() {
        let failure = DnsblError::reason_failed("stubProvider", "5.6.7.8", "SERVFAIL");
        let provider = Fixed::new(Ok(true), Err(failure.clone()));
        let outcome = lookup("5.6.7.8", &provider).await;

        assert!(outcome.is_blacklisted());
        assert_eq!(outcome.reason(), Some(""));
        assert_eq!(outcome.error_detail(), Some(&failure));
    }

    #[tokio::test]
    async fn test_listing_failure_is_error() {
        let failure = DnsblError::query_failed("stubProvider", "5.6.7.8", "SERVFAIL");
        let provider = Fixed::new(Err(failure.clone()), Ok("never".into()));
        let outcome = lookup("5.6.7.8", &provider).await;

        assert_eq!(outcome.status, OutcomeStatus::Error(failure));
        assert_eq!(provider.reason_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_address_is_kept_verbatim() {
        let provider = Fixed::new(Ok(false), Ok(String::new()));
        let outcome = tokio_test::block_on(lookup(" 1.2.3.4", &provider));
        assert_eq!(outcome.address, " 1.2.3.4");
    }
}
