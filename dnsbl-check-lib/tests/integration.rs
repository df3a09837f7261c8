// dnsbl-check-lib/tests/integration.rs

//! Integration tests for the lookup engine using stub providers

use dnsbl_check_lib::{
    async_trait, lookup, render_line, BlacklistChecker, CheckConfig, DnsblError, DnsblProvider,
    LookupOutcome, OutcomeKind, Result, Summary,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

/// Deterministic provider with a fixed answer for every address.
struct StubProvider {
    name: String,
    listed: std::result::Result<bool, String>,
    reason: std::result::Result<String, String>,
    delay: Duration,
}

impl StubProvider {
    fn clean() -> Self {
        Self::new(Ok(false), Ok(String::new()))
    }

    fn listed(reason: &str) -> Self {
        Self::new(Ok(true), Ok(reason.to_string()))
    }

    fn new(
        listed: std::result::Result<bool, String>,
        reason: std::result::Result<String, String>,
    ) -> Self {
        Self {
            name: "stubProvider".to_string(),
            listed,
            reason,
            delay: Duration::ZERO,
        }
    }

    fn named(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl DnsblProvider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_blacklisted(&self, address: &str) -> Result<bool> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.listed
            .clone()
            .map_err(|msg| DnsblError::query_failed(&self.name, address, msg))
    }

    async fn reason(&self, address: &str) -> Result<String> {
        self.reason
            .clone()
            .map_err(|msg| DnsblError::reason_failed(&self.name, address, msg))
    }
}

fn shared(provider: StubProvider) -> Arc<dyn DnsblProvider> {
    Arc::new(provider)
}

async fn run(addresses: &[&str], providers: Vec<Arc<dyn DnsblProvider>>) -> Vec<LookupOutcome> {
    BlacklistChecker::new()
        .check_all_collected(addresses, &providers)
        .await
}

// ============================================================
// Scenarios
// ============================================================

#[tokio::test]
async fn test_clean_address_renders_ok() {
    let outcomes = run(&["1.2.3.4"], vec![shared(StubProvider::clean())]).await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].kind(), OutcomeKind::Ok);
    assert_eq!(render_line(&outcomes[0]), "OK\t1.2.3.4\tstubProvider");
}

#[tokio::test]
async fn test_listed_address_renders_reason() {
    let outcomes = run(
        &["5.6.7.8"],
        vec![shared(StubProvider::listed("spam source"))],
    )
    .await;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_blacklisted());
    assert_eq!(
        render_line(&outcomes[0]),
        "FAIL\t5.6.7.8\tstubProvider\tspam source"
    );
}

#[tokio::test]
async fn test_failed_reason_renders_unknown_reason() {
    let provider = StubProvider::new(Ok(true), Err("TXT SERVFAIL".to_string()));
    let outcomes = run(&["5.6.7.8"], vec![shared(provider)]).await;

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert!(outcome.is_blacklisted());
    assert!(matches!(
        outcome.error_detail(),
        Some(DnsblError::ReasonFailed { .. })
    ));
    assert_eq!(
        render_line(outcome),
        "FAIL\t5.6.7.8\tstubProvider\tunknown reason"
    );
}

#[tokio::test]
async fn test_failed_listing_renders_err() {
    let provider = StubProvider::new(Err("connection refused".to_string()), Ok(String::new()));
    let outcomes = run(&["5.6.7.8"], vec![shared(provider)]).await;

    assert_eq!(outcomes.len(), 1);
    let error = outcomes[0].error_detail().unwrap().to_string();
    assert!(!outcomes[0].is_blacklisted());
    assert_eq!(
        render_line(&outcomes[0]),
        format!("ERR\t5.6.7.8\tstubProvider\t{}", error)
    );
    assert!(error.contains("connection refused"));
}

#[tokio::test]
async fn test_empty_inputs_yield_nothing() {
    assert!(run(&[], vec![shared(StubProvider::clean())])
        .await
        .is_empty());
    assert!(run(&["1.2.3.4", "5.6.7.8"], Vec::new()).await.is_empty());
    assert!(run(&[], Vec::new()).await.is_empty());
}

// ============================================================
// Properties
// ============================================================

#[tokio::test]
async fn test_completeness_and_coverage() {
    let addresses: Vec<String> = (0..40).map(|i| format!("198.51.100.{}", i)).collect();
    let providers: Vec<Arc<dyn DnsblProvider>> = (0..7)
        .map(|i| {
            shared(
                StubProvider::clean()
                    .named(&format!("p{}", i))
                    .with_delay(Duration::from_millis(1)),
            )
        })
        .collect();

    let checker = BlacklistChecker::with_config(CheckConfig::default().with_concurrency(16));
    let outcomes = checker.check_all_collected(&addresses, &providers).await;

    assert_eq!(outcomes.len(), 40 * 7);

    let observed: HashSet<(String, String)> = outcomes
        .iter()
        .map(|o| (o.address.clone(), o.provider.clone()))
        .collect();
    let expected: HashSet<(String, String)> = addresses
        .iter()
        .flat_map(|a| (0..7).map(move |i| (a.clone(), format!("p{}", i))))
        .collect();
    assert_eq!(observed, expected);
}

#[tokio::test]
async fn test_not_listed_never_has_reason() {
    let providers = vec![
        shared(StubProvider::clean().named("clean")),
        shared(StubProvider::listed("why").named("listed")),
        shared(StubProvider::new(Err("x".into()), Ok("y".into())).named("broken")),
    ];
    for outcome in run(&["192.0.2.1", "192.0.2.2"], providers).await {
        if !outcome.is_blacklisted() {
            assert!(outcome.reason().map_or(true, str::is_empty));
        }
    }
}

#[tokio::test]
async fn test_failing_provider_is_isolated() {
    let mut providers: Vec<Arc<dyn DnsblProvider>> = (0..5)
        .map(|i| shared(StubProvider::listed("listed").named(&format!("ok{}", i))))
        .collect();
    providers.insert(
        2,
        shared(StubProvider::new(Err("timeout".into()), Ok(String::new())).named("bad")),
    );

    let outcomes = run(&["203.0.113.1", "203.0.113.2", "203.0.113.3"], providers).await;
    assert_eq!(outcomes.len(), 18);

    let mut by_provider: HashMap<String, Vec<&LookupOutcome>> = HashMap::new();
    for outcome in &outcomes {
        by_provider
            .entry(outcome.provider.clone())
            .or_default()
            .push(outcome);
    }

    assert!(by_provider["bad"].iter().all(|o| o.is_error()));
    for i in 0..5 {
        let healthy = &by_provider[&format!("ok{}", i)];
        assert_eq!(healthy.len(), 3);
        assert!(healthy.iter().all(|o| o.reason() == Some("listed")));
    }

    let summary: Summary = outcomes.iter().collect();
    assert_eq!(summary.errors, 3);
    assert_eq!(summary.listed, 15);
    assert_eq!(summary.clean, 0);
}

#[tokio::test]
async fn test_lookup_is_idempotent() {
    let provider = StubProvider::listed("spam source");
    let mut first = lookup("5.6.7.8", &provider).await;
    let mut second = lookup("5.6.7.8", &provider).await;

    first.duration = None;
    second.duration = None;
    assert_eq!(first, second);
    assert_eq!(render_line(&first), render_line(&second));
}

#[tokio::test]
async fn test_stream_interleaves_with_slow_providers() {
    let providers = vec![
        shared(StubProvider::clean().named("fast")),
        shared(
            StubProvider::clean()
                .named("slow")
                .with_delay(Duration::from_millis(100)),
        ),
    ];
    let checker = BlacklistChecker::new();
    let mut stream = checker.check_all(&["192.0.2.10"], &providers);

    let first = stream.next_outcome().await.unwrap();
    assert_eq!(first.provider, "fast");
    let second = stream.next_outcome().await.unwrap();
    assert_eq!(second.provider, "slow");
    assert!(stream.next_outcome().await.is_none());
}
