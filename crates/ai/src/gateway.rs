use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use testgen_api::FileContent;
use testgen_core::extract::{extract_code_block, extract_json_array};
use testgen_core::framework::test_file_name;
use testgen_core::{RawSummary, SummaryCheck, TestSummary, check_summary};

use crate::error::AiError;
use crate::prompt::{summaries_prompt, test_code_prompt};
use crate::provider::LlmProvider;

/// Default end-to-end budget for one gateway call, shared by every attempt.
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(120);

/// Test file produced by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode {
    pub file_name: String,
    pub content: String,
    pub framework: String,
}

/// Ordered list of providers with fallback.
///
/// Each call tries the providers in order. An attempt is one completion plus
/// parsing its text, so a malformed answer falls through to the next
/// provider just like a failed request. All attempts share one time budget.
/// When every provider fails the last provider's error is returned.
#[derive(Clone)]
pub struct AiGateway {
    providers: Vec<Arc<dyn LlmProvider>>,
    budget: Duration,
}

impl AiGateway {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>, budget: Duration) -> Self {
        Self { providers, budget }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    async fn run<T>(
        &self,
        prompt: &str,
        parse: impl Fn(&str, &'static str) -> Result<T, AiError>,
    ) -> Result<T, AiError> {
        if self.providers.is_empty() {
            return Err(AiError::NoProviderConfigured);
        }

        let deadline = Instant::now() + self.budget;
        let mut last_err = AiError::NoProviderConfigured;

        for (idx, provider) in self.providers.iter().enumerate() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                last_err = AiError::Timeout(self.budget.as_secs());
                break;
            }

            let attempt = async {
                let text = provider.complete(prompt).await?;
                parse(&text, provider.name())
            };
            let outcome = match tokio::time::timeout(remaining, attempt).await {
                Ok(result) => result,
                Err(_) => Err(AiError::Timeout(self.budget.as_secs())),
            };

            match outcome {
                Ok(value) => {
                    if idx > 0 {
                        info!(provider = provider.name(), "fallback AI provider succeeded");
                    }
                    return Ok(value);
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "AI provider attempt failed");
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }

    /// Propose test cases for `files`.
    ///
    /// Returns one check per array element the model produced, after filling
    /// the fields models tend to omit. Callers decide what to do with
    /// invalid candidates.
    pub async fn summarize(&self, files: &[FileContent]) -> Result<Vec<SummaryCheck>, AiError> {
        self.run(&summaries_prompt(files), parse_summaries).await
    }

    /// Write a test file for `summary` against the current `source`.
    pub async fn generate_code(
        &self,
        summary: &TestSummary,
        source: &str,
        framework: &str,
    ) -> Result<GeneratedCode, AiError> {
        let prompt = test_code_prompt(summary, source, framework);
        self.run(&prompt, |text, provider| {
            let code = extract_code_block(text);
            if code.is_empty() {
                return Err(AiError::malformed(provider, "empty test code"));
            }
            Ok(GeneratedCode {
                file_name: test_file_name(&summary.file, framework),
                content: code.to_string(),
                framework: framework.to_string(),
            })
        })
        .await
    }
}

fn parse_summaries(text: &str, provider: &'static str) -> Result<Vec<SummaryCheck>, AiError> {
    let array = extract_json_array(text)
        .ok_or_else(|| AiError::malformed(provider, "no JSON array found in response"))?;
    let items: Vec<serde_json::Value> =
        serde_json::from_str(array).map_err(|e| AiError::malformed(provider, e.to_string()))?;
    Ok(items
        .iter()
        .enumerate()
        .map(|(idx, item)| check_summary(RawSummary::from_value(item).with_defaults(idx)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use testgen_core::{Complexity, Priority, TestType};

    /// Replays scripted outcomes and counts calls.
    struct Scripted {
        name: &'static str,
        replies: Mutex<VecDeque<Result<String, AiError>>>,
        calls: AtomicUsize,
        delay: Option<Duration>,
    }

    impl Scripted {
        fn new(name: &'static str, replies: Vec<Result<String, AiError>>) -> Arc<Self> {
            Arc::new(Self {
                name,
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
                delay: None,
            })
        }

        fn slow(name: &'static str, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                name,
                replies: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
                delay: Some(delay),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for Scripted {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
                return Ok("late".into());
            }
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AiError::malformed(self.name, "script exhausted")))
        }
    }

    fn gateway(providers: Vec<Arc<Scripted>>) -> AiGateway {
        AiGateway::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn LlmProvider>)
                .collect(),
            DEFAULT_BUDGET,
        )
    }

    fn summary() -> TestSummary {
        TestSummary {
            id: "t1".into(),
            title: "adds".into(),
            description: "adds two numbers".into(),
            test_type: TestType::Unit,
            file: "src/math.js".into(),
            priority: Priority::High,
            complexity: Complexity::Simple,
            framework: None,
            created_at: None,
        }
    }

    const SUMMARIES: &str = r#"Sure! Here they are:
```json
[
  {"id": "test-1", "title": "adds", "description": "adds numbers", "type": "unit", "file": "src/math.js", "priority": "high", "complexity": "simple"},
  {"title": "no id", "description": "d", "type": "integration", "file": "src/math.js"},
  {"id": "bad", "title": "t", "description": "d", "type": "smoke", "file": "src/math.js"}
]
```"#;

    #[tokio::test]
    async fn empty_gateway_fails_without_calling_anything() {
        let gw = AiGateway::new(Vec::new(), DEFAULT_BUDGET);
        assert!(!gw.is_configured());
        assert_eq!(
            gw.generate_code(&summary(), "src", "jest").await.unwrap_err(),
            AiError::NoProviderConfigured
        );
        assert_eq!(gw.summarize(&[]).await.unwrap_err(), AiError::NoProviderConfigured);
    }

    #[tokio::test]
    async fn summaries_are_checked_and_defaulted() {
        let primary = Scripted::new("primary", vec![Ok(SUMMARIES.into())]);
        let checks = gateway(vec![primary]).summarize(&[]).await.unwrap();
        assert_eq!(checks.len(), 3);

        let valid: Vec<TestSummary> = checks
            .iter()
            .cloned()
            .filter_map(SummaryCheck::into_valid)
            .collect();
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[1].id, "test-2");
        assert_eq!(valid[1].priority, Priority::Medium);
        assert!(matches!(checks[2], SummaryCheck::Invalid { .. }));
    }

    #[tokio::test]
    async fn rate_limited_primary_falls_back_to_secondary() {
        let primary = Scripted::new(
            "primary",
            vec![Err(AiError::RateLimited { provider: "primary" })],
        );
        let secondary = Scripted::new("secondary", vec![Ok("```js\ntest('x', () => {});\n```".into())]);
        let gw = gateway(vec![primary.clone(), secondary.clone()]);

        let code = gw.generate_code(&summary(), "src", "jest").await.unwrap();
        assert_eq!(code.content, "test('x', () => {});");
        assert_eq!(code.file_name, "math.test.js");
        assert_eq!(code.framework, "jest");
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn unparseable_primary_answer_falls_back() {
        let primary = Scripted::new("primary", vec![Ok("I cannot help with that.".into())]);
        let secondary = Scripted::new("secondary", vec![Ok(SUMMARIES.into())]);
        let checks = gateway(vec![primary, secondary.clone()])
            .summarize(&[])
            .await
            .unwrap();
        assert_eq!(checks.len(), 3);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn healthy_primary_skips_secondary() {
        let primary = Scripted::new("primary", vec![Ok("plain code".into())]);
        let secondary = Scripted::new("secondary", vec![]);
        let gw = gateway(vec![primary, secondary.clone()]);
        assert_eq!(
            gw.generate_code(&summary(), "src", "pytest").await.unwrap().file_name,
            "test_math.py"
        );
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn last_error_is_surfaced_when_all_fail() {
        let primary = Scripted::new(
            "primary",
            vec![Err(AiError::RateLimited { provider: "primary" })],
        );
        let secondary = Scripted::new(
            "secondary",
            vec![Err(AiError::InvalidCredentials { provider: "secondary" })],
        );
        let err = gateway(vec![primary, secondary])
            .generate_code(&summary(), "src", "jest")
            .await
            .unwrap_err();
        assert_eq!(err, AiError::InvalidCredentials { provider: "secondary" });
    }

    #[tokio::test(start_paused = true)]
    async fn budget_is_shared_across_attempts() {
        let slow = Scripted::slow("slow", Duration::from_secs(200));
        let never = Scripted::new("never", vec![Ok("code".into())]);
        let gw = AiGateway::new(
            vec![
                slow.clone() as Arc<dyn LlmProvider>,
                never.clone() as Arc<dyn LlmProvider>,
            ],
            Duration::from_secs(120),
        );

        let err = gw.generate_code(&summary(), "src", "jest").await.unwrap_err();
        assert_eq!(err, AiError::Timeout(120));
        assert_eq!(slow.calls(), 1);
        assert_eq!(never.calls(), 0);
    }
}
