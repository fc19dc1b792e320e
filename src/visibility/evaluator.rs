//! Hidden Evaluator — resolves effective visibility for a set of entries.
//!
//! Given a batch of items and one shared [`EvaluationContext`], the evaluator
//! resolves each item's visibility rule and returns the visible subset in the
//! original relative order. Static rules resolve immediately; predicate rules
//! are fanned out concurrently, each bounded by the same per-predicate
//! timeout, and a predicate shared by several items runs at most once per
//! call.
//!
//! Failure policy is fail open: a predicate that errors or times out resolves
//! as *visible* and the failure is logged. A defective visibility rule must
//! not make already-published capabilities vanish from discovery; the cost is
//! at worst a temporary over-exposure of an entry's existence in listings,
//! never of its invocability (which ignores visibility entirely).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::capabilities::{Visibility, VisibilityPredicate};
use crate::visibility::EvaluationContext;

/// Default per-predicate timeout in milliseconds. Generous, because
/// predicates are expected to be cheap flag checks or map lookups.
pub const DEFAULT_PREDICATE_TIMEOUT_MS: u64 = 500;

// ---------------------------------------------------------------------------
// VisibilityTarget
// ---------------------------------------------------------------------------

/// Implemented by anything the evaluator can filter.
///
/// `visibility` is the rule carried on the item itself; the evaluator also
/// consults the per-call registry resolver, which takes precedence. Items
/// unknown to both resolve as visible.
pub trait VisibilityTarget {
    /// Identifier used in failure logs.
    fn target_id(&self) -> &str;

    /// Visibility carried on the item itself, if any.
    fn visibility(&self) -> Option<&Visibility> {
        None
    }
}

impl<T: VisibilityTarget + ?Sized> VisibilityTarget for &T {
    fn target_id(&self) -> &str {
        (**self).target_id()
    }

    fn visibility(&self) -> Option<&Visibility> {
        (**self).visibility()
    }
}

impl VisibilityTarget for crate::capabilities::ToolEntry {
    fn target_id(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> Option<&Visibility> {
        Some(&self.visibility)
    }
}

impl VisibilityTarget for crate::capabilities::ResourceEntry {
    fn target_id(&self) -> &str {
        &self.uri
    }

    fn visibility(&self) -> Option<&Visibility> {
        Some(&self.visibility)
    }
}

impl VisibilityTarget for crate::capabilities::PromptEntry {
    fn target_id(&self) -> &str {
        &self.name
    }

    fn visibility(&self) -> Option<&Visibility> {
        Some(&self.visibility)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Per-item evaluation result. `Failed` stays observable for logging and
/// collapses to visible only at the final filtering step.
#[derive(Debug, Clone)]
enum Outcome {
    Visible,
    Hidden,
    Failed(String),
}

// ---------------------------------------------------------------------------
// HiddenEvaluator
// ---------------------------------------------------------------------------

/// Concurrent, timeout-bounded, fail-open visibility evaluation.
#[derive(Debug, Clone)]
pub struct HiddenEvaluator {
    /// Upper bound on each individual predicate invocation.
    predicate_timeout: Duration,
}

impl Default for HiddenEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl HiddenEvaluator {
    /// Create an evaluator with the default per-predicate timeout.
    pub fn new() -> Self {
        Self {
            predicate_timeout: Duration::from_millis(DEFAULT_PREDICATE_TIMEOUT_MS),
        }
    }

    /// Builder: set the per-predicate timeout.
    pub fn with_predicate_timeout(mut self, timeout: Duration) -> Self {
        self.predicate_timeout = timeout;
        self
    }

    /// The configured per-predicate timeout.
    pub fn predicate_timeout(&self) -> Duration {
        self.predicate_timeout
    }

    /// Filter `items` down to the subset visible under `ctx`.
    ///
    /// `resolve` is the registry-side lookup: given an item, it returns the
    /// visibility recorded for it in the registry, or `None` when the
    /// registry has no entry. Resolution falls back to the visibility the
    /// item carries itself, and finally to visible — an item nobody claims a
    /// rule for is listed.
    ///
    /// Relative order of surviving items matches the input. Never returns an
    /// error: predicate failures and timeouts are logged and resolved as
    /// visible.
    pub async fn filter_visible<T, R>(
        &self,
        items: Vec<T>,
        resolve: R,
        ctx: &Arc<EvaluationContext>,
    ) -> Vec<T>
    where
        T: VisibilityTarget,
        R: Fn(&T) -> Option<Visibility>,
    {
        // Phase 1: split static outcomes from predicate-bearing items.
        let mut outcomes: Vec<Outcome> = Vec::with_capacity(items.len());
        let mut pending: Vec<(usize, VisibilityPredicate)> = Vec::new();
        for (idx, item) in items.iter().enumerate() {
            let effective = resolve(item)
                .or_else(|| item.visibility().cloned())
                .unwrap_or_default();
            match effective {
                Visibility::Always => outcomes.push(Outcome::Visible),
                Visibility::Static(hidden) => outcomes.push(if hidden {
                    Outcome::Hidden
                } else {
                    Outcome::Visible
                }),
                Visibility::Predicate(predicate) => {
                    // Placeholder; overwritten once the predicate resolves.
                    outcomes.push(Outcome::Visible);
                    pending.push((idx, predicate));
                }
            }
        }

        if pending.is_empty() {
            return self.finish(items, outcomes);
        }

        // Phase 2: deduplicate predicates by Arc identity so each distinct
        // rule runs once per call no matter how many items share it.
        let mut seen: HashMap<usize, usize> = HashMap::new();
        let mut unique: Vec<(VisibilityPredicate, Vec<usize>)> = Vec::new();
        for (idx, predicate) in pending {
            let key = Arc::as_ptr(&predicate).cast::<()>() as usize;
            match seen.get(&key) {
                Some(&slot) => unique[slot].1.push(idx),
                None => {
                    seen.insert(key, unique.len());
                    unique.push((predicate, vec![idx]));
                }
            }
        }

        // Phase 3: fan out, one timeout per predicate. Only one predicate's
        // synchronous code runs at a time; suspension happens at await
        // points inside the predicates themselves.
        let timeout = self.predicate_timeout;
        let evaluations = unique.iter().map(|(predicate, _)| {
            let predicate = Arc::clone(predicate);
            let ctx = Arc::clone(ctx);
            async move {
                match tokio::time::timeout(timeout, predicate(ctx)).await {
                    Ok(Ok(true)) => Outcome::Hidden,
                    Ok(Ok(false)) => Outcome::Visible,
                    Ok(Err(err)) => Outcome::Failed(err.to_string()),
                    Err(_) => Outcome::Failed(format!(
                        "timed out after {}ms",
                        timeout.as_millis()
                    )),
                }
            }
        });
        let results = join_all(evaluations).await;

        for ((_, indices), outcome) in unique.iter().zip(results) {
            for &idx in indices {
                outcomes[idx] = outcome.clone();
            }
        }

        self.finish(items, outcomes)
    }

    /// Collapse outcomes: `Failed` logs once per affected item, then counts
    /// as visible.
    fn finish<T: VisibilityTarget>(&self, items: Vec<T>, outcomes: Vec<Outcome>) -> Vec<T> {
        items
            .into_iter()
            .zip(outcomes)
            .filter_map(|(item, outcome)| match outcome {
                Outcome::Visible => Some(item),
                Outcome::Hidden => None,
                Outcome::Failed(reason) => {
                    log::warn!(
                        "visibility predicate for `{}` failed: {reason}; treating as visible",
                        item.target_id()
                    );
                    Some(item)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::ToolEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    async fn names_after_filter(
        evaluator: &HiddenEvaluator,
        items: Vec<ToolEntry>,
        ctx: EvaluationContext,
    ) -> Vec<String> {
        let ctx = Arc::new(ctx);
        evaluator
            .filter_visible(items, |t| Some(t.visibility.clone()), &ctx)
            .await
            .into_iter()
            .map(|t| t.name)
            .collect()
    }

    #[tokio::test]
    async fn test_static_visibility() {
        let evaluator = HiddenEvaluator::new();
        let items = vec![
            ToolEntry::new("a", "visible"),
            ToolEntry::new("b", "hidden").with_visibility(Visibility::hidden()),
            ToolEntry::new("c", "explicitly shown").with_visibility(Visibility::Static(false)),
        ];
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_predicate_depends_only_on_context() {
        let evaluator = HiddenEvaluator::new();
        let admin_only = || Visibility::predicate_fn(|ctx| !ctx.flag("is_admin"));

        let items = vec![
            ToolEntry::new("a", "plain"),
            ToolEntry::new("c", "admin").with_visibility(admin_only()),
        ];
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["a"]);

        let items = vec![
            ToolEntry::new("a", "plain"),
            ToolEntry::new("c", "admin").with_visibility(admin_only()),
        ];
        let visible = names_after_filter(
            &evaluator,
            items,
            EvaluationContext::new().with("is_admin", true),
        )
        .await;
        assert_eq!(visible, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_failing_predicate_is_visible() {
        init_logging();
        let evaluator = HiddenEvaluator::new();
        let items = vec![ToolEntry::new("flaky", "errors out").with_visibility(
            Visibility::predicate(|_ctx| async { Err("backend unreachable".into()) }),
        )];
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["flaky"]);
    }

    #[tokio::test]
    async fn test_timed_out_predicate_is_visible() {
        init_logging();
        let evaluator = HiddenEvaluator::new().with_predicate_timeout(Duration::from_millis(25));
        let items = vec![ToolEntry::new("stuck", "never resolves").with_visibility(
            Visibility::predicate(|_ctx| async {
                futures::future::pending::<()>().await;
                Ok(true)
            }),
        )];
        let started = std::time::Instant::now();
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["stuck"]);
        // Bounded by the timeout, not by the predicate.
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_shared_predicate_runs_once() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let rule = match Visibility::predicate(|_ctx| async {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(false)
        }) {
            Visibility::Predicate(p) => p,
            _ => unreachable!(),
        };

        let evaluator = HiddenEvaluator::new();
        let items = vec![
            ToolEntry::new("x", "first").with_visibility(Visibility::Predicate(Arc::clone(&rule))),
            ToolEntry::new("y", "second").with_visibility(Visibility::Predicate(Arc::clone(&rule))),
            ToolEntry::new("z", "third").with_visibility(Visibility::Predicate(rule)),
        ];
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["x", "y", "z"]);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_order_preserved_with_mixed_rules() {
        let evaluator = HiddenEvaluator::new();
        let items = vec![
            ToolEntry::new("a", "static"),
            ToolEntry::new("b", "hidden").with_visibility(Visibility::hidden()),
            ToolEntry::new("c", "predicate")
                .with_visibility(Visibility::predicate_fn(|_| false)),
            ToolEntry::new("d", "static"),
        ];
        let visible = names_after_filter(&evaluator, items, EvaluationContext::new()).await;
        assert_eq!(visible, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_unknown_items_default_to_visible() {
        // Resolver knows nothing and items carry no rule of their own.
        struct Bare(&'static str);
        impl VisibilityTarget for Bare {
            fn target_id(&self) -> &str {
                self.0
            }
        }

        let evaluator = HiddenEvaluator::new();
        let ctx = Arc::new(EvaluationContext::new());
        let visible = tokio_test::block_on(evaluator.filter_visible(
            vec![Bare("u"), Bare("v")],
            |_| None,
            &ctx,
        ));
        assert_eq!(visible.len(), 2);
    }
}
