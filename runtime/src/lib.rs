//! # Pull-Tab Runtime
//!
//! Executes the effect descriptions returned by reducers.
//!
//! Unlike a long-lived store, the pull-tab engine runs every command as a
//! single request/response: the persistence shell reduces one command inside a
//! database transaction, commits, and then hands the collected effects to
//! [`execute`]. Actions produced by `Effect::Future` are returned to the caller
//! instead of being fed back automatically, so the caller decides whether a
//! follow-up command deserves its own transaction.
//!
//! # Example
//!
//! ```ignore
//! let effects = reducer.reduce(&mut state, action, &env);
//! tx.commit().await?;
//! let feedback = pulltab_runtime::execute_all(effects).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod metrics;

use pulltab_core::effect::Effect;
use std::time::Instant;

/// Execute a single effect, returning the action it produced, if any.
///
/// - `Effect::None` completes immediately.
/// - `Effect::Future` is awaited and timed.
pub async fn execute<A>(effect: Effect<A>) -> Option<A>
where
    A: Send + 'static,
{
    match effect {
        Effect::None => {
            tracing::trace!("Executing Effect::None (no-op)");
            None
        },
        Effect::Future(fut) => {
            tracing::trace!("Executing Effect::Future");
            let started = Instant::now();
            let produced = fut.await;
            metrics::EffectMetrics::record_execution("future", started.elapsed());
            produced
        },
    }
}

/// Execute a batch of effects in order, as returned by a reducer.
pub async fn execute_all<A, I>(effects: I) -> Vec<A>
where
    A: Send + 'static,
    I: IntoIterator<Item = Effect<A>>,
{
    let mut produced = Vec::new();
    for effect in effects {
        produced.extend(execute(effect).await);
    }
    produced
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum TestAction {
        Step(u32),
    }

    fn recording(log: &Arc<Mutex<Vec<u32>>>, step: u32, emit: bool) -> Effect<TestAction> {
        let log = Arc::clone(log);
        Effect::Future(Box::pin(async move {
            log.lock().unwrap().push(step);
            emit.then_some(TestAction::Step(step))
        }))
    }

    #[tokio::test]
    async fn test_none_produces_nothing() {
        assert!(execute(Effect::<TestAction>::None).await.is_none());
    }

    #[tokio::test]
    async fn test_future_feedback_is_collected() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let produced = execute(recording(&log, 1, true)).await;
        assert_eq!(produced, Some(TestAction::Step(1)));
        assert_eq!(*log.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_execute_all_runs_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let produced = execute_all(vec![
            recording(&log, 1, false),
            Effect::None,
            recording(&log, 2, true),
            recording(&log, 3, true),
        ])
        .await;

        assert_eq!(*log.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(produced, vec![TestAction::Step(2), TestAction::Step(3)]);
    }
}
