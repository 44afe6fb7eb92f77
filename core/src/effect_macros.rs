//! Declarative macros for ergonomic effect construction.

/// Create an `Effect::Future` from an async block body
///
/// The body must evaluate to `Option<Action>`. Everything captured is moved
/// into the future, so clone `Arc`s out of the environment first.
///
/// # Example
///
/// ```rust,ignore
/// use pulltab_core::async_effect;
///
/// let notifier = Arc::clone(&env.notifier);
/// async_effect! {
///     notifier.notify(notification).await;
///     None
/// }
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::effect::Effect;

    #[derive(Clone, Debug, PartialEq)]
    enum TestAction {
        AsyncResult { value: i32 },
    }

    #[test]
    fn test_async_effect_macro() {
        let effect = async_effect! {
            Some(TestAction::AsyncResult { value: 42 })
        };

        assert!(matches!(effect, Effect::Future(_)));
    }

    #[tokio::test]
    async fn test_async_effect_macro_yields_body() {
        let Effect::Future(fut) = async_effect!(Some(TestAction::AsyncResult { value: 7 })) else {
            unreachable!("async_effect! always builds Effect::Future");
        };

        assert_eq!(fut.await, Some(TestAction::AsyncResult { value: 7 }));
    }
}
