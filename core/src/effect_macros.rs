//! Declarative macros for building `Effect` values

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::async_effect;
///
/// async_effect! {
///     let seats = catalog.refresh().await;
///     Some(SessionAction::SeatsRefreshed { seats })
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

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::delay;
/// use std::time::Duration;
///
/// delay! {
///     duration: Duration::from_secs(2),
///     action: SessionAction::ResetSession
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

/// Create an `Effect::Cancellable` around another effect
///
/// # Example
///
/// ```rust,ignore
/// use marquee_core::{cancellable, delay};
///
/// cancellable! {
///     id: "session-reset",
///     effect: delay! { duration: Duration::from_secs(2), action: SessionAction::ResetSession }
/// }
/// ```
#[macro_export]
macro_rules! cancellable {
    (
        id: $id:expr,
        effect: $effect:expr
    ) => {
        $crate::effect::Effect::Cancellable {
            id: $crate::effect::EffectId::new($id),
            effect: ::std::boxed::Box::new($effect),
        }
    };
}
