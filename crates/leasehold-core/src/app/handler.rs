//! MessageHandler - caller-supplied processing logic.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::HandlerError;

/// Processes one message payload.
///
/// ```ignore
/// struct SendEmail;
///
/// #[async_trait]
/// impl MessageHandler<EmailRequest> for SendEmail {
///     async fn handle(&self, message: &EmailRequest) -> Result<(), HandlerError> {
///         mailer::send(&message.to, &message.body).await.map_err(HandlerError::from_error)
///     }
/// }
/// ```
///
/// `Ok` deletes the message. `Err` leaves it to reappear after its lease
/// expires, so handlers must tolerate seeing the same message twice.
#[async_trait]
pub trait MessageHandler<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    async fn handle(&self, message: &T) -> Result<(), HandlerError>;
}

#[async_trait]
impl<T, H> MessageHandler<T> for Arc<H>
where
    T: Send + Sync + 'static,
    H: MessageHandler<T> + ?Sized,
{
    async fn handle(&self, message: &T) -> Result<(), HandlerError> {
        (**self).handle(message).await
    }
}

/// Adapter turning an async closure over an owned payload into a handler.
pub struct FnHandler<F> {
    f: F,
}

/// ```ignore
/// let handler = handler_fn(|order: Order| async move {
///     println!("shipping {}", order.id);
///     Ok(())
/// });
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F> {
    FnHandler { f }
}

#[async_trait]
impl<T, F, Fut> MessageHandler<T> for FnHandler<F>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, message: &T) -> Result<(), HandlerError> {
        (self.f)(message.clone()).await
    }
}
