//! The external translation capability the engine drives.

use async_trait::async_trait;
use std::future::Future;

use crate::error::TranslateError;

/// Something that turns one paragraph of text into its translation.
///
/// Every call is independent: implementations get whole paragraphs, one at
/// a time, and must not rely on call order.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Adapts an async closure into a [`Translator`].
///
/// ```
/// use deck_core::{FnTranslator, TranslateError};
///
/// let upper = FnTranslator(|text: String| async move {
///     Ok::<_, TranslateError>(text.to_uppercase())
/// });
/// # let _ = upper;
/// ```
pub struct FnTranslator<F>(pub F);

#[async_trait]
impl<F, Fut> Translator for FnTranslator<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String, TranslateError>> + Send,
{
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (self.0)(text.to_string()).await
    }
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for std::sync::Arc<T> {
    async fn translate(&self, text: &str) -> Result<String, TranslateError> {
        (**self).translate(text).await
    }
}
