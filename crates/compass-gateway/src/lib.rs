//! AI gateway adapter: obtains one assistant reply from a remote
//! chat-completion service.
//!
//! The [`ChatCompletion`] trait is the seam the HTTP layer depends on;
//! [`HttpGateway`] is the production implementation. Every call runs under a
//! [`CompletionCall`], which carries the deadline and a cancel handle.
//!
//! Persisting the resulting turns is the caller's job.

pub mod call;
pub mod error;
pub mod http;
pub mod reply;

use std::future::Future;

use compass_core::conversation::ChatTurn;

pub use call::{CancelHandle, CompletionCall};
pub use error::GatewayError;
pub use http::{GatewayConfig, HttpGateway};
pub use reply::GatewayReply;

/// Something that can turn a system prompt plus a conversation into one
/// assistant reply.
pub trait ChatCompletion: Send + Sync {
  /// `turns` are sent in order after the system prompt. No retries.
  fn complete<'a>(
    &'a self,
    system_prompt: &'a str,
    turns: &'a [ChatTurn],
  ) -> impl Future<Output = Result<GatewayReply, GatewayError>> + Send + 'a;
}
