//! [`CompletionCall`]: an outbound call with an explicit deadline and
//! cancel operation.
//!
//! When the deadline passes or the call is cancelled, the wrapped future is
//! dropped, which aborts the in-flight HTTP request.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::{sync::Notify, time::Instant};

use crate::GatewayError;

/// A single bounded, cancellable gateway call.
#[derive(Debug)]
pub struct CompletionCall {
  deadline: Instant,
  timeout:  Duration,
  cancel:   Arc<Notify>,
}

/// Cancels the [`CompletionCall`] it was taken from. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<Notify>);

impl CancelHandle {
  /// Cancel the call. Safe to invoke before the call starts running, after
  /// it finishes, or more than once.
  pub fn cancel(&self) { self.0.notify_one(); }
}

impl CompletionCall {
  /// A call whose deadline is `timeout` from now.
  pub fn with_timeout(timeout: Duration) -> Self {
    Self {
      deadline: Instant::now() + timeout,
      timeout,
      cancel: Arc::new(Notify::new()),
    }
  }

  pub fn deadline(&self) -> Instant { self.deadline }

  pub fn cancel_handle(&self) -> CancelHandle { CancelHandle(self.cancel.clone()) }

  /// Drive `fut` until it completes, the deadline passes, or the call is
  /// cancelled, whichever comes first.
  pub async fn run<F, T>(self, fut: F) -> Result<T, GatewayError>
  where
    F: Future<Output = Result<T, GatewayError>>,
  {
    tokio::select! {
      res = fut => res,
      () = tokio::time::sleep_until(self.deadline) => {
        tracing::warn!(timeout = ?self.timeout, "completion call timed out");
        Err(GatewayError::Timeout(self.timeout))
      }
      () = self.cancel.notified() => Err(GatewayError::Cancelled),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicBool, Ordering};

  use super::*;

  /// Sets its flag when dropped.
  struct DropFlag(Arc<AtomicBool>);

  impl Drop for DropFlag {
    fn drop(&mut self) { self.0.store(true, Ordering::SeqCst); }
  }

  #[tokio::test]
  async fn completes_before_deadline() {
    let call = CompletionCall::with_timeout(Duration::from_secs(5));
    let out = call.run(async { Ok::<_, GatewayError>(7) }).await.unwrap();
    assert_eq!(out, 7);
  }

  #[tokio::test(start_paused = true)]
  async fn times_out_and_drops_pending_future() {
    let dropped = Arc::new(AtomicBool::new(false));
    let guard = DropFlag(dropped.clone());

    let call = CompletionCall::with_timeout(Duration::from_secs(15));
    let deadline = call.deadline();
    let err = call
      .run(async move {
        let _guard = guard;
        std::future::pending::<Result<(), GatewayError>>().await
      })
      .await
      .unwrap_err();

    assert!(matches!(err, GatewayError::Timeout(t) if t == Duration::from_secs(15)));
    assert!(Instant::now() >= deadline);
    assert!(dropped.load(Ordering::SeqCst), "pending call leaked");
  }

  #[tokio::test]
  async fn cancel_before_run_is_remembered() {
    let call = CompletionCall::with_timeout(Duration::from_secs(60));
    call.cancel_handle().cancel();
    let err = call
      .run(std::future::pending::<Result<(), GatewayError>>())
      .await
      .unwrap_err();
    assert!(matches!(err, GatewayError::Cancelled));
  }

  #[tokio::test]
  async fn cancel_from_another_task() {
    let call = CompletionCall::with_timeout(Duration::from_secs(60));
    let handle = call.cancel_handle();
    tokio::spawn(async move {
      tokio::time::sleep(Duration::from_millis(20)).await;
      handle.cancel();
    });
    let err = call
      .run(std::future::pending::<Result<(), GatewayError>>())
      .await
      .unwrap_err();
    assert!(matches!(err, GatewayError::Cancelled));
  }
}
