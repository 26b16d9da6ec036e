//! Blocking wrappers over the async client surface
//!
//! Each call spawns a dedicated OS thread, builds a single-threaded tokio
//! runtime on it, drives the future to completion and tears both down. The
//! caller's thread blocks, but its own runtime (if any) is never entered, so
//! these wrappers can be called from inside an async context without
//! tripping "cannot start a runtime from within a runtime".

use crate::{
    error::SentinelError,
    provider::{GenerateRequest, LlmProvider},
    response::LlmResponse,
};
use std::{future::Future, panic, thread};

/// Run `future` to completion on an isolated worker thread
///
/// # Errors
///
/// `SentinelError::WorkerRuntime` if the worker runtime cannot be built.
/// A panic inside the future is resumed on the calling thread.
pub fn run_blocking<F>(future: F) -> Result<F::Output, SentinelError>
where
    F: Future + Send,
    F::Output: Send,
{
    thread::scope(|scope| {
        let worker = scope.spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| {
                    SentinelError::WorkerRuntime(format!("Failed to build worker runtime: {e}"))
                })?;
            Ok(runtime.block_on(future))
        });

        match worker.join() {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    })
}

/// Synchronous variants of the `LlmProvider` operations
pub trait BlockingLlmProvider {
    /// Blocking `generate`
    fn generate_blocking(&self, request: GenerateRequest<'_>)
        -> Result<LlmResponse, SentinelError>;

    /// Blocking `validate_credentials`; still never fails
    fn validate_credentials_blocking(&self) -> bool;
}

impl<T: LlmProvider + ?Sized> BlockingLlmProvider for T {
    fn generate_blocking(
        &self,
        request: GenerateRequest<'_>,
    ) -> Result<LlmResponse, SentinelError> {
        run_blocking(self.generate(request))?
    }

    fn validate_credentials_blocking(&self) -> bool {
        match run_blocking(self.validate_credentials()) {
            Ok(valid) => valid,
            Err(e) => {
                log::error!(
                    "Credential validation for {} could not run: {e}",
                    self.provider_name()
                );
                false
            }
        }
    }
}
