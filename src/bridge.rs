// ABOUTME: Scoped sync-to-async bridge for blocking tool calls.
// ABOUTME: Runs one future on a dedicated thread with its own runtime.

use std::future::Future;

use crate::error::ToolError;

/// Run `future` to completion from synchronous code.
///
/// Each call gets a fresh current-thread runtime on its own OS thread, so
/// this works both from plain threads and from inside an existing tokio
/// runtime without touching the caller's executor.
pub fn block_on<F>(future: F) -> Result<F::Output, ToolError>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handle = std::thread::Builder::new()
        .name("mcp-relay-call".into())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            Ok::<_, std::io::Error>(runtime.block_on(future))
        })
        .map_err(|e| ToolError::Execution(e.into()))?;

    match handle.join() {
        Ok(result) => result.map_err(|e| ToolError::Execution(e.into())),
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
