//! Named worker threads that log through an injected dispatch.
//!
//! A `tracing` subscriber installed with `set_default` is thread-local, so a
//! freshly spawned thread would otherwise log nowhere. Each worker runs its
//! body under the [`Dispatch`] captured by whoever built it.

use std::thread::{self, JoinHandle};

use tracing::Dispatch;

use crate::error::{PipelineError, Result};

/// The dispatch that is in scope on the calling thread.
pub fn current_dispatch() -> Dispatch {
    tracing::dispatcher::get_default(|current| current.clone())
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PipelineError::InvalidName {
            name: name.to_string(),
            reason: "must not be empty",
        });
    }
    if name.contains('\0') {
        return Err(PipelineError::InvalidName {
            name: name.to_string(),
            reason: "must not contain NUL bytes",
        });
    }
    Ok(())
}

pub(crate) fn spawn<F>(name: String, dispatch: Dispatch, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    validate_name(&name)?;
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || tracing::dispatcher::with_default(&dispatch, body))
        .map_err(|source| PipelineError::spawn(name, source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_names_the_thread() {
        let handle = spawn("worker-7".to_string(), current_dispatch(), || {
            assert_eq!(thread::current().name(), Some("worker-7"));
        })
        .unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_rejects_nul_in_name() {
        let result = spawn("bad\0name".to_string(), current_dispatch(), || {});
        assert!(matches!(result, Err(PipelineError::InvalidName { .. })));
    }

    #[test]
    fn test_rejects_empty_name() {
        assert!(validate_name("").is_err());
        assert!(validate_name("producer").is_ok());
    }
}
