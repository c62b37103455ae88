//! Single-result adapters over operation streams.
//!
//! Lookups don't need progress rendering, only the first value. A "not found"
//! error becomes an empty result here and nowhere else.
use crate::engine::OpStream;
use crate::error::EngineError;
use futures::StreamExt;
use std::time::Duration;

/// Wait up to `limit` for the stream's first value or its completion.
pub async fn first<T>(
    mut stream: OpStream<T>,
    limit: Duration,
) -> Result<Option<T>, EngineError> {
    let next = tokio::time::timeout(limit, stream.next())
        .await
        .map_err(|_| EngineError::Timeout {
            waited: limit,
            what: "lookup",
        })?;
    match next {
        Some(Ok(value)) => Ok(Some(value)),
        None => Ok(None),
        Some(Err(err)) if err.is_not_found() => {
            tracing::debug!(%err, "lookup found nothing");
            Ok(None)
        }
        Some(Err(err)) => Err(err),
    }
}

/// Synchronous form of [`first`] for callers outside any async runtime.
///
/// Builds a private current-thread runtime, so it must not be called from
/// within a Tokio runtime, and the stream must not depend on tasks spawned
/// on another runtime.
pub fn block_on_first<T>(
    stream: OpStream<T>,
    limit: Duration,
) -> Result<Option<T>, EngineError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(EngineError::Runtime)?;
    runtime.block_on(first(stream, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use futures::stream;

    fn boxed<T: Send + 'static>(items: Vec<Result<T, EngineError>>) -> OpStream<T> {
        Box::pin(stream::iter(items))
    }

    fn not_found() -> EngineError {
        ApiError::NotFound {
            message: "Stack with id production does not exist".to_string(),
        }
        .into()
    }

    #[test]
    fn returns_first_value() {
        let value = block_on_first(boxed(vec![Ok(1), Ok(2)]), Duration::from_secs(1));
        assert_eq!(value.expect("first"), Some(1));
    }

    #[test]
    fn empty_stream_is_empty_result() {
        let value = block_on_first(boxed::<u8>(Vec::new()), Duration::from_secs(1));
        assert_eq!(value.expect("first"), None);
    }

    #[test]
    fn not_found_is_empty_result() {
        let value = block_on_first(boxed::<u8>(vec![Err(not_found())]), Duration::from_secs(1));
        assert_eq!(value.expect("first"), None);
    }

    #[test]
    fn other_errors_propagate() {
        let err = ApiError::Transport {
            operation: "describe_stacks",
            code: "Throttling".to_string(),
            message: "Rate exceeded".to_string(),
        };
        let result = block_on_first(boxed::<u8>(vec![Err(err.into())]), Duration::from_secs(1));
        assert!(matches!(result, Err(EngineError::Api(ApiError::Transport { .. }))));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_stream_times_out() {
        let silent: OpStream<u8> = Box::pin(stream::pending());
        let result = first(silent, Duration::from_secs(10)).await;
        assert!(matches!(result, Err(EngineError::Timeout { .. })));
    }
}
