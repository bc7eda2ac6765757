use mtf_core::MtfError;

/// Await `fut`, failing with `RequestTimeout(capability)` once `deadline` elapses.
pub(crate) async fn with_request_deadline<F, T>(
    capability: &str,
    deadline: Option<std::time::Duration>,
    fut: F,
) -> Result<T, MtfError>
where
    F: core::future::Future<Output = T>,
{
    match deadline {
        Some(d) => tokio::time::timeout(d, fut)
            .await
            .map_err(|_| MtfError::request_timeout(capability)),
        None => Ok(fut.await),
    }
}

/// Join a collection of tasks and apply an optional request-level deadline.
///
/// This wraps `futures::future::join_all(tasks)`. On timeout it returns
/// `MtfError::RequestTimeout` labelled `request`; call sites can remap the
/// label to a more specific capability.
///
/// # Errors
/// Returns `RequestTimeout` if the deadline elapses before every task finishes.
pub async fn join_with_deadline<I, F, T>(
    tasks: I,
    deadline: Option<std::time::Duration>,
) -> Result<Vec<T>, MtfError>
where
    I: IntoIterator<Item = F>,
    F: core::future::Future<Output = T>,
{
    with_request_deadline("request", deadline, futures::future::join_all(tasks)).await
}

/// Collapse a set of per-source errors into a uniform `MtfError` outcome.
///
/// Rules:
/// - If all errors are `ProviderTimeout` → `AllProvidersTimedOut(capability)`.
/// - If `not_found_what` is `Some` and all errors are `NotFound` → `NotFound(what)`.
/// - Else → `AllProvidersFailed(errors)`.
#[must_use]
pub fn collapse_errors(
    capability: &str,
    errors: Vec<MtfError>,
    not_found_what: Option<String>,
) -> MtfError {
    if !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, MtfError::ProviderTimeout { .. }))
    {
        return MtfError::AllProvidersTimedOut {
            capability: capability.to_string(),
        };
    }
    if let Some(what) = not_found_what
        && !errors.is_empty()
        && errors
            .iter()
            .all(|e| matches!(e, MtfError::NotFound { .. }))
    {
        return MtfError::not_found(what);
    }
    MtfError::AllProvidersFailed(errors)
}
