use smartpro_core::AppError;

/// Fetch control flags kept by every session store.
///
/// `fetched` is the only "do not refetch" signal; a failed fetch still sets
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStatus {
    /// A remote call is in flight.
    pub loading: bool,
    /// Failure recorded by the most recent fetch, cleared when the next one
    /// starts.
    pub error: Option<AppError>,
    /// At least one fetch completed since construction or the last clear.
    pub fetched: bool,
}
