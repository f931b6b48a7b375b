/// Reports progress of long-running collection work.
pub trait Progress: Send + Sync {
    /// Label the current stage of work (e.g., "Searching", "Analyzing").
    fn set_phase(&self, phase: &str);

    /// Set how many units of work the current phase has.
    fn set_total(&self, total: u64);

    /// Mark one unit of work as complete, with a short description of it.
    fn advance(&self, message: &str);

    /// Print a line without disturbing the progress indicator.
    fn println(&self, message: &str);

    /// Finish and clear the progress indicator.
    fn done(&self);
}
