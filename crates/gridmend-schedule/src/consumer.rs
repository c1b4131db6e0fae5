/// Anything the scheduler can refresh: a grid view, a chart, a summary
/// panel. One required method, checked at compile time.
pub trait Consumer {
    /// Re-read whatever this consumer presents.
    ///
    /// An error is caught and logged by the scheduler and never prevents
    /// the other pending consumers in the same batch from running.
    fn refresh(&mut self) -> anyhow::Result<()>;
}
