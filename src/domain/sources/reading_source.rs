use crate::domain::percept::Reading;

/// Port for anything that produces station readings
///
/// Implemented by the simulated station and by scripted replays in
/// the infrastructure layer. A source is owned by exactly one sensor agent.
pub trait ReadingSource: Send {
    /// Produces the reading for the next poll tick
    fn next_reading(&mut self) -> Reading;

    /// Short label used in logs
    fn name(&self) -> &str {
        "reading-source"
    }
}

impl<S: ReadingSource + ?Sized> ReadingSource for Box<S> {
    fn next_reading(&mut self) -> Reading {
        (**self).next_reading()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
