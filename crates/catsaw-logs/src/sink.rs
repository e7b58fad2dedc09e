use catsaw_types::{RenderedLine, StatusSnapshot};

/// Destination of everything the engine shows
pub trait RenderSink {
    /// A record that passed the filter pipeline
    fn render(&mut self, line: RenderedLine);

    /// A line from the log source's error stream, shown verbatim
    fn diagnostic(&mut self, text: &str);

    /// Feedback about a command ("Clearing log level", "Found PID 1234")
    fn notice(&mut self, text: &str);

    /// Latest status, sent after every processed batch and command
    fn status(&mut self, snapshot: &StatusSnapshot);

    /// Remove the transient status text; calling it twice is harmless
    fn clear_line(&mut self);
}
