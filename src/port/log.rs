/// Logging hook the engine reports diagnostics through
///
/// Formatting and destination are up to the implementation.
pub trait LogSink {
    fn log(&self, prefix: &str, message: &str);
}
