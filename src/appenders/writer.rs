//! Appender writing formatted events to any `io::Write`
//!
//! [`WriterAppender`] owns at most one writer at a time. Installing a new
//! writer closes the previous one and writes the layout header; closing the
//! appender writes the footer and closes the writer. Write and flush failures
//! never reach the logging caller: they go to the appender's error handler.

use crate::core::appender::{Appender, AppenderSkeleton};
use crate::core::diagnostics;
use crate::core::error::{LoggerError, Result};
use crate::core::error_handler::ErrorCode;
use crate::core::event::LoggingEvent;
use crate::core::layout::{Layout, LINE_SEP};
use crate::core::level::Level;
use encoding_rs::Encoding;
use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;

pub type BoxedWriter = Box<dyn Write + Send>;

/// When the writer is flushed after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlushPolicy {
    /// After every event.
    #[default]
    Immediate,
    /// Only when the writer's own buffer decides, on explicit flush, or at close.
    Buffered,
    /// After events at or above the given level.
    AtLeast(Level),
}

impl FlushPolicy {
    fn should_flush(&self, event: &LoggingEvent) -> bool {
        match self {
            FlushPolicy::Immediate => true,
            FlushPolicy::Buffered => false,
            FlushPolicy::AtLeast(level) => event.level.is_greater_or_equal(level),
        }
    }
}

struct WriterState {
    writer: Option<BoxedWriter>,
    encoding: &'static Encoding,
    flush_policy: FlushPolicy,
}

pub struct WriterAppender {
    skeleton: AppenderSkeleton,
    state: Mutex<WriterState>,
}

impl WriterAppender {
    /// An appender with neither layout nor writer. Appends fail softly until
    /// both are set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            skeleton: AppenderSkeleton::new(name),
            state: Mutex::new(WriterState {
                writer: None,
                encoding: encoding_rs::UTF_8,
                flush_policy: FlushPolicy::default(),
            }),
        }
    }

    pub fn with_writer<W>(name: impl Into<String>, layout: Arc<dyn Layout>, writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let appender = Self::new(name);
        appender.skeleton.set_layout(Some(layout));
        appender.set_writer(writer);
        appender
    }

    pub fn set_layout(&self, layout: Arc<dyn Layout>) {
        self.skeleton.set_layout(Some(layout));
    }

    /// Close the current writer, if any, then install `writer` and write the
    /// layout header to it.
    pub fn set_writer<W>(&self, writer: W)
    where
        W: Write + Send + 'static,
    {
        self.set_boxed_writer(Box::new(writer));
    }

    pub fn set_boxed_writer(&self, writer: BoxedWriter) {
        let _guard = self.skeleton.lock_append();
        let mut state = self.state.lock();
        Self::reset(&mut state);
        state.writer = Some(writer);
        self.write_header(&mut state);
    }

    pub fn has_writer(&self) -> bool {
        self.state.lock().writer.is_some()
    }

    /// Select the character encoding by label (`"utf-8"`, `"latin1"`,
    /// `"shift_jis"`, ...). Unknown labels fall back to UTF-8.
    pub fn set_encoding(&self, label: &str) {
        let encoding = match Encoding::for_label(label.trim().as_bytes()) {
            Some(encoding) => encoding.output_encoding(),
            None => {
                diagnostics::warn(format!(
                    "{}; falling back to UTF-8",
                    LoggerError::UnsupportedEncoding(label.to_string())
                ));
                encoding_rs::UTF_8
            }
        };
        self.state.lock().encoding = encoding;
    }

    pub fn encoding(&self) -> &'static str {
        self.state.lock().encoding.name()
    }

    pub fn set_immediate_flush(&self, immediate: bool) {
        self.set_flush_policy(if immediate {
            FlushPolicy::Immediate
        } else {
            FlushPolicy::Buffered
        });
    }

    pub fn immediate_flush(&self) -> bool {
        self.flush_policy() == FlushPolicy::Immediate
    }

    pub fn set_flush_policy(&self, policy: FlushPolicy) {
        self.state.lock().flush_policy = policy;
    }

    pub fn flush_policy(&self) -> FlushPolicy {
        self.state.lock().flush_policy
    }

    /// Flush the current writer.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        match state.writer.as_mut() {
            Some(writer) => writer
                .flush()
                .map_err(|e| LoggerError::io_operation("flushing", self.name(), e)),
            None => Ok(()),
        }
    }

    fn encode_and_write(state: &mut WriterState, text: &str) -> std::io::Result<()> {
        let Some(writer) = state.writer.as_mut() else {
            return Ok(());
        };
        if state.encoding == encoding_rs::UTF_8 {
            writer.write_all(text.as_bytes())
        } else {
            let (bytes, _, _) = state.encoding.encode(text);
            writer.write_all(&bytes)
        }
    }

    fn write_reported(&self, state: &mut WriterState, text: &str) {
        if let Err(e) = Self::encode_and_write(state, text) {
            let err = LoggerError::io_operation("writing", self.name(), e);
            self.skeleton
                .report_error("Failed to write to writer.", Some(&err), ErrorCode::WriteFailure);
        }
    }

    fn flush_reported(&self, state: &mut WriterState) {
        let Some(writer) = state.writer.as_mut() else {
            return;
        };
        if let Err(e) = writer.flush() {
            let err = LoggerError::io_operation("flushing", self.name(), e);
            self.skeleton
                .report_error("Failed to flush writer.", Some(&err), ErrorCode::FlushFailure);
        }
    }

    fn write_header(&self, state: &mut WriterState) {
        let header = self.skeleton.layout().and_then(|layout| layout.header());
        if let Some(header) = header {
            self.write_reported(state, &header);
        }
    }

    fn write_footer(&self, state: &mut WriterState) {
        let footer = self.skeleton.layout().and_then(|layout| layout.footer());
        if let Some(footer) = footer {
            if state.writer.is_some() {
                self.write_reported(state, &footer);
                self.flush_reported(state);
            }
        }
    }

    /// Flush and drop the current writer.
    fn reset(state: &mut WriterState) {
        if let Some(mut writer) = state.writer.take() {
            if let Err(e) = writer.flush() {
                diagnostics::error_with("Could not close writer", &e);
            }
        }
    }

    /// Layout to use when the appender may write, `None` otherwise.
    fn check_entry_conditions(&self, state: &WriterState) -> Option<Arc<dyn Layout>> {
        if self.skeleton.is_closed() {
            diagnostics::warn("Not allowed to write to a closed appender.");
            return None;
        }
        if state.writer.is_none() {
            let err = LoggerError::missing_writer(self.name());
            self.skeleton
                .report_error(&err.to_string(), Some(&err), ErrorCode::GenericFailure);
            return None;
        }
        match self.skeleton.layout() {
            Some(layout) => Some(layout),
            None => {
                let err = LoggerError::missing_layout(self.name());
                self.skeleton
                    .report_error(&err.to_string(), Some(&err), ErrorCode::MissingLayout);
                None
            }
        }
    }

    fn sub_append(&self, state: &mut WriterState, layout: &dyn Layout, event: &LoggingEvent) {
        self.write_reported(state, &layout.format(event));
        if layout.ignores_throwable() {
            if let Some(lines) = event.throwable_str_rep() {
                for line in lines {
                    self.write_reported(state, line);
                    self.write_reported(state, LINE_SEP);
                }
            }
        }
        if state.flush_policy.should_flush(event) {
            self.flush_reported(state);
        }
    }
}

impl Appender for WriterAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        &self.skeleton
    }

    fn append(&self, event: &LoggingEvent) {
        let mut state = self.state.lock();
        if let Some(layout) = self.check_entry_conditions(&state) {
            self.sub_append(&mut state, layout.as_ref(), event);
        }
    }

    /// Write the footer and close the writer. Later calls do nothing.
    fn close(&self) {
        let mut state = self.state.lock();
        if !self.skeleton.mark_closed() {
            return;
        }
        self.write_footer(&mut state);
        Self::reset(&mut state);
    }

    fn requires_layout(&self) -> bool {
        true
    }
}

impl Drop for WriterAppender {
    fn drop(&mut self) {
        if !self.skeleton.is_closed() {
            diagnostics::debug(format!("Finalizing appender named [{}].", self.name()));
            self.close();
        }
    }
}

impl std::fmt::Debug for WriterAppender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("WriterAppender")
            .field("skeleton", &self.skeleton)
            .field("has_writer", &state.writer.is_some())
            .field("encoding", &state.encoding.name())
            .field("flush_policy", &state.flush_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handler::ErrorHandler;
    use crate::core::layout::{SimpleLayout, TextLayout};
    use std::io;

    /// Writer whose bytes stay inspectable after it is handed over.
    #[derive(Clone, Default)]
    struct SharedBuf {
        bytes: Arc<Mutex<Vec<u8>>>,
        flushes: Arc<Mutex<usize>>,
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.bytes.lock()).into_owned()
        }

        fn flushes(&self) -> usize {
            *self.flushes.lock()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.bytes.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            *self.flushes.lock() += 1;
            Ok(())
        }
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        codes: Mutex<Vec<ErrorCode>>,
    }

    impl ErrorHandler for RecordingHandler {
        fn error(&self, _message: &str, _cause: Option<&LoggerError>, code: ErrorCode) {
            self.codes.lock().push(code);
        }
    }

    fn event(level: Level, message: &str) -> LoggingEvent {
        LoggingEvent::new("test", level, message)
    }

    #[test]
    fn test_header_events_footer() {
        let buf = SharedBuf::default();
        let layout = TextLayout::new()
            .with_custom_timestamp("T")
            .with_thread(false)
            .with_header("HEAD\n")
            .with_footer("FOOT\n");
        let appender = WriterAppender::with_writer("w", Arc::new(layout), buf.clone());

        appender.do_append(&event(Level::INFO, "hello"));
        appender.close();
        appender.close();

        assert_eq!(buf.text(), "HEAD\n[T] [INFO ] test - hello\nFOOT\n");
    }

    #[test]
    fn test_throwable_lines_written_when_layout_ignores_them() {
        let buf = SharedBuf::default();
        let appender = WriterAppender::with_writer("w", Arc::new(SimpleLayout), buf.clone());
        let e = event(Level::ERROR, "boom").with_throwable(vec!["first".into(), "second".into()]);

        appender.do_append(&e);
        assert_eq!(buf.text(), "ERROR - boom\nfirst\nsecond\n");
    }

    #[test]
    fn test_flush_policies() {
        let buf = SharedBuf::default();
        let appender = WriterAppender::with_writer("w", Arc::new(SimpleLayout), buf.clone());

        appender.do_append(&event(Level::INFO, "a"));
        assert_eq!(buf.flushes(), 1);

        appender.set_immediate_flush(false);
        appender.do_append(&event(Level::INFO, "b"));
        assert_eq!(buf.flushes(), 1);

        appender.set_flush_policy(FlushPolicy::AtLeast(Level::WARN));
        appender.do_append(&event(Level::INFO, "c"));
        appender.do_append(&event(Level::ERROR, "d"));
        assert_eq!(buf.flushes(), 2);
    }

    #[test]
    fn test_missing_writer_and_layout_reported() {
        let handler = Arc::new(RecordingHandler::default());
        let appender = WriterAppender::new("bare");
        appender.skeleton().set_error_handler(handler.clone());

        appender.do_append(&event(Level::INFO, "x"));
        appender.set_writer(SharedBuf::default());
        appender.do_append(&event(Level::INFO, "y"));

        assert_eq!(
            *handler.codes.lock(),
            vec![ErrorCode::GenericFailure, ErrorCode::MissingLayout]
        );
    }

    #[test]
    fn test_write_failure_goes_to_error_handler() {
        let handler = Arc::new(RecordingHandler::default());
        let appender = WriterAppender::with_writer("w", Arc::new(SimpleLayout), FailingWriter);
        appender.skeleton().set_error_handler(handler.clone());

        appender.do_append(&event(Level::INFO, "lost"));
        assert_eq!(*handler.codes.lock(), vec![ErrorCode::WriteFailure]);
    }

    #[test]
    fn test_replacing_writer_closes_previous() {
        let first = SharedBuf::default();
        let second = SharedBuf::default();
        let appender = WriterAppender::with_writer("w", Arc::new(SimpleLayout), first.clone());
        appender.set_immediate_flush(false);
        appender.do_append(&event(Level::INFO, "one"));

        appender.set_writer(second.clone());
        appender.do_append(&event(Level::INFO, "two"));

        assert_eq!(first.text(), "INFO - one\n");
        assert_eq!(first.flushes(), 1);
        assert_eq!(second.text(), "INFO - two\n");
    }

    #[test]
    fn test_encoding() {
        let buf = SharedBuf::default();
        let appender = WriterAppender::with_writer("w", Arc::new(SimpleLayout), buf.clone());
        appender.set_encoding("latin1");
        assert_eq!(appender.encoding(), "windows-1252");
        appender.do_append(&event(Level::INFO, "caf\u{e9}"));
        assert_eq!(buf.bytes.lock().as_slice(), b"INFO - caf\xe9\n");

        appender.set_encoding("no-such-charset");
        assert_eq!(appender.encoding(), "UTF-8");
    }
}
