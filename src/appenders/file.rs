//! File appender implementation

use super::writer::WriterAppender;
use crate::core::appender::{Appender, AppenderSkeleton};
use crate::core::diagnostics;
use crate::core::error::{LoggerError, Result};
use crate::core::event::LoggingEvent;
use crate::core::layout::Layout;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct FileSettings {
    path: Option<PathBuf>,
    append: bool,
    buffered_io: bool,
    buffer_size: usize,
}

/// Writes formatted events to a file.
///
/// # Example
///
/// ```no_run
/// use rust_log_hierarchy::appenders::FileAppender;
/// use rust_log_hierarchy::{Hierarchy, Level, TextLayout};
/// use std::sync::Arc;
///
/// let hierarchy = Hierarchy::new(Level::DEBUG);
/// let file = FileAppender::open("file", Arc::new(TextLayout::new()), "/var/log/app.log", true)
///     .unwrap();
/// hierarchy.root_logger().add_appender(Arc::new(file));
/// ```
#[derive(Debug)]
pub struct FileAppender {
    inner: WriterAppender,
    settings: Mutex<FileSettings>,
}

impl FileAppender {
    pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

    /// An appender with no file yet; call [`FileAppender::set_file`].
    pub fn new(name: impl Into<String>, layout: Arc<dyn Layout>) -> Self {
        let inner = WriterAppender::new(name);
        inner.set_layout(layout);
        Self {
            inner,
            settings: Mutex::new(FileSettings {
                path: None,
                append: true,
                buffered_io: false,
                buffer_size: Self::DEFAULT_BUFFER_SIZE,
            }),
        }
    }

    /// Create the appender and open `path` unbuffered.
    pub fn open(
        name: impl Into<String>,
        layout: Arc<dyn Layout>,
        path: impl AsRef<Path>,
        append: bool,
    ) -> Result<Self> {
        let appender = Self::new(name, layout);
        appender.set_file(path, append, false, Self::DEFAULT_BUFFER_SIZE)?;
        Ok(appender)
    }

    /// Close the current file, if any, and start writing to `path`.
    ///
    /// Missing parent directories are created. With `buffered_io` the file is
    /// written through a `buffer_size` buffer and no longer flushed after every
    /// event.
    pub fn set_file(
        &self,
        path: impl AsRef<Path>,
        append: bool,
        buffered_io: bool,
        buffer_size: usize,
    ) -> Result<()> {
        let path = path.as_ref();
        diagnostics::debug(format!("setFile called: {}, {}", path.display(), append));

        // A failed open leaves the current target and flush policy untouched.
        let file = Self::open_file(path, append)?;
        if buffered_io {
            self.inner.set_immediate_flush(false);
            self.inner
                .set_writer(BufWriter::with_capacity(buffer_size.max(1), file));
        } else {
            self.inner.set_writer(file);
        }

        *self.settings.lock() = FileSettings {
            path: Some(path.to_path_buf()),
            append,
            buffered_io,
            buffer_size,
        };
        diagnostics::debug(format!("setFile ended: {}", path.display()));
        Ok(())
    }

    fn open_file(path: &Path, append: bool) -> Result<File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    LoggerError::file_appender(
                        path.display().to_string(),
                        format!("could not create parent directory: {}", e),
                    )
                })?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        options
            .open(path)
            .map_err(|e| LoggerError::file_appender(path.display().to_string(), e.to_string()))
    }

    pub fn file(&self) -> Option<PathBuf> {
        self.settings.lock().path.clone()
    }

    pub fn is_append(&self) -> bool {
        self.settings.lock().append
    }

    pub fn buffered_io(&self) -> bool {
        self.settings.lock().buffered_io
    }

    pub fn buffer_size(&self) -> usize {
        self.settings.lock().buffer_size
    }

    /// Underlying writer appender, for encoding and flush settings.
    pub fn writer(&self) -> &WriterAppender {
        &self.inner
    }

    pub fn flush(&self) -> Result<()> {
        self.inner.flush()
    }
}

impl Appender for FileAppender {
    fn skeleton(&self) -> &AppenderSkeleton {
        self.inner.skeleton()
    }

    fn append(&self, event: &LoggingEvent) {
        self.inner.append(event);
    }

    fn close(&self) {
        self.inner.close();
    }

    fn requires_layout(&self) -> bool {
        true
    }
}
