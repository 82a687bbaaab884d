//! FrameSource trait - point cloud producer abstraction
//!
//! Synthetic generation and directory replay implement the same pull-based
//! interface, so the scheduler never knows which one it drives.

use crate::{Frame, Result};

/// Frame source trait
///
/// Call order: `open` once, then any number of `next` / `reset`, then `close`.
/// Sources are owned by a single caller; no method is called concurrently.
///
/// # Example
///
/// ```ignore
/// let mut source: Box<dyn FrameSource> = frame_source::build_source(&config)?;
/// source.open()?;
/// loop {
///     match source.next() {
///         Ok(frame) => println!("{} points", frame.len()),
///         Err(e) if e.is_eof() => break,
///         Err(e) => return Err(e),
///     }
/// }
/// source.close();
/// ```
pub trait FrameSource: Send {
    /// Source name (used for logging)
    fn name(&self) -> &str;

    /// Prepare the source for reading
    ///
    /// # Errors
    /// Invalid argument for bad configuration, not found for missing data.
    fn open(&mut self) -> Result<()>;

    /// Produce the next frame
    ///
    /// # Errors
    /// `OutOfRange` at end of sequence; any other kind is a real failure.
    fn next(&mut self) -> Result<Frame>;

    /// Rewind to the first frame
    fn reset(&mut self) -> Result<()>;

    /// Release resources. Safe to call repeatedly.
    fn close(&mut self);

    /// Number of times the source rewound itself while looping
    fn rewind_count(&self) -> u64 {
        0
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self) -> Result<()> {
        (**self).open()
    }

    fn next(&mut self) -> Result<Frame> {
        (**self).next()
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn rewind_count(&self) -> u64 {
        (**self).rewind_count()
    }
}
