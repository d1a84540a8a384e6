//! Platform collaborator traits.
//!
//! The detector never talks to the audio subsystem directly. Everything the
//! heuristic needs from the platform goes through two seams: a locator that
//! resolves the logical probe-sound name to an asset path, and a playback
//! service that loads, categorizes, plays, and disposes the sound. Both are
//! injected at construction, so tests script them freely.

use std::path::{Path, PathBuf};

use muteprobe_foundation::{PlaybackError, ResourceError};

/// Opaque identifier for a sound loaded by a `PlaybackService`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u64);

/// One-shot hook a `PlaybackService` invokes when playback finishes.
///
/// "Finishes" is whatever the platform considers completion, including the
/// near-instant completion of a sound the silent switch suppressed. The
/// service may invoke it from any thread, including inline from `play`.
pub type CompletionHandler = Box<dyn FnOnce() + Send + 'static>;

/// A trait for platform audio playback backends.
///
/// This defines the minimal surface the timing heuristic needs, allowing the
/// real system-sound backend and scripted test doubles to be used
/// interchangeably.
pub trait PlaybackService: Send + Sync {
    /// Load the asset at `path` into a playable handle.
    fn load(&self, path: &Path) -> Result<SoundHandle, PlaybackError>;

    /// Tag the sound as a UI-category sound. The silent switch only
    /// suppresses this category, so the timing signal depends on it.
    fn mark_ui_sound(&self, handle: SoundHandle) -> Result<(), PlaybackError>;

    /// Start playback and arrange for `on_complete` to run exactly once when
    /// the platform reports the sound finished.
    fn play(&self, handle: SoundHandle, on_complete: CompletionHandler);

    /// Release the platform resources behind `handle`.
    fn dispose(&self, handle: SoundHandle);
}

/// A trait for resolving the probe sound's logical name to an asset path
pub trait SoundLocator: Send + Sync {
    fn locate(&self, name: &str) -> Result<PathBuf, ResourceError>;
}
