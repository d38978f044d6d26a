//! Process-wide speech session.
//!
//! Callers that have no session to pass around share one through these
//! functions. The first successful [`get_or_try_init`] builds it; a failed
//! init is returned to that caller and tried again by the next one. Engine
//! construction usually happens inside `init`, so its errors convert into
//! [`SessionError::Engine`] with `?`.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::session::{SessionError, SpeechSession};

static SESSION: Mutex<Option<Arc<SpeechSession>>> = parking_lot::const_mutex(None);

/// Returns the shared session, building it with `init` if there is none.
///
/// Concurrent callers wait while one of them runs `init`.
pub fn get_or_try_init<F>(init: F) -> Result<Arc<SpeechSession>, SessionError>
where
    F: FnOnce() -> Result<SpeechSession, SessionError>,
{
    let mut slot = SESSION.lock();
    if let Some(session) = slot.as_ref() {
        return Ok(Arc::clone(session));
    }
    let session = Arc::new(init()?);
    *slot = Some(Arc::clone(&session));
    Ok(session)
}

/// Returns the shared session if one has been built.
pub fn get() -> Option<Arc<SpeechSession>> {
    SESSION.lock().clone()
}

/// Releases the shared session. It is closed once the last handle returned
/// by [`get`] or [`get_or_try_init`] is dropped. Returns false if there was
/// none.
pub fn shutdown() -> bool {
    let session = SESSION.lock().take();
    session.is_some()
}
