//! Process-wide handle registry
//!
//! The C interface never hands out Rust pointers. Each registered handle gets
//! a positive integer id; callers pass the id back for every operation and
//! release it exactly once when done.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use log::{debug, warn};

use crate::error::{GlueError, Result};
use crate::handle::{AnyHandle, Handle, HandleKind, Native};

/// Handle id type for the C interface
///
/// Ids start at 1; 0 is never a valid id.
pub type HandleId = i64;

/// Global handle counter
static NEXT_HANDLE: AtomicI64 = AtomicI64::new(1);

/// Set by `mark_initialized`, cleared by `drain`
static INITIALIZED: AtomicBool = AtomicBool::new(false);

lazy_static::lazy_static! {
    /// Global handle registry
    static ref HANDLES: Mutex<HashMap<HandleId, AnyHandle>> = Mutex::new(HashMap::new());
}

fn get_next_handle() -> HandleId {
    NEXT_HANDLE.fetch_add(1, Ordering::SeqCst)
}

fn handles() -> MutexGuard<'static, HashMap<HandleId, AnyHandle>> {
    // A panic while holding the lock cannot leave the map half-updated
    HANDLES.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn invalid_handle(id: HandleId) -> GlueError {
    GlueError::InvalidHandle(format!("Invalid handle: {}", id))
}

/// Flag the registry as initialized
///
/// The set of handle kinds is closed by the sealed `Native` trait, so there
/// is nothing to install per kind. Returns `true` on the first call since
/// start-up or the last `drain`.
pub(crate) fn mark_initialized() -> bool {
    !INITIALIZED.swap(true, Ordering::SeqCst)
}

/// Whether `init` ran since start-up or the last shutdown
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

/// Take ownership of `handle` and return its id
pub fn register<T: Native + ?Sized>(handle: Handle<T>) -> HandleId {
    let id = get_next_handle();
    debug!("register {} handle {}", T::KIND, id);
    handles().insert(id, handle.into());
    id
}

/// Run `f` on the registered handle `id`
///
/// `f` runs with the registry locked; it must not call back into the
/// registry.
pub fn with_handle<T, R, F>(id: HandleId, f: F) -> Result<R>
where
    T: Native + ?Sized,
    F: FnOnce(&Handle<T>) -> R,
{
    let guard = handles();
    let any = guard.get(&id).ok_or_else(|| invalid_handle(id))?;
    match T::from_any(any) {
        Some(handle) => Ok(f(handle)),
        None => {
            warn!(
                "handle {} is a {} handle, not a {} handle",
                id,
                any.kind(),
                T::KIND
            );
            Err(GlueError::KindMismatch {
                expected: T::KIND,
                actual: any.kind(),
            })
        }
    }
}

/// New handle sharing the value registered under `id`
pub fn get<T: Native + ?Sized>(id: HandleId) -> Result<Handle<T>> {
    with_handle::<T, _, _>(id, |handle| handle.share())
}

/// Release handle `id`
///
/// The entry is removed before its value is dropped, so a second release of
/// the same id fails with `InvalidHandle` instead of releasing twice.
pub fn release(id: HandleId) -> Result<()> {
    let removed = handles().remove(&id);
    match removed {
        Some(handle) => {
            debug!("release {} handle {}", handle.kind(), id);
            drop(handle);
            Ok(())
        }
        None => {
            warn!("release of unknown handle {}", id);
            Err(invalid_handle(id))
        }
    }
}

/// Kind of the handle registered under `id`
pub fn kind_of(id: HandleId) -> Result<HandleKind> {
    handles()
        .get(&id)
        .map(AnyHandle::kind)
        .ok_or_else(|| invalid_handle(id))
}

/// Number of live references to the value behind `id`, the registry's included
pub fn ref_count(id: HandleId) -> Result<usize> {
    handles()
        .get(&id)
        .map(AnyHandle::ref_count)
        .ok_or_else(|| invalid_handle(id))
}

/// Check if a handle id is registered
pub fn is_valid(id: HandleId) -> bool {
    handles().contains_key(&id)
}

/// Number of registered handles
pub fn live_count() -> usize {
    handles().len()
}

/// Number of registered handles of one kind
pub fn live_count_of(kind: HandleKind) -> usize {
    handles().values().filter(|h| h.kind() == kind).count()
}

/// Drop every registered handle; returns how many there were
///
/// With `report_leaks`, each kind still holding handles is logged.
pub(crate) fn drain(report_leaks: bool) -> usize {
    let drained: Vec<(HandleId, AnyHandle)> = handles().drain().collect();
    if report_leaks {
        for kind in HandleKind::ALL {
            let count = drained.iter().filter(|(_, h)| h.kind() == kind).count();
            if count > 0 {
                warn!("{} {} handle(s) still registered at shutdown", count, kind);
            }
        }
    }
    INITIALIZED.store(false, Ordering::SeqCst);
    drained.len()
}
