//! Panic capture.
//!
//! A panic is the kernel's fatal fault. [`guard`] runs a closure under
//! `catch_unwind`; while a guard is active on the current thread, the
//! process-wide hook installed by [`install_hook`] records the panic
//! message, location and a backtrace instead of printing them, and the
//! guard turns the unwind into a [`FatalFault`]. Outside a guard the
//! previously installed hook runs unchanged.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe, Location};

use once_cell::sync::OnceCell;
use thiserror::Error;

/// A runtime fault with no ordinary error value behind it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FatalFault {
    pub message: String,
    /// `file:line:column` of the panic, when known.
    pub location: Option<String>,
    pub trace: Vec<String>,
}

impl FatalFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            trace: Vec::new(),
        }
    }

    /// Build a fault from a caught unwind payload, preferring what the hook
    /// recorded for it.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        LAST_FAULT
            .with(|slot| slot.borrow_mut().take())
            .unwrap_or_else(|| Self::new(payload_message(payload.as_ref())))
    }
}

thread_local! {
    static GUARD_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT: RefCell<Option<FatalFault>> = const { RefCell::new(None) };
}

static HOOK: OnceCell<()> = OnceCell::new();

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

fn record(payload: &(dyn Any + Send), location: Option<&Location<'_>>) {
    let fault = FatalFault {
        message: payload_message(payload),
        location: location.map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
        trace: Backtrace::force_capture()
            .to_string()
            .lines()
            .map(|l| l.trim_end().to_string())
            .collect(),
    };
    LAST_FAULT.with(|slot| *slot.borrow_mut() = Some(fault));
}

/// Install the capturing panic hook. Idempotent.
pub fn install_hook() {
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if GUARD_DEPTH.with(Cell::get) > 0 {
                record(info.payload(), info.location());
            } else {
                previous(info);
            }
        }));
    });
}

/// Run `f`, turning a panic into a [`FatalFault`].
///
/// # Errors
///
/// Returns the fault when `f` panics.
pub fn guard<T>(f: impl FnOnce() -> T) -> Result<T, FatalFault> {
    install_hook();
    GUARD_DEPTH.with(|d| d.set(d.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    result.map_err(FatalFault::from_panic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_passes_values_through() {
        assert_eq!(guard(|| 7), Ok(7));
    }

    #[test]
    fn panic_becomes_fault_with_location() {
        let fault = guard(|| -> u8 { panic!("boom {}", 42) }).unwrap_err();
        assert_eq!(fault.message, "boom 42");
        let location = fault.location.unwrap_or_default();
        assert!(location.contains("fault.rs"), "location was {location}");
        assert!(!fault.trace.is_empty());
    }

    #[test]
    fn nested_guards_capture_innermost() {
        let outer = guard(|| guard(|| -> u8 { panic!("inner") }).unwrap_err());
        assert_eq!(outer.unwrap().message, "inner");
    }

    #[test]
    fn non_string_payload_is_described() {
        let fault = FatalFault::from_panic(Box::new(5_u32));
        assert_eq!(fault.message, "panic with non-string payload");
    }
}
