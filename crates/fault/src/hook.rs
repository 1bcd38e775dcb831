//! Stack-overflow notification hook.
//!
//! The scheduler calls [`HookSlot::notify`] when it detects a task stack
//! overflow. The embedding application may install its own callback once at
//! start-up; without one the caller falls back to
//! [`report_stack_overflow`] followed by `abort()`.
//!
//! The slot is a `critical_section::Mutex<Cell<..>>` so installation from
//! normal code and reads from the scheduler's tick never tear.

use core::cell::Cell;

use critical_section::Mutex;
use platform::TxFifo;

use crate::console::Console;

/// Opaque scheduler task handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TaskHandle(pub usize);

/// Stack-overflow callback: task handle and task name.
pub type StackOverflowHook = fn(TaskHandle, &str);

/// Single replaceable callback slot.
pub struct HookSlot {
    hook: Mutex<Cell<Option<StackOverflowHook>>>,
}

impl HookSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self {
            hook: Mutex::new(Cell::new(None)),
        }
    }

    /// Install `hook`, replacing any previous one.
    pub fn install(&self, hook: StackOverflowHook) {
        critical_section::with(|cs| self.hook.borrow(cs).set(Some(hook)));
        info!("stack overflow hook installed");
    }

    /// Remove the installed hook.
    pub fn clear(&self) {
        critical_section::with(|cs| self.hook.borrow(cs).set(None));
    }

    /// Whether a hook is installed.
    pub fn is_installed(&self) -> bool {
        critical_section::with(|cs| self.hook.borrow(cs).get().is_some())
    }

    /// Run the installed hook. Returns `false` if there is none and the
    /// caller must run the default.
    pub fn notify(&self, task: TaskHandle, name: &str) -> bool {
        let hook = critical_section::with(|cs| self.hook.borrow(cs).get());
        match hook {
            Some(hook) => {
                hook(task, name);
                true
            }
            None => false,
        }
    }
}

impl Default for HookSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Default report: `***ERROR*** A stack overflow in task <name> has been
/// detected.`
pub fn report_stack_overflow<T: TxFifo>(console: &mut Console<T>, name: &str) {
    console.put_str("***ERROR*** A stack overflow in task ");
    console.put_str(name);
    console.put_str(" has been detected.\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::DiagnosticOutput;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use platform::mocks::MockUart;

    static SEEN: AtomicUsize = AtomicUsize::new(0);

    fn recording_hook(task: TaskHandle, name: &str) {
        assert_eq!(name, "net");
        SEEN.store(task.0, Ordering::SeqCst);
    }

    #[test]
    fn test_empty_slot_defers_to_default() {
        let slot = HookSlot::new();
        assert!(!slot.is_installed());
        assert!(!slot.notify(TaskHandle(1), "idle"));
    }

    #[test]
    fn test_installed_hook_runs() {
        let slot = HookSlot::new();
        slot.install(recording_hook);
        assert!(slot.notify(TaskHandle(0x3FFB_4000), "net"));
        assert_eq!(SEEN.load(Ordering::SeqCst), 0x3FFB_4000);

        slot.clear();
        assert!(!slot.is_installed());
    }

    #[test]
    fn test_default_report_text() {
        let mut console = Console::new(MockUart::new(), DiagnosticOutput::Enabled);
        report_stack_overflow(&mut console, "wifi");
        assert_eq!(
            console.inner().output(),
            "***ERROR*** A stack overflow in task wifi has been detected.\r\n"
        );
    }
}
