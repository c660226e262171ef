//! Named-event notifier with ordered, isolated listener delivery.
//!
//! Listeners run synchronously on the emitting turn in registration order. A listener that
//! returns `Err` or panics is logged and skipped; the remaining listeners still run and the
//! emitter never observes the failure.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    panic::{catch_unwind, AssertUnwindSafe},
    rc::Rc,
};

use serde_json::Value;

type ListenerFn = dyn Fn(&Value) -> Result<(), String>;

#[derive(Clone)]
/// Handle to a registered callback. Identity is the callback allocation, so clones of the same
/// handle compare equal for [`EventNotifier::off`].
pub struct Listener {
    callback: Rc<ListenerFn>,
}

impl Listener {
    /// Wraps a callback into a handle that can be registered with [`EventNotifier::subscribe`].
    pub fn new(callback: impl Fn(&Value) -> Result<(), String> + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    /// Returns whether both handles wrap the same callback allocation.
    pub fn same_callback(&self, other: &Listener) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    fn invoke(&self, payload: &Value) -> Result<(), String> {
        invoke_isolated(|| (self.callback)(payload))
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

/// Runs `f`, converting a panic into an `Err` carrying the panic message.
pub(crate) fn invoke_isolated(f: impl FnOnce() -> Result<(), String>) -> Result<(), String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => Err(panic_message(panic.as_ref())),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("panicked: {message}")
    } else {
        "panicked".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One isolated listener failure captured during emission.
pub struct ListenerFailure {
    /// Position of the listener in the emission snapshot.
    pub position: usize,
    /// Error or panic message.
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Aggregated outcome of one emission.
pub struct EmitReport {
    /// Listeners that completed successfully.
    pub delivered: usize,
    /// Listeners that failed, in emission order.
    pub failures: Vec<ListenerFailure>,
}

impl EmitReport {
    /// Returns whether every listener succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Default)]
/// Registry of listeners keyed by event name.
pub struct EventNotifier {
    listeners: RefCell<HashMap<String, Vec<Listener>>>,
}

impl EventNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for `event` and returns its handle.
    pub fn on(
        &self,
        event: &str,
        callback: impl Fn(&Value) -> Result<(), String> + 'static,
    ) -> Listener {
        let listener = Listener::new(callback);
        self.subscribe(event, &listener);
        listener
    }

    /// Appends an existing handle for `event`.
    ///
    /// Registering the same handle twice is allowed; it will then run twice per emission.
    pub fn subscribe(&self, event: &str, listener: &Listener) {
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(listener.clone());
    }

    /// Removes the first registration of `listener` for `event`. No-op when absent.
    pub fn off(&self, event: &str, listener: &Listener) {
        let mut listeners = self.listeners.borrow_mut();
        let Some(registered) = listeners.get_mut(event) else {
            return;
        };
        if let Some(position) = registered
            .iter()
            .position(|candidate| candidate.same_callback(listener))
        {
            registered.remove(position);
        }
        if registered.is_empty() {
            listeners.remove(event);
        }
    }

    /// Removes every listener for `event`.
    pub fn off_all(&self, event: &str) {
        self.listeners.borrow_mut().remove(event);
    }

    /// Returns the number of registrations for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.borrow().get(event).map_or(0, Vec::len)
    }

    /// Delivers `payload` to every listener of `event`, isolating failures.
    pub fn emit(&self, event: &str, payload: &Value) {
        let _ = self.emit_with_report(event, payload);
    }

    /// Like [`EventNotifier::emit`] but returns the aggregated outcome.
    ///
    /// The listener list is snapshotted before delivery: listeners added during emission wait
    /// for the next emit, listeners removed during emission still receive this one.
    pub fn emit_with_report(&self, event: &str, payload: &Value) -> EmitReport {
        let snapshot = match self.listeners.borrow().get(event) {
            Some(listeners) => listeners.clone(),
            None => return EmitReport::default(),
        };

        let mut report = EmitReport::default();
        for (position, listener) in snapshot.iter().enumerate() {
            match listener.invoke(payload) {
                Ok(()) => report.delivered += 1,
                Err(message) => {
                    leptos::logging::warn!("listener for `{event}` failed: {message}");
                    report.failures.push(ListenerFailure { position, message });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, name: &'static str) -> impl Fn(&Value) -> Result<(), String> {
        let log = Rc::clone(log);
        move |_| {
            log.borrow_mut().push(name.to_string());
            Ok(())
        }
    }

    #[test]
    fn emit_runs_listeners_in_registration_order_once_each() {
        let notifier = EventNotifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        notifier.on("child:changed", recorder(&log, "A"));
        notifier.on("child:changed", recorder(&log, "B"));
        notifier.on("child:changed", recorder(&log, "C"));

        notifier.emit("child:changed", &json!({"_id": "a"}));

        assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
    }

    #[test]
    fn failing_listener_is_isolated_from_siblings() {
        let notifier = EventNotifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        notifier.on("taskList:changed", recorder(&log, "A"));
        notifier.on("taskList:changed", |_| Err("boom".to_string()));
        notifier.on("taskList:changed", recorder(&log, "C"));

        let report = notifier.emit_with_report("taskList:changed", &Value::Null);

        assert_eq!(*log.borrow(), vec!["A", "C"]);
        assert_eq!(report.delivered, 2);
        assert_eq!(
            report.failures,
            vec![ListenerFailure {
                position: 1,
                message: "boom".to_string()
            }]
        );
    }

    #[test]
    fn panicking_listener_is_isolated_and_emit_returns() {
        let notifier = EventNotifier::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        notifier.on("e", recorder(&log, "A"));
        notifier.on("e", |_| panic!("listener exploded"));
        notifier.on("e", recorder(&log, "C"));

        let report = notifier.emit_with_report("e", &Value::Null);

        assert_eq!(*log.borrow(), vec!["A", "C"]);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].message.contains("listener exploded"));
    }

    #[test]
    fn duplicate_registration_runs_twice_and_off_removes_first_only() {
        let notifier = EventNotifier::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = {
            let hits = Rc::clone(&hits);
            Listener::new(move |_| {
                *hits.borrow_mut() += 1;
                Ok(())
            })
        };
        notifier.subscribe("e", &counter);
        notifier.subscribe("e", &counter.clone());

        notifier.emit("e", &Value::Null);
        assert_eq!(*hits.borrow(), 2);

        notifier.off("e", &counter);
        assert_eq!(notifier.listener_count("e"), 1);
        notifier.emit("e", &Value::Null);
        assert_eq!(*hits.borrow(), 3);

        notifier.off("e", &counter);
        notifier.off("e", &counter);
        assert_eq!(notifier.listener_count("e"), 0);
    }

    #[test]
    fn off_with_unknown_listener_is_a_noop() {
        let notifier = EventNotifier::new();
        let registered = notifier.on("e", |_| Ok(()));
        let stranger = Listener::new(|_| Ok(()));

        notifier.off("e", &stranger);
        notifier.off("missing", &registered);

        assert_eq!(notifier.listener_count("e"), 1);
    }

    #[test]
    fn removal_during_emit_does_not_skip_remaining_listeners() {
        let notifier = Rc::new(EventNotifier::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let second = Listener::new(recorder(&log, "B"));

        {
            let notifier_ref = Rc::clone(&notifier);
            let second = second.clone();
            let log = Rc::clone(&log);
            notifier.on("e", move |_| {
                log.borrow_mut().push("A".to_string());
                notifier_ref.off("e", &second);
                Ok(())
            });
        }
        notifier.subscribe("e", &second);
        notifier.on("e", recorder(&log, "C"));

        notifier.emit("e", &Value::Null);
        assert_eq!(*log.borrow(), vec!["A", "B", "C"]);

        log.borrow_mut().clear();
        notifier.emit("e", &Value::Null);
        assert_eq!(*log.borrow(), vec!["A", "C"]);
    }

    #[test]
    fn listener_added_during_emit_waits_for_next_emission() {
        let notifier = Rc::new(EventNotifier::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let notifier_ref = Rc::clone(&notifier);
            let log_ref = Rc::clone(&log);
            notifier.on("e", move |_| {
                notifier_ref.on("e", recorder(&log_ref, "late"));
                Ok(())
            });
        }

        notifier.emit("e", &Value::Null);
        assert!(log.borrow().is_empty());
        notifier.emit("e", &Value::Null);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn off_all_clears_event_and_emit_without_listeners_is_clean() {
        let notifier = EventNotifier::new();
        notifier.on("e", |_| Ok(()));
        notifier.on("e", |_| Ok(()));
        notifier.off_all("e");

        let report = notifier.emit_with_report("e", &Value::Null);
        assert_eq!(report, EmitReport::default());
        assert!(report.is_clean());
    }
}
