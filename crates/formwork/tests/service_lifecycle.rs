#![forbid(unsafe_code)]
#![cfg(feature = "services")]

//! Service registry lifecycle through the facade.
//!
//! Run: `cargo test -p formwork --test service_lifecycle`

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use formwork::prelude::*;
use formwork::services::{
    DISPOSE_CALLED, DISPOSE_ERROR, DISPOSE_MISSING, DisposeError, DisposeOutcome, ServiceFactory,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

// ---------------------------------------------------------------------------
// Log capture
// ---------------------------------------------------------------------------

#[derive(Default)]
struct KeyVisitor {
    key: Option<String>,
    service: Option<String>,
}

impl Visit for KeyVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "key" => self.key = Some(value.to_owned()),
            "service" => self.service = Some(value.to_owned()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record_str(field, &format!("{value:?}"));
    }
}

type Line = (Level, String, String);

#[derive(Clone, Default)]
struct DisposeLog {
    lines: Arc<Mutex<Vec<Line>>>,
}

impl<S: Subscriber> Layer<S> for DisposeLog {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = KeyVisitor::default();
        event.record(&mut visitor);
        if let (Some(key), Some(service)) = (visitor.key, visitor.service) {
            self.lines
                .lock()
                .expect("log lock")
                .push((*event.metadata().level(), key, service));
        }
    }
}

fn with_dispose_log<R>(f: impl FnOnce() -> R) -> (R, Vec<Line>) {
    let log = DisposeLog::default();
    let lines = Arc::clone(&log.lines);
    let result = tracing::subscriber::with_default(tracing_subscriber::registry().with(log), f);
    let captured = lines.lock().expect("log lock").clone();
    (result, captured)
}

struct Broken;

impl Service for Broken {
    fn teardown(&self) -> Teardown {
        Teardown::Available
    }

    fn dispose(&self) -> Result<(), DisposeError> {
        Err("connection refused".into())
    }
}

#[derive(Default)]
struct Session {
    closed: Cell<u32>,
}

impl Service for Session {
    fn teardown(&self) -> Teardown {
        Teardown::Available
    }

    fn dispose(&self) -> Result<(), DisposeError> {
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }
}

struct Options(OptionsNodeList);
impl Service for Options {}

#[test]
fn first_failure_does_not_stop_later_teardown() {
    let registry = ServiceRegistry::new();
    let session = Rc::new(Session::default());
    registry.register_service("broken", Rc::new(Broken)).expect("broken");
    registry.register_service("session", Rc::clone(&session)).expect("session");

    let report = registry.dispose();

    assert_eq!(session.closed.get(), 1);
    assert_eq!(
        report.entries(),
        &[
            ("broken".to_owned(), DisposeOutcome::Failed("connection refused".into())),
            ("session".to_owned(), DisposeOutcome::Disposed),
        ]
    );
    assert!(!registry.is_service_registered("session"));

    assert!(registry.dispose().is_empty());
    assert_eq!(session.closed.get(), 1);
}

#[test]
fn dispose_logs_one_line_per_service() {
    let registry = ServiceRegistry::new();
    registry.register_service("broken", Rc::new(Broken)).expect("broken");
    registry.register_service("session", Rc::new(Session::default())).expect("session");
    registry
        .register_service("options", Rc::new(Options(OptionsNodeList::new(["a"]))))
        .expect("options");

    let (report, lines) = with_dispose_log(|| registry.dispose());

    assert_eq!(report.len(), 3);
    assert_eq!(
        lines,
        vec![
            (Level::ERROR, DISPOSE_ERROR.to_owned(), "broken".to_owned()),
            (Level::DEBUG, DISPOSE_CALLED.to_owned(), "session".to_owned()),
            (Level::DEBUG, DISPOSE_MISSING.to_owned(), "options".to_owned()),
        ]
    );
}

#[test]
fn shared_option_list_as_a_service() {
    let factory: ServiceFactory =
        Rc::new(|| ServiceHandle::new(Rc::new(Options(OptionsNodeList::new(["eur", "usd"])))));
    let registry = ServiceRegistry::with_aliases([("currencies".to_owned(), factory)]);

    let currencies = registry.get_service_as::<Options>("currencies").expect("alias");
    let field = SelectionField::new(currencies.0.clone());
    field.automatically_update_value_when_options_change(true);

    registry
        .get_service_as::<Options>("currencies")
        .expect("cached")
        .0
        .set_options(["usd", "gbp"]);

    assert_eq!(field.value.value().as_deref(), Some("usd"));
    assert_eq!(registry.service_names(), vec!["currencies"]);
}

#[test]
fn registry_errors_surface_as_formwork_errors() {
    let registry = ServiceRegistry::new();
    assert!(matches!(
        registry.get_service("nothing"),
        Err(FormworkError::NotRegistered(_))
    ));
    assert_eq!(
        registry.register_service("none", None::<Rc<Session>>),
        Err(FormworkError::UndefinedInstance)
    );
}
