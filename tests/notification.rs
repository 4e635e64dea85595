#![cfg(feature = "test-dom")]

use landing_behavior::components::notification::Notifier;
use landing_behavior::config::ToastConfig;
use landing_behavior::dom::memory::{MemoryDom, NodeId};
use landing_behavior::dom::Dom;
use landing_behavior::timers::ManualScheduler;

fn notifier() -> (MemoryDom, ManualScheduler, Notifier<MemoryDom, ManualScheduler>) {
    let dom = MemoryDom::new();
    let clock = ManualScheduler::new();
    let notifier = Notifier::new(dom.clone(), clock.clone(), &ToastConfig::default());
    (dom, clock, notifier)
}

fn part(dom: &MemoryDom, toast: NodeId, selector: &str) -> NodeId {
    dom.query(Some(&toast), selector)
        .unwrap_or_else(|| panic!("{selector} missing"))
}

#[test]
fn first_call_builds_accessible_toast() {
    let (dom, _clock, notifier) = notifier();
    assert!(dom.by_id("notify").is_none());

    notifier.notify("Hola", false);

    let toast = dom.by_id("notify").unwrap();
    assert_eq!(dom.parent(toast), dom.body());
    assert!(dom.has_class(&toast, "notify"));
    assert!(dom.has_class(&toast, "show"));
    assert!(!dom.has_class(&toast, "error"));
    assert_eq!(dom.attribute(&toast, "role").as_deref(), Some("status"));
    assert_eq!(dom.attribute(&toast, "aria-live").as_deref(), Some("polite"));
    assert_eq!(dom.attribute(&toast, "aria-atomic").as_deref(), Some("true"));
    assert_eq!(dom.text(&part(&dom, toast, ".notify-text")), "Hola");
    assert_eq!(dom.text(&part(&dom, toast, ".notify-icon")), "✓");
    let close = part(&dom, toast, ".notify-close");
    assert_eq!(
        dom.attribute(&close, "aria-label").as_deref(),
        Some("Cerrar notificación")
    );
}

#[test]
fn auto_hides_after_delay() {
    let (dom, clock, notifier) = notifier();
    notifier.notify("Hola", false);
    let toast = dom.by_id("notify").unwrap();

    clock.advance(3499);
    assert!(dom.has_class(&toast, "show"));
    clock.advance(1);
    assert!(!dom.has_class(&toast, "show"));
}

#[test]
fn second_call_restarts_the_hide_timer() {
    let (dom, clock, notifier) = notifier();
    notifier.notify("first", false);
    clock.advance(2000);
    notifier.notify("second", true);

    assert_eq!(dom.count("#notify"), 1);
    assert_eq!(clock.pending(), 1);
    let toast = dom.by_id("notify").unwrap();
    assert_eq!(dom.text(&part(&dom, toast, ".notify-text")), "second");

    // The first call's hide would have fired here.
    clock.advance(1500);
    assert!(dom.has_class(&toast, "show"));

    clock.advance(1999);
    assert!(dom.has_class(&toast, "show"));
    clock.advance(1);
    assert!(!dom.has_class(&toast, "show"));
    assert_eq!(clock.pending(), 0);
}

#[test]
fn error_styling_follows_latest_call() {
    let (dom, _clock, notifier) = notifier();
    notifier.notify("boom", true);
    let toast = dom.by_id("notify").unwrap();
    assert!(dom.has_class(&toast, "error"));
    assert_eq!(dom.text(&part(&dom, toast, ".notify-icon")), "!");

    notifier.notify("ok", false);
    assert!(!dom.has_class(&toast, "error"));
    assert_eq!(dom.text(&part(&dom, toast, ".notify-icon")), "✓");
}

#[test]
fn close_button_hides() {
    let (dom, _clock, notifier) = notifier();
    notifier.notify("Hola", false);
    let toast = dom.by_id("notify").unwrap();

    dom.click(part(&dom, toast, ".notify-close"));
    assert!(!dom.has_class(&toast, "show"));
}

#[test]
fn reuses_toast_already_in_markup() {
    let (dom, _clock, notifier) = notifier();
    let body = dom.body().unwrap();
    let toast = dom.append(body, "div", "notify");
    dom.set_attribute(&toast, "id", "notify");
    let text = dom.append(toast, "p", "notify-text");

    notifier.notify("Hola", false);
    assert_eq!(dom.count("#notify"), 1);
    assert_eq!(dom.text(&text), "Hola");
    assert!(dom.has_class(&toast, "show"));
}
