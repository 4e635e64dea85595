//! Visibility-driven effects: reveal-on-scroll cards, counting stats and lazy images.

use log::debug;

use crate::dom::{Dom, ObserveOptions};
use crate::timers::Scheduler;

pub const REVEAL_TARGETS: &str = ".service-card, .large-card, .small-card, .mvv-card, .client-logo";
pub const REVEALED: &str = "animate-in";
const REVEAL_STYLE: &str = "
  .animate-in {
    opacity: 1 !important;
    transform: translateY(0) !important;
  }
";

const COUNTER_CONTAINERS: &str = ".hero-stats, .about-image-badge";
const COUNTER_NUMBERS: &str = ".hero-stat-number, .about-image-badge-number";
const LAZY_IMAGES: &str = "img[data-src]";

/// One animation frame, roughly 60 fps.
pub const FRAME_MS: u32 = 16;

/// Hides the reveal targets and fades each one in the first time it scrolls into
/// view. Without visibility observers they are revealed straight away.
pub fn init_reveal<D: Dom>(dom: &D) -> usize {
    let targets = dom.query_all(None, REVEAL_TARGETS);
    for target in &targets {
        dom.set_style(target, "opacity", "0");
        dom.set_style(target, "transform", "translateY(30px)");
        dom.set_style(target, "transition", "opacity 0.6s ease, transform 0.6s ease");
    }

    if let (Some(head), Some(style)) = (dom.head(), dom.create_element("style")) {
        dom.set_text(&style, REVEAL_STYLE);
        dom.append_child(&head, &style);
    }

    let count = targets.len();
    let observer_dom = dom.clone();
    let observed = dom.observe_once(
        targets.clone(),
        ObserveOptions::threshold(0.1).with_root_margin("0px 0px -50px 0px"),
        Box::new(move |node| observer_dom.add_class(&node, REVEALED)),
    );
    if !observed {
        debug!("No IntersectionObserver, revealing {count} cards immediately");
        for target in &targets {
            dom.add_class(target, REVEALED);
        }
    }
    count
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Running(i64),
    Done(i64),
}

impl Frame {
    pub fn value(&self) -> i64 {
        match self {
            Frame::Running(v) | Frame::Done(v) => *v,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Frame::Done(_))
    }

    pub fn label(&self) -> String {
        format!("{}+", self.value())
    }
}

/// Counts from zero to `target` in equal steps over `duration_ms`.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    target: i64,
    increment: f64,
    value: f64,
}

impl Counter {
    pub fn new(target: i64, duration_ms: u32) -> Self {
        let frames = f64::from(duration_ms) / f64::from(FRAME_MS);
        Self {
            target,
            increment: target as f64 / frames,
            value: 0.0,
        }
    }

    pub fn step(&mut self) -> Frame {
        self.value += self.increment;
        if self.value < self.target as f64 {
            Frame::Running(self.value.floor() as i64)
        } else {
            Frame::Done(self.target)
        }
    }
}

/// Integer at the start of `text`, the way `parseInt` reads it: leading
/// whitespace, an optional sign, then digits. `"150+"` gives 150.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits_end = rest
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(rest.len(), |(i, _)| i);
    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

/// Renders the first frame now and one more every [`FRAME_MS`] until done.
pub fn animate_counter<D: Dom, S: Scheduler>(dom: D, scheduler: S, node: D::Node, mut counter: Counter) {
    let frame = counter.step();
    dom.set_text(&node, &frame.label());
    if frame.is_done() {
        return;
    }
    let next = scheduler.clone();
    scheduler.defer(
        FRAME_MS,
        Box::new(move || animate_counter(dom, next, node, counter)),
    );
}

/// Starts the stat counters inside each container once it is half visible.
pub fn init_counters<D: Dom, S: Scheduler>(dom: &D, scheduler: &S, duration_ms: u32) {
    let containers = dom.query_all(None, COUNTER_CONTAINERS);
    if containers.is_empty() {
        return;
    }
    let observer_dom = dom.clone();
    let scheduler = scheduler.clone();
    dom.observe_once(
        containers,
        ObserveOptions::threshold(0.5),
        Box::new(move |container| {
            for stat in observer_dom.query_all(Some(&container), COUNTER_NUMBERS) {
                let Some(target) = parse_leading_int(&observer_dom.text(&stat)) else {
                    continue;
                };
                animate_counter(
                    observer_dom.clone(),
                    scheduler.clone(),
                    stat,
                    Counter::new(target, duration_ms),
                );
            }
        }),
    );
}

/// Swaps `data-src` into `src` when an image first comes into view. Returns
/// `false` when the platform cannot observe visibility; images then keep their
/// placeholder.
pub fn init_lazy_images<D: Dom>(dom: &D) -> bool {
    let images = dom.query_all(None, LAZY_IMAGES);
    let observer_dom = dom.clone();
    dom.observe_once(
        images,
        ObserveOptions::threshold(0.0),
        Box::new(move |img| {
            if let Some(src) = observer_dom.attribute(&img, "data-src") {
                observer_dom.set_attribute(&img, "src", &src);
                observer_dom.remove_attribute(&img, "data-src");
            }
        }),
    )
}
