use std::rc::Rc;

use log::{info, warn};

pub mod animations;
pub mod config;
pub mod dom;
pub mod error;
pub mod faq;
pub mod nav;
pub mod timers;
pub mod validation;

pub mod components {
    pub mod contact;
    pub mod notification;
}

use components::contact::{ContactForm, EmailJsGateway};
use components::notification::Notifier;
use config::SiteConfig;
use dom::browser::{expose_validators, BrowserDom};
use dom::Dom;
use faq::Accordion;
use nav::Navigation;
use timers::{GlooScheduler, Scheduler};

/// Everything wired up on one page.
pub struct Page<D: Dom, S: Scheduler> {
    pub config: SiteConfig,
    pub navigation: Navigation<D>,
    pub accordion: Accordion<D, S>,
    pub notifier: Rc<Notifier<D, S>>,
}

impl<D: Dom, S: Scheduler> Page<D, S> {
    /// Attaches every behavior except the contact form, which needs a gateway and a
    /// way to spawn futures (see [`ContactForm::bind`]).
    pub fn init(dom: D, scheduler: S, config: SiteConfig) -> Self {
        let navigation = Navigation::init(dom.clone(), &config);
        let accordion = Accordion::init(dom.clone(), scheduler.clone(), config.stagger);

        let revealed = animations::init_reveal(&dom);
        animations::init_counters(&dom, &scheduler, config.counter_duration_ms);
        if !animations::init_lazy_images(&dom) {
            warn!("IntersectionObserver not available, lazy images stay unloaded");
        }
        info!("Page behaviors attached ({revealed} reveal targets)");

        let notifier = Rc::new(Notifier::new(dom, scheduler, &config.toast));
        Self {
            config,
            navigation,
            accordion,
            notifier,
        }
    }
}

/// Browser entry point.
pub fn start() {
    let Some(dom) = BrowserDom::new() else {
        warn!("No window/document, nothing to attach to");
        return;
    };
    let config = SiteConfig::load(&dom);
    expose_validators(&dom);

    let page = Page::init(dom.clone(), GlooScheduler, config);
    let gateway = EmailJsGateway::new(&page.config.emailjs);
    if let Some(contact) = ContactForm::new(dom, &page.config, gateway, page.notifier.clone()) {
        info!("Contact form found");
        Rc::new(contact).bind(|future| wasm_bindgen_futures::spawn_local(future));
    }
}
