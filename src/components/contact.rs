use std::collections::BTreeMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use gloo_net::http::Request;
use log::{debug, error, info};
use serde::Serialize;

use crate::components::notification::Notifier;
use crate::config::{EmailJsConfig, SiteConfig};
use crate::dom::Dom;
use crate::error::ContactError;
use crate::timers::Scheduler;

/// One contact-form submission as handed to the email service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendForm {
    pub service_id: String,
    pub template_id: String,
    pub fields: Vec<(String, String)>,
}

#[cfg_attr(test, mockall::automock)]
pub trait EmailGateway {
    fn send_form(&self, request: SendForm) -> LocalBoxFuture<'static, Result<(), ContactError>>;
}

/// EmailJS REST API (`/api/v1.0/email/send`).
pub struct EmailJsGateway {
    endpoint: String,
    public_key: String,
}

#[derive(Serialize)]
struct EmailJsPayload {
    service_id: String,
    template_id: String,
    user_id: String,
    template_params: BTreeMap<String, String>,
}

impl EmailJsGateway {
    pub fn new(config: &EmailJsConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            public_key: config.public_key.clone(),
        }
    }
}

impl EmailGateway for EmailJsGateway {
    fn send_form(&self, request: SendForm) -> LocalBoxFuture<'static, Result<(), ContactError>> {
        let endpoint = self.endpoint.clone();
        let public_key = self.public_key.clone();
        async move {
            if public_key.is_empty() {
                return Err(ContactError::NotConfigured("EmailJS public key"));
            }
            if request.service_id.is_empty() || request.template_id.is_empty() {
                return Err(ContactError::NotConfigured("EmailJS service or template id"));
            }
            let payload = EmailJsPayload {
                service_id: request.service_id,
                template_id: request.template_id,
                user_id: public_key,
                template_params: request.fields.into_iter().collect(),
            };

            let response = Request::post(&endpoint).json(&payload)?.send().await?;
            if response.ok() {
                Ok(())
            } else {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ContactError::Rejected { status, body })
            }
        }
        .boxed_local()
    }
}

pub struct ContactForm<D: Dom, S: Scheduler, G: EmailGateway> {
    dom: D,
    form: D::Node,
    gateway: G,
    notifier: Rc<Notifier<D, S>>,
    service_id: String,
    template_id: String,
    success_message: String,
    error_message: String,
}

impl<D: Dom, S: Scheduler, G: EmailGateway + 'static> ContactForm<D, S, G> {
    /// `None` when the page has no contact form.
    pub fn new(
        dom: D,
        config: &SiteConfig,
        gateway: G,
        notifier: Rc<Notifier<D, S>>,
    ) -> Option<Self> {
        let form = dom.by_id(&config.contact_form_id)?;
        Some(Self {
            dom,
            form,
            gateway,
            notifier,
            service_id: config.emailjs.service_id.clone(),
            template_id: config.emailjs.template_id.clone(),
            success_message: config.toast.success_message.clone(),
            error_message: config.toast.error_message.clone(),
        })
    }

    /// Sends the form and reports the outcome through the toast. On success the
    /// form is cleared.
    pub async fn submit(&self) -> Result<(), ContactError> {
        let request = SendForm {
            service_id: self.service_id.clone(),
            template_id: self.template_id.clone(),
            fields: self.dom.form_fields(&self.form),
        };
        debug!("Sending contact form ({} fields)", request.fields.len());

        match self.gateway.send_form(request).await {
            Ok(()) => {
                info!("Contact form sent");
                self.notifier.notify(&self.success_message, false);
                self.dom.reset_form(&self.form);
                Ok(())
            }
            Err(e) => {
                error!("Error: {e}");
                self.notifier.notify(&self.error_message, true);
                Err(e)
            }
        }
    }

    /// Submits through `spawn` on every submit event. The browser passes
    /// `wasm_bindgen_futures::spawn_local`.
    pub fn bind(self: Rc<Self>, spawn: impl Fn(LocalBoxFuture<'static, ()>) + 'static) {
        let form = self.form.clone();
        let dom = self.dom.clone();
        dom.on_submit(
            &form,
            Box::new(move || {
                let this = self.clone();
                spawn(
                    async move {
                        let _ = this.submit().await;
                    }
                    .boxed_local(),
                );
            }),
        );
    }
}
