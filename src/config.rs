use log::{warn, Level};
use serde::Deserialize;

use crate::dom::Dom;
use crate::error::ConfigError;

/// Id of the optional `<script type="application/json">` holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EmailJsConfig {
    pub endpoint: String,
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl Default for EmailJsConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.emailjs.com/api/v1.0/email/send".to_string(),
            service_id: "service_2gahwtr".to_string(),
            template_id: "template_6fzx6xg".to_string(),
            public_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToastConfig {
    pub hide_after_ms: u32,
    pub close_label: String,
    pub success_message: String,
    pub error_message: String,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            hide_after_ms: 3500,
            close_label: "Cerrar notificación".to_string(),
            success_message: "Mensaje enviado correctamente".to_string(),
            error_message: "Error al enviar el mensaje".to_string(),
        }
    }
}

/// Delay before item `i` of a freshly opened category settles: `base_ms + i * step_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StaggerConfig {
    pub base_ms: u32,
    pub step_ms: u32,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            base_ms: 60,
            step_ms: 80,
        }
    }
}

impl StaggerConfig {
    pub fn delay_for(&self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.base_ms
            .saturating_add(index.saturating_mul(self.step_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub emailjs: EmailJsConfig,
    pub contact_form_id: String,
    pub mobile_breakpoint: f64,
    pub header_scroll_threshold: f64,
    pub anchor_offset: f64,
    pub counter_duration_ms: u32,
    pub stagger: StaggerConfig,
    pub toast: ToastConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            emailjs: EmailJsConfig::default(),
            contact_form_id: "contact-form".to_string(),
            mobile_breakpoint: 768.0,
            header_scroll_threshold: 50.0,
            anchor_offset: 20.0,
            counter_duration_ms: 2000,
            stagger: StaggerConfig::default(),
            toast: ToastConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads overrides from `#site-config`. Falls back to defaults when the element
    /// is missing or holds invalid JSON.
    pub fn load<D: Dom>(dom: &D) -> Self {
        let Some(node) = dom.by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        match Self::from_json(&dom.text(&node)) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring #{CONFIG_ELEMENT_ID}: {e}");
                Self::default()
            }
        }
    }
}
