use crate::errors::Result;
use crate::mail::Mailer;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

pub type MailerConstructor = Arc<dyn Fn() -> Result<Arc<dyn Mailer>> + Send + Sync>;

static MAILER_REGISTRY: Lazy<RwLock<HashMap<String, MailerConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

pub fn register_mailer_plugin<S: Into<String>>(name: S, constructor: MailerConstructor) {
    let mut registry = MAILER_REGISTRY
        .write()
        .expect("Mailer registry lock poisoned");
    registry.insert(name.into(), constructor);
}

pub fn get_mailer_plugin(name: &str) -> Option<MailerConstructor> {
    MAILER_REGISTRY
        .read()
        .expect("Mailer registry lock poisoned")
        .get(name)
        .cloned()
}

pub fn debug_mailer_registry() {
    let registry = MAILER_REGISTRY
        .read()
        .expect("Mailer registry lock poisoned");
    if registry.is_empty() {
        tracing::debug!("No mailer plugins registered.");
    } else {
        tracing::debug!("Registered mailer plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}
