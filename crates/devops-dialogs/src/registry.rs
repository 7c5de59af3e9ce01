//! Static command registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::dialog::Dialog;

/// Maps command words to dialogs.
///
/// Built once at startup and shared read-only. Keys are lowercase; lookups
/// trim and ignore case but otherwise require an exact match.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use devops_dialogs::{dialogs::HelpDialog, CommandRegistry};
///
/// let mut registry = CommandRegistry::new();
/// registry.register(Arc::new(HelpDialog::new(["help"])));
/// registry.alias("?", "help");
///
/// assert!(registry.resolve(" HELP ").is_some());
/// assert!(registry.resolve("?").is_some());
/// assert!(registry.resolve("help me").is_none());
/// ```
#[derive(Default)]
pub struct CommandRegistry {
    dialogs: HashMap<String, Arc<dyn Dialog>>,
    aliases: HashMap<String, String>,
    order: Vec<String>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a dialog under its own name.
    pub fn register(&mut self, dialog: Arc<dyn Dialog>) {
        let key = dialog.name().trim().to_lowercase();
        if !self.dialogs.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.dialogs.insert(key, dialog);
    }

    /// Adds another command word for a registered dialog.
    pub fn alias(&mut self, alias: &str, command: &str) {
        self.aliases
            .insert(alias.trim().to_lowercase(), command.trim().to_lowercase());
    }

    /// Resolves command text to its registry key and dialog.
    pub fn resolve(&self, text: &str) -> Option<(&str, Arc<dyn Dialog>)> {
        let key = text.trim().to_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.dialogs
            .get_key_value(key)
            .map(|(key, dialog)| (key.as_str(), Arc::clone(dialog)))
    }

    /// Dialog registered under `key`.
    pub fn get(&self, key: &str) -> Option<Arc<dyn Dialog>> {
        self.dialogs.get(key).cloned()
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }
}
