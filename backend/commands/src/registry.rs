/// Command registry: the live, swappable set of registered handlers.
use std::collections::HashMap;
use std::sync::Arc;

use pagetree_core::BotError;

use crate::dispatch::CommandHandler;

#[derive(Default)]
pub struct CommandRegistry {
    handlers: Vec<Arc<dyn CommandHandler>>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A second handler with the same command string is
    /// rejected rather than shadowing the first.
    pub fn add(&mut self, handler: Arc<dyn CommandHandler>) -> Result<(), BotError> {
        let key = handler.command_string().to_string();
        if self.index.contains_key(&key) {
            return Err(BotError::DuplicateCommand(key));
        }
        self.index.insert(key, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
        self.index.clear();
    }

    /// Registered handlers in registration order.
    pub fn list(&self) -> &[Arc<dyn CommandHandler>] {
        &self.handlers
    }

    pub fn find(&self, command: &str) -> Option<Arc<dyn CommandHandler>> {
        self.index.get(command).map(|&i| Arc::clone(&self.handlers[i]))
    }

    pub fn command_strings(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|h| h.command_string().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::ShowPageCommand;
    use crate::types::{CommandNode, PageDescription};

    fn page_command(name: &str) -> Arc<dyn CommandHandler> {
        let node = CommandNode {
            command_string: name.into(),
            page: PageDescription {
                command: name.into(),
                short_text: format!("{name} short"),
                text: format!("{name} text"),
                photo: None,
            },
            parent_path: vec![],
            children: vec![],
        };
        Arc::new(ShowPageCommand::new(node))
    }

    #[test]
    fn add_and_find() {
        let mut registry = CommandRegistry::new();
        registry.add(page_command("weather")).unwrap();
        registry.add(page_command("news")).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.command_strings(), vec!["weather", "news"]);
        assert!(registry.find("news").is_some());
        assert!(registry.find("sports").is_none());
    }

    #[test]
    fn duplicate_command_is_rejected() {
        let mut registry = CommandRegistry::new();
        registry.add(page_command("weather")).unwrap();
        let err = registry.add(page_command("weather")).unwrap_err();
        assert!(matches!(err, BotError::DuplicateCommand(name) if name == "weather"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn clear_drops_every_handler() {
        let mut registry = CommandRegistry::new();
        registry.add(page_command("weather")).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.find("weather").is_none());
        registry.add(page_command("weather")).unwrap();
        assert_eq!(registry.len(), 1);
    }
}
