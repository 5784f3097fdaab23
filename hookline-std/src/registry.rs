//! Registry module for phase handlers.
//!
//! This module provides a builder for registering handlers and a frozen
//! registry for immutable, thread-safe resolution.
//!
//! Resolution is a linear scan in registration order. There is no
//! specificity sorting: a wildcard BEFORE handler registered first runs
//! first. ON handlers are the exception, since each (event, entity) pair may
//! only have one, and it must be named explicitly.

use hookline_core::{
    AfterHandler, BeforeHandler, DefinitionError, DynAfterHandler, DynBeforeHandler,
    DynOnHandler, EntityMatcher, EventKind, EventMatcher, Matcher, OnHandler, Phase,
};
use std::fmt;

/// A type-erased handler tagged with its phase.
pub enum PhaseHandler {
    /// A BEFORE handler.
    Before(Box<dyn DynBeforeHandler>),
    /// An ON handler.
    On(Box<dyn DynOnHandler>),
    /// An AFTER handler.
    After(Box<dyn DynAfterHandler>),
}

impl PhaseHandler {
    /// Erase a BEFORE handler.
    pub fn before<H: BeforeHandler>(handler: H) -> Self {
        PhaseHandler::Before(Box::new(handler))
    }

    /// Erase an ON handler.
    pub fn on<H: OnHandler>(handler: H) -> Self {
        PhaseHandler::On(Box::new(handler))
    }

    /// Erase an AFTER handler.
    pub fn after<H: AfterHandler>(handler: H) -> Self {
        PhaseHandler::After(Box::new(handler))
    }

    /// The phase this handler runs in.
    pub fn phase(&self) -> Phase {
        match self {
            PhaseHandler::Before(_) => Phase::Before,
            PhaseHandler::On(_) => Phase::On,
            PhaseHandler::After(_) => Phase::After,
        }
    }
}

/// One handler bound to an event and entity.
pub struct Registration {
    event: EventMatcher,
    entity: EntityMatcher,
    handler: PhaseHandler,
}

impl Registration {
    /// Create a registration.
    pub fn new(
        event: impl Into<EventMatcher>,
        entity: impl Into<EntityMatcher>,
        handler: PhaseHandler,
    ) -> Self {
        Self {
            event: event.into(),
            entity: entity.into(),
            handler,
        }
    }

    /// The phase of the registered handler.
    pub fn phase(&self) -> Phase {
        self.handler.phase()
    }

    /// The event matcher.
    pub fn event(&self) -> &EventMatcher {
        &self.event
    }

    /// The entity matcher.
    pub fn entity(&self) -> &EntityMatcher {
        &self.entity
    }

    /// The registered handler.
    pub fn handler(&self) -> &PhaseHandler {
        &self.handler
    }

    /// Whether this registration applies to a request.
    pub fn matches(&self, event: &EventKind, target: Option<&str>) -> bool {
        self.event.matches(event) && self.entity.matches(target)
    }

    fn on_key(&self) -> Option<(&EventKind, &str)> {
        match (&self.handler, &self.event, &self.entity) {
            (PhaseHandler::On(_), Matcher::Specific(event), EntityMatcher::Specific(entity)) => {
                Some((event, entity.as_str()))
            }
            _ => None,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("phase", &self.phase())
            .field("event", &self.event)
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// RegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a [`Registry`].
///
/// ON conflicts are reported by the registering call, so a misconfigured
/// service fails at start-up rather than on its first request.
///
/// # Example
/// ```ignore
/// let mut builder = RegistryBuilder::new();
/// builder
///     .before(EventMatcher::Wildcard, EntityMatcher::Wildcard, LoggingHandler::new())
///     .before(EventKind::Create, "books", ValidateBook);
/// builder.on(EventKind::Create, "books", InsertBook)?;
/// let registry = builder.build();
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Registration>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a registration.
    pub fn register(&mut self, registration: Registration) -> Result<&mut Self, DefinitionError> {
        if registration.phase() == Phase::On {
            let Some((event, entity)) = registration.on_key() else {
                return Err(DefinitionError::UnspecificOn {
                    event: registration.event.clone(),
                    entity: registration.entity.clone(),
                });
            };
            if self
                .entries
                .iter()
                .filter_map(Registration::on_key)
                .any(|key| key == (event, entity))
            {
                return Err(DefinitionError::DuplicateOn {
                    event: event.clone(),
                    entity: entity.to_owned(),
                });
            }
        }
        self.entries.push(registration);
        Ok(self)
    }

    /// Register a BEFORE handler.
    pub fn before<H: BeforeHandler>(
        &mut self,
        event: impl Into<EventMatcher>,
        entity: impl Into<EntityMatcher>,
        handler: H,
    ) -> &mut Self {
        self.entries.push(Registration::new(
            event,
            entity,
            PhaseHandler::before(handler),
        ));
        self
    }

    /// Register the ON handler for an event and entity.
    pub fn on<H: OnHandler>(
        &mut self,
        event: impl Into<EventMatcher>,
        entity: impl Into<EntityMatcher>,
        handler: H,
    ) -> Result<&mut Self, DefinitionError> {
        self.register(Registration::new(event, entity, PhaseHandler::on(handler)))
    }

    /// Register an AFTER handler.
    pub fn after<H: AfterHandler>(
        &mut self,
        event: impl Into<EventMatcher>,
        entity: impl Into<EntityMatcher>,
        handler: H,
    ) -> &mut Self {
        self.entries
            .push(Registration::new(event, entity, PhaseHandler::after(handler)));
        self
    }

    /// Build the immutable Registry, keeping registration order.
    pub fn build(self) -> Registry {
        Registry {
            entries: self.entries,
        }
    }

    /// Get the number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the builder has no registrations.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Registry - immutable, thread-safe handler storage
// ============================================================================

/// An immutable, thread-safe registry of phase handlers.
///
/// Created by calling [`RegistryBuilder::build`]. Share it between
/// dispatchers via `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All registrations of `phase` matching the request, in registration order.
    pub fn resolve<'a>(
        &'a self,
        phase: Phase,
        event: &'a EventKind,
        target: Option<&'a str>,
    ) -> impl Iterator<Item = &'a Registration> + 'a {
        self.entries
            .iter()
            .filter(move |r| r.phase() == phase && r.matches(event, target))
    }

    /// BEFORE handlers matching the request, in registration order.
    pub fn before_handlers<'a>(
        &'a self,
        event: &'a EventKind,
        target: Option<&'a str>,
    ) -> impl Iterator<Item = &'a dyn DynBeforeHandler> + 'a {
        self.resolve(Phase::Before, event, target)
            .filter_map(|r| match &r.handler {
                PhaseHandler::Before(h) => Some(h.as_ref()),
                _ => None,
            })
    }

    /// The ON registration for the request, if one exists.
    pub fn resolve_on(&self, event: &EventKind, target: Option<&str>) -> Option<&Registration> {
        self.entries
            .iter()
            .find(|r| r.phase() == Phase::On && r.matches(event, target))
    }

    /// The ON handler for the request, if one is registered.
    pub fn on_handler(&self, event: &EventKind, target: Option<&str>) -> Option<&dyn DynOnHandler> {
        match &self.resolve_on(event, target)?.handler {
            PhaseHandler::On(h) => Some(h.as_ref()),
            _ => None,
        }
    }

    /// AFTER handlers matching the request, in registration order.
    pub fn after_handlers<'a>(
        &'a self,
        event: &'a EventKind,
        target: Option<&'a str>,
    ) -> impl Iterator<Item = &'a dyn DynAfterHandler> + 'a {
        self.resolve(Phase::After, event, target)
            .filter_map(|r| match &r.handler {
                PhaseHandler::After(h) => Some(h.as_ref()),
                _ => None,
            })
    }

    /// Number of registrations in `phase`.
    pub fn count(&self, phase: Phase) -> usize {
        self.entries.iter().filter(|r| r.phase() == phase).count()
    }

    /// Get the number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get all registrations (for advanced use).
    pub fn entries(&self) -> &[Registration] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookline_core::{Context, HandlerError, Request, serde_json::Value};

    struct Noop;

    impl BeforeHandler for Noop {
        async fn before(&self, _req: &mut Request, _cx: &Context) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    impl OnHandler for Noop {
        async fn on(&self, _req: &mut Request, _cx: &Context) -> Result<Value, HandlerError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn test_duplicate_on_is_rejected() {
        let mut builder = RegistryBuilder::new();
        builder.on(EventKind::Create, "books", Noop).unwrap();
        builder.on(EventKind::Create, "authors", Noop).unwrap();
        builder.on(EventKind::Read, "books", Noop).unwrap();

        let err = builder.on(EventKind::Create, "books", Noop).unwrap_err();
        assert_eq!(
            err,
            DefinitionError::DuplicateOn {
                event: EventKind::Create,
                entity: "books".into(),
            }
        );
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn test_wildcard_on_is_rejected() {
        let mut builder = RegistryBuilder::new();
        let err = builder
            .on(EventMatcher::Wildcard, "books", Noop)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnspecificOn { .. }));

        let err = builder
            .on(EventKind::Create, EntityMatcher::Wildcard, Noop)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnspecificOn { .. }));

        let err = builder
            .on(EventKind::custom("approveBook"), EntityMatcher::Unbound, Noop)
            .unwrap_err();
        assert!(matches!(err, DefinitionError::UnspecificOn { .. }));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_resolve_keeps_registration_order() {
        let mut builder = RegistryBuilder::new();
        builder
            .before(EventMatcher::Wildcard, EntityMatcher::Wildcard, Noop)
            .before(EventKind::Create, "books", Noop)
            .before(EventKind::Read, "books", Noop)
            .before(EventKind::Create, "authors", Noop);
        let registry = builder.build();

        let matched: Vec<_> = registry
            .resolve(Phase::Before, &EventKind::Create, Some("books"))
            .map(|r| r.event().to_string())
            .collect();
        assert_eq!(matched, vec!["*", "CREATE"]);

        assert_eq!(registry.before_handlers(&EventKind::Delete, None).count(), 1);
        assert_eq!(registry.count(Phase::Before), 4);
        assert!(registry.on_handler(&EventKind::Create, Some("books")).is_none());
    }

    #[test]
    fn test_resolve_on_outlives_lookup_arguments() {
        let mut builder = RegistryBuilder::new();
        builder.on(EventKind::Create, "books", Noop).unwrap();
        builder.on(EventKind::Read, "books", Noop).unwrap();
        let registry = builder.build();

        let found = {
            let event = EventKind::Read;
            let target = String::from("books");
            registry.resolve_on(&event, Some(&target))
        };
        assert_eq!(found.map(|r| r.event().to_string()), Some("READ".to_owned()));
        assert!(registry.resolve_on(&EventKind::Delete, Some("books")).is_none());
        assert!(registry.on_handler(&EventKind::Create, Some("books")).is_some());
    }
}
