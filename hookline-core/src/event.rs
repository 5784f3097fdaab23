//! Event kinds, phases, and the matchers used to bind handlers to them.

use serde::{Deserialize, Serialize};
use std::{borrow::Cow, convert::Infallible, fmt, str::FromStr};

/// The operation a [`Request`] performs.
///
/// CRUD verbs and draft lifecycle events are closed variants; anything else is
/// a named custom operation (an action or function).
///
/// [`Request`]: crate::Request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Insert a new record.
    Create,
    /// Query records.
    Read,
    /// Modify an existing record.
    Update,
    /// Remove a record.
    Delete,
    /// Draft lifecycle: a new draft is started.
    New,
    /// Draft lifecycle: a draft is edited.
    Patch,
    /// Draft lifecycle: a draft is activated.
    Save,
    /// A named custom operation.
    Custom(Cow<'static, str>),
}

impl EventKind {
    /// Creates a custom operation event.
    ///
    /// Built-in names (`CREATE`, `SAVE`, ...) resolve to their closed variant,
    /// so `EventKind::custom("CREATE") == EventKind::Create`.
    pub fn custom(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self::builtin(&name).unwrap_or(EventKind::Custom(name))
    }

    fn builtin(name: &str) -> Option<Self> {
        Some(match name {
            "CREATE" => EventKind::Create,
            "READ" => EventKind::Read,
            "UPDATE" => EventKind::Update,
            "DELETE" => EventKind::Delete,
            "NEW" => EventKind::New,
            "PATCH" => EventKind::Patch,
            "SAVE" => EventKind::Save,
            _ => return None,
        })
    }

    /// The canonical name of this event.
    pub fn name(&self) -> &str {
        match self {
            EventKind::Create => "CREATE",
            EventKind::Read => "READ",
            EventKind::Update => "UPDATE",
            EventKind::Delete => "DELETE",
            EventKind::New => "NEW",
            EventKind::Patch => "PATCH",
            EventKind::Save => "SAVE",
            EventKind::Custom(name) => name,
        }
    }

    /// Whether this is one of the four CRUD verbs.
    pub fn is_crud(&self) -> bool {
        matches!(
            self,
            EventKind::Create | EventKind::Read | EventKind::Update | EventKind::Delete
        )
    }

    /// Whether this is a draft lifecycle event.
    pub fn is_draft(&self) -> bool {
        matches!(self, EventKind::New | EventKind::Patch | EventKind::Save)
    }

    /// Whether this is a custom operation.
    pub fn is_custom(&self) -> bool {
        matches!(self, EventKind::Custom(_))
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::builtin(s).unwrap_or_else(|| EventKind::Custom(Cow::Owned(s.to_owned()))))
    }
}

/// When a handler runs relative to the core effect of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Validation and request rewriting.
    Before,
    /// The single handler that produces the outcome.
    On,
    /// Observers of a successful outcome.
    After,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Before => "BEFORE",
            Phase::On => "ON",
            Phase::After => "AFTER",
        })
    }
}

/// Matches either any value or one specific value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Matcher<T> {
    /// Matches everything (`*`).
    Wildcard,
    /// Matches exactly this value.
    Specific(T),
}

impl<T: PartialEq> Matcher<T> {
    /// Returns `true` if `value` satisfies this matcher.
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Matcher::Wildcard => true,
            Matcher::Specific(expected) => expected == value,
        }
    }

    /// The specific value, if any.
    pub fn specific(&self) -> Option<&T> {
        match self {
            Matcher::Wildcard => None,
            Matcher::Specific(value) => Some(value),
        }
    }
}

/// Matches the event of a request.
pub type EventMatcher = Matcher<EventKind>;

impl From<EventKind> for Matcher<EventKind> {
    fn from(event: EventKind) -> Self {
        Matcher::Specific(event)
    }
}

impl<T: fmt::Display> fmt::Display for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Wildcard => f.write_str("*"),
            Matcher::Specific(value) => value.fmt(f),
        }
    }
}

/// Matches the entity a request targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityMatcher {
    /// Matches every request, bound or not.
    Wildcard,
    /// Matches requests targeting this entity.
    Specific(String),
    /// Matches only requests without a target (unbound operations).
    Unbound,
}

impl EntityMatcher {
    /// Matches requests targeting `name`.
    pub fn entity(name: impl Into<String>) -> Self {
        EntityMatcher::Specific(name.into())
    }

    /// Returns `true` if a request with this target satisfies the matcher.
    pub fn matches(&self, target: Option<&str>) -> bool {
        match (self, target) {
            (EntityMatcher::Wildcard, _) => true,
            (EntityMatcher::Specific(name), Some(target)) => name == target,
            (EntityMatcher::Specific(_), None) => false,
            (EntityMatcher::Unbound, target) => target.is_none(),
        }
    }
}

impl From<&str> for EntityMatcher {
    fn from(name: &str) -> Self {
        EntityMatcher::Specific(name.to_owned())
    }
}

impl From<String> for EntityMatcher {
    fn from(name: String) -> Self {
        EntityMatcher::Specific(name)
    }
}

impl fmt::Display for EntityMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityMatcher::Wildcard => f.write_str("*"),
            EntityMatcher::Specific(name) => f.write_str(name),
            EntityMatcher::Unbound => f.write_str("<unbound>"),
        }
    }
}

/// Progress of one pipeline run.
///
/// `Aborted` and `Failed` are both terminal failures; they differ only in
/// which phase produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Not started.
    Pending,
    /// BEFORE handlers are executing.
    BeforeRunning,
    /// The ON handler is executing.
    OnRunning,
    /// AFTER handlers are executing.
    AfterRunning,
    /// The run produced an outcome.
    Completed,
    /// BEFORE or ON failed.
    Aborted,
    /// An AFTER handler failed after the outcome was computed.
    Failed,
}

impl RunState {
    /// Whether the run has finished.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted | RunState::Failed)
    }
}
