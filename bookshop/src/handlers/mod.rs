//! Phase handlers of the catalog.
//!
//! [`register`] installs them in a fixed order: the generic wildcard
//! loggers, the entity's BEFORE handlers, its ON handlers, its AFTER
//! handlers, the draft observers, and last the forced-error check. Since
//! BEFORE handlers run in registration order, validation and id generation
//! always precede the forced-error check.

pub mod books;
pub mod drafts;

use crate::ids::IdGenerator;
use books::{
    AcknowledgeDelete, Announce, EchoUpdate, ForcedError, GuardApproved, InsertBook, PrepareBook,
    ReadBooks,
};
use drafts::{DraftEvent, DraftObserver};
use hookline::{
    DefinitionError, EntityMatcher, EventKind, EventMatcher, RegistryBuilder,
    hooks::LoggingHandler,
};
use std::sync::Arc;

/// Register every catalog handler for `entity`.
pub fn register(
    builder: &mut RegistryBuilder,
    entity: &str,
    ids: Arc<dyn IdGenerator>,
) -> Result<(), DefinitionError> {
    // Generic handlers, all entities.
    builder
        .before(EventMatcher::Wildcard, EntityMatcher::Wildcard, LoggingHandler::new())
        .after(EventMatcher::Wildcard, EntityMatcher::Wildcard, LoggingHandler::new());

    builder
        .before(EventKind::Create, entity, PrepareBook::new(ids))
        .before(EventKind::Read, entity, Announce("Before"))
        .before(EventKind::Update, entity, GuardApproved)
        .before(EventKind::Delete, entity, Announce("Before"));

    builder
        .on(EventKind::Create, entity, InsertBook)?
        .on(EventKind::Read, entity, ReadBooks)?
        .on(EventKind::Update, entity, EchoUpdate)?
        .on(EventKind::Delete, entity, AcknowledgeDelete)?;

    builder
        .after(EventKind::Create, entity, Announce("After"))
        .after(EventKind::Read, entity, Announce("After"))
        .after(EventKind::Update, entity, Announce("After"))
        .after(EventKind::Delete, entity, Announce("After"));

    for draft in DraftEvent::ALL {
        builder.before(EventKind::from(draft), entity, DraftObserver);
    }

    builder.before(EventKind::Create, entity, ForcedError);
    Ok(())
}
