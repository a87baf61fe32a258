//! Things and their attributes
//!
//! A [`Thing`] is an opaque identity composed of attributes. The kernel only
//! ever asks a thing whether it has a capability ([`Thing::find`]) and never
//! looks at attribute internals beyond that. Every lookup returns an `Option`,
//! so callers chain over absent capabilities with ordinary combinators.
//!
//! Things form a graph with containers: a container owns the things inside
//! it, each thing keeps a weak back-reference ("locate") to the container it
//! is in, and a container keeps a weak reference to the thing that owns it.
//! Only downward links are strong, so cycles never keep anything alive.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use uuid::Uuid;

use super::container::{Container, WeakContainer};
use crate::attr::{Alias, Description, Name, Narrative, Player};

/// Unique identifier for a thing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThingId(pub Uuid);

impl ThingId {
    /// Create a new random ThingId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ThingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ThingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Downcasting support for attribute trait objects
pub trait AsAny {
    /// View this value as `Any`
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A capability attached to a thing.
///
/// Attributes must be Send + Sync as things are shared between command
/// executions running on different threads. Attributes with mutable state
/// guard it themselves.
pub trait Attribute: AsAny + Send + Sync {
    /// Copy this attribute for a copy of its thing, or `None` if the
    /// attribute must not be carried over
    fn copy(&self) -> Option<Box<dyn Attribute>>;

    /// One line diagnostic description
    fn dump(&self) -> String;
}

/// Back-references maintained by container moves
#[derive(Default)]
struct Locate {
    at: Option<WeakContainer>,
    origin: Option<WeakContainer>,
}

pub(crate) struct ThingInner {
    id: ThingId,
    attrs: Vec<Box<dyn Attribute>>,
    inventory: Option<Container>,
    locate: Mutex<Locate>,
}

/// Shared handle to a thing. Equality is identity, not value.
#[derive(Clone)]
pub struct Thing(Arc<ThingInner>);

/// Non-owning reference to a thing
#[derive(Clone, Default)]
pub struct WeakThing(Weak<ThingInner>);

impl WeakThing {
    /// Resolve the thing if it is still alive
    pub fn upgrade(&self) -> Option<Thing> {
        self.0.upgrade().map(Thing)
    }
}

impl Thing {
    /// Start building a new thing
    pub fn builder() -> ThingBuilder {
        ThingBuilder::default()
    }

    /// Unique identifier
    pub fn id(&self) -> ThingId {
        self.0.id
    }

    /// Find the first attribute of type `A`
    pub fn find<A: Attribute + 'static>(&self) -> Option<&A> {
        self.0
            .attrs
            .iter()
            .find_map(|attr| (**attr).as_any().downcast_ref::<A>())
    }

    /// Check for an attribute of type `A`
    pub fn has<A: Attribute + 'static>(&self) -> bool {
        self.find::<A>().is_some()
    }

    /// True if this thing is a player
    pub fn is_player(&self) -> bool {
        self.has::<Player>()
    }

    /// True if this thing is narrative (scenery)
    pub fn is_narrative(&self) -> bool {
        self.has::<Narrative>()
    }

    /// Name of the thing, or `default` if it has none
    pub fn name(&self, default: &str) -> String {
        self.find::<Name>()
            .map(|n| n.name().to_string())
            .unwrap_or_else(|| default.to_string())
    }

    /// Description of the thing, empty if it has none
    pub fn description(&self) -> String {
        self.find::<Description>()
            .map(|d| d.description().to_string())
            .unwrap_or_default()
    }

    /// True if the thing answers to `alias` (case insensitive)
    pub fn has_alias(&self, alias: &str) -> bool {
        self.find::<Alias>().is_some_and(|a| a.has_alias(alias))
    }

    /// The container this thing owns, if any
    pub fn inventory(&self) -> Option<&Container> {
        self.0.inventory.as_ref()
    }

    /// The container this thing is currently in
    pub fn location(&self) -> Option<Container> {
        self.0.locate.lock().at.as_ref().and_then(WeakContainer::upgrade)
    }

    /// The first container this thing was ever placed in
    pub fn origin(&self) -> Option<Container> {
        self.0
            .locate
            .lock()
            .origin
            .as_ref()
            .and_then(WeakContainer::upgrade)
    }

    /// Repoint the back-reference. Only container operations call this, with
    /// the relevant container locks held.
    pub(crate) fn set_location(&self, at: Option<&Container>) {
        let mut locate = self.0.locate.lock();
        locate.at = at.map(Container::downgrade);
        if locate.origin.is_none() {
            locate.origin = locate.at.clone();
        }
    }

    /// Non-owning handle
    pub fn downgrade(&self) -> WeakThing {
        WeakThing(Arc::downgrade(&self.0))
    }

    /// Copy this thing and its copyable attributes.
    ///
    /// A copied container starts out empty: copying nested contents would
    /// touch containers outside of the caller's lock set.
    pub fn copy(&self) -> Thing {
        let mut builder = Thing::builder();
        builder.attrs = self.0.attrs.iter().filter_map(|a| a.copy()).collect();
        builder.inventory = self.0.inventory.is_some();
        builder.build()
    }

    /// Diagnostic listing of this thing's attributes
    pub fn dump(&self) -> Vec<String> {
        let mut lines = vec![format!("{} {}", self.id(), self.name("(unnamed)"))];
        lines.extend(self.0.attrs.iter().map(|a| format!("  {}", a.dump())));
        if let Some(inventory) = self.inventory() {
            lines.push(format!("  inventory lock {}", inventory.lock_id()));
        }
        lines
    }
}

impl PartialEq for Thing {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Thing {}

impl fmt::Debug for Thing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thing")
            .field("id", &self.0.id)
            .field("name", &self.name("(unnamed)"))
            .finish()
    }
}

/// Builder for things
#[derive(Default)]
pub struct ThingBuilder {
    attrs: Vec<Box<dyn Attribute>>,
    inventory: bool,
}

impl ThingBuilder {
    /// Attach an attribute
    pub fn with<A: Attribute + 'static>(mut self, attr: A) -> Self {
        self.attrs.push(Box::new(attr));
        self
    }

    /// Give the thing its own container
    pub fn with_inventory(mut self) -> Self {
        self.inventory = true;
        self
    }

    /// Finish building
    pub fn build(self) -> Thing {
        let quiet_when_empty = self
            .attrs
            .iter()
            .any(|a| (**a).as_any().is::<Narrative>());
        let wants_inventory = self.inventory;
        let attrs = self.attrs;

        Thing(Arc::new_cyclic(|weak| ThingInner {
            id: ThingId::new(),
            attrs,
            inventory: wants_inventory
                .then(|| Container::new(WeakThing(weak.clone()), quiet_when_empty)),
            locate: Mutex::new(Locate::default()),
        }))
    }
}
