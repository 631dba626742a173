//! A small in-memory item catalog and the `item` command tree built on it.
//!
//! This is what the shell binary serves by default, and a worked example of
//! wiring live state into suggestion sources and handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::Rng;

use crate::command::{CommandBuilder, CommandNode, SourceUnavailable, SuggestionSource};
use crate::error::ConstructionError;
use crate::host::{IdentifierKind, IdentifierRegistry};
use crate::registry::CommandRegistry;

/// Attempts `add-random` makes before giving up on finding visible items.
pub const MAX_RANDOM_ATTEMPTS: usize = 1000;

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogItem {
    pub guid: String,
    pub name: String,
    /// Hidden items can be added by name but are never picked at random.
    pub hidden: bool,
}

impl CatalogItem {
    pub fn new(guid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            name: name.into(),
            hidden: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Every item that exists, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    /// The built-in demo catalog.
    pub fn sample() -> Self {
        Self::new([
            CatalogItem::new("item-001", "Fireball"),
            CatalogItem::new("item-002", "IceBolt"),
            CatalogItem::new("item-003", "Iron Sword"),
            CatalogItem::new("item-004", "Healing Potion"),
            CatalogItem::new("item-005", "Burning Blood"),
            CatalogItem::new("item-006", "Debug Wand").hidden(),
        ])
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Names of items that are not hidden, in catalog order.
    pub fn visible_names(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|item| !item.hidden)
            .map(|item| item.name.clone())
            .collect()
    }
}

impl IdentifierRegistry for Catalog {
    type Item = CatalogItem;

    fn all_identifiers(&self, kind: IdentifierKind) -> Vec<String> {
        self.items
            .iter()
            .map(|item| match kind {
                IdentifierKind::ReadableId => item.name.clone(),
                IdentifierKind::Guid => item.guid.clone(),
            })
            .collect()
    }

    fn lookup(&self, id: &str, kind: IdentifierKind) -> Option<CatalogItem> {
        self.items
            .iter()
            .find(|item| match kind {
                IdentifierKind::ReadableId => item.name.eq_ignore_ascii_case(id),
                IdentifierKind::Guid => item.guid == id,
            })
            .cloned()
    }
}

// ============================================================================
// Collection
// ============================================================================

/// The items the user holds. Starts out unloaded; the first `add` loads it.
#[derive(Debug, Default)]
pub struct Collection {
    items: Mutex<Option<Vec<String>>>,
}

impl Collection {
    /// An unloaded collection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loaded(items: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            items: Mutex::new(Some(items.into_iter().map(Into::into).collect())),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.state().is_some()
    }

    /// Current contents, or `None` while unloaded.
    pub fn snapshot(&self) -> Option<Vec<String>> {
        self.state().clone()
    }

    pub fn add(&self, name: impl Into<String>) {
        self.state().get_or_insert_with(Vec::new).push(name.into());
    }

    /// Remove the first item called `name`; `None` while unloaded.
    pub fn remove(&self, name: &str) -> Option<bool> {
        let mut state = self.state();
        let items = state.as_mut()?;
        let index = items.iter().position(|item| item.eq_ignore_ascii_case(name));
        Some(index.map(|index| items.remove(index)).is_some())
    }

    fn state(&self) -> MutexGuard<'_, Option<Vec<String>>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ============================================================================
// Suggestion sources
// ============================================================================

/// Visible catalog names.
pub struct CatalogNames(pub Arc<Catalog>);

impl SuggestionSource for CatalogNames {
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
        Ok(self.0.visible_names())
    }
}

/// Names currently in the collection; unavailable while it is unloaded.
pub struct CollectionNames(pub Arc<Collection>);

impl SuggestionSource for CollectionNames {
    fn suggestions(&self) -> Result<Vec<String>, SourceUnavailable> {
        self.0
            .snapshot()
            .ok_or_else(|| SourceUnavailable::new("collection not loaded"))
    }
}

// ============================================================================
// Commands
// ============================================================================

/// The `item` tree: `add`, `add-random`, `remove` and `list`.
pub fn item_command(
    catalog: Arc<Catalog>,
    collection: Arc<Collection>,
) -> Result<CommandNode, ConstructionError> {
    let add_catalog = Arc::clone(&catalog);
    let add_collection = Arc::clone(&collection);
    let random_collection = Arc::clone(&collection);
    let remove_collection = Arc::clone(&collection);
    let list_catalog = Arc::clone(&catalog);
    let list_collection = Arc::clone(&collection);

    CommandBuilder::new("item")
        .with_description("Manage the item collection")
        .use_help_middleware()
        .with_sub_command("add")
        .with_description("Add an item to the collection")
        .use_help_middleware()
        .with_name_argument()
        .with_description("The name of the item to add")
        .with_suggestions(CatalogNames(Arc::clone(&catalog)))
        .parent()
        .set_handler(move |ctx| {
            let name = ctx.required_argument::<String>("name")?;
            let item = add_catalog
                .lookup(name, IdentifierKind::ReadableId)
                .ok_or_else(|| anyhow::anyhow!("unknown item '{name}'"))?;
            ctx.log(format!("Adding item: {}", item.name));
            add_collection.add(item.name);
            Ok(())
        })
        .parent()
        .with_sub_command("add-random")
        .with_description("Add random items to the collection")
        .use_help_middleware()
        .with_argument::<i64>("amount")
        .with_description("The number of items to add")
        .with_default_value("1")
        .parent()
        .set_handler(move |ctx| {
            let amount = *ctx.required_argument::<i64>("amount")?;
            anyhow::ensure!(amount > 0, "amount must be positive, got {amount}");
            let wanted = usize::try_from(amount)?;
            ctx.log(format!("Adding {wanted} random items"));

            let items = catalog.items();
            anyhow::ensure!(!items.is_empty(), "the catalog is empty");
            let mut rng = rand::thread_rng();
            let mut added = 0;
            let mut attempts = 0;
            while added < wanted && attempts < MAX_RANDOM_ATTEMPTS {
                attempts += 1;
                let item = &items[rng.gen_range(0..items.len())];
                if item.hidden {
                    continue;
                }
                ctx.log(format!("Adding {}", item.name));
                random_collection.add(item.name.clone());
                added += 1;
            }
            if added < wanted {
                ctx.log(format!(
                    "Gave up after {MAX_RANDOM_ATTEMPTS} attempts, added {added} of {wanted}"
                ));
                anyhow::bail!(
                    "failed to add all {wanted} items after {MAX_RANDOM_ATTEMPTS} attempts"
                );
            }
            Ok(())
        })
        .parent()
        .with_sub_command("remove")
        .with_description("Remove an item from the collection")
        .use_help_middleware()
        .with_name_argument()
        .with_description("The name of the item to remove")
        .with_suggestions(CollectionNames(Arc::clone(&collection)))
        .parent()
        .set_handler(move |ctx| {
            let name = ctx.required_argument::<String>("name")?;
            match remove_collection.remove(name) {
                None => anyhow::bail!("the collection is not loaded"),
                Some(false) => anyhow::bail!("no item '{name}' in the collection"),
                Some(true) => ctx.log(format!("Removing item: {name}")),
            }
            Ok(())
        })
        .parent()
        .with_sub_command("list")
        .with_description("List the items in the collection")
        .use_help_middleware()
        .with_option::<i64>("page")
        .with_description("The page number to list")
        .with_default_value("1")
        .with_aliases(["p"])
        .parent()
        .with_option::<i64>("page-size")
        .with_description("The number of items to list per page")
        .with_default_value("50")
        .with_aliases(["ps"])
        .parent()
        .set_handler(move |ctx| {
            let page = *ctx.required_option::<i64>("page")?;
            let page_size = *ctx.required_option::<i64>("page-size")?;
            anyhow::ensure!(page >= 1, "--page must be at least 1, got {page}");
            anyhow::ensure!(page_size >= 1, "--page-size must be at least 1, got {page_size}");
            let mut items: Vec<String> = list_collection
                .snapshot()
                .ok_or_else(|| anyhow::anyhow!("the collection is not loaded"))?
                .into_iter()
                .filter(|name| {
                    list_catalog
                        .lookup(name, IdentifierKind::ReadableId)
                        .is_none_or(|item| !item.hidden)
                })
                .collect();
            items.sort_by_cached_key(|name| name.to_lowercase());

            let page = usize::try_from(page)?;
            let page_size = usize::try_from(page_size)?;
            let skip = (page - 1).saturating_mul(page_size);
            ctx.log("Items:");
            for item in items.iter().skip(skip).take(page_size) {
                ctx.log(item);
            }
            Ok(())
        })
        .parent()
        .build()
}

/// Registry serving the `item` tree over `catalog` and `collection`.
pub fn sample_registry(
    catalog: Arc<Catalog>,
    collection: Arc<Collection>,
) -> Result<CommandRegistry, ConstructionError> {
    CommandRegistry::with_commands([item_command(catalog, collection)?])
}
