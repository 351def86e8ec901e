//! Single-flight fetch coordinator with a per-key result cache.
//!
//! Each (user key, [`ResourceKind`]) pair moves through
//! `Idle -> InFlight -> Idle`. A [`ProjectsFetcher::fetch`] call for a pair
//! that is already in flight shares the running request instead of sending a
//! second one. The in-flight marker is cleared on success and on failure, so a
//! later `fetch` can always retry.
//!
//! A successful fetch publishes its decoded list into the cache of its kind,
//! indexed by entity id, before the marker is cleared. A reader that finds no
//! marker therefore always sees the latest published result.

mod config;

pub use config::FetcherConfig;

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::watch;
use uuid::Uuid;

use crate::client::{ApiClient, HttpMethod};
use crate::decode;
use crate::error::{Error, Result};
use crate::models::{CoreProject, Identified, PriorityCatalog, Project, UserProfile};

/// Which project subset is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Core,
    Favorite,
    All,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Favorite => "favorite",
            Self::All => "all",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "core" => Some(Self::Core),
            "favorite" => Some(Self::Favorite),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn path_segments(&self) -> &'static [&'static str] {
        match self {
            Self::Core => &["user", "projects", "core"],
            Self::Favorite => &["user", "projects", "favorite"],
            Self::All => &["user", "projects"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whose projects a fetch targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    /// The configured main user.
    MainUser,
    /// Every configured user key, main user included.
    Emails,
    Organizations,
    Branches,
}

/// Observable state of one (user key, kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FetchKey {
    user: String,
    kind: ResourceKind,
}

impl FetchKey {
    fn new(user: &str, kind: ResourceKind) -> Self {
        Self {
            user: user.to_string(),
            kind,
        }
    }
}

/// `None` until the fetch finishes.
type Outcome = Option<std::result::Result<(), Arc<Error>>>;

type Cache<E> = RwLock<HashMap<String, HashMap<Uuid, E>>>;

struct Inner {
    config: FetcherConfig,
    client: ApiClient,
    runtime: Handle,
    catalog: RwLock<Arc<PriorityCatalog>>,
    in_flight: Mutex<HashMap<FetchKey, watch::Receiver<Outcome>>>,
    cores: Cache<CoreProject>,
    favorites: Cache<Project>,
    all: Cache<Project>,
}

/// Clears the in-flight marker when the fetch task ends, even by panic.
struct InFlightGuard {
    inner: Arc<Inner>,
    key: FetchKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.inner.in_flight.lock() {
            in_flight.remove(&self.key);
        }
    }
}

/// Single-flight fetch coordinator.
///
/// Cheap to clone; every clone shares the same cache and in-flight markers.
#[derive(Clone)]
pub struct ProjectsFetcher {
    inner: Arc<Inner>,
}

impl fmt::Debug for ProjectsFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectsFetcher")
            .field("config", &self.inner.config)
            .field("base_url", &self.inner.client.base_url())
            .finish()
    }
}

/// Builder for [`ProjectsFetcher`]. [`configure`](Self::configure) is mandatory.
#[derive(Default)]
pub struct ProjectsFetcherBuilder {
    config: Option<FetcherConfig>,
    client: Option<ApiClient>,
    runtime: Option<Handle>,
    catalog: Option<PriorityCatalog>,
}

impl ProjectsFetcherBuilder {
    pub fn configure(mut self, config: FetcherConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Client to fetch with. Defaults to [`ApiClient::from_env`].
    pub fn client(mut self, client: ApiClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Runtime fetch tasks are spawned on. Defaults to the current one.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Initial priority catalog. Defaults to empty.
    pub fn catalog(mut self, catalog: PriorityCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn build(self) -> Result<ProjectsFetcher> {
        let config = self.config.ok_or_else(|| {
            Error::Config("configure() must be called before the fetcher is built".to_string())
        })?;
        config.validate()?;

        let client = match self.client {
            Some(client) => client,
            None => ApiClient::from_env()?,
        };
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| {
                Error::Config("no tokio runtime to spawn fetches on".to_string())
            })?,
        };

        Ok(ProjectsFetcher {
            inner: Arc::new(Inner {
                config,
                client,
                runtime,
                catalog: RwLock::new(Arc::new(self.catalog.unwrap_or_default())),
                in_flight: Mutex::new(HashMap::new()),
                cores: RwLock::new(HashMap::new()),
                favorites: RwLock::new(HashMap::new()),
                all: RwLock::new(HashMap::new()),
            }),
        })
    }
}

impl ProjectsFetcher {
    pub fn builder() -> ProjectsFetcherBuilder {
        ProjectsFetcherBuilder::default()
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.inner.config
    }

    // ============================================================
    // Catalog
    // ============================================================

    pub fn catalog(&self) -> Arc<PriorityCatalog> {
        Arc::clone(&self.inner.catalog.read().expect("catalog lock poisoned"))
    }

    /// Replace the catalog. Fetches already in flight keep the one they started with.
    pub fn set_catalog(&self, catalog: PriorityCatalog) {
        *self.inner.catalog.write().expect("catalog lock poisoned") = Arc::new(catalog);
    }

    /// The catalog's descriptions in the configured language, ordered by id.
    pub fn priority_descriptions(&self) -> Vec<(i64, String)> {
        self.catalog()
            .descriptions(self.config().language())
            .into_iter()
            .map(|(id, description)| (id, description.to_string()))
            .collect()
    }

    /// Fetch the main user's personal info and install its priorities as the catalog.
    pub async fn load_catalog(&self) -> Result<UserProfile> {
        let client = &self.inner.client;
        let request =
            client.build_request::<Value>(self.config().main_email(), HttpMethod::Get, &["user"], None)?;
        let response = client.execute(&request).await?;
        let profile = decode::decode_user_profile(&response.body)?;

        tracing::debug!(priorities = profile.priorities.len(), "Loaded priority catalog");
        self.set_catalog(profile.catalog());
        Ok(profile)
    }

    // ============================================================
    // Fetching
    // ============================================================

    /// Start fetching every requested kind for every user in `scope`.
    ///
    /// Never blocks. A (user, kind) pair already in flight is left alone and
    /// its running request is shared.
    pub fn fetch(&self, kinds: &[ResourceKind], scope: &[Scope]) -> Result<()> {
        if kinds.is_empty() || scope.is_empty() {
            return Err(Error::InvalidRequest(
                "resource kinds and scope must not be empty".to_string(),
            ));
        }

        let kinds: BTreeSet<ResourceKind> = kinds.iter().copied().collect();
        for user in self.resolve_scope(scope) {
            for kind in &kinds {
                self.dispatch(&user, *kind);
            }
        }
        Ok(())
    }

    pub fn state(&self, user: &str, kind: ResourceKind) -> FetchState {
        let in_flight = self.inner.in_flight.lock().expect("in-flight lock poisoned");
        if in_flight.contains_key(&FetchKey::new(user, kind)) {
            FetchState::InFlight
        } else {
            FetchState::Idle
        }
    }

    fn resolve_scope(&self, scope: &[Scope]) -> BTreeSet<String> {
        let config = &self.inner.config;
        let mut users = BTreeSet::new();
        for entry in scope {
            match entry {
                Scope::MainUser => {
                    users.insert(config.main_email().to_string());
                }
                Scope::Emails => users.extend(config.emails().iter().cloned()),
                Scope::Organizations => tracing::warn!(
                    organizations = ?config.organizations(),
                    "No project endpoint for organizations, skipping"
                ),
                Scope::Branches => tracing::warn!(
                    branches = ?config.branches(),
                    "No project endpoint for branches, skipping"
                ),
            }
        }
        users
    }

    /// Mark (user, kind) in flight and spawn its request, unless it already is.
    fn dispatch(&self, user: &str, kind: ResourceKind) -> bool {
        let key = FetchKey::new(user, kind);
        let sender = {
            let mut in_flight = self.inner.in_flight.lock().expect("in-flight lock poisoned");
            match in_flight.entry(key.clone()) {
                Entry::Occupied(_) => {
                    tracing::debug!(user, %kind, "Fetch already in flight, sharing it");
                    return false;
                }
                Entry::Vacant(slot) => {
                    let (sender, receiver) = watch::channel(None);
                    slot.insert(receiver);
                    sender
                }
            }
        };

        tracing::debug!(user, %kind, "Dispatching fetch");
        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            key,
        };
        let catalog = self.catalog();
        self.inner.runtime.spawn(async move {
            let outcome = guard.inner.fetch_and_publish(&guard.key, &catalog).await;
            if let Err(e) = &outcome {
                tracing::error!(user = %guard.key.user, kind = %guard.key.kind, error = %e, "Fetch failed");
            }
            drop(guard);
            sender.send_replace(Some(outcome.map_err(Arc::new)));
        });
        true
    }

    // ============================================================
    // Read accessors
    // ============================================================

    /// Core projects of the main user. Waits for an in-flight fetch first.
    pub async fn get_cores(&self) -> Result<HashMap<Uuid, CoreProject>> {
        self.get_cores_of(self.config().main_email()).await
    }

    /// Favorite projects of the main user. Waits for an in-flight fetch first.
    pub async fn get_favorites(&self) -> Result<HashMap<Uuid, Project>> {
        self.get_favorites_of(self.config().main_email()).await
    }

    /// All projects of the main user. Waits for an in-flight fetch first.
    pub async fn get_all(&self) -> Result<HashMap<Uuid, Project>> {
        self.get_all_of(self.config().main_email()).await
    }

    pub async fn get_cores_of(&self, user: &str) -> Result<HashMap<Uuid, CoreProject>> {
        self.wait_for(user, ResourceKind::Core).await?;
        Ok(snapshot(&self.inner.cores, user))
    }

    pub async fn get_favorites_of(&self, user: &str) -> Result<HashMap<Uuid, Project>> {
        self.wait_for(user, ResourceKind::Favorite).await?;
        Ok(snapshot(&self.inner.favorites, user))
    }

    pub async fn get_all_of(&self, user: &str) -> Result<HashMap<Uuid, Project>> {
        self.wait_for(user, ResourceKind::All).await?;
        Ok(snapshot(&self.inner.all, user))
    }

    /// Wait until (user, kind) is idle, re-raising the failure of the fetch
    /// that was running.
    async fn wait_for(&self, user: &str, kind: ResourceKind) -> Result<()> {
        let receiver = {
            let in_flight = self.inner.in_flight.lock().expect("in-flight lock poisoned");
            in_flight.get(&FetchKey::new(user, kind)).cloned()
        };
        let Some(mut receiver) = receiver else {
            return Ok(());
        };

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).clone(),
            Err(_) => None,
        };
        match outcome {
            Some(Ok(())) => Ok(()),
            Some(Err(source)) => Err(Error::Fetch {
                key: user.to_string(),
                kind,
                source,
            }),
            None => Err(Error::FetchAborted {
                key: user.to_string(),
                kind,
            }),
        }
    }
}

impl Inner {
    async fn fetch_and_publish(&self, key: &FetchKey, catalog: &PriorityCatalog) -> Result<()> {
        let request =
            self.client
                .build_request::<Value>(&key.user, HttpMethod::Get, key.kind.path_segments(), None)?;
        let response = self.client.execute(&request).await?;

        let published = match key.kind {
            ResourceKind::Core => publish(
                &self.cores,
                &key.user,
                decode::decode_core_projects(&response.body, catalog)?,
            ),
            ResourceKind::Favorite => publish(
                &self.favorites,
                &key.user,
                decode::decode_projects(&response.body, catalog)?,
            ),
            ResourceKind::All => publish(
                &self.all,
                &key.user,
                decode::decode_projects(&response.body, catalog)?,
            ),
        };
        tracing::debug!(user = %key.user, kind = %key.kind, published, "Published fetch result");
        Ok(())
    }
}

/// Replace `user`'s cache entry with `items`, indexed by id.
fn publish<E: Identified>(cache: &Cache<E>, user: &str, items: Vec<E>) -> usize {
    let entry: HashMap<Uuid, E> = items.into_iter().map(|item| (item.id(), item)).collect();
    let count = entry.len();
    cache
        .write()
        .expect("cache lock poisoned")
        .insert(user.to_string(), entry);
    count
}

fn snapshot<E: Clone>(cache: &Cache<E>, user: &str) -> HashMap<Uuid, E> {
    cache
        .read()
        .expect("cache lock poisoned")
        .get(user)
        .cloned()
        .unwrap_or_default()
}
