//! Content stores grouped by owner kind.
//!
//! Use cases that work over any owner kind reach the right store through
//! [`ContentKind`], so one generic method serves feats, race traits, and
//! class features alike.

use std::sync::Arc;

use charforge_domain::{ClassFeatureOwner, FeatOwner, RaceTraitOwner, SelectionKind};

use crate::infrastructure::memory::InMemoryOwnerRepo;
use crate::infrastructure::ports::OwnerRepo;

#[derive(Clone)]
pub struct ContentRepos {
    pub feats: Arc<dyn OwnerRepo<FeatOwner>>,
    pub race_traits: Arc<dyn OwnerRepo<RaceTraitOwner>>,
    pub class_features: Arc<dyn OwnerRepo<ClassFeatureOwner>>,
}

impl ContentRepos {
    pub fn new(
        feats: Arc<dyn OwnerRepo<FeatOwner>>,
        race_traits: Arc<dyn OwnerRepo<RaceTraitOwner>>,
        class_features: Arc<dyn OwnerRepo<ClassFeatureOwner>>,
    ) -> Self {
        Self {
            feats,
            race_traits,
            class_features,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryOwnerRepo::new()),
            Arc::new(InMemoryOwnerRepo::new()),
            Arc::new(InMemoryOwnerRepo::new()),
        )
    }

    pub fn of<K: ContentKind>(&self) -> &Arc<dyn OwnerRepo<K>> {
        K::repo(self)
    }
}

/// Owner kinds with a store in [`ContentRepos`].
pub trait ContentKind: SelectionKind {
    fn repo(repos: &ContentRepos) -> &Arc<dyn OwnerRepo<Self>>;
}

impl ContentKind for FeatOwner {
    fn repo(repos: &ContentRepos) -> &Arc<dyn OwnerRepo<Self>> {
        &repos.feats
    }
}

impl ContentKind for RaceTraitOwner {
    fn repo(repos: &ContentRepos) -> &Arc<dyn OwnerRepo<Self>> {
        &repos.race_traits
    }
}

impl ContentKind for ClassFeatureOwner {
    fn repo(repos: &ContentRepos) -> &Arc<dyn OwnerRepo<Self>> {
        &repos.class_features
    }
}
