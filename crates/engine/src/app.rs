//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    importers::BundleImporter,
    memory::InMemoryCharacterRepo,
    ports::{CharacterRepo, ClockPort},
};
use crate::repositories::ContentRepos;
use crate::use_cases::{
    AuthoringUseCases, ChoiceUseCases, ContentAudit, ContentAuthoring, ReplacementAuthoring,
};

/// Main application state.
///
/// Holds all repositories and use cases.
pub struct App {
    pub config: EngineConfig,
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for the stores.
pub struct Repositories {
    pub content: ContentRepos,
    pub characters: Arc<dyn CharacterRepo>,
}

/// Container for all use cases.
pub struct UseCases {
    pub authoring: AuthoringUseCases,
    pub choices: ChoiceUseCases,
    pub audit: ContentAudit,
    pub import: BundleImporter,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(
        config: EngineConfig,
        content: ContentRepos,
        characters: Arc<dyn CharacterRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        let authoring = AuthoringUseCases::new(
            ContentAuthoring::new(content.feats.clone(), &config),
            ContentAuthoring::new(content.race_traits.clone(), &config),
            ContentAuthoring::new(content.class_features.clone(), &config),
            ReplacementAuthoring::new(content.race_traits.clone()),
            ReplacementAuthoring::new(content.class_features.clone()),
        );
        let choices = ChoiceUseCases::new(content.clone(), characters.clone(), clock);
        let audit = ContentAudit::new(content.clone());
        let import = BundleImporter::new(content.clone());

        Self {
            config,
            repositories: Repositories {
                content,
                characters,
            },
            use_cases: UseCases {
                authoring,
                choices,
                audit,
                import,
            },
        }
    }

    /// App backed by in-memory stores and the system clock.
    pub fn in_memory(config: EngineConfig) -> Self {
        Self::new(
            config,
            ContentRepos::in_memory(),
            Arc::new(InMemoryCharacterRepo::new()),
            Arc::new(SystemClock::new()),
        )
    }
}
