//! Character choice use cases.
//!
//! Each call loads the character and the relevant content snapshot, applies
//! one choice to the character's ledger, and saves the character. Content is
//! never modified here.

use std::sync::Arc;

use charforge_domain::{
    CharacterId, CharacterLevel, CharacterSelections, ChoiceError, ClassFeatureOwner, DomainError,
    FeatOwner, OptionState, OwningEntity, RaceTraitOwner,
};

use crate::infrastructure::ports::{CharacterRepo, ClockPort, RepoError};
use crate::repositories::{ContentKind, ContentRepos};

#[derive(Debug, thiserror::Error)]
pub enum ChoiceUseCaseError {
    #[error("Character not found: {0}")]
    CharacterNotFound(CharacterId),
    #[error("{kind} not found: {id}")]
    EntityNotFound { kind: &'static str, id: String },
    #[error("Choice rejected: {0}")]
    Choice(#[from] ChoiceError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

pub struct ChoiceUseCases {
    content: ContentRepos,
    characters: Arc<dyn CharacterRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ChoiceUseCases {
    pub fn new(
        content: ContentRepos,
        characters: Arc<dyn CharacterRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            content,
            characters,
            clock,
        }
    }

    async fn character(&self, id: CharacterId) -> Result<CharacterSelections, ChoiceUseCaseError> {
        self.characters
            .get(id)
            .await?
            .ok_or(ChoiceUseCaseError::CharacterNotFound(id))
    }

    async fn entity<K: ContentKind>(
        &self,
        id: K::EntityId,
    ) -> Result<OwningEntity<K>, ChoiceUseCaseError> {
        self.content
            .of::<K>()
            .get(id)
            .await?
            .ok_or_else(|| ChoiceUseCaseError::EntityNotFound {
                kind: K::ENTITY_LABEL,
                id: id.to_string(),
            })
    }

    pub async fn create_character(
        &self,
        level: u8,
    ) -> Result<CharacterSelections, ChoiceUseCaseError> {
        let character =
            CharacterSelections::new(CharacterId::new(), CharacterLevel::new(level)?, self.clock.now());
        self.characters.save(&character).await?;
        tracing::info!(character_id = %character.id(), level, "Created character");
        Ok(character)
    }

    pub async fn get_character(
        &self,
        id: CharacterId,
    ) -> Result<CharacterSelections, ChoiceUseCaseError> {
        self.character(id).await
    }

    /// Choose an entity and take any options it grants automatically.
    ///
    /// Choosing an entity that replaces another supersedes the replaced one.
    /// Returns the options granted.
    pub async fn choose_entity<K: ContentKind>(
        &self,
        character_id: CharacterId,
        entity_id: K::EntityId,
    ) -> Result<Vec<K::OptionId>, ChoiceUseCaseError> {
        let mut character = self.character(character_id).await?;
        let entity = self.entity::<K>(entity_id).await?;
        let now = self.clock.now();

        if let Err(e) = character.choose_entity(&entity, now) {
            tracing::warn!(
                character_id = %character_id,
                entity_id = %entity_id,
                error = %e,
                "Entity choice rejected"
            );
            return Err(e.into());
        }
        let granted = character.grant_automatic(&entity, now)?;
        self.characters.save(&character).await?;

        tracing::info!(
            character_id = %character_id,
            kind = K::ENTITY_LABEL,
            entity_id = %entity_id,
            supersedes = ?entity.replaces_id(),
            granted = granted.len(),
            "Entity chosen"
        );
        Ok(granted)
    }

    /// Choose one option, then take any automatic options it unlocks.
    pub async fn choose_option<K: ContentKind>(
        &self,
        character_id: CharacterId,
        entity_id: K::EntityId,
        option_id: K::OptionId,
    ) -> Result<Vec<K::OptionId>, ChoiceUseCaseError> {
        let mut character = self.character(character_id).await?;
        let entity = self.entity::<K>(entity_id).await?;
        let now = self.clock.now();

        if let Err(e) = character.choose_option(&entity, option_id, now) {
            tracing::warn!(
                character_id = %character_id,
                option_id = %option_id,
                error = %e,
                "Option choice rejected"
            );
            return Err(e.into());
        }
        let granted = character.grant_automatic(&entity, now)?;
        self.characters.save(&character).await?;

        tracing::info!(
            character_id = %character_id,
            kind = K::OPTION_LABEL,
            option_id = %option_id,
            granted = granted.len(),
            "Option chosen"
        );
        Ok(granted)
    }

    pub async fn option_states<K: ContentKind>(
        &self,
        character_id: CharacterId,
        entity_id: K::EntityId,
    ) -> Result<Vec<(K::OptionId, OptionState<K>)>, ChoiceUseCaseError> {
        let character = self.character(character_id).await?;
        let entity = self.entity::<K>(entity_id).await?;
        Ok(character.option_states(&entity)?)
    }

    /// Take automatic options that have become available, e.g. after a level up.
    pub async fn grant_automatic<K: ContentKind>(
        &self,
        character_id: CharacterId,
        entity_id: K::EntityId,
    ) -> Result<Vec<K::OptionId>, ChoiceUseCaseError> {
        let mut character = self.character(character_id).await?;
        let entity = self.entity::<K>(entity_id).await?;
        let granted = character.grant_automatic(&entity, self.clock.now())?;
        if !granted.is_empty() {
            self.characters.save(&character).await?;
            tracing::debug!(
                character_id = %character_id,
                entity_id = %entity_id,
                granted = granted.len(),
                "Granted automatic options"
            );
        }
        Ok(granted)
    }

    /// Raise the character's level, then grant automatic options the new
    /// level unlocks across every active entity.
    pub async fn level_up(
        &self,
        character_id: CharacterId,
        new_level: u8,
    ) -> Result<CharacterSelections, ChoiceUseCaseError> {
        let mut character = self.character(character_id).await?;
        let now = self.clock.now();
        character.level_up(CharacterLevel::new(new_level)?, now)?;

        let granted = self.regrant::<FeatOwner>(&mut character).await?
            + self.regrant::<RaceTraitOwner>(&mut character).await?
            + self.regrant::<ClassFeatureOwner>(&mut character).await?;

        self.characters.save(&character).await?;
        tracing::info!(
            character_id = %character_id,
            level = new_level,
            granted,
            "Character leveled up"
        );
        Ok(character)
    }

    async fn regrant<K: ContentKind>(
        &self,
        character: &mut CharacterSelections,
    ) -> Result<usize, ChoiceUseCaseError> {
        let mut granted = 0;
        for entity_id in character.ledger::<K>().active_entities() {
            // Deleted content no longer grants anything
            let Some(entity) = self.content.of::<K>().get(entity_id).await? else {
                continue;
            };
            granted += character.grant_automatic(&entity, self.clock.now())?.len();
        }
        Ok(granted)
    }

    /// Stored choices of one kind that the current content no longer supports.
    pub async fn recheck<K: ContentKind>(
        &self,
        character_id: CharacterId,
    ) -> Result<Vec<ChoiceError>, ChoiceUseCaseError> {
        let character = self.character(character_id).await?;
        let ledger = character.ledger::<K>();

        let mut problems = Vec::new();
        for entity_id in ledger.active_entities() {
            match self.content.of::<K>().get(entity_id).await? {
                Some(entity) => problems.extend(ledger.recheck(&entity, character.level())),
                None => tracing::warn!(
                    character_id = %character_id,
                    entity_id = %entity_id,
                    "Chosen entity no longer exists"
                ),
            }
        }
        Ok(problems)
    }
}
