//! Cache invalidation policy
//!
//! One table maps every mutation to the cache entries it can make stale.
//! Plans list invalidations first, then direct writes, and are applied only
//! after the mutation completed successfully.

use crate::cache::{KeyPattern, QueryCache, QueryKey};

/// Completed write against the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Caller profile saved
    SaveProfile,
    /// Mod created
    CreateMod,
    /// Mod files replaced
    UpdateModFiles {
        /// Target mod
        mod_id: String,
    },
    /// Mod share link toggled
    SetModEnabled {
        /// Target mod
        mod_id: String,
        /// New state
        enabled: bool,
    },
    /// Story mode created
    CreateStoryMode,
    /// Story mode content replaced
    UpdateStoryMode {
        /// Target story
        story_mode_id: String,
    },
    /// Story mode visibility toggled
    SetStoryModeEnabled {
        /// Target story
        story_mode_id: String,
    },
    /// Character showcase created
    CreateShowcase,
    /// Character showcase content replaced
    UpdateShowcase {
        /// Target showcase
        showcase_id: String,
    },
}

/// One step of an invalidation plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheAction {
    /// Drop matching entries
    Invalidate(KeyPattern),
    /// Write a known enabled flag
    SetEnabled(QueryKey, bool),
}

/// Cache actions for a completed mutation
#[must_use]
pub fn invalidation_plan(mutation: &Mutation) -> Vec<CacheAction> {
    use CacheAction::{Invalidate, SetEnabled};

    match mutation {
        Mutation::SaveProfile => vec![Invalidate(KeyPattern::prefix(["currentUserProfile"]))],
        Mutation::CreateMod => vec![Invalidate(KeyPattern::prefix(["mods"]))],
        Mutation::UpdateModFiles { mod_id } => mod_family(mod_id),
        Mutation::SetModEnabled { mod_id, enabled } => {
            let mut plan = mod_family(mod_id);
            plan.push(SetEnabled(QueryKey::ModEnabled(mod_id.clone()), *enabled));
            plan
        }
        Mutation::CreateStoryMode => vec![Invalidate(KeyPattern::prefix(["storyModes"]))],
        Mutation::UpdateStoryMode { story_mode_id }
        | Mutation::SetStoryModeEnabled { story_mode_id } => vec![
            Invalidate(KeyPattern::prefix(["storyMode", story_mode_id.as_str()])),
            Invalidate(KeyPattern::prefix(["storyModes"])),
        ],
        Mutation::CreateShowcase => vec![Invalidate(KeyPattern::prefix(["characterShowcases"]))],
        Mutation::UpdateShowcase { showcase_id } => vec![
            Invalidate(KeyPattern::prefix(["characterShowcase", showcase_id.as_str()])),
            Invalidate(KeyPattern::prefix(["characterShowcases"])),
            Invalidate(KeyPattern::prefix(["characterShowcase", "unlisted"])),
        ],
    }
}

fn mod_family(mod_id: &str) -> Vec<CacheAction> {
    vec![
        CacheAction::Invalidate(KeyPattern::prefix(["mod", mod_id])),
        CacheAction::Invalidate(KeyPattern::prefix(["mods"])),
        CacheAction::Invalidate(KeyPattern::prefix(["mod", "unlisted"])),
    ]
}

/// Apply the plan of `mutation` to `cache`
pub async fn apply(cache: &QueryCache, mutation: &Mutation) {
    cache.advance_generation();
    for action in invalidation_plan(mutation) {
        match action {
            CacheAction::Invalidate(pattern) => {
                cache.invalidate(&pattern).await;
            }
            CacheAction::SetEnabled(key, enabled) => cache.insert(key, enabled).await,
        }
    }
}
