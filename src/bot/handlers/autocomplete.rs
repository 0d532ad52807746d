//! Autocomplete handlers for Discord slash command parameters.
//!
//! Most suggestions come straight from the static catalog. Only the inventory
//! handler touches the database, to suggest items the user actually holds.

use crate::{
    bot::Context,
    core::{
        catalog::{self, BodyguardTier},
        inventory,
        preferences::PreferenceKey,
    },
};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

/// Filters ids by a case-insensitive substring, capped at Discord's limit.
#[must_use]
pub fn matching<'a>(ids: impl IntoIterator<Item = &'a str>, partial: &str) -> Vec<String> {
    let partial_lower = partial.to_lowercase();
    ids.into_iter()
        .filter(|id| id.to_lowercase().contains(&partial_lower))
        .map(str::to_string)
        .take(MAX_SUGGESTIONS)
        .collect()
}

/// Suggests bank ids.
pub async fn autocomplete_bank(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::BANKS.iter().map(|b| b.id), partial)
}

/// Suggests business ids.
pub async fn autocomplete_business(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::BUSINESSES.iter().map(|b| b.id), partial)
}

/// Suggests heist target ids.
pub async fn autocomplete_heist(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::HEISTS.iter().map(|h| h.id), partial)
}

/// Suggests smuggling route ids.
pub async fn autocomplete_route(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::SMUGGLE_ROUTES.iter().map(|r| r.id), partial)
}

/// Suggests contraband ids.
pub async fn autocomplete_contraband(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::CONTRABAND.iter().map(|c| c.id), partial)
}

/// Suggests dealer ids.
pub async fn autocomplete_dealer(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::DEALERS.iter().map(|d| d.id), partial)
}

/// Suggests consumables any dealer sells.
pub async fn autocomplete_drug(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    let mut ids: Vec<&str> = catalog::DEALERS
        .iter()
        .flat_map(|d| d.stock.iter().map(|(id, _)| *id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    matching(ids, partial)
}

/// Suggests weapon ids.
pub async fn autocomplete_weapon(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::WEAPONS.iter().map(|w| w.id), partial)
}

/// Suggests shop listings.
pub async fn autocomplete_shop_item(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::SHOP.iter().map(|i| i.id), partial)
}

/// Suggests pet species.
pub async fn autocomplete_species(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(catalog::PET_SPECIES.iter().map(|p| p.id), partial)
}

/// Suggests bodyguard tiers.
pub async fn autocomplete_bodyguard(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(BodyguardTier::ALL.iter().map(|t| t.id()), partial)
}

/// Suggests preference keys.
pub async fn autocomplete_preference(_ctx: Context<'_>, partial: &str) -> Vec<String> {
    matching(PreferenceKey::ALL.iter().map(|k| k.as_str()), partial)
}

/// Suggests consumables the user currently holds.
pub async fn autocomplete_owned_consumable(ctx: Context<'_>, partial: &str) -> Vec<String> {
    let db = ctx.data().economy.db();
    let user_id = ctx.author().id.to_string();

    let Ok(items) = inventory::list_items(db, &user_id).await else {
        return Vec::new();
    };
    let owned: Vec<String> = items
        .into_iter()
        .filter(|item| catalog::consumable(&item.item_id).is_some())
        .map(|item| item.item_id)
        .collect();
    matching(owned.iter().map(String::as_str), partial)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_is_case_insensitive() {
        let ids = ["national_bank", "community_bank", "federal_reserve"];
        assert_eq!(matching(ids, "BANK"), vec!["national_bank", "community_bank"]);
        assert_eq!(matching(ids, "").len(), 3);
    }

    #[test]
    fn test_matching_caps_suggestions() {
        let ids: Vec<String> = (0..40).map(|i| format!("item_{i}")).collect();
        assert_eq!(matching(ids.iter().map(String::as_str), "item").len(), MAX_SUGGESTIONS);
    }
}
