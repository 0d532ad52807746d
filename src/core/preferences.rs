//! Preference set - named boolean flags with fixed defaults.
//!
//! Only flags a user has explicitly changed are stored. Everything else resolves to
//! [`PreferenceKey::default_value`], never to an error. Flags only decide whether a user
//! may be *targeted*; they never block the user's own actions.

use crate::{
    entities::{Preference, preference},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Every known preference flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PreferenceKey {
    AllowAttacks,
    AllowRobberies,
    AllowPetAttacks,
    BodyguardProtection,
    PetDefense,
    AutoBailFriends,
    CrimeNotifications,
    ArrestNotifications,
    BailNotifications,
    BusinessNotifications,
    ShowInLeaderboards,
    AllowFriendRequests,
    PublicBusinessInfo,
    AllowDrugDeals,
    AllowBusinessPartnerships,
    ReceiveCrimeInvites,
    AutoCollectIncome,
    SmartBodyguardMode,
    PetAutoFeed,
    CrimeRiskWarnings,
}

impl PreferenceKey {
    /// Every flag in display order.
    pub const ALL: [Self; 20] = [
        Self::AllowAttacks,
        Self::AllowRobberies,
        Self::AllowPetAttacks,
        Self::BodyguardProtection,
        Self::PetDefense,
        Self::AutoBailFriends,
        Self::CrimeNotifications,
        Self::ArrestNotifications,
        Self::BailNotifications,
        Self::BusinessNotifications,
        Self::ShowInLeaderboards,
        Self::AllowFriendRequests,
        Self::PublicBusinessInfo,
        Self::AllowDrugDeals,
        Self::AllowBusinessPartnerships,
        Self::ReceiveCrimeInvites,
        Self::AutoCollectIncome,
        Self::SmartBodyguardMode,
        Self::PetAutoFeed,
        Self::CrimeRiskWarnings,
    ];

    /// Storage key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllowAttacks => "allow_attacks",
            Self::AllowRobberies => "allow_robberies",
            Self::AllowPetAttacks => "allow_pet_attacks",
            Self::BodyguardProtection => "bodyguard_protection",
            Self::PetDefense => "pet_defense",
            Self::AutoBailFriends => "auto_bail_friends",
            Self::CrimeNotifications => "crime_notifications",
            Self::ArrestNotifications => "arrest_notifications",
            Self::BailNotifications => "bail_notifications",
            Self::BusinessNotifications => "business_notifications",
            Self::ShowInLeaderboards => "show_in_leaderboards",
            Self::AllowFriendRequests => "allow_friend_requests",
            Self::PublicBusinessInfo => "public_business_info",
            Self::AllowDrugDeals => "allow_drug_deals",
            Self::AllowBusinessPartnerships => "allow_business_partnerships",
            Self::ReceiveCrimeInvites => "receive_crime_invites",
            Self::AutoCollectIncome => "auto_collect_income",
            Self::SmartBodyguardMode => "smart_bodyguard_mode",
            Self::PetAutoFeed => "pet_auto_feed",
            Self::CrimeRiskWarnings => "crime_risk_warnings",
        }
    }

    /// Value used when the user never set the flag.
    #[must_use]
    pub const fn default_value(self) -> bool {
        !matches!(self, Self::AutoCollectIncome | Self::PetAutoFeed)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::not_found("preference", s))
    }
}

async fn find_row<C>(db: &C, user_id: &str, key: PreferenceKey) -> Result<Option<preference::Model>>
where
    C: ConnectionTrait,
{
    Preference::find()
        .filter(preference::Column::UserId.eq(user_id))
        .filter(preference::Column::Key.eq(key.as_str()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Resolves one flag, falling back to its default.
pub async fn get<C>(db: &C, user_id: &str, key: PreferenceKey) -> Result<bool>
where
    C: ConnectionTrait,
{
    Ok(find_row(db, user_id, key)
        .await?
        .map_or_else(|| key.default_value(), |row| row.enabled))
}

/// Resolves every flag for display.
pub async fn get_all<C>(db: &C, user_id: &str) -> Result<Vec<(PreferenceKey, bool)>>
where
    C: ConnectionTrait,
{
    let stored = Preference::find()
        .filter(preference::Column::UserId.eq(user_id))
        .all(db)
        .await?;

    Ok(PreferenceKey::ALL
        .into_iter()
        .map(|key| {
            let value = stored
                .iter()
                .find(|row| row.key == key.as_str())
                .map_or_else(|| key.default_value(), |row| row.enabled);
            (key, value)
        })
        .collect())
}

/// Sets a flag by its storage key. Unknown keys are `NotFound`.
pub async fn update<C>(db: &C, user_id: &str, key: &str, enabled: bool) -> Result<PreferenceKey>
where
    C: ConnectionTrait,
{
    let key: PreferenceKey = key.parse()?;
    match find_row(db, user_id, key).await? {
        Some(row) => {
            let mut active: preference::ActiveModel = row.into();
            active.enabled = Set(enabled);
            active.update(db).await?;
        }
        None => {
            preference::ActiveModel {
                user_id: Set(user_id.to_string()),
                key: Set(key.as_str().to_string()),
                enabled: Set(enabled),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }
    info!("{user_id} set {key} = {enabled}");
    Ok(key)
}

/// Whether `target_id` currently permits actions gated by `key`.
pub async fn can_target<C>(db: &C, target_id: &str, key: PreferenceKey) -> Result<bool>
where
    C: ConnectionTrait,
{
    get(db, target_id, key).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_defaults_without_rows() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get(&db, "u1", PreferenceKey::AllowAttacks).await?);
        assert!(get(&db, "u1", PreferenceKey::SmartBodyguardMode).await?);
        assert!(!get(&db, "u1", PreferenceKey::AutoCollectIncome).await?);
        assert!(!get(&db, "u1", PreferenceKey::PetAutoFeed).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_read_back() -> Result<()> {
        let db = setup_test_db().await?;
        let key = update(&db, "u1", "allow_attacks", false).await?;
        assert_eq!(key, PreferenceKey::AllowAttacks);
        assert!(!can_target(&db, "u1", PreferenceKey::AllowAttacks).await?);

        update(&db, "u1", "allow_attacks", true).await?;
        assert!(can_target(&db, "u1", PreferenceKey::AllowAttacks).await?);
        assert_eq!(Preference::find().all(&db).await?.len(), 1);

        // Other users keep defaults
        assert!(get(&db, "u2", PreferenceKey::AllowAttacks).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_key_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update(&db, "u1", "allow_everything", true).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { kind: "preference", .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_merges_stored_values() -> Result<()> {
        let db = setup_test_db().await?;
        update(&db, "u1", "pet_defense", false).await?;

        let all = get_all(&db, "u1").await?;
        assert_eq!(all.len(), PreferenceKey::ALL.len());
        assert!(all.contains(&(PreferenceKey::PetDefense, false)));
        assert!(all.contains(&(PreferenceKey::AllowRobberies, true)));
        Ok(())
    }

    #[test]
    fn test_keys_round_trip_through_str() {
        for key in PreferenceKey::ALL {
            assert_eq!(key.as_str().parse::<PreferenceKey>().unwrap(), key);
        }
    }
}
