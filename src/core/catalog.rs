//! Static game tables: crime targets, routes, dealers, NPC friends and items.
//!
//! These are content, not state. Everything here is `'static` and looked up by id.

use crate::core::effects::Modifiers;

/// A robbable location with a flat payout range (banks and businesses).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobTarget {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Smallest possible take
    pub min_payout: i64,
    /// Largest possible take
    pub max_payout: i64,
    /// Base chance of getting caught
    pub risk: f64,
}

/// A heist target. Required items are consumed when the crew moves in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeistTarget {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Smallest possible take
    pub min_payout: i64,
    /// Largest possible take
    pub max_payout: i64,
    /// Base chance of getting caught
    pub risk: f64,
    /// Items consumed on every attempt
    pub required_items: &'static [&'static str],
}

/// A smuggling route. The investment is paid upfront and lost on failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmuggleRoute {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Upfront cost
    pub investment: i64,
    /// Smallest possible profit
    pub min_payout: i64,
    /// Largest possible profit
    pub max_payout: i64,
    /// Base chance of getting caught
    pub risk: f64,
    /// Items consumed on every attempt
    pub required_items: &'static [&'static str],
}

/// Optional cargo that raises both payout and risk on a smuggling run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contraband {
    /// Lookup key
    pub id: &'static str,
    /// Payout multiplier
    pub value_multiplier: f64,
    /// Added to the route's base risk
    pub risk_increase: f64,
}

/// A street dealer and the discount they give on each drug they carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dealer {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Chance of a police sting
    pub risk: f64,
    /// `(item_id, price_multiplier)` pairs
    pub stock: &'static [(&'static str, f64)],
}

impl Dealer {
    /// Price multiplier for an item, if the dealer sells it.
    #[must_use]
    pub fn discount_for(&self, item_id: &str) -> Option<f64> {
        self.stock
            .iter()
            .find(|(id, _)| *id == item_id)
            .map(|(_, multiplier)| *multiplier)
    }
}

/// An NPC who might pay a user's bail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NpcFriend {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Chance the friend agrees once eligible
    pub bail_chance: f64,
    /// Largest bail the friend will cover
    pub max_bail: i64,
    /// Friendship level needed before the friend will help
    pub friendship_required: i32,
}

/// A drug or drink. `duration_minutes` is `None` for instant consumables.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Consumable {
    /// Lookup key
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Street price before dealer discounts
    pub price: i64,
    /// Modifiers granted while active
    pub modifiers: Modifiers,
    /// How long the effect lasts
    pub duration_minutes: Option<i64>,
}

/// A weapon. Each attack burns one unit of its ammo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Weapon {
    /// Lookup key
    pub id: &'static str,
    /// Base damage per hit
    pub damage: i64,
    /// Ammo item id
    pub ammo: &'static str,
}

/// A piece of armor. All owned pieces stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmorPiece {
    /// Lookup key
    pub id: &'static str,
    /// Flat damage subtracted from each hit
    pub defense: i64,
}

/// Bodyguard tiers a user can hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyguardTier {
    /// Cheap muscle
    Basic,
    /// Experienced security professional
    Professional,
    /// Former special forces
    Elite,
}

impl BodyguardTier {
    /// Every tier, cheapest first.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Professional, Self::Elite];

    /// Protection added per guard of this tier.
    #[must_use]
    pub const fn protection(self) -> f64 {
        match self {
            Self::Basic => 0.2,
            Self::Professional => 0.4,
            Self::Elite => 0.6,
        }
    }

    /// One-off hiring cost.
    #[must_use]
    pub const fn hire_cost(self) -> i64 {
        match self {
            Self::Basic => 5_000,
            Self::Professional => 15_000,
            Self::Elite => 50_000,
        }
    }

    /// Lookup key.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Professional => "professional",
            Self::Elite => "elite",
        }
    }

    /// Parses a tier from its id.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.id() == id)
    }
}

/// Upper bound on combined bodyguard protection.
pub const MAX_BODYGUARD_PROTECTION: f64 = 0.8;

/// A legal job for the work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    /// What the user did
    pub description: &'static str,
    /// Lowest pay
    pub min_pay: i64,
    /// Highest pay
    pub max_pay: i64,
}

/// A pet species and its starting stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PetSpecies {
    /// Lookup key
    pub id: &'static str,
    /// Adoption price
    pub price: i64,
    /// Starting defense
    pub defense: i32,
    /// Starting speed
    pub speed: i32,
}

/// What aisle of the shop an item sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopCategory {
    /// One of each per user
    Weapon,
    /// Sold in bundles
    Ammo,
    /// Every owned piece adds defense
    Armor,
    /// Drinks
    Consumable,
    /// Heist and smuggling gear
    Tool,
}

/// Something the shop sells at a fixed price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    /// Inventory item id
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Aisle
    pub category: ShopCategory,
    /// Price of one unit (one bundle for ammo)
    pub price: i64,
    /// Items received per unit bought
    pub bundle: i32,
}

/// Banks for `rob_bank`.
pub static BANKS: &[RobTarget] = &[
    RobTarget {
        id: "local_credit_union",
        name: "Local Credit Union",
        min_payout: 5_000,
        max_payout: 15_000,
        risk: 0.15,
    },
    RobTarget {
        id: "community_bank",
        name: "Community Bank",
        min_payout: 12_000,
        max_payout: 30_000,
        risk: 0.25,
    },
    RobTarget {
        id: "national_bank",
        name: "National Bank",
        min_payout: 25_000,
        max_payout: 60_000,
        risk: 0.35,
    },
    RobTarget {
        id: "federal_reserve",
        name: "Federal Reserve",
        min_payout: 50_000,
        max_payout: 150_000,
        risk: 0.50,
    },
];

/// Businesses for `rob_business`.
pub static BUSINESSES: &[RobTarget] = &[
    RobTarget {
        id: "convenience_store",
        name: "Convenience Store",
        min_payout: 500,
        max_payout: 2_000,
        risk: 0.10,
    },
    RobTarget {
        id: "gas_station",
        name: "Gas Station",
        min_payout: 800,
        max_payout: 3_000,
        risk: 0.12,
    },
    RobTarget {
        id: "jewelry_store",
        name: "Jewelry Store",
        min_payout: 8_000,
        max_payout: 25_000,
        risk: 0.30,
    },
    RobTarget {
        id: "electronics_store",
        name: "Electronics Store",
        min_payout: 3_000,
        max_payout: 12_000,
        risk: 0.20,
    },
    RobTarget {
        id: "casino",
        name: "Casino",
        min_payout: 15_000,
        max_payout: 50_000,
        risk: 0.40,
    },
];

/// Heist targets.
pub static HEISTS: &[HeistTarget] = &[
    HeistTarget {
        id: "convenience_store",
        name: "Convenience Store",
        min_payout: 500,
        max_payout: 2_000,
        risk: 0.15,
        required_items: &[],
    },
    HeistTarget {
        id: "jewelry_store",
        name: "Jewelry Store",
        min_payout: 2_000,
        max_payout: 8_000,
        risk: 0.25,
        required_items: &["lockpicks"],
    },
    HeistTarget {
        id: "bank_vault",
        name: "Bank Vault",
        min_payout: 8_000,
        max_payout: 25_000,
        risk: 0.35,
        required_items: &["explosives", "hacking_device"],
    },
    HeistTarget {
        id: "casino_vault",
        name: "Casino Vault",
        min_payout: 15_000,
        max_payout: 50_000,
        risk: 0.45,
        required_items: &["keycard", "thermal_drill"],
    },
    HeistTarget {
        id: "armored_truck",
        name: "Armored Truck",
        min_payout: 5_000,
        max_payout: 20_000,
        risk: 0.30,
        required_items: &["explosives"],
    },
];

/// Smuggling routes.
pub static SMUGGLE_ROUTES: &[SmuggleRoute] = &[
    SmuggleRoute {
        id: "local_delivery",
        name: "Local Delivery",
        investment: 500,
        min_payout: 800,
        max_payout: 1_200,
        risk: 0.10,
        required_items: &[],
    },
    SmuggleRoute {
        id: "cross_state",
        name: "Cross-State Run",
        investment: 1_500,
        min_payout: 2_500,
        max_payout: 4_000,
        risk: 0.20,
        required_items: &["fake_id"],
    },
    SmuggleRoute {
        id: "international",
        name: "International Shipment",
        investment: 5_000,
        min_payout: 8_000,
        max_payout: 15_000,
        risk: 0.35,
        required_items: &["fake_passport", "bribe_money"],
    },
    SmuggleRoute {
        id: "air_drop",
        name: "Air Drop",
        investment: 3_000,
        min_payout: 5_000,
        max_payout: 8_000,
        risk: 0.25,
        required_items: &["pilot_license"],
    },
];

/// Contraband that can ride along on a smuggling run.
pub static CONTRABAND: &[Contraband] = &[
    Contraband {
        id: "drugs",
        value_multiplier: 1.5,
        risk_increase: 0.15,
    },
    Contraband {
        id: "weapons",
        value_multiplier: 2.0,
        risk_increase: 0.20,
    },
    Contraband {
        id: "artifacts",
        value_multiplier: 1.8,
        risk_increase: 0.10,
    },
    Contraband {
        id: "electronics",
        value_multiplier: 1.3,
        risk_increase: 0.08,
    },
];

/// Street dealers.
pub static DEALERS: &[Dealer] = &[
    Dealer {
        id: "sketchy_steve",
        name: "Sketchy Steve",
        risk: 0.20,
        stock: &[("weed", 0.8), ("cocaine", 0.9)],
    },
    Dealer {
        id: "big_mike",
        name: "Big Mike",
        risk: 0.15,
        stock: &[("weed", 0.7), ("cocaine", 0.8), ("lsd", 0.9)],
    },
    Dealer {
        id: "crazy_carla",
        name: "Crazy Carla",
        risk: 0.30,
        stock: &[("weed", 0.6), ("cocaine", 0.7), ("lsd", 0.8), ("heroin", 0.9)],
    },
    Dealer {
        id: "smooth_sam",
        name: "Smooth Sam",
        risk: 0.10,
        stock: &[("weed", 0.9), ("cocaine", 0.95), ("lsd", 0.95)],
    },
];

/// NPC friends who may post bail.
pub static NPC_FRIENDS: &[NpcFriend] = &[
    NpcFriend {
        id: "loyal_larry",
        name: "Loyal Larry",
        bail_chance: 0.8,
        max_bail: 10_000,
        friendship_required: 50,
    },
    NpcFriend {
        id: "rich_rachel",
        name: "Rich Rachel",
        bail_chance: 0.6,
        max_bail: 50_000,
        friendship_required: 75,
    },
    NpcFriend {
        id: "corrupt_cop_charlie",
        name: "Corrupt Cop Charlie",
        bail_chance: 0.9,
        max_bail: 25_000,
        friendship_required: 100,
    },
];

/// Drugs and drinks.
pub static CONSUMABLES: &[Consumable] = &[
    Consumable {
        id: "weed",
        name: "Weed",
        price: 800,
        modifiers: Modifiers {
            luck: 15.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(30),
    },
    Consumable {
        id: "cocaine",
        name: "Cocaine",
        price: 2_000,
        modifiers: Modifiers {
            speed: 25.0,
            cooldown_reduction: 50.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(20),
    },
    Consumable {
        id: "lsd",
        name: "LSD",
        price: 1_500,
        modifiers: Modifiers {
            xp_multiplier: 2.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(45),
    },
    Consumable {
        id: "heroin",
        name: "Heroin",
        price: 3_000,
        modifiers: Modifiers {
            damage_immunity: 50.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(25),
    },
    Consumable {
        id: "sleeping_pills",
        name: "Sleeping Pills",
        price: 500,
        modifiers: Modifiers {
            sleep_protection: true,
            ..Modifiers::NONE
        },
        duration_minutes: Some(60),
    },
    Consumable {
        id: "opioids",
        name: "Opioids",
        price: 1_200,
        modifiers: Modifiers {
            attack: 30.0,
            pain_immunity: true,
            ..Modifiers::NONE
        },
        duration_minutes: Some(15),
    },
    Consumable {
        id: "steroids",
        name: "Steroids",
        price: 2_500,
        modifiers: Modifiers {
            attack: 50.0,
            damage_immunity: 25.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(30),
    },
    Consumable {
        id: "adrenaline",
        name: "Adrenaline Shot",
        price: 1_800,
        modifiers: Modifiers {
            speed: 40.0,
            attack: 25.0,
            cooldown_reduction: 75.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(10),
    },
    Consumable {
        id: "whiskey",
        name: "Whiskey",
        price: 500,
        modifiers: Modifiers {
            attack: 20.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(60),
    },
    Consumable {
        id: "vodka",
        name: "Vodka",
        price: 600,
        modifiers: Modifiers {
            defense: 25.0,
            ..Modifiers::NONE
        },
        duration_minutes: Some(45),
    },
    // Instant: clears every cooldown instead of applying an effect
    Consumable {
        id: "beer",
        name: "Beer",
        price: 200,
        modifiers: Modifiers::NONE,
        duration_minutes: None,
    },
];

/// Weapons usable in `attack`.
pub static WEAPONS: &[Weapon] = &[
    Weapon {
        id: "pistol",
        damage: 25,
        ammo: "bullets",
    },
    Weapon {
        id: "rifle",
        damage: 45,
        ammo: "bullets",
    },
    Weapon {
        id: "crossbow",
        damage: 35,
        ammo: "arrows",
    },
    Weapon {
        id: "flamethrower",
        damage: 55,
        ammo: "fuel",
    },
    Weapon {
        id: "laser",
        damage: 65,
        ammo: "energy",
    },
    Weapon {
        id: "speaker",
        damage: 15,
        ammo: "sound",
    },
];

/// Armor pieces; every owned piece counts.
pub static ARMOR: &[ArmorPiece] = &[
    ArmorPiece {
        id: "armor",
        defense: 25,
    },
    ArmorPiece {
        id: "helmet",
        defense: 15,
    },
    ArmorPiece {
        id: "shield",
        defense: 35,
    },
];

/// Legal jobs for `work`.
pub static JOBS: &[Job] = &[
    Job {
        description: "delivered packages",
        min_pay: 50,
        max_pay: 150,
    },
    Job {
        description: "walked dogs",
        min_pay: 40,
        max_pay: 120,
    },
    Job {
        description: "cleaned houses",
        min_pay: 60,
        max_pay: 180,
    },
    Job {
        description: "worked at a café",
        min_pay: 45,
        max_pay: 135,
    },
    Job {
        description: "tutored students",
        min_pay: 70,
        max_pay: 200,
    },
    Job {
        description: "did freelance work",
        min_pay: 80,
        max_pay: 250,
    },
    Job {
        description: "worked construction",
        min_pay: 90,
        max_pay: 300,
    },
    Job {
        description: "programmed websites",
        min_pay: 100,
        max_pay: 350,
    },
    Job {
        description: "performed street magic",
        min_pay: 30,
        max_pay: 100,
    },
    Job {
        description: "sold lemonade",
        min_pay: 20,
        max_pay: 80,
    },
];

/// Adoptable pets.
pub static PET_SPECIES: &[PetSpecies] = &[
    PetSpecies {
        id: "cat",
        price: 5_000,
        defense: 10,
        speed: 20,
    },
    PetSpecies {
        id: "dog",
        price: 4_500,
        defense: 15,
        speed: 15,
    },
    PetSpecies {
        id: "bird",
        price: 3_000,
        defense: 8,
        speed: 25,
    },
    PetSpecies {
        id: "rabbit",
        price: 2_500,
        defense: 12,
        speed: 22,
    },
    PetSpecies {
        id: "dragon",
        price: 50_000,
        defense: 30,
        speed: 18,
    },
    PetSpecies {
        id: "wolf",
        price: 15_000,
        defense: 18,
        speed: 20,
    },
];

/// Everything the shop sells.
pub static SHOP: &[ShopItem] = &[
    ShopItem {
        id: "pistol",
        name: "Pistol",
        category: ShopCategory::Weapon,
        price: 2_500,
        bundle: 1,
    },
    ShopItem {
        id: "rifle",
        name: "Rifle",
        category: ShopCategory::Weapon,
        price: 8_000,
        bundle: 1,
    },
    ShopItem {
        id: "crossbow",
        name: "Crossbow",
        category: ShopCategory::Weapon,
        price: 4_500,
        bundle: 1,
    },
    ShopItem {
        id: "flamethrower",
        name: "Flamethrower",
        category: ShopCategory::Weapon,
        price: 15_000,
        bundle: 1,
    },
    ShopItem {
        id: "laser",
        name: "Laser Gun",
        category: ShopCategory::Weapon,
        price: 25_000,
        bundle: 1,
    },
    ShopItem {
        id: "speaker",
        name: "Sonic Speaker",
        category: ShopCategory::Weapon,
        price: 1_500,
        bundle: 1,
    },
    ShopItem {
        id: "bullets",
        name: "Bullets",
        category: ShopCategory::Ammo,
        price: 50,
        bundle: 25,
    },
    ShopItem {
        id: "arrows",
        name: "Arrows",
        category: ShopCategory::Ammo,
        price: 75,
        bundle: 20,
    },
    ShopItem {
        id: "fuel",
        name: "Fuel Canisters",
        category: ShopCategory::Ammo,
        price: 100,
        bundle: 10,
    },
    ShopItem {
        id: "energy",
        name: "Energy Cells",
        category: ShopCategory::Ammo,
        price: 150,
        bundle: 15,
    },
    ShopItem {
        id: "sound",
        name: "Sound Charges",
        category: ShopCategory::Ammo,
        price: 25,
        bundle: 30,
    },
    ShopItem {
        id: "armor",
        name: "Body Armor",
        category: ShopCategory::Armor,
        price: 5_000,
        bundle: 1,
    },
    ShopItem {
        id: "helmet",
        name: "Helmet",
        category: ShopCategory::Armor,
        price: 2_000,
        bundle: 1,
    },
    ShopItem {
        id: "shield",
        name: "Riot Shield",
        category: ShopCategory::Armor,
        price: 7_500,
        bundle: 1,
    },
    ShopItem {
        id: "beer",
        name: "Beer",
        category: ShopCategory::Consumable,
        price: 750,
        bundle: 1,
    },
    ShopItem {
        id: "lockpicks",
        name: "Lockpick Set",
        category: ShopCategory::Tool,
        price: 1_200,
        bundle: 1,
    },
    ShopItem {
        id: "explosives",
        name: "Explosives",
        category: ShopCategory::Tool,
        price: 4_000,
        bundle: 1,
    },
    ShopItem {
        id: "hacking_device",
        name: "Hacking Device",
        category: ShopCategory::Tool,
        price: 6_000,
        bundle: 1,
    },
    ShopItem {
        id: "keycard",
        name: "Stolen Keycard",
        category: ShopCategory::Tool,
        price: 5_000,
        bundle: 1,
    },
    ShopItem {
        id: "thermal_drill",
        name: "Thermal Drill",
        category: ShopCategory::Tool,
        price: 7_500,
        bundle: 1,
    },
    ShopItem {
        id: "fake_id",
        name: "Fake ID",
        category: ShopCategory::Tool,
        price: 3_000,
        bundle: 1,
    },
    ShopItem {
        id: "fake_passport",
        name: "Fake Passport",
        category: ShopCategory::Tool,
        price: 6_000,
        bundle: 1,
    },
    ShopItem {
        id: "bribe_money",
        name: "Bribe Money",
        category: ShopCategory::Tool,
        price: 2_500,
        bundle: 1,
    },
    ShopItem {
        id: "pilot_license",
        name: "Forged Pilot License",
        category: ShopCategory::Tool,
        price: 8_000,
        bundle: 1,
    },
];

fn find<T: Copy>(table: &'static [T], id: &str, key: impl Fn(&T) -> &'static str) -> Option<T> {
    table.iter().find(|entry| key(entry) == id).copied()
}

/// Looks up a bank by id.
#[must_use]
pub fn bank(id: &str) -> Option<RobTarget> {
    find(BANKS, id, |b| b.id)
}

/// Looks up a business by id.
#[must_use]
pub fn business(id: &str) -> Option<RobTarget> {
    find(BUSINESSES, id, |b| b.id)
}

/// Looks up a heist target by id.
#[must_use]
pub fn heist(id: &str) -> Option<HeistTarget> {
    find(HEISTS, id, |h| h.id)
}

/// Looks up a smuggling route by id.
#[must_use]
pub fn smuggle_route(id: &str) -> Option<SmuggleRoute> {
    find(SMUGGLE_ROUTES, id, |r| r.id)
}

/// Looks up contraband by id.
#[must_use]
pub fn contraband(id: &str) -> Option<Contraband> {
    find(CONTRABAND, id, |c| c.id)
}

/// Looks up a dealer by id.
#[must_use]
pub fn dealer(id: &str) -> Option<Dealer> {
    find(DEALERS, id, |d| d.id)
}

/// Looks up an NPC friend by id.
#[must_use]
pub fn npc_friend(id: &str) -> Option<NpcFriend> {
    find(NPC_FRIENDS, id, |f| f.id)
}

/// Looks up a consumable by id.
#[must_use]
pub fn consumable(id: &str) -> Option<Consumable> {
    find(CONSUMABLES, id, |c| c.id)
}

/// Looks up a weapon by id.
#[must_use]
pub fn weapon(id: &str) -> Option<Weapon> {
    find(WEAPONS, id, |w| w.id)
}

/// Looks up an armor piece by id.
#[must_use]
pub fn armor(id: &str) -> Option<ArmorPiece> {
    find(ARMOR, id, |a| a.id)
}

/// Looks up a pet species by id.
#[must_use]
pub fn pet_species(id: &str) -> Option<PetSpecies> {
    find(PET_SPECIES, id, |p| p.id)
}

/// Looks up a shop listing by item id.
#[must_use]
pub fn shop_item(id: &str) -> Option<ShopItem> {
    find(SHOP, id, |i| i.id)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_lookups() {
        assert_eq!(bank("federal_reserve").unwrap().max_payout, 150_000);
        assert_eq!(heist("bank_vault").unwrap().required_items.len(), 2);
        assert_eq!(smuggle_route("local_delivery").unwrap().investment, 500);
        assert_eq!(weapon("laser").unwrap().ammo, "energy");
        assert!(bank("moon_bank").is_none());
    }

    #[test]
    fn test_dealer_stock() {
        let carla = dealer("crazy_carla").unwrap();
        assert_eq!(carla.discount_for("weed"), Some(0.6));
        assert_eq!(carla.discount_for("heroin"), Some(0.9));
        assert_eq!(dealer("sketchy_steve").unwrap().discount_for("lsd"), None);
    }

    #[test]
    fn test_every_dealer_item_is_a_consumable() {
        for dealer in DEALERS {
            for (item, _) in dealer.stock {
                assert!(consumable(item).is_some(), "{} sells unknown {item}", dealer.id);
            }
        }
    }

    #[test]
    fn test_payout_ranges_are_ordered() {
        for target in BANKS.iter().chain(BUSINESSES) {
            assert!(target.min_payout <= target.max_payout, "{}", target.id);
        }
        for route in SMUGGLE_ROUTES {
            assert!(route.investment < route.min_payout, "{}", route.id);
        }
    }

    #[test]
    fn test_shop_stocks_every_required_item() {
        let required = HEISTS
            .iter()
            .flat_map(|h| h.required_items)
            .chain(SMUGGLE_ROUTES.iter().flat_map(|r| r.required_items));
        for item in required {
            assert!(shop_item(item).is_some(), "{item} cannot be bought");
        }
        for weapon in WEAPONS {
            assert_eq!(shop_item(weapon.id).unwrap().category, ShopCategory::Weapon);
            assert_eq!(shop_item(weapon.ammo).unwrap().category, ShopCategory::Ammo);
        }
        for piece in ARMOR {
            assert!(shop_item(piece.id).is_some(), "{} cannot be bought", piece.id);
        }
    }

    #[test]
    fn test_bodyguard_tiers() {
        assert_eq!(BodyguardTier::from_id("elite"), Some(BodyguardTier::Elite));
        assert_eq!(BodyguardTier::from_id("ninja"), None);
        assert_eq!(BodyguardTier::Professional.protection(), 0.4);
    }
}
