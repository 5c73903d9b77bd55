/// Holds all database entities.
use chrono::{DateTime, Utc};

/// Account that holds the login information of a player.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Account {
    pub id: i32,
    pub accountname: String,
    pub email: String,
    pub valid: bool,
    pub banned: bool,
    pub gamesession: i32,
    pub playing: bool,
    pub verify: String,
    pub hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

/// Player character. Owned by exactly one account.
#[derive(Clone, Debug, Default, PartialEq, sqlx::FromRow)]
pub struct Pc {
    pub id: i32,
    pub account_id: i32,
    pub firstname: String,
    pub lastname: String,
    pub guild: String,
    pub race: String,
    pub gender: String,
    pub face: String,
    pub skin: String,
    pub profession: String,
    pub alive: bool,
    pub plevel: i32,
    pub dp: i32,
    pub hp: i32,
    pub maxhp: i32,
    pub bp: i32,
    pub maxbp: i32,
    pub mp: i32,
    pub maxmp: i32,
    pub ep: i32,
    pub maxep: i32,
    pub strength: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub dexterity: i32,
    pub axe: i32,
    pub dagger: i32,
    pub unarmed: i32,
    pub hammer: i32,
    pub polearm: i32,
    pub spear: i32,
    pub staff: i32,
    pub sword: i32,
    pub archery: i32,
    pub crossbow: i32,
    pub sling: i32,
    pub thrown: i32,
    pub armor: i32,
    pub dualweapon: i32,
    pub shield: i32,
    pub bardic: i32,
    pub conjuring: i32,
    pub druidic: i32,
    pub illusion: i32,
    pub necromancy: i32,
    pub sorcery: i32,
    pub shamanic: i32,
    pub spellcraft: i32,
    pub summoning: i32,
    pub focus: i32,
    pub armorsmithing: i32,
    pub tailoring: i32,
    pub fletching: i32,
    pub weaponsmithing: i32,
    pub alchemy: i32,
    pub lapidary: i32,
    pub calligraphy: i32,
    pub enchanting: i32,
    pub herbalism: i32,
    pub hunting: i32,
    pub mining: i32,
    pub bargaining: i32,
    pub camping: i32,
    pub firstaid: i32,
    pub lore: i32,
    pub picklocks: i32,
    pub scouting: i32,
    pub search: i32,
    pub stealth: i32,
    pub traps: i32,
    pub aeolandis: i32,
    pub hieroform: i32,
    pub highgundis: i32,
    pub oldpraxic: i32,
    pub praxic: i32,
    pub runic: i32,
    pub head: String,
    pub chest: String,
    pub arms: String,
    pub hands: String,
    pub legs: String,
    pub feet: String,
    pub cloak: String,
    pub necklace: String,
    pub ringone: String,
    pub ringtwo: String,
    pub righthand: String,
    pub lefthand: String,
    pub zone: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: f32,
}

/// Non player character of the world.
#[derive(Clone, Debug, Default, PartialEq, sqlx::FromRow)]
pub struct Npc {
    pub id: i32,
    pub firstname: String,
    pub lastname: String,
    pub guild: String,
    pub race: String,
    pub gender: String,
    pub face: String,
    pub skin: String,
    pub profession: String,
    pub alive: bool,
    pub level: i32,
    pub hp: i32,
    pub maxhp: i32,
    pub bp: i32,
    pub maxbp: i32,
    pub mp: i32,
    pub maxmp: i32,
    pub ep: i32,
    pub maxep: i32,
    pub strength: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub dexterity: i32,
    pub head: String,
    pub chest: String,
    pub arms: String,
    pub hands: String,
    pub legs: String,
    pub feet: String,
    pub cloak: String,
    pub righthand: String,
    pub lefthand: String,
    pub zone: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: f32,
}

/// Catalog entry every item instance is derived from.
#[derive(Clone, Debug, Default, PartialEq, sqlx::FromRow)]
pub struct ItemTemplate {
    pub id: i32,
    pub name: String,
    pub true_name: String,
    pub lore_level: i32,
    pub item_type: String,
    pub slot: String,
    pub icon: String,
    pub weight: f32,
    pub encumbrance: f32,
    pub dyeable: bool,
    pub stackable: bool,
    pub stack_size: i32,
    pub usable: bool,
    pub equipable: bool,
    pub base_price: i32,
    pub strength_requirement: i32,
    pub constitution_requirement: i32,
    pub intelligence_requirement: i32,
    pub dexterity_requirement: i32,
    pub skill_type_0: String,
    pub skill_requirement_0: i32,
    pub skill_type_1: String,
    pub skill_requirement_1: i32,
    pub skill_type_2: String,
    pub skill_requirement_2: i32,
    pub skill_type_3: String,
    pub skill_requirement_3: i32,
    pub skill_type_4: String,
    pub skill_requirement_4: i32,
}

impl ItemTemplate {
    /// Returns the (skill type, required level) pairs that are in use. Unused pairs have an empty skill type.
    pub fn skill_requirements(&self) -> Vec<(&str, i32)> {
        [
            (&self.skill_type_0, self.skill_requirement_0),
            (&self.skill_type_1, self.skill_requirement_1),
            (&self.skill_type_2, self.skill_requirement_2),
            (&self.skill_type_3, self.skill_requirement_3),
            (&self.skill_type_4, self.skill_requirement_4),
        ]
        .iter()
        .filter(|(skill, _)| !skill.is_empty())
        .map(|&(skill, level)| (skill.as_str(), level))
        .collect()
    }
}
