/// Holds the logic to interact with the database. A `conn` can either be a ```sqlx::PgConnection```
/// or a ```sqlx::Transaction``` by using ```&mut *tx```.
pub mod account;
pub mod item_template;
pub mod npc;
pub mod player;
