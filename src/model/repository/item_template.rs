/// Handles the item template catalog.
use sqlx::PgConnection;

use crate::model::entity::ItemTemplate;
use crate::Result;

/// Creates a new item template. The ID of the given record is ignored; the generated one is returned.
pub async fn create(conn: &mut PgConnection, template: &ItemTemplate) -> Result<i32> {
    let (id,): (i32,) = sqlx::query_as(
        r#"INSERT INTO "item_templates" (
            name, true_name, lore_level, item_type, slot, icon, weight, encumbrance, dyeable,
            stackable, stack_size, usable, equipable, base_price, strength_requirement,
            constitution_requirement, intelligence_requirement, dexterity_requirement,
            skill_type_0, skill_requirement_0, skill_type_1, skill_requirement_1, skill_type_2,
            skill_requirement_2, skill_type_3, skill_requirement_3, skill_type_4,
            skill_requirement_4
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
            $19, $20, $21, $22, $23, $24, $25, $26, $27, $28
        )
        RETURNING "id""#,
    )
    .bind(&template.name)
    .bind(&template.true_name)
    .bind(&template.lore_level)
    .bind(&template.item_type)
    .bind(&template.slot)
    .bind(&template.icon)
    .bind(&template.weight)
    .bind(&template.encumbrance)
    .bind(&template.dyeable)
    .bind(&template.stackable)
    .bind(&template.stack_size)
    .bind(&template.usable)
    .bind(&template.equipable)
    .bind(&template.base_price)
    .bind(&template.strength_requirement)
    .bind(&template.constitution_requirement)
    .bind(&template.intelligence_requirement)
    .bind(&template.dexterity_requirement)
    .bind(&template.skill_type_0)
    .bind(&template.skill_requirement_0)
    .bind(&template.skill_type_1)
    .bind(&template.skill_requirement_1)
    .bind(&template.skill_type_2)
    .bind(&template.skill_requirement_2)
    .bind(&template.skill_type_3)
    .bind(&template.skill_requirement_3)
    .bind(&template.skill_type_4)
    .bind(&template.skill_requirement_4)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Loads all item templates.
pub async fn list(conn: &mut PgConnection) -> Result<Vec<ItemTemplate>> {
    Ok(
        sqlx::query_as::<_, ItemTemplate>(r#"SELECT * FROM "item_templates""#)
            .fetch_all(conn)
            .await?,
    )
}
