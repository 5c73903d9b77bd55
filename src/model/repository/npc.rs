/// Handles the non player characters of the world.
use sqlx::PgConnection;

use crate::model::entity::Npc;
use crate::Result;

/// Creates a new NPC. The ID of the given record is ignored; the generated one is returned.
pub async fn create(conn: &mut PgConnection, npc: &Npc) -> Result<i32> {
    let (id,): (i32,) = sqlx::query_as(
        r#"INSERT INTO "npcs" (
            firstname, lastname, guild, race, gender, face, skin, profession, alive, level, hp,
            maxhp, bp, maxbp, mp, maxmp, ep, maxep, strength, constitution, intelligence,
            dexterity, head, chest, arms, hands, legs, feet, cloak, righthand, lefthand, zone,
            x, y, z, direction
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
            $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, $35,
            $36
        )
        RETURNING "id""#,
    )
    .bind(&npc.firstname)
    .bind(&npc.lastname)
    .bind(&npc.guild)
    .bind(&npc.race)
    .bind(&npc.gender)
    .bind(&npc.face)
    .bind(&npc.skin)
    .bind(&npc.profession)
    .bind(&npc.alive)
    .bind(&npc.level)
    .bind(&npc.hp)
    .bind(&npc.maxhp)
    .bind(&npc.bp)
    .bind(&npc.maxbp)
    .bind(&npc.mp)
    .bind(&npc.maxmp)
    .bind(&npc.ep)
    .bind(&npc.maxep)
    .bind(&npc.strength)
    .bind(&npc.constitution)
    .bind(&npc.intelligence)
    .bind(&npc.dexterity)
    .bind(&npc.head)
    .bind(&npc.chest)
    .bind(&npc.arms)
    .bind(&npc.hands)
    .bind(&npc.legs)
    .bind(&npc.feet)
    .bind(&npc.cloak)
    .bind(&npc.righthand)
    .bind(&npc.lefthand)
    .bind(&npc.zone)
    .bind(&npc.x)
    .bind(&npc.y)
    .bind(&npc.z)
    .bind(&npc.direction)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Loads all NPCs.
pub async fn list(conn: &mut PgConnection) -> Result<Vec<Npc>> {
    Ok(sqlx::query_as::<_, Npc>(r#"SELECT * FROM "npcs""#)
        .fetch_all(conn)
        .await?)
}

/// Writes the state of an NPC back to its row. Returns the number of affected rows.
pub async fn update(conn: &mut PgConnection, npc: &Npc) -> Result<u64> {
    let result = sqlx::query(
        r#"UPDATE "npcs" SET
            "firstname" = $1, "lastname" = $2, "guild" = $3, "race" = $4, "gender" = $5,
            "face" = $6, "skin" = $7, "profession" = $8, "alive" = $9, "level" = $10,
            "hp" = $11, "maxhp" = $12, "bp" = $13, "maxbp" = $14, "mp" = $15, "maxmp" = $16,
            "ep" = $17, "maxep" = $18, "strength" = $19, "constitution" = $20,
            "intelligence" = $21, "dexterity" = $22, "head" = $23, "chest" = $24, "arms" = $25,
            "hands" = $26, "legs" = $27, "feet" = $28, "cloak" = $29, "righthand" = $30,
            "lefthand" = $31, "zone" = $32, "x" = $33, "y" = $34, "z" = $35, "direction" = $36
            WHERE "id" = $37"#,
    )
    .bind(&npc.firstname)
    .bind(&npc.lastname)
    .bind(&npc.guild)
    .bind(&npc.race)
    .bind(&npc.gender)
    .bind(&npc.face)
    .bind(&npc.skin)
    .bind(&npc.profession)
    .bind(&npc.alive)
    .bind(&npc.level)
    .bind(&npc.hp)
    .bind(&npc.maxhp)
    .bind(&npc.bp)
    .bind(&npc.maxbp)
    .bind(&npc.mp)
    .bind(&npc.maxmp)
    .bind(&npc.ep)
    .bind(&npc.maxep)
    .bind(&npc.strength)
    .bind(&npc.constitution)
    .bind(&npc.intelligence)
    .bind(&npc.dexterity)
    .bind(&npc.head)
    .bind(&npc.chest)
    .bind(&npc.arms)
    .bind(&npc.hands)
    .bind(&npc.legs)
    .bind(&npc.feet)
    .bind(&npc.cloak)
    .bind(&npc.righthand)
    .bind(&npc.lefthand)
    .bind(&npc.zone)
    .bind(&npc.x)
    .bind(&npc.y)
    .bind(&npc.z)
    .bind(&npc.direction)
    .bind(&npc.id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
pub mod tests {
    use sqlx::PgPool;

    use super::*;
    use crate::model::tests::{db_test, default_npc};

    #[test]
    fn test_create_npc() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            let org_npc = default_npc("Brannoc");

            let id = create(&mut conn, &org_npc).await?;
            assert!(id > 0);

            let npcs = list(&mut conn).await?;
            assert_eq!(npcs.len(), 1);
            assert_eq!(npcs[0], Npc { id, ..org_npc });
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_list_npcs() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            assert!(list(&mut conn).await?.is_empty());

            for i in 1..=5i32 {
                create(&mut conn, &default_npc(&format!("Guard{}", i))).await?;
            }
            assert_eq!(list(&mut conn).await?.len(), 5);
            Ok(())
        }
        db_test(test)
    }

    #[test]
    fn test_update_npc() -> Result<()> {
        async fn test(pool: PgPool) -> Result<()> {
            let mut conn = pool.acquire().await?;
            let id = create(&mut conn, &default_npc("Brannoc")).await?;

            let mut npc = list(&mut conn).await?.remove(0);
            npc.hp = 3;
            npc.alive = false;
            npc.zone = "Graveyard".to_string();
            npc.x = 12.5;
            npc.direction = 90.0;
            assert_eq!(update(&mut conn, &npc).await?, 1);

            let db_npc = list(&mut conn).await?.remove(0);
            assert_eq!(db_npc.id, id);
            assert_eq!(db_npc, npc);

            let ghost = Npc { id: id + 100, ..npc };
            assert_eq!(update(&mut conn, &ghost).await?, 0);
            Ok(())
        }
        db_test(test)
    }
}
