/// Handles the player characters of an account.
use sqlx::PgConnection;

use crate::model::entity::Pc;
use crate::Result;

/// Creates a new player character. The ID of the given record is ignored; the generated one is returned.
pub async fn create(conn: &mut PgConnection, pc: &Pc) -> Result<i32> {
    let (id,): (i32,) = sqlx::query_as(
        r#"INSERT INTO "players" (
            account_id, firstname, lastname, guild, race, gender, face, skin, profession, alive,
            plevel, dp, hp, maxhp, bp, maxbp, mp, maxmp, ep, maxep, strength, constitution,
            intelligence, dexterity, axe, dagger, unarmed, hammer, polearm, spear, staff, sword,
            archery, crossbow, sling, thrown, armor, dualweapon, shield, bardic, conjuring,
            druidic, illusion, necromancy, sorcery, shamanic, spellcraft, summoning, focus,
            armorsmithing, tailoring, fletching, weaponsmithing, alchemy, lapidary, calligraphy,
            enchanting, herbalism, hunting, mining, bargaining, camping, firstaid, lore,
            picklocks, scouting, search, stealth, traps, aeolandis, hieroform, highgundis,
            oldpraxic, praxic, runic, head, chest, arms, hands, legs, feet, cloak, necklace,
            ringone, ringtwo, righthand, lefthand, zone, x, y, z, direction
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18,
            $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31, $32, $33, $34, $35,
            $36, $37, $38, $39, $40, $41, $42, $43, $44, $45, $46, $47, $48, $49, $50, $51, $52,
            $53, $54, $55, $56, $57, $58, $59, $60, $61, $62, $63, $64, $65, $66, $67, $68, $69,
            $70, $71, $72, $73, $74, $75, $76, $77, $78, $79, $80, $81, $82, $83, $84, $85, $86,
            $87, $88, $89, $90, $91, $92
        )
        RETURNING "id""#,
    )
    .bind(&pc.account_id)
    .bind(&pc.firstname)
    .bind(&pc.lastname)
    .bind(&pc.guild)
    .bind(&pc.race)
    .bind(&pc.gender)
    .bind(&pc.face)
    .bind(&pc.skin)
    .bind(&pc.profession)
    .bind(&pc.alive)
    .bind(&pc.plevel)
    .bind(&pc.dp)
    .bind(&pc.hp)
    .bind(&pc.maxhp)
    .bind(&pc.bp)
    .bind(&pc.maxbp)
    .bind(&pc.mp)
    .bind(&pc.maxmp)
    .bind(&pc.ep)
    .bind(&pc.maxep)
    .bind(&pc.strength)
    .bind(&pc.constitution)
    .bind(&pc.intelligence)
    .bind(&pc.dexterity)
    .bind(&pc.axe)
    .bind(&pc.dagger)
    .bind(&pc.unarmed)
    .bind(&pc.hammer)
    .bind(&pc.polearm)
    .bind(&pc.spear)
    .bind(&pc.staff)
    .bind(&pc.sword)
    .bind(&pc.archery)
    .bind(&pc.crossbow)
    .bind(&pc.sling)
    .bind(&pc.thrown)
    .bind(&pc.armor)
    .bind(&pc.dualweapon)
    .bind(&pc.shield)
    .bind(&pc.bardic)
    .bind(&pc.conjuring)
    .bind(&pc.druidic)
    .bind(&pc.illusion)
    .bind(&pc.necromancy)
    .bind(&pc.sorcery)
    .bind(&pc.shamanic)
    .bind(&pc.spellcraft)
    .bind(&pc.summoning)
    .bind(&pc.focus)
    .bind(&pc.armorsmithing)
    .bind(&pc.tailoring)
    .bind(&pc.fletching)
    .bind(&pc.weaponsmithing)
    .bind(&pc.alchemy)
    .bind(&pc.lapidary)
    .bind(&pc.calligraphy)
    .bind(&pc.enchanting)
    .bind(&pc.herbalism)
    .bind(&pc.hunting)
    .bind(&pc.mining)
    .bind(&pc.bargaining)
    .bind(&pc.camping)
    .bind(&pc.firstaid)
    .bind(&pc.lore)
    .bind(&pc.picklocks)
    .bind(&pc.scouting)
    .bind(&pc.search)
    .bind(&pc.stealth)
    .bind(&pc.traps)
    .bind(&pc.aeolandis)
    .bind(&pc.hieroform)
    .bind(&pc.highgundis)
    .bind(&pc.oldpraxic)
    .bind(&pc.praxic)
    .bind(&pc.runic)
    .bind(&pc.head)
    .bind(&pc.chest)
    .bind(&pc.arms)
    .bind(&pc.hands)
    .bind(&pc.legs)
    .bind(&pc.feet)
    .bind(&pc.cloak)
    .bind(&pc.necklace)
    .bind(&pc.ringone)
    .bind(&pc.ringtwo)
    .bind(&pc.righthand)
    .bind(&pc.lefthand)
    .bind(&pc.zone)
    .bind(&pc.x)
    .bind(&pc.y)
    .bind(&pc.z)
    .bind(&pc.direction)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Loads all player characters.
pub async fn list(conn: &mut PgConnection) -> Result<Vec<Pc>> {
    Ok(sqlx::query_as::<_, Pc>(r#"SELECT * FROM "players""#)
        .fetch_all(conn)
        .await?)
}

/// Checks if a player character with the given first name already exists.
pub async fn is_first_name_taken(conn: &mut PgConnection, firstname: &str) -> Result<bool> {
    let (found,): (bool,) =
        sqlx::query_as(r#"SELECT EXISTS(SELECT 1 FROM "players" WHERE "firstname" = $1)"#)
            .bind(firstname)
            .fetch_one(conn)
            .await?;
    Ok(found)
}

/// Get the player character count of an account.
pub async fn get_count_by_account_name(conn: &mut PgConnection, accountname: &str) -> Result<i64> {
    let (count,): (i64,) = sqlx::query_as(
        r#"SELECT COUNT(1) FROM "players"
        INNER JOIN "accounts" ON "players"."account_id" = "accounts"."id"
        WHERE "accounts"."accountname" = $1"#,
    )
    .bind(accountname)
    .fetch_one(conn)
    .await?;
    Ok(count)
}
