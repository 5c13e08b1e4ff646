//! Row and insert types for the ledger tables, with conversions into the
//! domain types the rest of the workspace speaks.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use tally_models::{Debt, GuildSetup, JournalEntry, NewGuildSetup, NewPlayer, Player};

/// Database row for the players table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::players)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PlayerRow {
    pub id: i32,
    pub discord_id: String,
    pub discord_name: String,
    pub guild_id: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Insertable struct for the players table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::players)]
pub struct NewPlayerRow {
    pub discord_id: String,
    pub discord_name: String,
    pub guild_id: String,
    pub name: String,
}

/// Database row for the debts table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::debts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DebtRow {
    pub id: i32,
    pub player_id: i32,
    pub amount: i64,
    pub last_updated: NaiveDateTime,
}

/// Insertable struct for the debts table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::debts)]
pub struct NewDebtRow {
    pub player_id: i32,
    pub amount: i64,
}

/// Database row for the debt_journal table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::debt_journal)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JournalEntryRow {
    pub id: i32,
    pub player_id: i32,
    pub amount: i64,
    pub description: String,
    pub recorded_at: NaiveDateTime,
}

/// Insertable struct for the debt_journal table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::debt_journal)]
pub struct NewJournalEntryRow {
    pub player_id: i32,
    pub amount: i64,
    pub description: String,
}

/// Database row for the guild_setups table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::guild_setups)]
#[diesel(primary_key(guild_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSetupRow {
    pub guild_id: String,
    pub channel_id: String,
    pub registration_message_id: String,
    pub board_message_id: String,
    pub created_at: NaiveDateTime,
}

/// Insertable struct for the guild_setups table.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::guild_setups)]
pub struct NewGuildSetupRow {
    pub guild_id: String,
    pub channel_id: String,
    pub registration_message_id: String,
    pub board_message_id: String,
}

impl From<PlayerRow> for Player {
    fn from(row: PlayerRow) -> Self {
        Player {
            id: row.id,
            discord_id: row.discord_id,
            discord_name: row.discord_name,
            guild_id: row.guild_id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

impl From<&NewPlayer> for NewPlayerRow {
    fn from(player: &NewPlayer) -> Self {
        NewPlayerRow {
            discord_id: player.discord_id.clone(),
            discord_name: player.discord_name.clone(),
            guild_id: player.guild_id.clone(),
            name: player.name.clone(),
        }
    }
}

impl From<DebtRow> for Debt {
    fn from(row: DebtRow) -> Self {
        Debt {
            id: row.id,
            player_id: row.player_id,
            amount: row.amount,
            last_updated: row.last_updated,
        }
    }
}

impl From<JournalEntryRow> for JournalEntry {
    fn from(row: JournalEntryRow) -> Self {
        JournalEntry {
            id: row.id,
            player_id: row.player_id,
            amount: row.amount,
            description: row.description,
            recorded_at: row.recorded_at,
        }
    }
}

impl From<GuildSetupRow> for GuildSetup {
    fn from(row: GuildSetupRow) -> Self {
        GuildSetup {
            guild_id: row.guild_id,
            channel_id: row.channel_id,
            registration_message_id: row.registration_message_id,
            board_message_id: row.board_message_id,
            created_at: row.created_at,
        }
    }
}

impl From<&NewGuildSetup> for NewGuildSetupRow {
    fn from(setup: &NewGuildSetup) -> Self {
        NewGuildSetupRow {
            guild_id: setup.guild_id.clone(),
            channel_id: setup.channel_id.clone(),
            registration_message_id: setup.registration_message_id.clone(),
            board_message_id: setup.board_message_id.clone(),
        }
    }
}
