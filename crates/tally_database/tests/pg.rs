//! Queries against a live PostgreSQL database.
//!
//! Ignored by default; point `DATABASE_URL` at a scratch database and run
//! `cargo test -p tally_database -- --ignored`.

use tally_database::{LedgerStore, PgLedgerStore, establish_connection, run_migrations};
use tally_error::{StoreError, StoreErrorKind, TallyResult};
use tally_models::{NewGuildSetup, NewPlayer};

fn connect() -> PgLedgerStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a scratch database");
    let mut conn = establish_connection(&url).expect("could not connect");
    run_migrations(&mut conn).expect("could not migrate");
    PgLedgerStore::new(conn)
}

#[tokio::test]
#[ignore] // Requires a PostgreSQL database
async fn players_debts_and_journal_round_trip() {
    let store = connect();
    let guild = format!("pg-ledger-{}", std::process::id());

    let (player, debt) = store
        .transaction({
            let guild = guild.clone();
            move |q| {
                let player = q.insert_player(&NewPlayer::new(
                    "user-1",
                    "torfstack",
                    guild.as_str(),
                    "Torfstack",
                ))?;
                let debt = q.insert_debt(player.id)?;
                Ok((player, debt))
            }
        })
        .await
        .unwrap();
    assert_eq!(debt.player_id, player.id);
    assert_eq!(debt.amount, 0);

    let pid = player.id;
    let locked = store
        .transaction(move |q| {
            let locked = q.debt_for_update(pid)?;
            q.set_debt_amount(pid, 42_000)?;
            q.insert_journal_entry(pid, 42_000, "raid loot")?;
            q.trim_journal(pid)?;
            Ok(locked)
        })
        .await
        .unwrap();
    assert_eq!(locked.unwrap().amount, 0);

    let (count, exists, roster) = store
        .read({
            let guild = guild.clone();
            move |q| {
                Ok((
                    q.player_count(guild.as_str())?,
                    q.player_exists("user-1", guild.as_str())?,
                    q.roster(guild.as_str())?,
                ))
            }
        })
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert!(exists);
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].name(), "Torfstack");
    assert_eq!(roster[0].amount(), 42_000);

    let window = store.read(move |q| Ok(q.journal_window(pid)?)).await.unwrap();
    assert_eq!(window.len(), 1);
    assert_eq!(window[0].amount, 42_000);
    assert_eq!(window[0].description, "raid loot");

    let rollback: TallyResult<()> = store
        .transaction(move |q| {
            q.set_debt_amount(pid, 0)?;
            Err(StoreError::new(StoreErrorKind::Query("forced failure".to_string())).into())
        })
        .await;
    assert!(rollback.is_err());
    let after = store.read(move |q| Ok(q.debt(pid)?)).await.unwrap();
    assert_eq!(after.unwrap().amount, 42_000);

    let removed = store
        .transaction({
            let guild = guild.clone();
            move |q| Ok(q.delete_player("user-1", guild.as_str())?)
        })
        .await
        .unwrap();
    assert_eq!(removed, 1);
}

#[tokio::test]
#[ignore] // Requires a PostgreSQL database
async fn setup_rows_upsert_and_delete() {
    let store = connect();
    let guild = format!("pg-setup-{}", std::process::id());

    let first = store
        .transaction({
            let guild = guild.clone();
            move |q| Ok(q.put_setup(&NewGuildSetup::new(guild, "chan-1", "reg-1", "board-1"))?)
        })
        .await
        .unwrap();
    assert_eq!(first.channel_id, "chan-1");

    let second = store
        .transaction({
            let guild = guild.clone();
            move |q| Ok(q.put_setup(&NewGuildSetup::new(guild, "chan-2", "reg-2", "board-2"))?)
        })
        .await
        .unwrap();
    assert_eq!(second.channel_id, "chan-2");
    assert_eq!(second.guild_id, first.guild_id);

    let stored = store
        .read({
            let guild = guild.clone();
            move |q| Ok(q.setup(guild.as_str())?)
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.board_message_id, "board-2");

    let all = store.read(move |q| Ok(q.all_setups()?)).await.unwrap();
    assert!(all.iter().any(|s| s.guild_id == stored.guild_id));

    let deleted = store
        .transaction({
            let guild = stored.guild_id.clone();
            move |q| Ok(q.delete_setup(guild.as_str())?)
        })
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let gone = store
        .read({
            let guild = stored.guild_id.clone();
            move |q| Ok(q.setup(guild.as_str())?)
        })
        .await
        .unwrap();
    assert!(gone.is_none());
}
