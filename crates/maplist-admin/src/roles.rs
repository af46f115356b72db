use itertools::Itertools as _;
use maplist_lib::{
    Database,
    achievements::{self, RoleAction, RoleFeed},
    constants::ConstantsCache,
    error::ErrorKind,
};

use crate::leaderboard::player_names;

#[derive(clap::Subcommand)]
pub enum RolesCommand {
    /// Prints the role updates not yet committed.
    Pending,
    /// Computes the role updates and commits them as the new snapshot.
    Commit,
}

async fn print_feed(db: &Database, feed: &RoleFeed) -> anyhow::Result<()> {
    let names = player_names(&db.sql_conn, feed.events.iter().map(|e| e.player_id)).await?;

    let mut table = prettytable::Table::init(vec![prettytable::row![
        "Player", "Name", "Action", "Format", "Metric", "Threshold", "Badges"
    ]]);
    for event in &feed.events {
        table.add_row(prettytable::row![
            event.player_id,
            names.get(&event.player_id).map(String::as_str).unwrap_or("?"),
            match event.action {
                RoleAction::Grant => "grant",
                RoleAction::Revoke => "revoke",
            },
            event.key.format,
            event.key.metric,
            event.key.threshold,
            event
                .badges
                .iter()
                .map(|b| format!("{}/{}", b.guild_id, b.badge_id))
                .join(", ")
        ]);
    }

    println!(
        "{} update(s) against snapshot version {}",
        feed.events.len(),
        feed.snapshot_version
    );
    println!("{table}");

    Ok(())
}

pub async fn roles(db: Database, cache: &ConstantsCache, cmd: RolesCommand) -> anyhow::Result<()> {
    let feed = achievements::pending_updates(&db.sql_conn, Some(cache)).await?;
    print_feed(&db, &feed).await?;

    if let RolesCommand::Commit = cmd {
        match achievements::commit_snapshot(&db.sql_conn, &feed).await {
            Ok(version) => println!("Committed snapshot version {version}"),
            Err(e) if e.kind() == ErrorKind::Conflict => {
                anyhow::bail!("another snapshot was committed in the meantime, run it again")
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
