use std::{collections::HashMap, path::PathBuf};

use anyhow::Context as _;
use entity::{
    players,
    types::{Format, Metric},
};
use maplist_lib::{Database, constants::ConstantsCache, scoring};
use sea_orm::{ColumnTrait as _, ConnectionTrait, EntityTrait as _, QueryFilter as _};

#[derive(clap::Args)]
pub struct LbCommand {
    /// The format of the leaderboard: current, all-versions or expert.
    format: Format,

    /// The metric: points, lccs, no_optimal_hero or black_border.
    #[arg(default_value = "points")]
    metric: Metric,

    #[arg(long, short = 'p', default_value_t = 1)]
    page: u64,
}

#[derive(clap::Args)]
pub struct ExportCommand {
    format: Format,

    #[arg(default_value = "points")]
    metric: Metric,

    /// The output file.
    #[arg(long, short = 'o', default_value = "leaderboard.csv")]
    output: PathBuf,
}

#[derive(serde::Serialize)]
struct Row<'a> {
    placement: u32,
    player_id: i64,
    name: &'a str,
    score: f64,
}

/// Returns the names of the provided players.
pub async fn player_names<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i64>,
) -> anyhow::Result<HashMap<i64, String>> {
    let names = players::Entity::find()
        .filter(players::Column::Id.is_in(ids))
        .all(conn)
        .await
        .context("couldn't fetch player names")?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();
    Ok(names)
}

pub async fn leaderboard(db: Database, cache: &ConstantsCache, cmd: LbCommand) -> anyhow::Result<()> {
    let page =
        scoring::compute_leaderboard(&db.sql_conn, Some(cache), cmd.format, cmd.metric, cmd.page)
            .await?;
    let names = player_names(&db.sql_conn, page.entries.iter().map(|e| e.player_id)).await?;

    let mut table =
        prettytable::Table::init(vec![prettytable::row!["Rank", "Player", "Name", "Score"]]);

    for entry in &page.entries {
        table.add_row(prettytable::row![
            entry.placement,
            entry.player_id,
            names.get(&entry.player_id).map(String::as_str).unwrap_or("?"),
            entry.score
        ]);
    }

    println!(
        "Leaderboard {} / {}, page {} of {} ({} players)",
        page.format,
        page.metric,
        page.page,
        page.pages.max(1),
        page.total
    );
    println!("{table}");

    Ok(())
}

pub async fn export(db: Database, cache: &ConstantsCache, cmd: ExportCommand) -> anyhow::Result<()> {
    let entries =
        scoring::compute_full_leaderboard(&db.sql_conn, Some(cache), cmd.format, cmd.metric)
            .await?;
    let names = player_names(&db.sql_conn, entries.iter().map(|e| e.player_id)).await?;

    let mut writer = csv::Writer::from_path(&cmd.output)
        .with_context(|| format!("couldn't open {}", cmd.output.display()))?;

    for entry in &entries {
        writer
            .serialize(Row {
                placement: entry.placement,
                player_id: entry.player_id,
                name: names.get(&entry.player_id).map(String::as_str).unwrap_or_default(),
                score: entry.score,
            })
            .context("couldn't write a row to the output file")?;
    }
    writer.flush()?;

    tracing::info!(
        rows = entries.len(),
        output = %cmd.output.display(),
        "exported leaderboard"
    );

    Ok(())
}
