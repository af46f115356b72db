use entity::types::Format;
use maplist_lib::{Database, constants::ConstantsCache, scoring};

#[derive(clap::Args)]
pub struct UserCommand {
    /// The ID of the player.
    player_id: i64,

    /// The formats to sum the medals over. Defaults to every format.
    #[arg(long = "format", short = 'f')]
    formats: Vec<Format>,
}

#[derive(clap::Args)]
pub struct LccCommand {
    /// The code of the map.
    map_code: String,
    format: Format,
}

pub async fn user(db: Database, cache: &ConstantsCache, cmd: UserCommand) -> anyhow::Result<()> {
    let formats = if cmd.formats.is_empty() {
        Format::ALL.to_vec()
    } else {
        cmd.formats
    };

    let totals =
        scoring::compute_user_totals(&db.sql_conn, Some(cache), cmd.player_id, &formats).await?;

    let mut table = prettytable::Table::init(vec![prettytable::row![
        "Format", "Points", "Wins", "Black border", "No optimal hero", "LCCs"
    ]]);
    for t in &totals.per_format {
        table.add_row(prettytable::row![
            t.format,
            t.points,
            t.medals.wins,
            t.medals.black_border,
            t.medals.no_optimal_hero,
            t.medals.lccs
        ]);
    }
    table.add_row(prettytable::row![
        "(union)",
        "",
        totals.medals.wins,
        totals.medals.black_border,
        totals.medals.no_optimal_hero,
        totals.medals.lccs
    ]);

    println!("Player {}", totals.player_id);
    println!("{table}");

    Ok(())
}

pub async fn lcc(db: Database, cmd: LccCommand) -> anyhow::Result<()> {
    match scoring::current_lcc(&db.sql_conn, &cmd.map_code, cmd.format).await? {
        Some(id) => println!("{id}"),
        None => println!("No least-cost completion for {} in {}", cmd.map_code, cmd.format),
    }
    Ok(())
}
