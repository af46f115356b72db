use clap::Parser;
use maplist_lib::{Database, DbUrlEnv, LibEnv, constants::ConstantsCache};
use mkenv::prelude::*;

use self::{leaderboard::LbCommand, roles::RolesCommand, user::UserCommand};

mod leaderboard;
mod roles;
mod user;

#[derive(clap::Parser)]
enum Command {
    /// Prints a page of a leaderboard.
    Leaderboard(LbCommand),
    /// Writes a full leaderboard to a CSV file.
    Export(leaderboard::ExportCommand),
    /// Prints the points and medals of a player.
    User(UserCommand),
    /// Prints the current least-cost completion of a map.
    Lcc(user::LccCommand),
    #[clap(subcommand)]
    Roles(RolesCommand),
}

mkenv::make_config! {
    struct Env {
        db_env: { DbUrlEnv },
        lib_env: { LibEnv },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match dotenvy::dotenv() {
        Err(err) if !err.not_found() => return Err(err.into()),
        _ => (),
    }
    tracing_subscriber::fmt()
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("unable to init tracing_subscriber: {e}"))?;
    let env = Env::define();
    env.init();
    maplist_lib::init_env(env.lib_env);

    let db = Database::from_db_url(env.db_env.db_url.get()).await?;
    let cache = ConstantsCache::from_env();

    let cmd = Command::parse();

    match cmd {
        Command::Leaderboard(cmd) => leaderboard::leaderboard(db, &cache, cmd).await,
        Command::Export(cmd) => leaderboard::export(db, &cache, cmd).await,
        Command::User(cmd) => user::user(db, &cache, cmd).await,
        Command::Lcc(cmd) => user::lcc(db, cmd).await,
        Command::Roles(cmd) => roles::roles(db, &cache, cmd).await,
    }
}
