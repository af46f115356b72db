use std::time::Duration;

use once_cell::sync::OnceCell;

#[cfg(debug_assertions)]
mkenv::make_config! {
    /// The environment used to set up a connection to the database.
    pub struct DbUrlEnv {
        /// The database URL.
        pub db_url: {
            var_name: "DATABASE_URL",
            description: "The URL to the Maplist database",
        }
    }
}
#[cfg(not(debug_assertions))]
mkenv::make_config! {
    /// The environment used to set up a connection to the database.
    pub struct DbUrlEnv {
        /// The path to the file containing the database URL.
        pub db_url: {
            var_name: "DATABASE_URL",
            layers: [
                file_read(),
            ],
            description: "The path to the file containing the URL to the Maplist database",
        }
    }
}

mkenv::make_config! {
    /// The environment used by this crate.
    pub struct LibEnv {
        /// How long a read of the tuning constants is reused by the scoring entry points.
        pub constants_cache_ttl: {
            var_name: "MAPLIST_CONSTANTS_CACHE_TTL",
            layers: [
                parsed<Duration>(|input| {
                    input.parse().map(Duration::from_secs).map_err(From::from)
                }),
                or_default_val(|| Duration::from_secs(30)),
            ],
            description: "The time-to-live of the memoized tuning constants, in seconds",
            default_val_fmt: "30s",
        },

        /// The amount of entries in a leaderboard page.
        pub leaderboard_page_size: {
            var_name: "MAPLIST_LEADERBOARD_PAGE_SIZE",
            layers: [
                parsed_from_str<u64>(),
                or_default_val(|| 50),
            ],
            description: "The amount of entries in a page of a leaderboard",
            default_val_fmt: "50",
        }
    }
}

static ENV: OnceCell<LibEnv> = OnceCell::new();

/// Initializes the provided library environment as global.
///
/// If this function has already been called, the provided environment will be ignored.
pub fn init_env(env: LibEnv) {
    let _ = ENV.set(env);
}

/// Returns a static reference to the global library environment, if it was initialized.
pub fn try_env() -> Option<&'static LibEnv> {
    ENV.get()
}

/// Returns the configured leaderboard page size, or its default if the environment
/// wasn't initialized.
pub fn leaderboard_page_size() -> u64 {
    use mkenv::prelude::*;
    try_env()
        .map(|env| env.leaderboard_page_size.get())
        .unwrap_or(crate::scoring::DEFAULT_PAGE_SIZE)
}

/// Returns the configured time-to-live of the memoized tuning constants, or its default if
/// the environment wasn't initialized.
pub fn constants_cache_ttl() -> Duration {
    use mkenv::prelude::*;
    try_env()
        .map(|env| env.constants_cache_ttl.get())
        .unwrap_or(crate::constants::DEFAULT_CACHE_TTL)
}
