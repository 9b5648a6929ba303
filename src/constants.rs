pub mod leveling {

    /// Experience credited for a completion or episode-count increase.
    pub const EXP_PER_WATCH_EVENT: i32 = 100;
}

pub mod limits {

    pub const RECENT_HISTORY_LIMIT: u64 = 100;

    pub const DEFAULT_NOW_WATCHING_LIMIT: u64 = 10;

    pub const DEFAULT_GLOBAL_WATCHED_LIMIT: u64 = 10;

    pub const DEFAULT_REVIEWS_LIMIT: u64 = 20;

    pub const PUBLIC_NEWS_LIMIT: u64 = 5;
}

pub mod media {

    pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
}

pub mod analytics {

    /// Window for the daily signup chart, including today.
    pub const NEW_USERS_WINDOW_DAYS: i64 = 7;

    /// Window for the cumulative signup chart, including today.
    pub const CUMULATIVE_WINDOW_DAYS: i64 = 30;
}
