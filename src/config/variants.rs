//! Built-in layout variants

use crate::extraction::{ColumnSpec, TableLayout};
use crate::target::{ScrapeTarget, TargetTemplate, TargetTiming};
use std::path::Path;
use std::sync::Arc;

/// Dunkest EuroLeague player stats table, one week per `{WEEK}`
pub const DUNKEST_WEEK_URL: &str = "https://www.dunkest.com/en/euroleague/stats/players/table/season/2024-2025?season_id=17&mode=dunkest&stats_type=tot&weeks[]={WEEK}&rounds[]=1&rounds[]=2&teams[]=31&teams[]=32&teams[]=33&teams[]=34&teams[]=35&teams[]=36&teams[]=37&teams[]=38&teams[]=39&teams[]=40&teams[]=41&teams[]=42&teams[]=43&teams[]=44&teams[]=45&teams[]=47&teams[]=48&teams[]=60&positions[]=1&positions[]=2&positions[]=3&player_search=&min_cr=4&max_cr=35&sort_by=pdk&sort_order=desc&iframe=yes&noadv=yes";

/// GiveMeStats domestic-league stats table
pub const GIVEMESTATS_URL: &str = "https://givemestats.com/euroleague-fantasy-domestic-stats/?sortby=minutes&index=all&minutes=all&stage=Regular%20season&period=na&euroleagueFantasyPrice=all";

/// Season directory used when none is given
pub const DEFAULT_SEASON: &str = "2024-2025";

/// Weeks available in the default season
pub const DEFAULT_WEEKS: &str = "1-43";

/// Names accepted by [`layout`]
pub const VARIANTS: &[&str] = &["dunkest", "givemestats"];

/// Dunkest: `#, Player, Pos, Team, FPT, CR, PLUS, GP, MIN, ST, PTS, ...`.
/// The rendered rank cell is not a `td`, so cell 0 is the player.
pub fn dunkest_layout() -> TableLayout {
    const STATS: &[(&str, &str)] = &[
        ("fantasy_points", "FPT"),
        ("credits", "CR"),
        ("plus", "PLUS"),
        ("games_played", "GP"),
        ("minutes", "MIN"),
        ("starter", "ST"),
        ("points", "PTS"),
        ("rebounds", "REB"),
        ("assists", "AST"),
        ("steals", "STL"),
        ("blocks", "BLK"),
        ("blocks_against", "BA"),
        ("field_goals_made", "FGM"),
        ("field_goals_attempted", "FGA"),
        ("field_goal_percentage", "FG%"),
        ("three_point_made", "3PM"),
        ("three_point_attempted", "3PA"),
        ("three_point_percentage", "3P%"),
        ("free_throws_made", "FTM"),
        ("free_throws_attempted", "FTA"),
        ("free_throw_percentage", "FT%"),
        ("offensive_rebounds", "OREB"),
        ("defensive_rebounds", "DREB"),
        ("turnovers", "TOV"),
        ("personal_fouls", "PF"),
        ("fouls_drawn", "FD"),
        ("plus_minus", "+/-"),
    ];

    let layout = TableLayout::new(
        "dunkest",
        "body > main > div.mt-4.table-stats__container > table",
        "player_name",
    )
    .secondary_locator(".table-stats__container table")
    .team_field("team")
    .expected_page_size(15)
    .column(ColumnSpec::rank("rank", "Rank"))
    .column(ColumnSpec::at("player_name", "Player Name", 0))
    .column(ColumnSpec::at("team", "Team", 2))
    .column(ColumnSpec::at("position", "Position", 1));

    STATS
        .iter()
        .enumerate()
        .fold(layout, |layout, (i, (field, title))| {
            layout.column(ColumnSpec::at(field, title, i + 3))
        })
}

/// GiveMeStats: columns found by header text
pub fn givemestats_layout() -> TableLayout {
    TableLayout::new("givemestats", "#filterableTable", "player")
        .cells("td, th")
        .header_keywords(&["player", "fantasy price"])
        .column(ColumnSpec::header("player", "Player", &["player"]))
        .column(ColumnSpec::header("fantasy_price", "Fantasy price", &["fantasy", "price"]))
}

/// Built-in layout by name
pub fn layout(name: &str) -> Option<TableLayout> {
    match name.to_ascii_lowercase().as_str() {
        "dunkest" => Some(dunkest_layout()),
        "givemestats" => Some(givemestats_layout()),
        _ => None,
    }
}

/// One Dunkest target per week, written to `<output_dir>/<season>/week_NN.csv`
pub fn dunkest_weeks(
    season: &str,
    weeks: &[u32],
    output_dir: &Path,
    timing: TargetTiming,
) -> crate::Result<Vec<ScrapeTarget>> {
    let output = output_dir.join(season).join("week_{WEEK:02}.csv");
    TargetTemplate {
        param: "WEEK".to_string(),
        label: "Week {WEEK}".to_string(),
        url: DUNKEST_WEEK_URL.to_string(),
        output: output.to_string_lossy().into_owned(),
        layout: Arc::new(dunkest_layout()),
        timing,
    }
    .expand(weeks)
}

/// The single GiveMeStats target
pub fn givemestats_target(output_dir: &Path, timing: TargetTiming) -> ScrapeTarget {
    ScrapeTarget::new(
        "GiveMeStats domestic stats",
        GIVEMESTATS_URL,
        Arc::new(givemestats_layout()),
        output_dir.join("givemestats_domestic_stats.csv"),
    )
    .with_timing(timing)
}
