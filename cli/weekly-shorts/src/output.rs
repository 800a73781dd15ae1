//! Table rendering for weekly leaderboards

use nadeo_api::WeeklySummary;
use std::collections::HashMap;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// One leaderboard row as printed
#[derive(Tabled)]
struct RecordLine {
    #[tabled(rename = "Pos")]
    position: u32,
    #[tabled(rename = "Player")]
    player: String,
    #[tabled(rename = "Time")]
    time: String,
}

/// Render the summary as text: a campaign heading, then one table per map.
pub fn render(summary: &WeeklySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("== {} ==\n", summary.campaign_name));
    for board in &summary.boards {
        out.push_str(&format!("\n--- {} ---\n", board.map_name));
        if board.rows.is_empty() {
            out.push_str("no records found\n");
            continue;
        }
        let lines: Vec<RecordLine> = board
            .rows
            .iter()
            .map(|row| RecordLine {
                position: row.position,
                player: display_name(&summary.member_names, &row.account_id),
                time: format_score(row.score),
            })
            .collect();
        out.push_str(&Table::new(lines).with(Style::modern()).to_string());
        out.push('\n');
    }
    out
}

/// Millisecond score as seconds, keeping millisecond precision.
fn format_score(millis: u64) -> String {
    format!("{:.3}s", millis as f64 / 1000.0)
}

/// Club member name for an account. Players who left the club since
/// setting their record fall back to a shortened account id.
fn display_name(members: &HashMap<String, String>, account_id: &str) -> String {
    match members.get(account_id) {
        Some(name) => name.clone(),
        None => format!("ID: {}", account_id.chars().take(8).collect::<String>()),
    }
}
