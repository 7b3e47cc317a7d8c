//! Console rendering: startup banner and the per-cycle status line.

use crate::profile::PlayerProfile;
use chrono::{DateTime, Local};
use core_logic::{CycleReport, StatsSnapshot};
use nu_ansi_term::{Color, Style};

/// `1234567` → `1,234,567`
pub fn format_number(num: u64) -> String {
    group_thousands(&num.to_string())
}

/// Balance with grouped integer part and at most two decimals,
/// trailing zeros dropped: `1234567.5` → `1,234,567.5`.
pub fn format_balance(balance: f64) -> String {
    let fixed = format!("{:.2}", balance.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let sign = if balance < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, group_thousands(int_part))
    } else {
        format!("{}{}.{}", sign, group_thousands(int_part), frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn boost_line(profile: &PlayerProfile) -> String {
    match &profile.active_boost {
        Some(boost) => {
            let until = DateTime::parse_from_rfc3339(&boost.active_to)
                .map(|ts| ts.with_timezone(&Local).format("%H:%M:%S").to_string())
                .unwrap_or_else(|_| boost.active_to.clone());
            format!("{}x until {}", boost.multiplier, until)
        }
        None => "None".to_string(),
    }
}

pub fn banner(profile: &PlayerProfile) -> String {
    let rule = Color::Green
        .bold()
        .paint("=============== SmashX Tapper Initialized ===============");
    let footer = Color::Green
        .bold()
        .paint("=========================================================");
    let monster = profile.monster();

    format!(
        "{}\n{} {} ({})\n{} {} SQC\n{} {}\n{} {} (random up to {})\n{} {}\n{}",
        rule,
        Color::Yellow.bold().paint("User Level:"),
        profile.player_level.level_name,
        profile.player_level.level_id,
        Color::Cyan.bold().paint("Current Balance:"),
        format_balance(profile.balance),
        Color::Magenta.bold().paint("Active Monster:"),
        monster.name,
        Color::Blue.bold().paint("Coin per tap:"),
        monster.coin_per_tap,
        monster.random_coin_per_tap,
        Color::Red.bold().paint("Boost:"),
        boost_line(profile),
        footer,
    )
}

pub fn status_line(snapshot: &StatsSnapshot) -> String {
    let field = |color: Color, label: &str, value: u64| {
        Style::new()
            .fg(color)
            .paint(format!("{}: {}", label, format_number(value)))
            .to_string()
    };

    [
        field(Color::Green, "Success", snapshot.success),
        field(Color::Red, "Failure", snapshot.failure),
        field(Color::Blue, "Success Retry", snapshot.retry_success),
        field(Color::Yellow, "Failure Retry", snapshot.retry_failure),
        field(Color::Cyan, "Earned", snapshot.total_coins_earned),
    ]
    .join(" | ")
}

pub fn cycle_line(report: &CycleReport, snapshot: &StatsSnapshot) -> String {
    format!(
        "[Cycle {}] launched {} | in flight {} | {}",
        format_number(report.cycle),
        report.launched,
        report.in_flight,
        status_line(snapshot)
    )
}
