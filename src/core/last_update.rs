// Most recent package installation, parsed from `rpm -qa --last`

use std::io::{self, Write};

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone, Utc, Weekday};

use crate::core::exposition::MetricWriter;

pub const METRIC_LAST_UPDATE: &str = "dnf_last_update";
pub const METRIC_LAST_UPDATE_INFO: &str = "dnf_last_update_info";
pub const METRIC_LAST_UPDATE_ERROR: &str = "dnf_last_update_error";

/// Result of one install-history probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastUpdate {
    /// Unix epoch of the newest install, 0 when unknown
    pub epoch: i64,
    /// Date text taken from the history line; `None` when no line could be split
    pub time_text: Option<String>,
    pub error: bool,
}

impl LastUpdate {
    /// Record for a probe that produced nothing usable
    pub fn failed() -> Self {
        Self {
            epoch: 0,
            time_text: None,
            error: true,
        }
    }
}

/// Where a layout keeps its time zone
#[derive(Debug, Clone, Copy)]
enum ZoneField {
    /// No zone, the time is UTC
    Absent,
    /// Zone name at this token index (weekday already removed): an
    /// abbreviation such as `CET`, or a numeric `+04` / `-0330`
    Abbreviation(usize),
    /// Numeric `-0700` style offset, handled by chrono's `%z`
    Offset,
}

#[derive(Debug, Clone, Copy)]
struct Layout {
    format: &'static str,
    zone: ZoneField,
}

/// Known install-time layouts in priority order. All of them lead with a
/// weekday name, which is stripped before the rest is handed to chrono.
const LAYOUTS: &[Layout] = &[
    // Mon 02 Jan 2006 03:04:05 PM MST
    Layout {
        format: "%d %b %Y %I:%M:%S %p",
        zone: ZoneField::Abbreviation(5),
    },
    // Mon 2 Jan 2006 03:04:05 PM MST
    Layout {
        format: "%-d %b %Y %I:%M:%S %p",
        zone: ZoneField::Abbreviation(5),
    },
    // ANSI C: Mon Jan _2 15:04:05 2006
    Layout {
        format: "%b %e %H:%M:%S %Y",
        zone: ZoneField::Absent,
    },
    // Unix date: Mon Jan _2 15:04:05 MST 2006
    Layout {
        format: "%b %e %H:%M:%S %Y",
        zone: ZoneField::Abbreviation(3),
    },
    // Ruby date: Mon Jan 02 15:04:05 -0700 2006
    Layout {
        format: "%b %d %H:%M:%S %z %Y",
        zone: ZoneField::Offset,
    },
];

fn is_weekday(token: &str) -> bool {
    token.len() == 3 && token.parse::<Weekday>().is_ok()
}

fn is_zone_abbreviation(token: &str) -> bool {
    (3..=5).contains(&token.len()) && token.chars().all(|c| c.is_ascii_uppercase())
}

/// Numeric zone name as printed for zones without an abbreviation:
/// `+hh` or `+hhmm`
fn numeric_offset(token: &str) -> Option<FixedOffset> {
    let sign = match token.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits = &token[1..];
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let (hours, minutes): (i32, i32) = match digits.len() {
        2 => (digits.parse().ok()?, 0),
        4 => (digits[..2].parse().ok()?, digits[2..].parse().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Resolve a wall-clock time written in the zone `zone`.
///
/// Numeric zones are fixed offsets. rpm prints install times in the host
/// zone, so any abbreviation other than an explicit UTC/GMT marker is read
/// as local time.
fn resolve_zone(naive: NaiveDateTime, zone: &str) -> Option<i64> {
    if let Some(offset) = numeric_offset(zone) {
        return offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.timestamp());
    }
    if !is_zone_abbreviation(zone) {
        return None;
    }

    match zone {
        "UTC" | "GMT" => Some(Utc.from_utc_datetime(&naive).timestamp()),
        _ => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp()),
    }
}

fn parse_with_layout(tokens: &[&str], layout: &Layout) -> Option<i64> {
    let (weekday, rest) = tokens.split_first()?;
    if !is_weekday(weekday) {
        return None;
    }

    match layout.zone {
        ZoneField::Absent => {
            let naive = NaiveDateTime::parse_from_str(&rest.join(" "), layout.format).ok()?;
            Some(naive.and_utc().timestamp())
        }
        ZoneField::Abbreviation(index) => {
            let zone = *rest.get(index)?;
            let without_zone: Vec<&str> = rest
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, t)| *t)
                .collect();
            let naive = NaiveDateTime::parse_from_str(&without_zone.join(" "), layout.format).ok()?;
            resolve_zone(naive, zone)
        }
        ZoneField::Offset => DateTime::parse_from_str(&rest.join(" "), layout.format)
            .ok()
            .map(|dt| dt.timestamp()),
    }
}

/// Parse an install time, trying each known layout in order
pub fn parse_install_time(text: &str) -> Option<i64> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    LAYOUTS
        .iter()
        .find_map(|layout| parse_with_layout(&tokens, layout))
}

/// Turn `rpm -qa --last` output into a [`LastUpdate`].
///
/// Only the first (newest) line matters. Everything after the package token
/// is date text; when it does not parse as a whole, leading tokens are dropped
/// one at a time until a layout matches.
pub fn parse_history(output: &str) -> LastUpdate {
    let line = match output.lines().next() {
        Some(line) => line,
        None => return LastUpdate::failed(),
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return LastUpdate::failed();
    }

    for start in 1..tokens.len() {
        let candidate = tokens[start..].join(" ");
        if let Some(epoch) = parse_install_time(&candidate) {
            return LastUpdate {
                epoch,
                error: epoch == 0,
                time_text: Some(candidate),
            };
        }
    }

    LastUpdate {
        epoch: 0,
        time_text: Some(tokens[1..].join(" ")),
        error: true,
    }
}

pub fn render<W: Write>(record: &LastUpdate, writer: &mut MetricWriter<W>) -> io::Result<()> {
    writer.gauge(METRIC_LAST_UPDATE, &[], record.epoch)?;

    if let Some(time) = &record.time_text {
        writer.gauge(METRIC_LAST_UPDATE_INFO, &[("time", time.as_str())], 1)?;
    }

    writer.gauge(METRIC_LAST_UPDATE_ERROR, &[], u8::from(record.error))?;
    writer.trailer()
}
