// chrony time sources, parsed from `chronyc -n sources -v`

use std::io::{self, Write};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::exposition::{MetricWriter, Seconds};

pub const METRIC_UP: &str = "chrony_sources_up";
pub const METRIC_SELECTED: &str = "chrony_source_selected";
pub const METRIC_IN_USE: &str = "chrony_source_in_use";
pub const METRIC_REACHABLE: &str = "chrony_source_reachable";
pub const METRIC_REACH: &str = "chrony_source_reach";
pub const METRIC_LAST_RX: &str = "chrony_source_last_rx_seconds";
pub const METRIC_OFFSET: &str = "chrony_source_offset_seconds";
pub const METRIC_JITTER: &str = "chrony_source_jitter_seconds";

/// Help text for each per-source family, in output order
const SOURCE_METRICS: &[(&str, &str)] = &[
    (METRIC_SELECTED, "1 if this source is selected (*), else 0"),
    (METRIC_IN_USE, "1 if this source is being combined/used (+), else 0"),
    (METRIC_REACHABLE, "1 if reachable (reach>0), else 0"),
    (METRIC_REACH, "Reach register value"),
    (METRIC_LAST_RX, "Seconds since last sample"),
    (METRIC_OFFSET, "Reported offset in seconds"),
    (METRIC_JITTER, "Reported jitter in seconds"),
];

/// First characters of the source rows we report on: server and peer
const SOURCE_INDICATORS: &[char] = &['^', '='];

const SELECTED_MARKER: char = '*';
const COMBINED_MARKER: char = '+';

/// Minimum whitespace fields in a usable source row
const MIN_FIELDS: usize = 7;

static DURATION_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^([+-]?[\d.]+)([a-z]*)$").ok());

/// One row of the chronyc source table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSource {
    /// Mode and state token, e.g. `^*`
    pub mode: String,
    pub name: String,
    pub stratum: i64,
    pub poll: i64,
    /// 8-bit reach shift register
    pub reach: i64,
    pub last_rx: i64,
    pub offset: f64,
    pub jitter: f64,
    pub selected: bool,
    pub in_use: bool,
    pub reachable: bool,
}

/// Convert a chrony duration such as `-120us`, `1.2ms` or `0.0003s` to seconds.
/// Anything that does not look like a number is 0.
pub fn unit_to_seconds(value: &str) -> f64 {
    let caps = match DURATION_RE.as_ref().and_then(|re| re.captures(value)) {
        Some(caps) => caps,
        None => return 0.0,
    };

    let num: f64 = match caps[1].parse() {
        Ok(num) => num,
        Err(_) => return 0.0,
    };

    match caps.get(2).map_or("", |m| m.as_str()) {
        "ns" => num / 1_000_000_000.0,
        "us" => num / 1_000_000.0,
        "ms" => num / 1_000.0,
        _ => num,
    }
}

/// Reach is printed in octal; fall back to decimal, then 0
pub fn parse_reach(raw: &str) -> i64 {
    i64::from_str_radix(raw, 8)
        .or_else(|_| raw.parse::<i64>())
        .unwrap_or(0)
}

fn parse_int(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}

/// Offset column, e.g. `-120us[` or `-120us[-130us]`: keep the adjusted value
fn parse_offset(raw: &str) -> f64 {
    let adjusted = raw.split('[').next().unwrap_or(raw);
    unit_to_seconds(adjusted.trim_matches(|c| c == '[' || c == ']'))
}

/// Error bound column, with any `+/-` or `±` marker removed
fn parse_jitter(raw: &str) -> f64 {
    let value = raw
        .strip_prefix("+/-")
        .or_else(|| raw.strip_prefix('±'))
        .unwrap_or(raw);
    unit_to_seconds(value.trim())
}

/// Parse one source row. Returns `None` when the row has too few fields;
/// numeric fields that do not parse default to zero.
pub fn parse_source_line(line: &str) -> Option<TimeSource> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let mode = fields[0];
    let reach = parse_reach(fields[4]);
    let jitter_field = fields[fields.len() - 1];

    Some(TimeSource {
        mode: mode.to_string(),
        name: fields[1].to_string(),
        stratum: parse_int(fields[2]),
        poll: parse_int(fields[3]),
        reach,
        last_rx: parse_int(fields[5]),
        offset: parse_offset(fields[6]),
        jitter: parse_jitter(jitter_field),
        selected: mode.contains(SELECTED_MARKER),
        in_use: mode.contains(COMBINED_MARKER),
        reachable: reach > 0,
    })
}

/// Collect every server/peer row of a `chronyc sources -v` listing
pub fn parse_sources(output: &str) -> Vec<TimeSource> {
    output
        .lines()
        .filter(|line| line.starts_with(SOURCE_INDICATORS))
        .filter_map(|line| {
            let source = parse_source_line(line);
            if source.is_none() {
                debug!("Skipping short chronyc row: {:?}", line);
            }
            source
        })
        .collect()
}

/// Everything one run reports: `None` means chronyc was unavailable
pub fn render<W: Write>(
    sources: Option<&[TimeSource]>,
    writer: &mut MetricWriter<W>,
) -> io::Result<()> {
    writer.gauge_type(METRIC_UP)?;
    let sources = match sources {
        Some(sources) => sources,
        None => {
            writer.sample(METRIC_UP, &[], 0)?;
            return writer.trailer();
        }
    };
    writer.sample(METRIC_UP, &[], 1)?;

    for (name, help) in SOURCE_METRICS {
        writer.help(name, help)?;
        writer.gauge_type(name)?;
    }

    for src in sources {
        let stratum = src.stratum.to_string();
        let poll = src.poll.to_string();
        let labels = [
            ("source", src.name.as_str()),
            ("mode", src.mode.as_str()),
            ("stratum", stratum.as_str()),
            ("poll", poll.as_str()),
        ];

        writer.sample(METRIC_SELECTED, &labels, u8::from(src.selected))?;
        writer.sample(METRIC_IN_USE, &labels, u8::from(src.in_use))?;
        writer.sample(METRIC_REACHABLE, &labels, u8::from(src.reachable))?;
        writer.sample(METRIC_REACH, &labels, src.reach)?;
        writer.sample(METRIC_LAST_RX, &labels, src.last_rx)?;
        writer.sample(METRIC_OFFSET, &labels, Seconds(src.offset))?;
        writer.sample(METRIC_JITTER, &labels, Seconds(src.jitter))?;
    }

    writer.trailer()
}
