//! Gantt chart rendering as a standalone SVG document.
//!
//! The chart only reads finished schedule entries. Machines become rows in
//! the order they first appear, and job types get palette colors in the
//! order they first appear.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use rustc_hash::FxHashMap;
use std::fmt;

use crate::config::{ChartConfig, TAB10_PALETTE};
use crate::models::ScheduleEntry;
use crate::scheduler::hours_between;

const MARGIN_LEFT: f64 = 110.0;
const MARGIN_RIGHT: f64 = 190.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 80.0;
const MIN_PLOT_WIDTH: f64 = 100.0;
const MAX_TICKS: f64 = 10.0;

/// Candidate tick spacings in hours, smallest first.
const TICK_STEPS_HOURS: [i64; 11] = [1, 2, 3, 4, 6, 12, 24, 48, 72, 168, 336];

/// Deterministic `job_type` -> color assignment.
#[derive(Clone, Debug, Default)]
pub struct ColorMap {
    /// (job_type, color) in first-seen order
    assigned: Vec<(String, String)>,
    index: FxHashMap<String, usize>,
}

impl ColorMap {
    /// Assign colors in first-seen order, cycling through the palette.
    ///
    /// An empty palette falls back to tab10.
    pub fn from_entries(entries: &[ScheduleEntry], palette: &[String]) -> Self {
        let fallback: Vec<String>;
        let palette = if palette.is_empty() {
            fallback = TAB10_PALETTE.iter().map(|c| c.to_string()).collect();
            &fallback
        } else {
            palette
        };

        let mut map = Self::default();
        for entry in entries {
            if map.index.contains_key(&entry.job_type) {
                continue;
            }
            let color = palette[map.assigned.len() % palette.len()].clone();
            map.index.insert(entry.job_type.clone(), map.assigned.len());
            map.assigned.push((entry.job_type.clone(), color));
        }
        map
    }

    pub fn color(&self, job_type: &str) -> Option<&str> {
        self.index
            .get(job_type)
            .map(|&i| self.assigned[i].1.as_str())
    }

    /// (job_type, color) pairs in legend order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assigned.iter().map(|(t, c)| (t.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

/// Escape text for use in SVG content and attribute values.
fn escape_xml(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Pick the smallest tick step (hours) giving at most `MAX_TICKS` ticks.
fn tick_step_hours(span_hours: f64) -> i64 {
    TICK_STEPS_HOURS
        .iter()
        .copied()
        .find(|&step| span_hours / step as f64 <= MAX_TICKS)
        .unwrap_or_else(|| (span_hours / MAX_TICKS).ceil().max(1.0) as i64)
}

/// Tick positions: multiples of `step_hours` counted from midnight of `start`.
fn tick_times(start: NaiveDateTime, end: NaiveDateTime, step_hours: i64) -> Vec<NaiveDateTime> {
    let midnight = start.date().and_time(NaiveTime::MIN);
    let step = Duration::hours(step_hours);
    let elapsed = hours_between(midnight, start);
    let first_multiple = (elapsed / step_hours as f64).ceil() as i32;

    let mut ticks = Vec::new();
    let mut tick = midnight + step * first_multiple;
    while tick <= end {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// A laid-out Gantt chart; `Display` writes the SVG document.
pub struct GanttChart<'a> {
    entries: &'a [ScheduleEntry],
    config: &'a ChartConfig,
    colors: ColorMap,
    /// Machine ids in first-seen order
    rows: Vec<&'a str>,
    row_of: FxHashMap<&'a str, usize>,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl<'a> GanttChart<'a> {
    pub fn new(entries: &'a [ScheduleEntry], config: &'a ChartConfig) -> Self {
        let mut rows: Vec<&'a str> = Vec::new();
        let mut row_of: FxHashMap<&'a str, usize> = FxHashMap::default();
        for entry in entries {
            let id = entry.machine_id.as_str();
            if !row_of.contains_key(id) {
                row_of.insert(id, rows.len());
                rows.push(id);
            }
        }

        let start = entries
            .iter()
            .map(|e| e.start_time)
            .min()
            .unwrap_or_default();
        let mut end = entries.iter().map(|e| e.end_time).max().unwrap_or(start);
        if end <= start {
            end = start + Duration::hours(1);
        }

        Self {
            entries,
            config,
            colors: ColorMap::from_entries(entries, &config.palette),
            rows,
            row_of,
            start,
            end,
        }
    }

    pub fn colors(&self) -> &ColorMap {
        &self.colors
    }

    /// Machine ids in row order (top to bottom).
    pub fn rows(&self) -> &[&'a str] {
        &self.rows
    }

    fn plot_width(&self) -> f64 {
        (self.config.width - MARGIN_LEFT - MARGIN_RIGHT).max(MIN_PLOT_WIDTH)
    }

    fn total_width(&self) -> f64 {
        MARGIN_LEFT + self.plot_width() + MARGIN_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.rows.len().max(1) as f64 * self.config.row_height
    }

    fn total_height(&self) -> f64 {
        MARGIN_TOP + self.plot_height() + MARGIN_BOTTOM
    }

    fn x(&self, ts: NaiveDateTime) -> f64 {
        let span = hours_between(self.start, self.end);
        MARGIN_LEFT + hours_between(self.start, ts) / span * self.plot_width()
    }

    fn row_center(&self, row: usize) -> f64 {
        MARGIN_TOP + (row as f64 + 0.5) * self.config.row_height
    }

    fn write_axes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bottom = MARGIN_TOP + self.plot_height();
        let right = MARGIN_LEFT + self.plot_width();

        let step = tick_step_hours(hours_between(self.start, self.end));
        for tick in tick_times(self.start, self.end, step) {
            let x = self.x(tick);
            writeln!(
                f,
                r##"<line x1="{x:.1}" y1="{MARGIN_TOP:.1}" x2="{x:.1}" y2="{bottom:.1}" stroke="#999" stroke-dasharray="4 3" stroke-opacity="0.7"/>"##
            )?;
            writeln!(
                f,
                r#"<text x="{x:.1}" y="{:.1}" font-size="9" text-anchor="end" transform="rotate(-45 {x:.1} {:.1})"><tspan x="{x:.1}">{}</tspan><tspan x="{x:.1}" dy="11">{}</tspan></text>"#,
                bottom + 14.0,
                bottom + 14.0,
                tick.format("%b %d"),
                tick.format("%I:%M %p"),
            )?;
        }

        writeln!(
            f,
            r#"<rect x="{MARGIN_LEFT:.1}" y="{MARGIN_TOP:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="black"/>"#,
            self.plot_width(),
            self.plot_height()
        )?;

        for (row, machine_id) in self.rows.iter().enumerate() {
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" font-size="11" text-anchor="end" dominant-baseline="middle">{}</text>"#,
                MARGIN_LEFT - 8.0,
                self.row_center(row),
                escape_xml(machine_id)
            )?;
        }

        writeln!(
            f,
            r#"<text x="{:.1}" y="{:.1}" font-size="12" text-anchor="middle">Time</text>"#,
            (MARGIN_LEFT + right) / 2.0,
            self.total_height() - 10.0
        )?;
        writeln!(
            f,
            r#"<text x="16" y="{y:.1}" font-size="12" text-anchor="middle" transform="rotate(-90 16 {y:.1})">Machine ID</text>"#,
            y = MARGIN_TOP + self.plot_height() / 2.0
        )
    }

    fn write_bars(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bar_height = self.config.row_height * self.config.bar_height_ratio;

        for entry in self.entries {
            let row = self.row_of[entry.machine_id.as_str()];
            let color = self.colors.color(&entry.job_type).unwrap_or("#7f7f7f");
            let x0 = self.x(entry.start_time);
            let width = (self.x(entry.end_time) - x0).max(1.0);
            let center = self.row_center(row);

            writeln!(
                f,
                r#"<rect x="{x0:.1}" y="{:.1}" width="{width:.1}" height="{bar_height:.1}" fill="{}" stroke="black"><title>{}</title></rect>"#,
                center - bar_height / 2.0,
                escape_xml(color),
                escape_xml(&format!(
                    "{} ({}) on {}: {} - {}, delay {:.2}h",
                    entry.job_id,
                    entry.job_type,
                    entry.machine_id,
                    entry.start_time,
                    entry.end_time,
                    entry.delay_hours
                )),
            )?;
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" font-size="8" font-weight="bold" fill="white" text-anchor="middle"><tspan x="{:.1}">{} ({})</tspan><tspan x="{:.1}" dy="10">{} - {}</tspan></text>"#,
                x0 + width / 2.0,
                center - 2.0,
                x0 + width / 2.0,
                escape_xml(&entry.job_id),
                escape_xml(&entry.job_type),
                x0 + width / 2.0,
                entry.start_time.format("%H:%M"),
                entry.end_time.format("%H:%M"),
            )?;
        }
        Ok(())
    }

    fn write_legend(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let x = MARGIN_LEFT + self.plot_width() + 20.0;
        writeln!(
            f,
            r#"<text x="{x:.1}" y="{:.1}" font-size="12" font-weight="bold">Job Types</text>"#,
            MARGIN_TOP + 4.0
        )?;
        for (i, (job_type, color)) in self.colors.iter().enumerate() {
            let y = MARGIN_TOP + 16.0 + i as f64 * 20.0;
            writeln!(
                f,
                r#"<rect x="{x:.1}" y="{y:.1}" width="14" height="14" fill="{}"/>"#,
                escape_xml(color)
            )?;
            writeln!(
                f,
                r#"<text x="{:.1}" y="{:.1}" font-size="11">{}</text>"#,
                x + 20.0,
                y + 11.0,
                escape_xml(job_type)
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for GanttChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.total_width();
        let height = self.total_height();
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}" viewBox="0 0 {width:.0} {height:.0}" font-family="sans-serif">"#
        )?;
        writeln!(f, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
        writeln!(
            f,
            r#"<text x="{:.1}" y="30" font-size="16" text-anchor="middle">{}</text>"#,
            width / 2.0,
            escape_xml(&self.config.title)
        )?;

        if self.entries.is_empty() {
            writeln!(
                f,
                r##"<text x="{:.1}" y="{:.1}" font-size="13" text-anchor="middle" fill="#555">No scheduled jobs</text>"##,
                width / 2.0,
                height / 2.0
            )?;
        } else {
            self.write_axes(f)?;
            self.write_bars(f)?;
            self.write_legend(f)?;
        }

        writeln!(f, "</svg>")
    }
}

/// Render entries as an SVG Gantt chart.
pub fn render_gantt_svg(entries: &[ScheduleEntry], config: &ChartConfig) -> String {
    GanttChart::new(entries, config).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn entry(job: &str, job_type: &str, machine: &str, start: u32, end: u32) -> ScheduleEntry {
        ScheduleEntry {
            job_id: job.to_string(),
            job_type: job_type.to_string(),
            machine_id: machine.to_string(),
            machine_type: "A".to_string(),
            start_time: at(6, start),
            end_time: at(6, end),
            due_date: at(6, end),
            delay_hours: 0.0,
        }
    }

    #[test]
    fn test_color_map_first_seen_order() {
        let entries = vec![
            entry("J1", "Weld", "M1", 8, 9),
            entry("J2", "Cut", "M1", 9, 10),
            entry("J3", "Weld", "M2", 8, 10),
        ];
        let palette: Vec<String> = TAB10_PALETTE.iter().map(|c| c.to_string()).collect();
        let colors = ColorMap::from_entries(&entries, &palette);

        assert_eq!(colors.len(), 2);
        assert_eq!(colors.color("Weld"), Some("#1f77b4"));
        assert_eq!(colors.color("Cut"), Some("#ff7f0e"));
        assert_eq!(colors.color("Drill"), None);
        let legend: Vec<_> = colors.iter().map(|(t, _)| t).collect();
        assert_eq!(legend, vec!["Weld", "Cut"]);
    }

    #[test]
    fn test_color_map_cycles_palette() {
        let entries: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|t| entry("J", t, "M1", 8, 9))
            .collect();
        let palette = vec!["red".to_string(), "blue".to_string()];
        let colors = ColorMap::from_entries(&entries, &palette);
        assert_eq!(colors.color("c"), Some("red"));
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let entries = vec![entry("J1", "Weld", "M1", 8, 9)];
        let colors = ColorMap::from_entries(&entries, &[]);
        assert_eq!(colors.color("Weld"), Some(TAB10_PALETTE[0]));
    }

    #[test]
    fn test_rows_follow_first_seen_machine() {
        let entries = vec![
            entry("J1", "Weld", "M2", 8, 9),
            entry("J2", "Cut", "M1", 8, 10),
            entry("J3", "Cut", "M2", 9, 11),
        ];
        let config = ChartConfig::default();
        let chart = GanttChart::new(&entries, &config);
        assert_eq!(chart.rows(), &["M2", "M1"]);
        assert_eq!(chart.colors().len(), 2);
    }

    #[test]
    fn test_svg_contains_bars_and_labels() {
        let entries = vec![
            entry("J1", "Weld", "M1", 8, 10),
            entry("J2", "Cut", "M2", 9, 12),
        ];
        let svg = render_gantt_svg(&entries, &ChartConfig::default());

        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("J1 (Weld)"));
        assert!(svg.contains("08:00 - 10:00"));
        assert!(svg.contains("09:00 - 12:00"));
        assert!(svg.contains("Job Types"));
        assert!(svg.contains("Detailed Machine Scheduling Gantt Chart"));
        assert!(svg.contains("Jan 06"));
        assert_eq!(svg.matches("<title>").count(), 2);
    }

    #[test]
    fn test_svg_escapes_text() {
        let entries = vec![entry("J<1>", "R&D", "M1", 8, 9)];
        let config = ChartConfig {
            title: "Shop \"A\"".to_string(),
            ..ChartConfig::default()
        };
        let svg = render_gantt_svg(&entries, &config);
        assert!(svg.contains("J&lt;1&gt; (R&amp;D)"));
        assert!(svg.contains("Shop &quot;A&quot;"));
        assert!(!svg.contains("J<1>"));
    }

    #[test]
    fn test_empty_schedule_renders_placeholder() {
        let svg = render_gantt_svg(&[], &ChartConfig::default());
        assert!(svg.contains("No scheduled jobs"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_zero_length_bar_still_drawn() {
        let entries = vec![entry("J1", "Weld", "M1", 8, 8)];
        let svg = render_gantt_svg(&entries, &ChartConfig::default());
        assert!(svg.contains("08:00 - 08:00"));
    }

    #[test]
    fn test_tick_step_selection() {
        assert_eq!(tick_step_hours(5.0), 1);
        assert_eq!(tick_step_hours(30.0), 3);
        assert_eq!(tick_step_hours(200.0), 24);
        assert_eq!(tick_step_hours(10_000.0), 1000);
    }

    #[test]
    fn test_tick_times_align_to_step() {
        let ticks = tick_times(at(6, 7), at(6, 13), 3);
        assert_eq!(ticks, vec![at(6, 9), at(6, 12)]);

        let ticks = tick_times(at(6, 0), at(6, 2), 1);
        assert_eq!(ticks, vec![at(6, 0), at(6, 1), at(6, 2)]);
    }
}
