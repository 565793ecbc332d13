use crate::error::{DeliveryError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sysboard_common::types::{DerivedSnapshot, MemoryUsage};

/// Number of cells in a usage bar.
pub const BAR_WIDTH: usize = 10;

const BAR_FILLED: char = '█';
const BAR_EMPTY: char = '░';
const CORE_SEPARATOR: &str = "    ";

/// A rendered dashboard, independent of the sink that shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: Option<String>,
    pub description: String,
    pub color: Option<u32>,
    pub fields: Vec<ReportField>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl ReportField {
    fn block(name: &str, value: String) -> Self {
        Self {
            name: name.to_string(),
            value,
            inline: false,
        }
    }
}

impl Report {
    /// Renders the report as plain text for terminals and logs.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(title);
            out.push('\n');
        }
        out.push_str(&self.description);
        out.push('\n');
        for field in &self.fields {
            out.push('\n');
            out.push_str(&field.name);
            out.push('\n');
            out.push_str(&field.value);
            out.push('\n');
        }
        if let Some(ts) = self.timestamp {
            out.push('\n');
            out.push_str(&ts.to_rfc3339_opts(SecondsFormat::Secs, true));
            out.push('\n');
        }
        out
    }
}

/// Static parts of the dashboard, loaded from the `[report]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportLayout {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    /// Text of the message posted before the first refresh.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_color")]
    pub color: u32,
    #[serde(default = "default_cores_per_line")]
    pub cores_per_line: usize,
}

fn default_title() -> String {
    "🖥 Monitoring Linux VM".to_string()
}

fn default_description() -> String {
    "Live system information".to_string()
}

fn default_placeholder() -> String {
    "Starting system monitor...".to_string()
}

fn default_color() -> u32 {
    0x0099ff
}

fn default_cores_per_line() -> usize {
    1
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            placeholder: default_placeholder(),
            color: default_color(),
            cores_per_line: default_cores_per_line(),
        }
    }
}

impl ReportLayout {
    /// The message posted at startup, before any sample exists.
    pub fn placeholder(&self) -> Report {
        Report {
            title: None,
            description: self.placeholder.clone(),
            color: None,
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Renders one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::RenderError`] when the snapshot carries a
    /// non-finite value.
    pub fn render(&self, snapshot: &DerivedSnapshot) -> Result<Report> {
        check_finite("cpu load", snapshot.cpu_load_overall)?;
        for load in &snapshot.per_core_load {
            check_finite("core load", *load)?;
        }
        check_finite("ram usage", snapshot.ram.usage_percent)?;
        check_finite("swap usage", snapshot.swap.usage_percent)?;
        check_finite("download rate", snapshot.net_down_mbit_per_sec)?;
        check_finite("upload rate", snapshot.net_up_mbit_per_sec)?;

        let fields = vec![
            ReportField::block("〽️ Total CPU Load", progress_bar(snapshot.cpu_load_overall)),
            ReportField::block(
                "📊 CPU Cores",
                core_lines(&snapshot.per_core_load, self.cores_per_line),
            ),
            ReportField::block("🎟 RAM", usage_block(&snapshot.ram)),
            ReportField::block("🗂️ Swap", usage_block(&snapshot.swap)),
            ReportField::block(
                "🌐 Network",
                format!(
                    "↓ {:.2} MBit/s    |    ↑ {:.2} MBit/s",
                    snapshot.net_down_mbit_per_sec, snapshot.net_up_mbit_per_sec
                ),
            ),
        ];

        Ok(Report {
            title: Some(self.title.clone()),
            description: self.description.clone(),
            color: Some(self.color),
            fields,
            timestamp: Some(snapshot.sampled_at),
        })
    }
}

fn check_finite(what: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(DeliveryError::RenderError(format!("{what} is {value}")))
    }
}

/// Renders a fixed-width usage gauge followed by the percentage.
///
/// Cells are counted from the unrounded value; only the label is rounded.
///
/// # Examples
///
/// ```
/// use sysboard_notify::report::progress_bar;
///
/// assert_eq!(progress_bar(0.0), "[░░░░░░░░░░] 0.00%");
/// assert_eq!(progress_bar(100.0), "[██████████] 100.00%");
/// assert_eq!(progress_bar(45.0), "[█████░░░░░] 45.00%");
/// ```
pub fn progress_bar(percent: f64) -> String {
    let filled = filled_cells(percent);
    let mut bar = String::with_capacity(BAR_WIDTH * 3 + 16);
    bar.push('[');
    bar.extend(std::iter::repeat(BAR_FILLED).take(filled));
    bar.extend(std::iter::repeat(BAR_EMPTY).take(BAR_WIDTH - filled));
    bar.push_str(&format!("] {percent:.2}%"));
    bar
}

/// `round(percent / 100 * BAR_WIDTH)`, clamped to the bar.
pub fn filled_cells(percent: f64) -> usize {
    let cells = (percent * BAR_WIDTH as f64 / 100.0).round();
    cells.clamp(0.0, BAR_WIDTH as f64) as usize
}

fn core_lines(per_core: &[f64], cores_per_line: usize) -> String {
    if per_core.is_empty() {
        return "-".to_string();
    }
    let labelled: Vec<String> = per_core
        .iter()
        .enumerate()
        .map(|(i, load)| format!("C{i:02}: {}", progress_bar(*load)))
        .collect();
    labelled
        .chunks(cores_per_line.max(1))
        .map(|chunk| chunk.join(CORE_SEPARATOR))
        .collect::<Vec<_>>()
        .join("\n")
}

fn usage_block(usage: &MemoryUsage) -> String {
    format!(
        "Used: {:.2} GB / Free: {:.2} GB / Total: {:.2} GB\nUsage: {}",
        usage.used_gib,
        usage.free_gib,
        usage.total_gib,
        progress_bar(usage.usage_percent)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> DerivedSnapshot {
        DerivedSnapshot {
            cpu_load_overall: 37.456,
            per_core_load: vec![12.0, 99.6, 0.0],
            ram: MemoryUsage {
                used_gib: 5.0,
                free_gib: 4.25,
                total_gib: 10.0,
                usage_percent: 50.0,
            },
            swap: MemoryUsage::default(),
            net_down_mbit_per_sec: 1.23456,
            net_up_mbit_per_sec: 0.007,
            sampled_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 40, 0).unwrap(),
        }
    }

    #[test]
    fn bar_extremes() {
        assert_eq!(progress_bar(0.0), "[░░░░░░░░░░] 0.00%");
        assert_eq!(progress_bar(100.0), "[██████████] 100.00%");
    }

    #[test]
    fn bar_rounds_half_up() {
        assert_eq!(filled_cells(45.0), 5);
        assert_eq!(filled_cells(44.9), 4);
    }

    #[test]
    fn bar_cells_use_unrounded_percent() {
        assert_eq!(progress_bar(44.996), "[████░░░░░░] 45.00%");
        assert_eq!(progress_bar(45.004), "[█████░░░░░] 45.00%");
    }

    #[test]
    fn bar_clamps_out_of_range() {
        assert_eq!(filled_cells(250.0), BAR_WIDTH);
        assert_eq!(filled_cells(-3.0), 0);
        assert_eq!(progress_bar(250.0), "[██████████] 250.00%");
    }

    #[test]
    fn render_field_order_and_content() {
        let report = ReportLayout::default().render(&snapshot()).unwrap();
        let names: Vec<&str> = report.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["〽️ Total CPU Load", "📊 CPU Cores", "🎟 RAM", "🗂️ Swap", "🌐 Network"]
        );
        assert_eq!(report.fields[0].value, "[████░░░░░░] 37.46%");
        assert_eq!(
            report.fields[1].value,
            "C00: [█░░░░░░░░░] 12.00%\nC01: [██████████] 99.60%\nC02: [░░░░░░░░░░] 0.00%"
        );
        assert_eq!(
            report.fields[2].value,
            "Used: 5.00 GB / Free: 4.25 GB / Total: 10.00 GB\nUsage: [█████░░░░░] 50.00%"
        );
        assert_eq!(
            report.fields[3].value,
            "Used: 0.00 GB / Free: 0.00 GB / Total: 0.00 GB\nUsage: [░░░░░░░░░░] 0.00%"
        );
        assert_eq!(report.fields[4].value, "↓ 1.23 MBit/s    |    ↑ 0.01 MBit/s");
        assert!(report.fields.iter().all(|f| !f.inline));
        assert_eq!(report.title.as_deref(), Some("🖥 Monitoring Linux VM"));
        assert_eq!(report.color, Some(0x0099ff));
        assert_eq!(report.timestamp, Some(snapshot().sampled_at));
    }

    #[test]
    fn render_groups_cores_per_line() {
        let layout = ReportLayout {
            cores_per_line: 2,
            ..ReportLayout::default()
        };
        let report = layout.render(&snapshot()).unwrap();
        let lines: Vec<&str> = report.fields[1].value.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("C00: "));
        assert!(lines[0].contains("    C01: "));
        assert!(lines[1].starts_with("C02: "));
    }

    #[test]
    fn render_rejects_nan() {
        let mut snap = snapshot();
        snap.net_down_mbit_per_sec = f64::NAN;
        let err = ReportLayout::default().render(&snap).unwrap_err();
        assert!(matches!(err, DeliveryError::RenderError(_)));
    }

    #[test]
    fn placeholder_has_only_description() {
        let report = ReportLayout::default().placeholder();
        assert_eq!(report.description, "Starting system monitor...");
        assert!(report.fields.is_empty());
        assert!(report.title.is_none());
    }

    #[test]
    fn plain_text_lists_fields() {
        let text = ReportLayout::default()
            .render(&snapshot())
            .unwrap()
            .to_plain_text();
        assert!(text.starts_with("🖥 Monitoring Linux VM\nLive system information\n"));
        assert!(text.contains("\n🌐 Network\n↓ 1.23 MBit/s"));
        assert!(text.ends_with("2024-01-15T08:40:00Z\n"));
    }
}
