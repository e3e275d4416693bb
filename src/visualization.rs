//! Chart views over the latest diagnosis.
//!
//! The symptom graph is rendered as a scatter of link endpoints, the
//! probability table as a horizontal bar chart.

use serde::Serialize;

use crate::models::DiagnosisData;

pub const SYMPTOM_CHART_TITLE: &str = "症状关联图谱";
pub const PROBABILITY_CHART_TITLE: &str = "疾病概率分布";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymptomPoint {
    pub source: String,
    pub target: String,
    pub value: f64,
    /// Node group of each endpoint, `None` when the link names an unlisted symptom.
    pub source_group: Option<i64>,
    pub target_group: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbabilityBar {
    pub disease: String,
    pub probability: f64,
    /// e.g. "65%"
    pub percent_label: String,
}

/// One point per link. Empty when no diagnosis has been received.
pub fn symptom_network_points(diagnosis: &DiagnosisData) -> Vec<SymptomPoint> {
    let network = &diagnosis.symptom_network;
    network
        .links
        .iter()
        .map(|link| SymptomPoint {
            source: link.source.clone(),
            target: link.target.clone(),
            value: link.weight,
            source_group: network.node(&link.source).map(|n| n.group),
            target_group: network.node(&link.target).map(|n| n.group),
        })
        .collect()
}

/// One bar per disease, in the order the backend listed them.
pub fn probability_bars(diagnosis: &DiagnosisData) -> Vec<ProbabilityBar> {
    diagnosis
        .probabilities
        .iter()
        .map(|p| ProbabilityBar {
            disease: p.disease.clone(),
            probability: p.probability,
            percent_label: format!("{:.0}%", p.probability * 100.0),
        })
        .collect()
}

/// Text rendering of both charts for terminal front-ends.
pub fn render_text(points: &[SymptomPoint], bars: &[ProbabilityBar]) -> String {
    let mut out = String::new();

    out.push_str(SYMPTOM_CHART_TITLE);
    out.push('\n');
    if points.is_empty() {
        out.push_str("  (暂无数据)\n");
    }
    for p in points {
        out.push_str(&format!("  {} → {}  {:.2}\n", p.source, p.target, p.value));
    }

    out.push_str(PROBABILITY_CHART_TITLE);
    out.push('\n');
    if bars.is_empty() {
        out.push_str("  (暂无数据)\n");
    }
    for bar in bars {
        let width = (bar.probability * 20.0).round() as usize;
        out.push_str(&format!(
            "  {:<8} {:<20} {}\n",
            bar.disease,
            "█".repeat(width),
            bar.percent_label
        ));
    }
    out
}
