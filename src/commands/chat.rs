//! Conversation and dashboard commands.

use serde::Serialize;

use crate::chat::{
    chat_bubbles, format_bubble, warning_banner, ChatBubble, COMPOSER_PLACEHOLDER,
    WARNING_BANNER_PREFIX,
};
use crate::core_state::CoreState;
use crate::medications::{reminder_rows, ReminderRow};
use crate::models::UserProfile;
use crate::pipeline::conversation::TurnOutcome;
use crate::visualization::{
    probability_bars, render_text, symptom_network_points, ProbabilityBar, SymptomPoint,
};

/// Everything the dashboard shows, built from one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub version: u64,
    pub profile: UserProfile,
    pub bubbles: Vec<ChatBubble>,
    pub warning_banner: Option<String>,
    pub symptom_points: Vec<SymptomPoint>,
    pub probability_bars: Vec<ProbabilityBar>,
    pub reminders: Vec<ReminderRow>,
    pub placeholder: &'static str,
    pub busy: bool,
}

impl DashboardView {
    pub fn pending_reminders(&self) -> usize {
        self.reminders.iter().filter(|r| !r.done).count()
    }
}

/// Submit one utterance and return the reply text shown to the user.
pub fn send_message(state: &CoreState, text: &str) -> Result<String, String> {
    let outcome = state.submit_text(text).map_err(|e| e.to_string())?;
    Ok(describe_outcome(&outcome))
}

pub fn describe_outcome(outcome: &TurnOutcome) -> String {
    match outcome {
        TurnOutcome::Answered { answer, warning } => match warning {
            Some(w) => format!("{answer}\n{WARNING_BANNER_PREFIX}{w}"),
            None => answer.clone(),
        },
        TurnOutcome::BackendFailed { notice, .. } => notice.clone(),
        TurnOutcome::Cancelled { notice } => notice.clone(),
    }
}

pub fn get_dashboard(state: &CoreState) -> Result<DashboardView, String> {
    let snapshot = state.snapshot().map_err(|e| e.to_string())?;
    Ok(DashboardView {
        version: snapshot.version,
        profile: snapshot.user_profile.clone(),
        bubbles: chat_bubbles(&snapshot),
        warning_banner: warning_banner(&snapshot),
        symptom_points: symptom_network_points(&snapshot.diagnosis),
        probability_bars: probability_bars(&snapshot.diagnosis),
        reminders: reminder_rows(&snapshot.medications),
        placeholder: COMPOSER_PLACEHOLDER,
        busy: state.is_busy(),
    })
}

/// Plain-text rendering of the whole dashboard.
pub fn show_dashboard(state: &CoreState) -> Result<String, String> {
    let view = get_dashboard(state)?;
    let mut out = String::new();

    let profile = &view.profile;
    let name = if profile.name.is_empty() { "未填写" } else { profile.name.as_str() };
    out.push_str(&format!(
        "患者：{}  {}岁  {}\n",
        name,
        profile.age,
        profile.gender.label()
    ));
    if !profile.medical_history.is_empty() {
        out.push_str(&format!("既往病史：{}\n", profile.medical_history.join("、")));
    }

    if let Some(banner) = &view.warning_banner {
        out.push_str(banner);
        out.push('\n');
    }

    if view.bubbles.is_empty() {
        out.push_str(&format!("（{}）\n", view.placeholder));
    }
    for bubble in &view.bubbles {
        out.push_str(&format_bubble(bubble));
        out.push('\n');
    }
    if view.busy {
        out.push_str("（正在分析…）\n");
    }

    out.push_str(&render_text(&view.symptom_points, &view.probability_bars));

    out.push_str(&format!("用药提醒（待服 {}）\n", view.pending_reminders()));
    if view.reminders.is_empty() {
        out.push_str("  (暂无提醒)\n");
    }
    for row in &view.reminders {
        out.push_str(&format!("  {}. {}\n", row.index + 1, row.display()));
    }
    Ok(out)
}
