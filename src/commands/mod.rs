//! Text command surface of the terminal dashboard.
//!
//! Each input line is parsed into a `Command` and dispatched to a handler
//! in one of the submodules. Handlers take `&CoreState` and return
//! `Result<_, String>` so every error reaches the user as plain text.

pub mod chat;
pub mod medications;
pub mod profile;
pub mod voice;

use std::io::{BufRead, Write};

use crate::config;
use crate::core_state::CoreState;
use crate::models::UserProfile;

pub const HELP_TEXT: &str = "\
命令：
  <症状描述>                      发送给问诊助手
  /profile                        显示个人信息
  /profile name=.. age=.. gender=.. history=a,b
  /history add <病史>             追加既往病史
  /med add <药名> <HH:MM>         添加用药提醒
  /med done <序号>                标记已服用
  /voice start | /voice push <采样,..> | /voice stop
  /show                           显示完整面板
  /status                         显示运行状态
  /help                           显示本帮助
  /quit                           退出";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Say(String),
    ShowProfile,
    Profile(Vec<String>),
    HistoryAdd(String),
    AddMedication { name: String, time: String },
    MedicationDone(usize),
    VoiceStart,
    VoicePush(String),
    VoiceStop,
    Show,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, String> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let head = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match (head, args.as_slice()) {
            ("profile", []) => Ok(Command::ShowProfile),
            ("profile", fields) => {
                Ok(Command::Profile(fields.iter().map(|f| f.to_string()).collect()))
            }
            ("history", ["add", entry @ ..]) if !entry.is_empty() => {
                Ok(Command::HistoryAdd(entry.join(" ")))
            }
            ("med", ["add", name @ .., time]) if !name.is_empty() => Ok(Command::AddMedication {
                name: name.join(" "),
                time: time.to_string(),
            }),
            ("med", ["done", n]) => n
                .parse::<usize>()
                .map(Command::MedicationDone)
                .map_err(|_| format!("Not a reminder number: {n:?}")),
            ("voice", ["start"]) => Ok(Command::VoiceStart),
            ("voice", ["push", samples @ ..]) => Ok(Command::VoicePush(samples.join(""))),
            ("voice", ["stop"]) => Ok(Command::VoiceStop),
            ("show", []) => Ok(Command::Show),
            ("status", []) => Ok(Command::Status),
            ("help", []) => Ok(Command::Help),
            ("quit", []) | ("exit", []) => Ok(Command::Quit),
            _ => Err(format!("Unknown command: /{rest}. Type /help")),
        }
    }
}

/// Run one command. `Quit` is handled by the caller.
pub fn execute(state: &CoreState, command: Command) -> Result<String, String> {
    match command {
        Command::Say(text) => chat::send_message(state, &text),
        Command::ShowProfile => profile::get_profile(state).map(|p| describe_profile(&p)),
        Command::Profile(fields) => {
            let update = profile::parse_profile_fields(fields.iter().map(String::as_str))?;
            let p = profile::update_profile(state, update)?;
            Ok(format!("已更新：{}", describe_profile(&p)))
        }
        Command::HistoryAdd(entry) => {
            let p = profile::add_history_entry(state, &entry)?;
            Ok(format!("既往病史：{}", p.medical_history.join("、")))
        }
        Command::AddMedication { name, time } => {
            let row = medications::add_medication_reminder(state, &name, &time)?;
            Ok(format!("{}. {}", row.index + 1, row.display()))
        }
        Command::MedicationDone(position) => {
            let row = medications::mark_medication_done(state, position)?;
            Ok(format!("{}. {}", row.index + 1, row.display()))
        }
        Command::VoiceStart => voice::start_voice_capture(state),
        Command::VoicePush(samples) => voice::push_voice_samples(state, &samples),
        Command::VoiceStop => voice::stop_voice_capture(state),
        Command::Show => chat::show_dashboard(state),
        Command::Status => status_report(state),
        Command::Help => Ok(HELP_TEXT.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

/// Verifies the core is responsive.
pub fn health_check(state: &CoreState) -> String {
    tracing::debug!("Health check called");
    match state.snapshot() {
        Ok(_) => "ok".to_string(),
        Err(e) => format!("degraded: {e}"),
    }
}

fn describe_profile(p: &UserProfile) -> String {
    let name = if p.name.is_empty() { "未填写" } else { p.name.as_str() };
    let mut line = format!("{} {}岁 {}", name, p.age, p.gender.label());
    if !p.medical_history.is_empty() {
        line.push_str(&format!("  既往病史：{}", p.medical_history.join("、")));
    }
    line
}

/// One line per subsystem, for `/status`.
pub fn status_report(state: &CoreState) -> Result<String, String> {
    let snapshot = state.snapshot().map_err(|e| e.to_string())?;
    let pending = state.pending_reminders().map_err(|e| e.to_string())?;
    Ok(format!(
        "core: {}\nversion: {}\nturn: {}\nvoice: {}\nreminders pending: {}",
        health_check(state),
        snapshot.version,
        if state.is_busy() { "in progress" } else { "idle" },
        voice::voice_status(state)?,
        pending
    ))
}

/// Read-eval-print loop over any line source.
pub fn run_repl<R: BufRead, W: Write>(
    state: &CoreState,
    input: R,
    mut output: W,
) -> std::io::Result<()> {
    writeln!(output, "{} v{}  (/help)", config::APP_NAME, config::APP_VERSION)?;

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(c) => c,
            Err(e) => {
                writeln!(output, "错误：{e}")?;
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match execute(state, command) {
            Ok(text) => writeln!(output, "{text}")?,
            Err(e) => writeln!(output, "错误：{e}")?,
        }
        output.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_lines(state: &CoreState, lines: &str) -> String {
        let mut out = Vec::new();
        run_repl(state, Cursor::new(lines.as_bytes()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn plain_text_is_a_turn() {
        assert_eq!(
            Command::parse("  头痛三天 ").unwrap(),
            Command::Say("头痛三天".into())
        );
    }

    #[test]
    fn parses_medication_commands() {
        assert_eq!(
            Command::parse("/med add 维生素 D 08:00").unwrap(),
            Command::AddMedication {
                name: "维生素 D".into(),
                time: "08:00".into()
            }
        );
        assert_eq!(
            Command::parse("/med done 2").unwrap(),
            Command::MedicationDone(2)
        );
        assert!(Command::parse("/med done two").is_err());
        assert!(Command::parse("/med add 08:00").is_err());
    }

    #[test]
    fn parses_voice_and_misc() {
        assert_eq!(Command::parse("/voice start").unwrap(), Command::VoiceStart);
        assert_eq!(
            Command::parse("/voice push 0.1, 0.2").unwrap(),
            Command::VoicePush("0.1,0.2".into())
        );
        assert_eq!(Command::parse("/quit").unwrap(), Command::Quit);
        assert!(Command::parse("/dance").is_err());
        assert_eq!(Command::parse("/profile").unwrap(), Command::ShowProfile);
        assert_eq!(Command::parse("/status").unwrap(), Command::Status);
        assert_eq!(
            Command::parse("/history add 2 型糖尿病").unwrap(),
            Command::HistoryAdd("2 型糖尿病".into())
        );
        assert!(Command::parse("/history add").is_err());
    }

    #[test]
    fn health_check_is_ok() {
        assert_eq!(health_check(&CoreState::with_mock_backend()), "ok");
    }

    #[test]
    fn repl_session_end_to_end() {
        let state = CoreState::with_mock_backend();
        let out = run_lines(
            &state,
            "头痛三天，伴有发热\n/med add 阿莫西林 08:00\n/med done 1\n/profile age=-3\n/quit\n轻微咳嗽\n",
        );

        assert!(out.contains("持续高热需立即就医"));
        assert!(out.contains("1. ⏰ 08:00  阿莫西林  ✓"));
        assert!(out.contains("错误："));

        // Nothing after /quit runs.
        let snapshot = state.snapshot().unwrap();
        assert_eq!(snapshot.conversation.len(), 2);
        assert_eq!(snapshot.user_profile.age, 30);
        assert!(snapshot.warning.is_some());
    }

    #[test]
    fn repl_status_and_history() {
        let state = CoreState::with_mock_backend();
        let out = run_lines(
            &state,
            "/med add 阿莫西林 08:00\n/voice start\n/status\n/history add 高血压\n/profile\n",
        );

        assert!(out.contains("core: ok"));
        assert!(out.contains("version: 1"));
        assert!(out.contains("turn: idle"));
        assert!(out.contains("voice: capturing (0 chunks)"));
        assert!(out.contains("reminders pending: 1"));
        assert!(out.contains("既往病史：高血压"));
        assert!(out.contains("未填写 30岁 男  既往病史：高血压"));
        assert_eq!(
            state.snapshot().unwrap().user_profile.medical_history,
            vec!["高血压"]
        );
    }

    #[test]
    fn repl_reports_parse_errors_and_continues() {
        let state = CoreState::with_mock_backend();
        let out = run_lines(&state, "/nope\n/show\n");
        assert!(out.contains("Unknown command"));
        assert!(out.contains("症状关联图谱"));
    }
}
