//! Line-oriented front end for the attendance page.
//!
//! Scans and location checks run in the background so the method can be switched while
//! they are in flight; their results arrive later as notices.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    attendance::{commands, AttendanceController, AttendanceSnapshot},
    db::{HistoryQuery, SortKey, SortOrder},
    settings::CaptureSettings,
    AppState,
};

pub const HELP: &str = "\
commands:
  class                         show the class being marked
  select qr|face|gps            choose an attendance method
  scan                          start a QR or face scan
  retry                         re-check GPS location
  confirm                       mark attendance
  reset                         start over (mark another attendance)
  dashboard                     go to the student dashboard
  state                         show the page state
  history [date=YYYY-MM-DD] [subject=NAME] [sort=date|subject|status] [asc|desc]
  analytics                     attendance summary per subject
  settings [field=value ...]    show or change capture settings (e.g. gpsRadius=40)
  help                          this text
  quit                          exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Class,
    Select(String),
    Scan,
    Retry,
    Confirm,
    Reset,
    Dashboard,
    State,
    History(HistoryQuery),
    Analytics,
    Settings(Vec<(String, String)>),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Print(String),
    Quit,
}

fn parse_history(args: &[&str]) -> Result<HistoryQuery, String> {
    let mut query = HistoryQuery::default();
    for arg in args {
        match arg.split_once('=') {
            Some(("date", value)) => query.date = Some(value.to_string()),
            Some(("subject", value)) => query.subject = Some(value.replace('_', " ")),
            Some(("sort", "date")) => query.sort_by = SortKey::Date,
            Some(("sort", "subject")) => query.sort_by = SortKey::Subject,
            Some(("sort", "status")) => query.sort_by = SortKey::Status,
            None if *arg == "asc" => query.order = SortOrder::Asc,
            None if *arg == "desc" => query.order = SortOrder::Desc,
            _ => return Err(format!("unrecognised history option '{arg}'")),
        }
    }
    Ok(query)
}

fn parse_assignments(args: &[&str]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((field, value)) if !field.is_empty() && !value.is_empty() => {
                Ok((field.to_string(), value.to_string()))
            }
            _ => Err(format!("expected field=value, got '{arg}'")),
        })
        .collect()
}

pub fn parse(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, rest)) = words.split_first() else {
        return Err("empty command".to_string());
    };

    let command = match (head.to_ascii_lowercase().as_str(), rest) {
        ("class", []) => Command::Class,
        ("select", [_, ..]) => Command::Select(rest.join(" ")),
        ("select", []) => return Err("usage: select qr|face|gps".to_string()),
        ("scan", []) => Command::Scan,
        ("retry", []) => Command::Retry,
        ("confirm", []) => Command::Confirm,
        ("reset", []) => Command::Reset,
        ("dashboard", []) => Command::Dashboard,
        ("state", []) => Command::State,
        ("history", args) => Command::History(parse_history(args)?),
        ("analytics", []) => Command::Analytics,
        ("settings", args) => Command::Settings(parse_assignments(args)?),
        ("help", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(format!("unknown command '{}'; try 'help'", line.trim())),
    };
    Ok(command)
}

fn render<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| e.to_string())
}

fn render_snapshot(snapshot: &AttendanceSnapshot) -> String {
    let actions: Vec<String> = snapshot
        .actions
        .iter()
        .map(|action| format!("{action:?}"))
        .collect();
    format!(
        "[{:?}] {}\n  actions: {}",
        snapshot.status.tone,
        snapshot.status.text,
        actions.join(", ")
    )
}

/// Applies `field=value` pairs (camelCase field names) on top of `current`.
fn apply_assignments(
    current: CaptureSettings,
    assignments: &[(String, String)],
) -> Result<CaptureSettings, String> {
    let mut value = serde_json::to_value(current).map_err(|e| e.to_string())?;
    let Value::Object(fields) = &mut value else {
        return Err("capture settings are not an object".to_string());
    };

    for (field, raw) in assignments {
        let slot = fields
            .get_mut(field)
            .ok_or_else(|| format!("unknown setting '{field}'"))?;
        *slot = serde_json::from_str(raw)
            .map_err(|_| format!("'{raw}' is not a valid value for {field}"))?;
    }

    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Sends a notice once the location check `attempt_id` settles or is abandoned.
fn notify_when_located(
    controller: AttendanceController,
    attempt_id: u64,
    notices: mpsc::UnboundedSender<String>,
) {
    tokio::spawn(async move {
        let mut snapshots = controller.subscribe();
        let notice = match snapshots
            .wait_for(|snapshot| !snapshot.state.is_pending(attempt_id))
            .await
        {
            Ok(snapshot) => {
                let resolved = snapshot
                    .state
                    .location
                    .as_ref()
                    .is_some_and(|check| check.attempt_id == attempt_id);
                if resolved {
                    render_snapshot(&snapshot)
                } else {
                    "location check cancelled".to_string()
                }
            }
            Err(_) => return,
        };
        let _ = notices.send(notice);
    });
}

/// Runs one command. Long captures are spawned and report through `notices`.
pub async fn execute(
    state: &Arc<AppState>,
    command: Command,
    notices: &mpsc::UnboundedSender<String>,
) -> Result<Reply, String> {
    let text = match command {
        Command::Class => render(&commands::get_current_class(state).await?)?,
        Command::Select(method) => {
            let snapshot = commands::select_method(state, &method).await?;
            let checking = snapshot
                .state
                .location
                .as_ref()
                .filter(|check| check.is_checking());
            if let Some(check) = checking {
                notify_when_located(state.controller.clone(), check.attempt_id, notices.clone());
            }
            render_snapshot(&snapshot)
        }
        Command::Scan => {
            let state = Arc::clone(state);
            let notices = notices.clone();
            tokio::spawn(async move {
                let notice = match commands::start_scan(&state).await {
                    Ok(report) if report.outcome.is_some() => render_snapshot(&report.snapshot),
                    Ok(_) => "scan cancelled".to_string(),
                    Err(err) => err,
                };
                let _ = notices.send(notice);
            });
            "scan started".to_string()
        }
        Command::Retry => {
            let state = Arc::clone(state);
            let notices = notices.clone();
            tokio::spawn(async move {
                let notice = match commands::retry_location(&state).await {
                    Ok(report) if report.outcome.is_some() => render_snapshot(&report.snapshot),
                    Ok(_) => "location check cancelled".to_string(),
                    Err(err) => err,
                };
                let _ = notices.send(notice);
            });
            "checking location".to_string()
        }
        Command::Confirm => {
            commands::confirm_attendance(state).await?;
            render_snapshot(&commands::get_attendance_state(state).await?)
        }
        Command::Reset => render_snapshot(&commands::reset_attendance(state).await?),
        Command::Dashboard => {
            commands::go_to_dashboard(state).await?;
            String::new()
        }
        Command::State => render(&commands::get_attendance_state(state).await?)?,
        Command::History(query) => {
            render(&commands::get_attendance_history(state, query).await?)?
        }
        Command::Analytics => render(&commands::get_attendance_analytics(state).await?)?,
        Command::Settings(assignments) if assignments.is_empty() => {
            render(&commands::get_capture_settings(state).await?)?
        }
        Command::Settings(assignments) => {
            let current = commands::get_capture_settings(state).await?;
            let updated = apply_assignments(current, &assignments)?;
            let saved = commands::update_capture_settings(state, updated).await?;
            format!("{}\n(applies from the next launch)", render(&saved)?)
        }
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Reply::Quit),
    };
    Ok(Reply::Print(text))
}
