use std::collections::BTreeSet;
use std::fmt::Write;

use chrono::{Datelike, NaiveDate};
use desbravadores_sdk::{
    access::{self, Feature},
    services::{
        achievements::{load_achievements, unlocked_xp, AchievementView},
        agenda::{upcoming_reminders, AgendaMonth, MonthCursor, WEEKDAY_SHORT_NAMES},
        chamada::RollCall,
    },
    Credentials, Member, Role, SessionState, Task,
};
use tracing::debug;

use crate::{
    cli::Command,
    context::AppContext,
    utils::errors::{CliError, Result},
};

/// Run one command and return what should be printed.
pub async fn run(command: Command, ctx: &AppContext, today: NaiveDate) -> Result<String> {
    match command {
        Command::Login { email, password } => login(ctx, email, password).await,
        Command::Logout => {
            ctx.client.session().sign_out().await?;
            Ok("Sessão encerrada.".to_string())
        }
        Command::Whoami => Ok(whoami(&ctx.client.session().state().await)),
        Command::Agenda { year, month, day } => agenda(ctx, today, year, month, day).await,
        Command::Reminders => reminders(ctx, today).await,
        Command::Achievements => achievements(ctx).await,
        Command::Members => members(ctx, today).await,
        Command::Chamada { date, present } => chamada(ctx, date.unwrap_or(today), present).await,
    }
}

async fn login(ctx: &AppContext, email: String, password: String) -> Result<String> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(CliError::InvalidArgument(
            "Por favor, preencha o email e a senha.".to_string(),
        ));
    }
    let role = ctx.client.login(Credentials::new(email.trim(), password)).await?;
    debug!("Session token stored at {}", ctx.config.storage.token_path.display());
    Ok(format!("Login realizado com êxito! Perfil: {}", role))
}

fn whoami(state: &SessionState) -> String {
    match state {
        SessionState::Authenticated { role, .. } => format!("Autenticado como {}", role),
        SessionState::Unauthenticated | SessionState::Loading => "Não autenticado".to_string(),
    }
}

/// Signed-out sessions get a sign-in hint instead of an access error.
async fn ensure_access(ctx: &AppContext, feature: Feature) -> Result<Role> {
    let role = ctx.client.session().role().await;
    if role == Role::Unauthenticated {
        return Err(CliError::NotSignedIn);
    }
    access::require(role, feature)?;
    Ok(role)
}

async fn agenda(
    ctx: &AppContext,
    today: NaiveDate,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
) -> Result<String> {
    ensure_access(ctx, Feature::Agenda).await?;

    let current = MonthCursor::containing(today);
    let cursor = MonthCursor::new(year.unwrap_or(current.year()), month.unwrap_or(current.month()))?;
    let tasks = ctx.client.tasks_for_month(cursor.year(), cursor.month()).await?;
    let agenda = AgendaMonth::new(cursor, tasks);

    let selected = match day {
        Some(day) => cursor.clamp_day(day),
        None if cursor.contains(today) => today.day(),
        None => 1,
    };
    Ok(render_agenda(&agenda, selected))
}

pub fn render_agenda(agenda: &AgendaMonth, selected: u32) -> String {
    let cursor = agenda.cursor();
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", cursor.name(), cursor.year());
    let header: Vec<String> = WEEKDAY_SHORT_NAMES.iter().map(|d| format!("{:>6}", d)).collect();
    let _ = writeln!(out, "{}", header.concat());

    for week in cursor.calendar_grid().chunks(7) {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                None => " ".repeat(6),
                Some(day) => {
                    let marker = if *day == selected { '>' } else { ' ' };
                    let count = match agenda.activity_count(*day) {
                        0 => String::new(),
                        n => format!("({})", n),
                    };
                    format!("{}{:>2}{:<3}", marker, day, count)
                }
            })
            .collect();
        let _ = writeln!(out, "{}", row.trim_end());
    }

    out.push('\n');
    if let Some(title) = agenda.day_title(selected) {
        let _ = writeln!(out, "{}", title);
    }
    let activities = agenda.activities_on(selected);
    if activities.is_empty() {
        let _ = writeln!(out, "  Nenhuma atividade neste dia.");
    }
    for task in activities {
        let _ = writeln!(out, "  {}  {}", task.time.format("%H:%M"), task.title);
        let _ = writeln!(out, "         {}", describe(task));
    }
    out.trim_end().to_string()
}

fn describe(task: &Task) -> &str {
    task.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("Sem descrição.")
}

async fn reminders(ctx: &AppContext, today: NaiveDate) -> Result<String> {
    ensure_access(ctx, Feature::Home).await?;

    let cursor = MonthCursor::containing(today);
    let tasks = ctx.client.tasks_for_month(cursor.year(), cursor.month()).await?;
    Ok(render_reminders(cursor, upcoming_reminders(tasks)))
}

pub fn render_reminders(cursor: MonthCursor, tasks: Vec<Task>) -> String {
    if tasks.is_empty() {
        return format!("Nenhum evento principal agendado para {}.", cursor.name());
    }
    tasks
        .iter()
        .map(|task| format!("{} de {} - {}", task.date.day(), cursor.name(), task.title))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn achievements(ctx: &AppContext) -> Result<String> {
    ensure_access(ctx, Feature::Achievements).await?;
    let views = load_achievements(&ctx.client).await?;
    Ok(render_achievements(&views, &ctx.config.backend.base_url))
}

pub fn render_achievements(views: &[AchievementView], base_url: &str) -> String {
    let mut out = String::new();
    for view in views {
        let a = &view.achievement;
        if view.unlocked {
            let _ = writeln!(out, "[x] {} - Desbloqueado! (+{} XP)", a.name, a.xp_reward);
        } else {
            let _ = writeln!(out, "[ ] {} - {}", a.name, a.description);
        }
        let _ = writeln!(out, "    {}", a.icon_url(base_url));
    }
    let unlocked = views.iter().filter(|v| v.unlocked).count();
    let _ = write!(
        out,
        "{}/{} conquistas, {} XP",
        unlocked,
        views.len(),
        unlocked_xp(views)
    );
    out
}

async fn members(ctx: &AppContext, today: NaiveDate) -> Result<String> {
    ensure_access(ctx, Feature::RollCallView).await?;
    let mut roll_call = RollCall::new(today);
    let members = roll_call.load_members(&ctx.client).await?;
    Ok(render_members(members))
}

pub fn render_members(members: &[Member]) -> String {
    if members.is_empty() {
        return "Nenhum membro encontrado no seu grupo.".to_string();
    }
    members
        .iter()
        .map(|m| format!("{:>6}  {}", m.id, m.full_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

async fn chamada(ctx: &AppContext, date: NaiveDate, present: Vec<i64>) -> Result<String> {
    ensure_access(ctx, Feature::RollCallSubmit).await?;

    let mut roll_call = RollCall::new(date);
    for id in present.into_iter().collect::<BTreeSet<_>>() {
        roll_call.toggle(id);
    }
    Ok(roll_call.submit(&ctx.client).await?)
}
