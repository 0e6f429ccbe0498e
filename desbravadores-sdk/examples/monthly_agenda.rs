//! Sign in and print this month's agenda.
//!
//! ```text
//! DESBRAVADORES_API_URL=http://192.168.56.1:8080 \
//!     cargo run -p desbravadores-sdk --example monthly_agenda -- a@b.com secret
//! ```

use std::sync::Arc;

use chrono::Local;
use desbravadores_sdk::{
    services::agenda::{AgendaMonth, MonthCursor},
    ApiClient, ClientConfig, Credentials, MemoryTokenStorage, SessionStore,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let (Some(email), Some(password)) = (args.next(), args.next()) else {
        eprintln!("usage: monthly_agenda <email> <password>");
        return;
    };
    let base_url = std::env::var("DESBRAVADORES_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());

    let session = Arc::new(SessionStore::new(Arc::new(MemoryTokenStorage::new())));
    let config = match ClientConfig::new(base_url) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    let client = match ApiClient::new(config, session.clone()) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };

    if let Err(e) = session.load().await {
        error!("Failed to load session: {}", e);
        return;
    }

    match client.login(Credentials::new(email, password)).await {
        Ok(role) => info!("Signed in as {}", role),
        Err(e) => {
            error!("Sign-in failed: {}", e);
            return;
        }
    }

    let cursor = MonthCursor::containing(Local::now().date_naive());
    match client.tasks_for_month(cursor.year(), cursor.month()).await {
        Ok(tasks) => {
            let agenda = AgendaMonth::new(cursor, tasks);
            println!("{} {}", cursor.name(), cursor.year());
            for (day, _) in agenda.busy_days() {
                if let Some(title) = agenda.day_title(day) {
                    println!("{}", title);
                }
                for task in agenda.activities_on(day) {
                    println!("  {} {}", task.time.format("%H:%M"), task.title);
                }
            }
        }
        Err(e) => error!("Failed to load agenda: {}", e),
    }
}
