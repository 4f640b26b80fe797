#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use chrono::{Datelike, Local};
    use std::net::SocketAddr;
    use task_calendar::{CalendarAssembler, CalendarConfig, InMemoryTaskStore, http_api, telemetry};

    telemetry::init_tracing("info");

    let config = CalendarConfig::from_env()?;
    let assembler = CalendarAssembler::from_config(&config);
    let this_year = Local::now().date_naive().year();
    assembler
        .holidays()
        .prefetch(config.prefetch_range(this_year));

    let addr: SocketAddr = std::env::var("TASK_CALENDAR_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    tracing::info!(%addr, "task-calendar HTTP API listening");
    let state = http_api::AppState::new(InMemoryTaskStore::new(), assembler);
    http_api::serve(addr, state).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
