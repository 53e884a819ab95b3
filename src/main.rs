use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::Instant;

use virtual_office_lib::api::LoginRequest;
use virtual_office_lib::config::{load_config, load_config_from};
use virtual_office_lib::types::Position;
use virtual_office_lib::{logs, OfficeClient, OfficeEvent, OfficeView};

#[derive(Parser, Debug)]
#[command(author, version, about = "Join the virtual office floor from a terminal", long_about = None)]
struct Args {
    /// Account email; omit to reuse a remembered session
    #[arg(short, long, env = "VIRTUAL_OFFICE_EMAIL")]
    email: Option<String>,

    /// Account password
    #[arg(short, long, env = "VIRTUAL_OFFICE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Keep the session for the next run
    #[arg(long)]
    remember: bool,

    /// Space to enter instead of the configured one
    #[arg(short, long)]
    space: Option<String>,

    /// Drag the avatar to X,Y (percent of the floor) once entered
    #[arg(long = "move", value_name = "X,Y", value_parser = parse_position)]
    move_to: Option<Position>,

    /// Config file instead of ~/.virtual-office/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_position(raw: &str) -> Result<Position, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{raw}'"))?;
    let x: f64 = x.trim().parse().map_err(|_| format!("invalid x '{x}'"))?;
    let y: f64 = y.trim().parse().map_err(|_| format!("invalid y '{y}'"))?;
    Ok(Position::new(x, y))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    };
    if let Some(space) = args.space.clone() {
        config.space_id = space;
    }

    let logs_dir = config.data_dir().map(|d| d.join("logs"));
    logs::init_logging(logs_dir.as_deref()).context("failed to set up logging")?;

    let client = OfficeClient::new(config).context("failed to build API client")?;
    sign_in(&client, &args).await?;

    let office = client.mount_office().await?;
    let mut events = office.subscribe();
    if let Some(target) = args.move_to {
        let applied = office.drag_to(target.x, target.y);
        tracing::info!(x = applied.x, y = applied.y, "moving avatar");
    }

    // Polling stops on a failed fetch; retry once per poll interval until it recovers.
    let retry_after = client.config().poll_interval();
    let mut retry_at: Option<Instant> = None;
    loop {
        let deadline = retry_at;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                retry_at = None;
                office.retry().await;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if needs_retry(&event) && retry_at.is_none() {
                        tracing::info!("retrying in {}s", retry_after.as_secs());
                        retry_at = Some(Instant::now() + retry_after);
                    }
                    print_event(&office, &event);
                }
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    tracing::info!("leaving the office");
    office.unmount().await;
    Ok(())
}

async fn sign_in(client: &OfficeClient, args: &Args) -> anyhow::Result<()> {
    match (&args.email, &args.password) {
        (Some(email), Some(password)) => {
            let request = LoginRequest {
                email: email.clone(),
                password: password.clone(),
                remember_me: args.remember,
            };
            client
                .auth
                .login(&request)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            Ok(())
        }
        (Some(_), None) => bail!("--password is required with --email"),
        _ if client.auth.is_authenticated().await => Ok(()),
        _ => bail!("no remembered session; pass --email and --password"),
    }
}

fn needs_retry(event: &OfficeEvent) -> bool {
    matches!(event, OfficeEvent::StateChanged { state } if state.is_error())
}

fn print_event(office: &OfficeView, event: &OfficeEvent) {
    match event {
        OfficeEvent::StateChanged { state } => match state.error_message() {
            Some(message) => println!("! {message}"),
            None => println!("* {state:?}"),
        },
        OfficeEvent::RosterUpdated { members, online } => {
            println!("{online}/{members} online in {}", office.space_id());
            for user in office.roster() {
                let at = user
                    .position
                    .map(|p| format!("({:.0}, {:.0})", p.x, p.y))
                    .unwrap_or_else(|| "-".into());
                println!("  {} {:<24} {:<8} {at}", user.avatar, user.name, user.status.label());
            }
        }
        OfficeEvent::PositionCommitted { x, y } => println!("> now at ({x:.0}, {y:.0})"),
        OfficeEvent::Error { message } => println!("! {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use virtual_office_lib::ViewState;

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_position("40, 55.5").unwrap(), Position::new(40.0, 55.5));
        assert!(parse_position("40").is_err());
        assert!(parse_position("a,1").is_err());
    }

    #[test]
    fn test_only_error_state_schedules_retry() {
        let failed = OfficeEvent::StateChanged {
            state: ViewState::Error("Internal server error".into()),
        };
        assert!(needs_retry(&failed));
        assert!(!needs_retry(&OfficeEvent::StateChanged { state: ViewState::Ready }));
        assert!(!needs_retry(&OfficeEvent::Error {
            message: "Internal server error".into()
        }));
    }
}
