//! Soil Insight
//!
//! Interactive terminal form for the soil spectrometer analysis service:
//! enter a water level and wavelength readings, submit them, browse model
//! metrics and wavelength rankings, and ask follow-up questions.

use anyhow::Result;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use soil_insight::cli::{self, Command, HELP};
use soil_insight::form::ViewState;
use soil_insight::render;
use soil_insight::{AppConfig, CachedGateway, FormSession, HttpGateway, SessionController, SessionStore, SoilGateway};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soil_insight=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env();
    info!("Using analysis service at {}", config.api_url);

    println!("\n{}", "═".repeat(60));
    println!("🌱 Soil Insight v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", "═".repeat(60));
    println!("Backend: {}", config.api_url);
    println!("{}\n", "═".repeat(60));

    let http: Arc<dyn SoilGateway> = Arc::new(HttpGateway::from_config(&config));
    let gateway = Arc::new(CachedGateway::new(http));
    let store = SessionStore::new(&config.session_file);

    let mut controller = SessionController::from_config(gateway.clone(), &config);
    match store.load().await {
        Ok(Some(session)) => {
            controller = controller.with_session(session);
            println!("💾 Session restored from '{}'", store.path().display());
        }
        Ok(None) => {}
        Err(e) => warn!("Starting a fresh session: {:#}", e),
    }

    println!("\n💡 Type 'help' for commands.\n");
    print!("{}", render::render_form(&*controller.session().await));

    loop {
        print!("\n🧪 > ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let command = match cli::parse(&input) {
            Ok(command) => command,
            Err(e) => {
                println!("❓ {}", e);
                continue;
            }
        };

        match command {
            Command::Quit => {
                println!("\n👋 Goodbye!\n");
                break;
            }
            Command::Help => println!("{}", HELP),
            Command::Water(raw) => {
                let mut session = controller.session().await;
                session.set_water_level(&raw);
                print!("{}", render::render_form(&session));
            }
            Command::Rows(n) => {
                let mut session = controller.session().await;
                let applied = session.rows.resize(n);
                if applied != n {
                    println!("Row count clamped to {}", applied);
                }
                print!("{}", render::render_form(&session));
            }
            Command::Label { row, label } => {
                let mut session = controller.session().await;
                let rows = &mut session.rows;
                let Some(id) = rows.row_at(row).map(|r| r.id) else {
                    println!("⚠️  There is no row {}", row + 1);
                    continue;
                };
                if rows.set_label(id, &label) {
                    print!("{}", render::render_rows(rows));
                } else {
                    println!(
                        "⚠️  '{}' is not available for row {}. Free: {}",
                        label,
                        row + 1,
                        rows.available_labels_for(id).join(", ")
                    );
                }
            }
            Command::Value { row, raw } => {
                let mut session = controller.session().await;
                let rows = &mut session.rows;
                let Some(id) = rows.row_at(row).map(|r| r.id) else {
                    println!("⚠️  There is no row {}", row + 1);
                    continue;
                };
                if rows.set_value(id, &raw) {
                    print!("{}", render::render_rows(rows));
                } else {
                    println!("⚠️  '{}' is not a number", raw);
                }
            }
            Command::Available(row) => {
                let session = controller.session().await;
                let rows = &session.rows;
                match rows.row_at(row) {
                    Some(r) => println!("{}", rows.available_labels_for(r.id).join(", ")),
                    None => println!("⚠️  There is no row {}", row + 1),
                }
            }
            Command::Show => {
                let session = controller.session().await;
                match session.view {
                    ViewState::Form => print!("{}", render::render_form(&session)),
                    ViewState::Metrics => {
                        if let Some(table) = &session.metrics {
                            let current = session.submitted.as_ref().and_then(|p| p.water_level_key());
                            print!("{}", render::render_metrics(table, current.as_deref()));
                        }
                    }
                }
            }
            Command::Submit => {
                println!("⏳ Analyzing...");
                match controller.submit_analysis().await {
                    Ok(result) => print!("{}", render::render_analysis(&result)),
                    Err(e) => println!("❌ {}", e),
                }
            }
            Command::Metrics => {
                let table = match controller.load_metrics().await {
                    Ok(table) => table,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                };
                controller.view_metrics().await;
                let session = controller.session().await;
                let current = session.submitted.as_ref().and_then(|p| p.water_level_key());
                print!("{}", render::render_metrics(&table, current.as_deref()));
            }
            Command::Back => {
                controller.back_to_form().await;
                print!("{}", render::render_form(&*controller.session().await));
            }
            Command::Top { attribute, count } => {
                {
                    let mut session = controller.session().await;
                    let top_x = &mut session.top_x;
                    top_x.set_attribute(attribute);
                    if top_x.set_count(count) != count {
                        println!("Count clamped to {}", top_x.count());
                    }
                }
                match controller.refresh_ranking().await {
                    Ok(ranking) => print!("{}", render::render_ranking(attribute, &ranking)),
                    Err(e) => println!("❌ {}", e),
                }
            }
            Command::Chat(question) => {
                println!("⏳ Thinking...");
                match controller.send_chat(&question).await {
                    Ok(reply) => println!("🤖 {}", reply),
                    Err(e) => println!("❌ {}", e),
                }
            }
            Command::History => print!("{}", render::render_transcript(&controller.session().await.transcript)),
            Command::Save => match store.save(&*controller.session().await).await {
                Ok(()) => println!("💾 Saved to '{}'", store.path().display()),
                Err(e) => println!("❌ {:#}", e),
            },
            Command::Reset => {
                *controller.session().await = FormSession::with_transcript_turns(config.transcript_turns);
                gateway.clear().await;
                if let Err(e) = store.clear().await {
                    warn!("Could not remove session file: {}", e);
                }
                println!("🗑️  Form cleared.");
                print!("{}", render::render_form(&*controller.session().await));
            }
        }
    }

    Ok(())
}
