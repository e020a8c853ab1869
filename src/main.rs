use anyhow::Result;
use teloxide::prelude::*;
use tg_citybot::{access, config, db, handlers, server};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let cfg = config::Config::from_env()?;

    let pool = db::init_pool(&cfg.database_url).await?;
    if let Err(err) = db::init_schema(&pool).await {
        // Store-dependent paths degrade individually; the bot itself can
        // still answer /start.
        error!(?err, "schema initialization failed, continuing without a usable store");
    }

    let gate = access::AccessGate::new(cfg.allow_all_users, cfg.admin_ids.iter().copied());

    let server_pool = pool.clone();
    let web_port = cfg.web_port;
    let static_dir = cfg.static_dir.clone();
    tokio::spawn(async move {
        if let Err(err) = server::run(web_port, server_pool, &static_dir).await {
            error!(?err, "web server exited");
        }
    });

    let bot = Bot::new(cfg.bot_token.clone());
    let webapp_url = cfg.webapp_url.clone();

    info!("starting telegram bot");
    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let pool = pool.clone();
        let gate = gate.clone();
        let webapp_url = webapp_url.clone();
        async move {
            if let Err(err) = handlers::handle_update(&bot, &pool, &gate, &webapp_url, &msg).await {
                error!(?err, "failed to handle update");
            }
            respond(())
        }
    })
    .await;

    Ok(())
}
