use crate::access::AccessGate;
use crate::{audit, db};
use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, WebAppInfo};
use tracing::instrument;
use url::Url;

const GREETING: &str = "Привет! Вот кнопки с городами.";
const BUTTON_LABEL: &str = "Открыть Web App";
const REFUSAL: &str = "Доступ запрещён.";

/// Handle one inbound message. Every message is audit-logged regardless of
/// outcome; only `/start` triggers the access check and a reply.
#[instrument(skip_all)]
pub async fn handle_update(
    bot: &Bot,
    pool: &db::Pool,
    gate: &AccessGate,
    webapp_url: &Url,
    msg: &Message,
) -> Result<()> {
    let user = match msg.from() {
        Some(u) => u,
        None => return Ok(()),
    };

    let tg_user_id = user.id.0 as i64;
    let username = user.username.as_deref();
    let full_name = user.full_name();
    let text = msg.text().unwrap_or_default();

    let allowed = gate.is_allowed(tg_user_id);
    audit::record(pool, tg_user_id, username, &full_name, text, allowed).await;

    if text.trim() != "/start" {
        return Ok(());
    }

    if allowed {
        bot.send_message(msg.chat.id, GREETING)
            .reply_markup(webapp_keyboard(webapp_url))
            .await?;
    } else {
        bot.send_message(msg.chat.id, REFUSAL).await?;
    }

    Ok(())
}

fn webapp_keyboard(webapp_url: &Url) -> KeyboardMarkup {
    let button = KeyboardButton::new(BUTTON_LABEL).request(ButtonRequest::WebApp(WebAppInfo {
        url: webapp_url.clone(),
    }));
    KeyboardMarkup::new([[button]]).resize_keyboard(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_has_single_webapp_button() {
        let url = Url::parse("https://example.com/app").unwrap();
        let markup = webapp_keyboard(&url);
        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0].len(), 1);
        let button = &markup.keyboard[0][0];
        assert_eq!(button.text, BUTTON_LABEL);
        match &button.request {
            Some(ButtonRequest::WebApp(info)) => {
                assert_eq!(info.url.as_str(), "https://example.com/app");
            }
            other => panic!("unexpected button request: {other:?}"),
        }
    }
}
