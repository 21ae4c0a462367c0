// notifier/telegram/command_handler.rs

use crate::analyzer::filter::{by_day, by_merchant, by_wallet, list_wallets};
use crate::analyzer::Analyzer;
use crate::model::MerchantPromotionSet;
use crate::notifier::telegram::format;
use crate::notifier::telegram::TelegramNotifier;
use crate::utils::split_terms;
use crate::weekday::Weekday;
use tracing::{info, warn};

const HELP: &str = "📋 Available commands:\n\
    /ping - check connection\n\
    /help - command list\n\
    /top [n] - best promotions\n\
    /wallets - known payment methods\n\
    /wallet a,b - promotions of those payment methods\n\
    /super a,b - promotions of those supermarkets\n\
    /hoy - promotions valid today\n\
    /refresh - scrape all supermarkets now\n\
    /uptime - service uptime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Help,
    Top(Option<usize>),
    Wallets,
    Wallet(Vec<String>),
    Super(Vec<String>),
    Today,
    Refresh,
    Uptime,
    Unknown,
}

impl Command {
    /// Parses "/cmd@bot args" messages.
    pub fn parse(text: &str) -> Command {
        let text = text.trim();
        let (head, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        let name = head.split('@').next().unwrap_or(head);
        match name {
            "/ping" => Command::Ping,
            "/help" | "/start" => Command::Help,
            "/top" => Command::Top(args.trim().parse().ok()),
            "/wallets" => Command::Wallets,
            "/wallet" => Command::Wallet(split_terms(args)),
            "/super" => Command::Super(split_terms(args)),
            "/hoy" => Command::Today,
            "/refresh" => Command::Refresh,
            "/uptime" => Command::Uptime,
            _ => Command::Unknown,
        }
    }
}

/// Builds the reply to a command.
pub async fn respond(command: &Command, notifier: &TelegramNotifier) -> String {
    let sets = match command {
        Command::Super(names) if !names.is_empty() => {
            let storage = notifier.storage.lock().await;
            let mut sets: Vec<MerchantPromotionSet> = Vec::new();
            for name in names {
                match storage.get_promotions(name) {
                    Ok(Some(set)) if !sets.iter().any(|s| s.merchant == set.merchant) => sets.push(set),
                    Ok(_) => {}
                    Err(e) => {
                        warn!("Cannot read promotions of {}: {:?}", name, e);
                        return format!("❌ Error: {}", e);
                    }
                }
            }
            sets
        }
        Command::Top(_) | Command::Wallets | Command::Wallet(_) | Command::Today => {
            match notifier.storage.lock().await.get_all_promotions() {
                Ok(sets) => sets,
                Err(e) => {
                    warn!("Cannot read promotions: {:?}", e);
                    return format!("❌ Error: {}", e);
                }
            }
        }
        _ => Vec::new(),
    };

    match command {
        Command::Ping => "✅ I am online!".to_string(),
        Command::Help => HELP.to_string(),
        Command::Top(limit) => {
            let limit = limit.unwrap_or(notifier.config.top_limit);
            format::groups(
                &format!("🏆 Top {} promotions:", limit),
                &notifier.analyzer.top_discounts(&sets, limit),
            )
        }
        Command::Wallets => format::wallets(&list_wallets(&sets)),
        Command::Wallet(terms) if terms.is_empty() => "ℹ️ Usage: /wallet mercado pago, galicia".to_string(),
        Command::Wallet(terms) => format::groups(&format!("👛 {}", terms.join(", ")), &by_wallet(&sets, terms)),
        Command::Super(names) if names.is_empty() => "ℹ️ Usage: /super coto, dia".to_string(),
        Command::Super(names) => format::groups(&format!("🏪 {}", names.join(", ")), &by_merchant(&sets, names)),
        Command::Today => {
            let today = Weekday::today();
            format::groups(&format!("📅 Promotions for {}:", today.spanish()), &by_day(&sets, &[today]))
        }
        Command::Refresh => {
            info!("/refresh command received, triggering refresh...");
            notifier.refresh_notify.notify_one();
            "🔄 Refresh started.".to_string()
        }
        Command::Uptime => format::uptime(notifier.start_time.elapsed()),
        Command::Unknown => "🤖 Unknown command. Type /help for a list of commands.".to_string(),
    }
}

/// Handles an incoming command and answers in the chat.
pub async fn handle_command(command_text: &str, notifier: &TelegramNotifier) {
    info!("Handling command: {}", command_text);
    let command = Command::parse(command_text);
    let reply = respond(&command, notifier).await;
    if let Err(e) = notifier.notify_text(&reply).await {
        warn!("{:?} reply error: {:?}", command, e);
    }
}
