//! Interactive chat and one-shot subcommand handlers for Focus Partner.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use focus_config::Config;
use focus_protocols::{Role, TranscriptEntry};
use focus_surface::{ChatSurface, SurfacePort};

use crate::browser::{Browser, Page};
use crate::cli::SurfaceChoice;

const FIRST_TAB: u32 = 1;

/// Run the interactive chat on the chosen surface until `/quit` or EOF.
pub(crate) async fn handle_chat(
    config: Config,
    surface: SurfaceChoice,
    url: &str,
    page_text: Option<String>,
) -> anyhow::Result<()> {
    let browser = Browser::launch(config).await?;
    let page = browser.open_page(FIRST_TAB, url, page_text);

    let mut verdicts = page.relay.subscribe();
    tokio::spawn(async move {
        while let Ok(verdict) = verdicts.recv().await {
            println!(
                "[tab {}] {} judged {} for \"{}\"",
                FIRST_TAB,
                verdict.url,
                verdict.relevance.as_str(),
                verdict.goal
            );
        }
    });

    match surface {
        SurfaceChoice::Popup => repl(browser.open_popup(), &page).await,
        SurfaceChoice::Overlay => {
            let overlay = browser.open_overlay(&page);
            let result = repl(overlay.clone(), &page).await;
            overlay.port().close();
            result
        }
    }
}

async fn repl<P: SurfacePort>(surface: ChatSurface<P>, page: &Page) -> anyhow::Result<()> {
    print_entries(&surface.init().await?);
    println!("Commands: /start /stop /remind /navigate <url> [text] /state /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        debug!("{} surface input: {}", surface.kind().as_str(), line);

        let appended = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/start", _) => surface.start().await,
            ("/stop", _) => surface.stop().await,
            ("/remind", _) => surface.remind().await,
            ("/state", _) => {
                match serde_json::to_string_pretty(&surface.state().await) {
                    Ok(state) => println!("{}", state),
                    Err(e) => warn!("Failed to render surface state: {}", e),
                }
                continue;
            }
            ("/navigate", rest) => {
                let (url, text) = match rest.trim().split_once(' ') {
                    Some((url, text)) => (url, Some(text.to_string())),
                    None => (rest.trim(), None),
                };
                if url.is_empty() {
                    println!("usage: /navigate <url> [text]");
                } else {
                    page.navigate(url, text);
                }
                continue;
            }
            _ => surface.send(line).await,
        };
        // Start and remind only answer when they apply.
        if appended.is_empty() && line.starts_with('/') {
            println!("(nothing to do in this state)");
        }
        print_entries(&appended);
    }

    info!("Chat ended");
    Ok(())
}

/// One relevance check across agent, relay and hub.
pub(crate) async fn handle_check(config: Config, goal: &str, text: &str) -> anyhow::Result<()> {
    let browser = Browser::launch(config).await?;
    let page = browser.open_page(FIRST_TAB, "about:blank", Some(text.to_string()));
    let relevance = page.agent.check_relevance(goal, text).await;
    println!("{}", relevance.as_str());
    Ok(())
}

/// One completion through the hub, as the popup asks for it.
pub(crate) async fn handle_complete(config: Config, prompt: &str) -> anyhow::Result<()> {
    let browser = Browser::launch(config).await?;
    let popup = browser.open_popup();
    match popup.port().complete(prompt.to_string()).await {
        Some(text) => println!("{}", text),
        None => anyhow::bail!("no completion arrived in time"),
    }
    Ok(())
}

fn print_entries(entries: &[TranscriptEntry]) {
    for entry in entries {
        let who = match entry.role {
            Role::User => "you",
            Role::Assistant => "partner",
        };
        println!("{:>8}: {}", who, entry.content);
    }
}
