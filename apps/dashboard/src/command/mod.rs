pub mod charts;
pub mod more;
pub mod search;
pub mod select;
pub mod sentiment;

use std::str::FromStr;

use anyhow::{Result, bail};
use stock::model::{FeedKind, SentimentSource};

use crate::Session;

pub const HELP: &str = "\
Type to search for a stock, or:
  /select <TICKER>               show the dashboard for a ticker
  /more <tweets|news|reddit>     load the next page of a feed
  /sentiment <tweet|news|reddit> switch the sentiment source
  /refresh                       refetch the dashboard for the ticker
  /charts                        write PNG charts for the ticker
  /help                          show this message
  /quit                          exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    Select(String),
    More(FeedKind),
    Sentiment(SentimentSource),
    Refresh,
    Charts,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Command::Search(line.to_string()));
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        match (name, arg) {
            ("select", "") => bail!("usage: /select <TICKER>"),
            ("select", ticker) => Ok(Command::Select(ticker.to_string())),
            ("more", kind) => Ok(Command::More(kind.parse()?)),
            ("sentiment", source) => Ok(Command::Sentiment(source.parse()?)),
            ("refresh", _) => Ok(Command::Refresh),
            ("charts", _) => Ok(Command::Charts),
            ("help", _) => Ok(Command::Help),
            ("quit" | "exit", _) => Ok(Command::Quit),
            (other, _) => bail!("unknown command /{other}, try /help"),
        }
    }
}

/// Run a per-ticker command. Searches and quitting are handled by the caller.
pub async fn run(session: &mut Session, command: Command) -> Result<()> {
    match command {
        Command::Select(ticker) => select::run(session, &ticker).await,
        Command::More(kind) => more::run(session, kind).await,
        Command::Sentiment(source) => sentiment::run(session, source).await,
        Command::Refresh => select::refresh(session).await,
        Command::Charts => charts::run(session).await,
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Search(_) | Command::Quit => Ok(()),
    }
}
