// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::Parser;

use crate::api::server::start_server;
use crate::cmd;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Start the local JSON API server.
    Serve {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Port to listen on.
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Print the next study queue.
    Queue {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
        /// Maximum number of cards; defaults to the daily goal.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Record a review outcome for a card.
    Review {
        /// Card id.
        card: String,
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
        /// Mark the answer as incorrect.
        #[arg(long)]
        wrong: bool,
        /// Response latency in milliseconds.
        #[arg(long, default_value_t = 0)]
        response_ms: i64,
    },
    /// Print the words most at risk of being forgotten.
    Repeat {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
        /// Maximum number of words.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print aggregate study statistics.
    Stats {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
    },
    /// Print review counts for the last seven days.
    Weekly {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
    },
    /// Erase all review progress for a language.
    Reset {
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
    },
    /// Pin or unpin a card on the repeat list.
    Pin {
        /// Card id.
        card: String,
        /// Optional path to the data directory.
        directory: Option<String>,
        /// Language deck id; defaults to the configured language.
        #[arg(long)]
        language: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve { directory, port } => start_server(directory, port).await,
        Command::Queue {
            directory,
            language,
            limit,
        } => cmd::queue::print_queue(directory, language, limit).await,
        Command::Review {
            card,
            directory,
            language,
            wrong,
            response_ms,
        } => cmd::review::record_review(card, directory, language, wrong, response_ms).await,
        Command::Repeat {
            directory,
            language,
            limit,
        } => cmd::repeat::print_repeat_list(directory, language, limit).await,
        Command::Stats {
            directory,
            language,
        } => cmd::stats::print_stats(directory, language).await,
        Command::Weekly {
            directory,
            language,
        } => cmd::weekly::print_weekly(directory, language).await,
        Command::Reset {
            directory,
            language,
        } => cmd::reset::reset_progress(directory, language).await,
        Command::Pin {
            card,
            directory,
            language,
        } => cmd::pin::toggle_pin(card, directory, language).await,
    }
}
