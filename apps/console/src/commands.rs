use clap::{Parser, Subcommand};
use shared::domain::{AutoBatchFilter, ContentFilter, PosterId, SortOrder};

/// One line typed at the prompt. The first word picks the command.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct Repl {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Reload the library listing; pending selections are discarded
    Items {
        #[arg(long = "type")]
        filter: Option<ContentFilter>,
        #[arg(long)]
        sort: Option<SortOrder>,
    },
    /// Apply a page query such as `type=movies&sort=year`
    Browse { query: String },
    /// Search poster candidates for an item
    Posters { item_id: String },
    /// Select a candidate from the open poster list
    Pick { poster_id: PosterId },
    /// Upload the pending selection of one item
    Upload { item_id: String },
    /// Upload every pending selection
    UploadAll,
    /// Let the backend pick and upload posters (no-poster, all, movies, series)
    Auto {
        #[arg(default_value = "no-poster")]
        filter: AutoBatchFilter,
    },
    /// Upload a poster url right away, bypassing selections
    Direct { item_id: String, poster_url: String },
    /// Show items, their status and the pending selections
    Status,
    /// Show live notifications
    Notes,
    Dismiss { id: u64 },
    Health,
    /// Close the poster list
    Close,
    /// Show the last batch results; `--close` dismisses them
    Results {
        #[arg(long)]
        close: bool,
    },
    /// Print the open poster list or batch results as HTML
    Html,
    #[command(alias = "exit")]
    Quit,
}

pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    Repl::try_parse_from(words).map(|repl| Some(repl.command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_no_command() {
        assert_eq!(parse_line("   ").expect("parse"), None);
    }

    #[test]
    fn parses_kebab_case_commands() {
        assert_eq!(parse_line("upload-all").expect("parse"), Some(Command::UploadAll));
        assert_eq!(
            parse_line("pick 7").expect("parse"),
            Some(Command::Pick {
                poster_id: PosterId(7)
            })
        );
        assert_eq!(parse_line("exit").expect("parse"), Some(Command::Quit));
    }

    #[test]
    fn auto_defaults_to_items_without_poster() {
        assert_eq!(
            parse_line("auto").expect("parse"),
            Some(Command::Auto {
                filter: AutoBatchFilter::NoPoster
            })
        );
        assert_eq!(
            parse_line("auto series").expect("parse"),
            Some(Command::Auto {
                filter: AutoBatchFilter::Series
            })
        );
    }

    #[test]
    fn listing_options_parse_into_domain_values() {
        assert_eq!(
            parse_line("items --type movie --sort date_added").expect("parse"),
            Some(Command::Items {
                filter: Some(ContentFilter::Movies),
                sort: Some(SortOrder::DateAdded),
            })
        );
    }

    #[test]
    fn rejects_unknown_commands_and_values() {
        assert!(parse_line("frobnicate").is_err());
        assert!(parse_line("auto everything").is_err());
        assert!(parse_line("pick seven").is_err());
    }
}
