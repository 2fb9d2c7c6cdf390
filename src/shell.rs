use std::future::Future;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::commands::App;
use crate::db::BookmarkStorage;
use crate::draft::RecipeDraft;
use crate::gateway::Gateway;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Open(String),
    Page(usize),
    Servings(u32),
    ToggleBookmark,
    Bookmarks,
    ClearBookmarks,
    Upload(String),
    Source,
    Show,
    Back,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  search <query>      search the catalog
  open <id>           show a recipe
  page <n>            go to a page of search results
  servings <n>        rescale the open recipe
  bookmark            bookmark / unbookmark the open recipe
  bookmarks [clear]   list (or clear) bookmarks
  upload <file>       submit a recipe from a file of name=value lines
  source              open the recipe's source page in a browser
  show                print the open recipe again
  back                return to the previous recipe
  help                this text
  quit                leave";

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    let need_arg = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {word} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };
    match word.to_ascii_lowercase().as_str() {
        "search" | "s" => need_arg("query").map(ShellCommand::Search),
        "open" | "o" => need_arg("id").map(|id| ShellCommand::Open(id.trim_start_matches('#').to_string())),
        "page" | "p" => need_arg("n")?
            .parse()
            .map(ShellCommand::Page)
            .map_err(|_| format!("not a page number: {rest}")),
        "servings" => need_arg("n")?
            .parse()
            .map(ShellCommand::Servings)
            .map_err(|_| format!("not a servings count: {rest}")),
        "bookmark" | "b" => Ok(ShellCommand::ToggleBookmark),
        "bookmarks" if rest == "clear" => Ok(ShellCommand::ClearBookmarks),
        "bookmarks" => Ok(ShellCommand::Bookmarks),
        "upload" => need_arg("file").map(ShellCommand::Upload),
        "source" => Ok(ShellCommand::Source),
        "show" => Ok(ShellCommand::Show),
        "back" => Ok(ShellCommand::Back),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

/// Read `name=value` lines into form fields, in file order. Blank lines and
/// `#` comments are skipped.
pub fn parse_form(text: &str) -> Vec<(String, String)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

fn load_draft(path: &Path) -> Result<RecipeDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading recipe form {}", path.display()))?;
    Ok(RecipeDraft::from_fields(parse_form(&text)))
}

/// Drive `work` to completion. If `interrupt` fires first, `cancel` is
/// cancelled and `work` is still awaited so it can report how it ended.
pub async fn run_interruptible<W, I>(work: W, interrupt: I, cancel: &CancellationToken) -> W::Output
where
    W: Future,
    I: Future,
{
    tokio::pin!(work);
    tokio::select! {
        biased;
        out = &mut work => out,
        _ = interrupt => {
            tracing::info!("interrupted; cancelling the running command");
            cancel.cancel();
            work.await
        }
    }
}

fn print_section(title: &str, body: &str) {
    if body.is_empty() {
        return;
    }
    println!("── {title} ──");
    println!("{body}");
}

/// Interactive loop on stdin until `quit` or end of input.
pub async fn run_shell<G: Gateway, S: BookmarkStorage>(app: &mut App<G, S>) -> Result<()> {
    println!("{}", app.recipe_view.target().to_plain_text());
    println!("type `help` for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        // Ctrl-C at an idle prompt leaves the shell.
        let next = tokio::select! {
            line = lines.next_line() => line.context("reading stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = next else {
            break;
        };
        if app.close_upload_window_if_due() {
            tracing::debug!("upload window closed");
        }
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(c) => c,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }
        let cancel = CancellationToken::new();
        let outcome =
            run_interruptible(execute(app, command, &cancel), tokio::signal::ctrl_c(), &cancel).await;
        if let Err(msg) = outcome {
            println!("error: {msg}");
        }
    }
    tracing::info!("shell closed");
    Ok(())
}

async fn execute<G: Gateway, S: BookmarkStorage>(
    app: &mut App<G, S>,
    command: ShellCommand,
    cancel: &CancellationToken,
) -> Result<(), String> {
    match command {
        ShellCommand::Search(query) => {
            let r = app.control_search_results(&query, cancel).await;
            print_section("results", &app.results_view.target().to_plain_text());
            print_section("pages", &app.pagination_view.target().to_plain_text());
            r
        }
        ShellCommand::Open(id) => {
            if app.location.navigate(&id) {
                let r = app.control_recipe(cancel).await;
                print_section("recipe", &app.recipe_view.target().to_plain_text());
                r
            } else {
                print_section("recipe", &app.recipe_view.target().to_plain_text());
                Ok(())
            }
        }
        ShellCommand::Back => {
            if app.location.back() {
                let r = app.control_recipe(cancel).await;
                print_section("recipe", &app.recipe_view.target().to_plain_text());
                r
            } else {
                Err("no earlier recipe".to_string())
            }
        }
        ShellCommand::Page(n) => {
            app.control_pagination(n);
            print_section("results", &app.results_view.target().to_plain_text());
            print_section("pages", &app.pagination_view.target().to_plain_text());
            Ok(())
        }
        ShellCommand::Servings(n) => {
            let r = app.control_servings(n);
            print_section("recipe", &app.recipe_view.target().to_plain_text());
            r
        }
        ShellCommand::ToggleBookmark => {
            let r = app.control_toggle_bookmark();
            print_section("bookmarks", &app.bookmarks_view.target().to_plain_text());
            r
        }
        ShellCommand::Bookmarks => {
            app.control_bookmarks();
            print_section("bookmarks", &app.bookmarks_view.target().to_plain_text());
            Ok(())
        }
        ShellCommand::ClearBookmarks => {
            let r = app.control_clear_bookmarks();
            print_section("bookmarks", &app.bookmarks_view.target().to_plain_text());
            r
        }
        ShellCommand::Upload(path) => match load_draft(Path::new(&path)) {
            Ok(draft) => {
                let r = app.control_add_recipe(draft, cancel).await;
                print_section("upload", &app.upload_view.target().to_plain_text());
                if r.is_ok() {
                    print_section("recipe", &app.recipe_view.target().to_plain_text());
                }
                r
            }
            Err(e) => Err(format!("{e:#}")),
        },
        ShellCommand::Source => app.open_source(),
        ShellCommand::Show => {
            print_section("recipe", &app.recipe_view.target().to_plain_text());
            Ok(())
        }
        ShellCommand::Help => {
            println!("{HELP}");
            Ok(())
        }
        ShellCommand::Quit => Ok(()),
    }
}
