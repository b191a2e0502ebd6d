//! vkbd-demo: drives the virtual keyboard from a terminal.
//!
//! The demo builds the same window a touch application would: two virtual
//! line edits (the second one works without focus), a virtual text edit, a
//! regular line edit, and the keyboard itself.  Physical keys are captured by
//! the interceptor; on-screen keys are clicked by name.
//!
//! # Usage
//!
//! ```text
//! vkbd-demo [--config <PATH>] [--layout <PATH>]
//! ```
//!
//! Commands are read from stdin, one per line:
//!
//! | Command          | Effect                                          |
//! |------------------|-------------------------------------------------|
//! | `click <symbol>` | Click the on-screen key labelled `symbol`       |
//! | `type <text>`    | Press physical keys producing `text`            |
//! | `key <name>`     | Press a named physical key (`enter`, `left`...) |
//! | `focus <n>`      | Focus field `n` (1-4)                           |
//! | `page <id>`      | Switch the keyboard to page `id`                |
//! | `show`           | Print fields and the visible page               |
//! | `quit`           | Exit                                            |
//!
//! Set `RUST_LOG=debug` to watch key routing.

use std::io::BufRead;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use vkbd_core::PhysicalKey;
use vkbd_ui::application::interceptor::{
    ForwardToFocused, InterceptPolicy, SingleFieldInjection,
};
use vkbd_ui::application::keyboard::VirtualKeyboard;
use vkbd_ui::application::services::Services;
use vkbd_ui::application::virtual_input::{VirtualLineEdit, VirtualTextEdit};
use vkbd_ui::infrastructure::storage::config::{load_config, InterceptorPolicyKind};
use vkbd_ui::infrastructure::toolkit::headless::HeadlessToolkit;
use vkbd_ui::infrastructure::toolkit::{
    HostWindow, PhysicalKeyEvent, TextControl, Toolkit, Widget,
};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Terminal demo of the virtual keyboard.
#[derive(Debug, Parser)]
#[command(name = "vkbd-demo", about = "Drive the virtual keyboard from stdin", version)]
struct Cli {
    /// Configuration file; a missing file means defaults.
    #[arg(long, default_value = "vkbd.toml", env = "VKBD_CONFIG")]
    config: PathBuf,

    /// Root layout, overriding the configuration.
    #[arg(long, env = "VKBD_LAYOUT")]
    layout: Option<PathBuf>,
}

// ── Commands ──────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Click(String),
    Type(String),
    Key(PhysicalKey),
    Focus(usize),
    Page(String),
    Show,
    Quit,
}

impl Command {
    fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        Ok(match verb {
            "click" if !rest.is_empty() => Command::Click(rest.to_string()),
            // Keep interior spaces: "type a b" types "a b".
            "type" if !rest.is_empty() => Command::Type(rest.to_string()),
            "key" => Command::Key(
                PhysicalKey::from_name(rest.trim())
                    .with_context(|| format!("unknown key name '{}'", rest.trim()))?,
            ),
            "focus" => Command::Focus(
                rest.trim()
                    .parse()
                    .with_context(|| format!("'{}' is not a field number", rest.trim()))?,
            ),
            "page" if !rest.is_empty() => Command::Page(rest.trim().to_string()),
            "show" => Command::Show,
            "quit" | "exit" => Command::Quit,
            _ => bail!("unrecognised command '{line}'"),
        })
    }
}

/// A text field of the demo window.
struct Field {
    label: &'static str,
    widget: Rc<dyn Widget>,
    control: Rc<dyn TextControl>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(layout) = cli.layout {
        config.keyboard.root_layout = layout;
    }

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(root = %config.keyboard.root_layout.display(), "virtual keyboard demo starting");

    let toolkit = Rc::new(HeadlessToolkit::new());
    let window = toolkit.create_window();
    let mut services = Services::new();
    services.install_key_bus()?;

    let preview = VirtualLineEdit::new(&services, &*toolkit)?;
    preview
        .control()
        .set_placeholder_text("Virtual keystrokes will appear here");
    let preview2 = VirtualTextEdit::new(&services, &*toolkit)?;
    preview2
        .control()
        .set_placeholder_text("Virtual keystrokes will appear here");
    let preview3 = VirtualLineEdit::new(&services, &*toolkit)?;
    preview3.control().set_placeholder_text("I don't need focus");
    preview3.set_requires_focus(false);
    let regular = toolkit.create_line_edit();
    regular.set_placeholder_text("I'm just a regular line edit, not a virtual one");

    let policy: Box<dyn InterceptPolicy> = match config.interceptor.policy {
        InterceptorPolicyKind::ForwardToFocused => Box::new(ForwardToFocused),
        InterceptorPolicyKind::SingleField => {
            Box::new(SingleFieldInjection::new(preview3.control()))
        }
    };
    let interceptor = services.install_interceptor(policy)?;
    let host: Rc<dyn HostWindow> = window.clone();
    interceptor.attach(&host);
    let _observer = interceptor.observe(|event| {
        debug!(key = ?event.key, text = ?event.text, "global key");
    });

    let keyboard = VirtualKeyboard::from_config(&services, toolkit.clone(), &config.keyboard)?;
    for (page, err) in &keyboard.report().failed {
        eprintln!("warning: layout page {page} failed to load: {err}");
    }

    let fields = [
        Field {
            label: "virtual line",
            widget: preview.clone(),
            control: preview.control(),
        },
        Field {
            label: "virtual text",
            widget: preview2.clone(),
            control: preview2.control(),
        },
        Field {
            label: "no-focus line",
            widget: preview3.clone(),
            control: preview3.control(),
        },
        Field {
            label: "regular line",
            widget: Rc::clone(&regular).into_widget(),
            control: Rc::clone(&regular),
        },
    ];
    window.set_focus(Rc::clone(&fields[0].widget));

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("error: {err:#}");
                continue;
            }
        };
        match command {
            Command::Click(symbol) => {
                if !keyboard.press(&symbol) {
                    eprintln!("error: no key '{symbol}' on the visible page");
                }
            }
            Command::Type(text) => {
                for ch in text.chars() {
                    window.press_key(PhysicalKeyEvent::text(ch.to_string()));
                }
            }
            Command::Key(key) => {
                window.press_key(PhysicalKeyEvent::named(key));
            }
            Command::Focus(n) => match n.checked_sub(1).and_then(|i| fields.get(i)) {
                Some(field) => window.set_focus(Rc::clone(&field.widget)),
                None => eprintln!("error: field must be 1-{}", fields.len()),
            },
            Command::Page(id) => {
                if let Err(err) = keyboard.switch_to(&id) {
                    eprintln!("error: {err}");
                }
            }
            Command::Show => show(&keyboard, &fields),
            Command::Quit => break,
        }
    }

    info!("virtual keyboard demo stopped");
    Ok(())
}

fn show(keyboard: &VirtualKeyboard, fields: &[Field]) {
    for (i, field) in fields.iter().enumerate() {
        let marker = if field.control.has_focus() { "*" } else { " " };
        println!("{marker}{} {:<14} {:?}", i + 1, field.label, field.control.text());
    }
    match keyboard.active_page() {
        Some(page) => println!(
            "page {} ({}): {}",
            page.page_id,
            page.name,
            page.key_labels().join(" ")
        ),
        None => println!("no page visible"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
