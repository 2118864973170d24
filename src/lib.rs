//! Sequentially tagged math notes for a markdown vault.
//!
//! Notes are named after a four-character base-36 tag drawn from a counter
//! kept in the vault's local storage. `sync` rebuilds that counter from the
//! notes that actually exist.

pub mod allocator;
pub mod archivist;
pub mod args;
pub mod catalog;
pub mod editor;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod notify;
pub mod picker;
pub mod render;
pub mod settings;
pub mod shared;
pub mod storage;
pub mod sync;
pub mod tag;
pub mod template;
pub mod vault;

use crate::archivist::Archivist;
use crate::args::{CreateFlags, DisplayFlags};
use crate::catalog::{describe, scan_tag_notes};
use crate::editor::DocumentSelection;
use crate::error::ArchivistError;
use crate::formatting::{FormatContext, TimeFormatter};
use crate::notify::ConsoleNotifier;
use crate::picker::{FzfPicker, Picker, QueryPicker};
use crate::settings::{Settings, load_settings, save_settings, settings_path, state_dir};
use crate::shared::table::render_table;
use crate::storage::FileStore;
use crate::sync::FilenamePattern;
use crate::tag::Tag;
use crate::template::NoteType;
use crate::vault::{FsVault, NoteFile, Vault, join_path};
use chrono::Local;
use std::env;
use std::error::Error;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, Stdio};

pub use allocator::{Allocation, TagAllocator};
pub use storage::{KeyValueStore, TAG_COUNT_KEY};
pub use sync::{SyncReport, TagSynchronizer};

pub const VAULT_ENV: &str = "MATH_ARCHIVIST_VAULT";

type Cli = Archivist<FsVault, FileStore, ConsoleNotifier>;

/// Run one command from the process arguments. Usage errors come back as
/// `Err`; command failures have already been reported to the user and come
/// back as a failing exit code.
pub fn entry() -> Result<ExitCode, Box<dyn Error>> {
    if let Err(err) = logging::init_logging() {
        eprintln!("Logging disabled: {err}");
    }

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    let cmd = args.remove(0);
    let root = vault_root()?;

    let outcome = match cmd.as_str() {
        "new" => new_note(args, &root)?,
        "typed" => typed_note(args, &root)?,
        "extract" => extract_note(args, &root)?,
        "sync" => sync_tags(&root),
        "next" => next_tag(&root)?,
        "list" => list_notes(args, &root)?,
        "view" => view_note(args, &root)?,
        "types" => {
            for name in NoteType::names() {
                println!("{name}");
            }
            true
        }
        "settings" => settings_command(args, &root)?,
        "path" => {
            println!("{}", root.display());
            true
        }
        "help" | "--help" | "-h" => {
            print_help();
            true
        }
        other => return Err(format!("Unknown command: {other} (see `ma help`)").into()),
    };

    Ok(if outcome { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn print_help() {
    println!(
        "\
Math Archivist
Usage:
  ma new [content...] [--open]    Create a note with the next tag (default content when none given)
  ma typed [--type <name>] [--open]
                                  Create a typed note (fzf picker unless --type is given)
  ma extract <doc> (--lines A:B | --text <s>) [--typed] [--type <name>] [--open]
                                  Move the selection into a new note and embed it as ![[TAG]]
  ma sync                         Rebuild the tag counter from the notes in the tag folder
  ma next                         Show the tag the next note will get
  ma list [--relative|-r] [--plain]
                                  List tag notes
  ma view <TAG> [--plain]         Show a tag note
  ma types                        List note types
  ma settings [show]              Show settings
  ma settings set <key> <value>   Set tag-path, default-content or lenient-sync
  ma settings reset               Restore default settings
  ma path                         Show the vault directory
  ma help                         Show this message

Environment:
  MATH_ARCHIVIST_VAULT            Vault directory (default: current directory)
  MATH_ARCHIVIST_LOG              Log level for stderr diagnostics (default: warn)
  MATH_ARCHIVIST_NO_FZF           Never launch fzf
  NO_COLOR                        Disable colored output
"
    );
}

fn vault_root() -> io::Result<PathBuf> {
    if let Ok(dir) = env::var(VAULT_ENV) {
        return Ok(PathBuf::from(dir));
    }
    env::current_dir()
}

fn load_archivist(root: &Path) -> Cli {
    Archivist::load(
        FsVault::new(root),
        FileStore::in_state_dir(&state_dir(root)),
        ConsoleNotifier::from_env(),
        load_settings(&settings_path(root)),
    )
}

fn picker_for(type_query: Option<&str>) -> Box<dyn Picker> {
    match type_query {
        Some(query) => Box::new(QueryPicker::new(query)),
        None => Box::new(FzfPicker::for_note_types()),
    }
}

fn new_note(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let flags = CreateFlags::parse(args, "new")?;
    let mut archivist = load_archivist(root);
    let created = if flags.positional.is_empty() {
        archivist.create_note()
    } else {
        archivist.create_note_with_new_tag(&flags.positional.join(" "), None, &[])
    };
    finish_create(&archivist, created, flags.open)
}

fn typed_note(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let flags = CreateFlags::parse(args, "typed")?;
    let mut archivist = load_archivist(root);
    let picker = picker_for(flags.type_query.as_deref());
    let created = archivist.create_with_type(picker.as_ref());
    finish_create(&archivist, created, flags.open)
}

fn extract_note(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let flags = CreateFlags::parse(args, "extract")?;
    let usage = "Usage: ma extract <doc> (--lines A:B | --text <s>) [--typed] [--type <name>]";
    let doc = flags.positional.first().ok_or(usage)?;
    let spec = flags.selection.as_ref().ok_or(usage)?;

    let mut archivist = load_archivist(root);
    let doc_vault = FsVault::new(root);
    let mut selection = DocumentSelection::open(&doc_vault, doc, spec)?;
    let created = if flags.typed {
        let picker = picker_for(flags.type_query.as_deref());
        archivist.create_with_type_from_selection(&mut selection, picker.as_ref())
    } else {
        archivist.create_from_selection(&mut selection, None)
    };
    finish_create(&archivist, created, flags.open)
}

fn finish_create(
    archivist: &Cli,
    created: Result<NoteFile, ArchivistError>,
    open: bool,
) -> Result<bool, Box<dyn Error>> {
    let Ok(file) = created else {
        return Ok(false);
    };
    println!("{}", file.path);
    if open {
        open_in_editor(&archivist.vault().absolute_path(&file.path)?)?;
    }
    Ok(true)
}

fn open_in_editor(path: &Path) -> Result<(), Box<dyn Error>> {
    let editor = env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(path)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()?;
    if !status.success() {
        return Err(ArchivistError::Editor.into());
    }
    Ok(())
}

fn sync_tags(root: &Path) -> bool {
    load_archivist(root)
        .sync_tags()
        .is_ok_and(|report| report.is_durable())
}

fn next_tag(root: &Path) -> Result<bool, Box<dyn Error>> {
    let archivist = load_archivist(root);
    println!("{}", archivist.next_tag_preview()?);
    Ok(true)
}

fn list_notes(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let flags = DisplayFlags::parse(args, "list")?;
    let settings = load_settings(&settings_path(root));
    let vault = FsVault::new(root);
    let notes = scan_tag_notes(
        &vault,
        &settings.tag_path,
        FilenamePattern::from_lenient(settings.lenient_sync),
    );
    if notes.is_empty() {
        println!("No tag notes found.");
        return Ok(true);
    }

    let ctx = FormatContext::from_env(flags.plain);
    let time = TimeFormatter::new(flags.relative_time, Local::now());
    let headers = vec![
        ctx.format_header("Tag"),
        ctx.format_header("Type"),
        ctx.format_header("Modified"),
        ctx.format_header("Preview"),
    ];
    let rows: Vec<Vec<String>> = notes
        .iter()
        .map(|note| {
            vec![
                ctx.format_tag(note.tag.as_str()),
                ctx.format_note_type(note.note_type.map(NoteType::name).unwrap_or("")),
                ctx.format_timestamp(&note.modified.map(|m| time.format(m)).unwrap_or_default()),
                note.preview.clone(),
            ]
        })
        .collect();
    println!("{}", render_table(&headers, &rows, terminal_columns()));
    Ok(true)
}

fn view_note(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let flags = DisplayFlags::parse(args, "view")?;
    let raw = flags.positional.first().ok_or("Usage: ma view <TAG> [--plain]")?;
    let tag = Tag::parse(&raw.to_ascii_uppercase())?;
    let settings = load_settings(&settings_path(root));
    let vault = FsVault::new(root);
    let path = join_path(&settings.tag_path, &tag.file_name())?;
    let text = vault.read_file(&path)?;
    let note = describe(tag, path, &text, None);

    let ctx = FormatContext::from_env(flags.plain);
    let heading = match note.note_type {
        Some(t) => format!("# {} {}", t, note.tag),
        None => format!("# {}", note.tag),
    };
    println!("{}\n", ctx.format_header(&heading));
    println!("{}", render::render_markdown(catalog::body_of(&text), ctx.use_color));
    Ok(true)
}

fn settings_command(args: Vec<String>, root: &Path) -> Result<bool, Box<dyn Error>> {
    let path = settings_path(root);
    let mut settings = load_settings(&path);
    let mut iter = args.into_iter();
    match iter.next().as_deref() {
        None | Some("show") => print_settings(&settings),
        Some("set") => {
            let key = iter.next().ok_or("Usage: ma settings set <key> <value>")?;
            let value: Vec<String> = iter.collect();
            if value.is_empty() {
                return Err("Usage: ma settings set <key> <value>".into());
            }
            settings.set(&key, &value.join(" "))?;
            save_settings(&path, &settings)?;
            print_settings(&settings);
        }
        Some("reset") => {
            settings = Settings::default();
            save_settings(&path, &settings)?;
            print_settings(&settings);
        }
        Some(other) => return Err(format!("Unknown settings action: {other}").into()),
    }
    Ok(true)
}

fn print_settings(settings: &Settings) {
    for (key, value) in settings.describe() {
        println!("{key:16} {value}");
    }
}

pub(crate) fn terminal_columns() -> Option<usize> {
    if let Ok(cols) = env::var("COLUMNS") {
        if let Ok(n) = cols.parse::<usize>() {
            return Some(n);
        }
    }
    terminal_size::terminal_size().map(|(w, _)| w.0 as usize)
}
