//! services/reader/src/cli.rs
//!
//! The `auraread` command line: argument definitions and the dispatcher that
//! drives the store and viewer for each command.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use auraread_core::anchoring::Selection;
use auraread_core::domain::{Credentials, DocumentPatch, Registration};
use auraread_core::library::{document_preview, relative_date_label, SortKey};
use auraread_core::ports::PortError;
use auraread_core::upload::PickedFile;
use bytes::Bytes;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use futures::StreamExt;
use tracing::{info, warn};

use crate::app::{AnnotationDraft, AppStore};
use crate::error::ReaderError;
use crate::viewer::{HighlightEvent, Viewer, ViewerMode};

/// AuraRead: read, annotate and listen to your PDF library.
#[derive(Parser, Debug)]
#[command(name = "auraread")]
#[command(about = "Terminal client for the AuraRead document reader")]
pub struct Cli {
    /// REST API base URL (overrides AURAREAD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and remember the session
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account and log into it
    Register {
        username: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// End the session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// List documents
    List {
        #[arg(long, default_value = "date")]
        sort: SortKey,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one document's details
    Show { id: i64 },
    /// Upload a PDF
    Upload {
        path: PathBuf,
        /// Defaults to the file name without its extension
        #[arg(long)]
        title: Option<String>,
    },
    /// Change a document's title, language or description
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a document
    Delete { id: i64 },
    /// Print a document's extracted text
    Text {
        id: i64,
        /// Mark annotated passages with [brackets]
        #[arg(long)]
        highlights: bool,
    },
    /// List the voices of the TTS engines
    Voices {
        /// Mark the default voice for this language
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Synthesize speech for a document and follow along
    Speak(SpeakArgs),
    /// Manage annotations
    #[command(subcommand)]
    Annotation(AnnotationCommand),
    /// Summarize a document with AI
    Summarize { id: i64 },
    /// Ask the AI a question about a document
    Ask { id: i64, question: String },
    /// Suggest tags for a document
    Tags { id: i64 },
}

impl Command {
    /// Whether the command itself establishes a session, so an auth
    /// failure means bad credentials rather than an expired login.
    pub fn starts_session(&self) -> bool {
        matches!(self, Command::Login { .. } | Command::Register { .. })
    }
}

#[derive(Args, Debug)]
pub struct SpeakArgs {
    pub id: i64,
    /// Read only this passage instead of the whole text
    #[arg(long)]
    pub selection: Option<String>,
    /// Reading language; also saved on the document
    #[arg(long)]
    pub language: Option<String>,
    /// Use the online engine instead of the offline one
    #[arg(long)]
    pub online: bool,
    #[arg(long)]
    pub voice: Option<String>,
    #[arg(long, default_value_t = 1.0)]
    pub rate: f32,
    /// Where to write the audio
    #[arg(long)]
    pub out: PathBuf,
    /// Print words as they are read
    #[arg(long)]
    pub follow: bool,
    #[arg(long, default_value = "basic")]
    pub mode: ViewerMode,
}

#[derive(Subcommand, Debug)]
pub enum AnnotationCommand {
    /// List a document's annotations
    List { document: i64 },
    /// Highlight a passage of a document
    Add {
        document: i64,
        /// The selected text
        selection: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        page: Option<u32>,
        /// Text of the block the selection starts in
        #[arg(long, requires = "container_offset")]
        container_text: Option<String>,
        /// Offset of the selection inside that block
        #[arg(long, requires = "container_text")]
        container_offset: Option<usize>,
    },
    /// Change an annotation's note or colour
    Edit {
        document: i64,
        id: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete an annotation
    Remove { id: i64 },
}

//=========================================================================================
// Dispatch
//=========================================================================================

fn read_password(given: Option<String>) -> Result<String, ReaderError> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn require_login(store: &AppStore) -> Result<(), ReaderError> {
    if store.auth.is_authenticated() {
        Ok(())
    } else {
        Err(PortError::Unauthorized("You are not logged in".to_string()).into())
    }
}

fn read_pdf(path: &Path) -> Result<PickedFile, ReaderError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(PickedFile {
        file_name,
        mime_type,
        bytes: Bytes::from(bytes),
    })
}

/// Runs one command against the store.
pub async fn run(command: Command, store: &mut AppStore) -> Result<(), ReaderError> {
    match command {
        Command::Login { username, password } => {
            let credentials = Credentials {
                username,
                password: read_password(password)?,
            };
            let user = store.login(&credentials).await?;
            println!("Logged in as {}", user.username);
        }
        Command::Register {
            username,
            email,
            password,
        } => {
            let registration = Registration {
                username,
                password: read_password(password)?,
                email,
            };
            let user = store.register(&registration).await?;
            println!("Registered and logged in as {}", user.username);
        }
        Command::Logout => {
            if let Err(e) = store.logout().await {
                warn!("Logout request failed: {}", e);
            }
            println!("Logged out");
        }
        Command::Whoami => {
            require_login(store)?;
            let user = store.load_current_user().await?;
            match user.email {
                Some(email) => println!("{} <{}> (id {})", user.username, email, user.id),
                None => println!("{} (id {})", user.username, user.id),
            }
        }
        Command::List { sort, search } => {
            require_login(store)?;
            store.fetch_documents().await?;
            let now = Utc::now();
            let documents = store.documents.visible(sort, &search);
            if documents.is_empty() {
                println!("No documents found.");
            }
            for doc in documents {
                println!(
                    "{:>5}  {}  [{}]  {}",
                    doc.id,
                    doc.title,
                    doc.language,
                    relative_date_label(doc.uploaded_at, now)
                );
                println!("       {}", document_preview(&doc, None));
            }
        }
        Command::Show { id } => {
            require_login(store)?;
            let doc = store.fetch_document(id).await?;
            println!("{} (id {})", doc.title, doc.id);
            println!("Language:  {}", doc.language);
            if let Some(pages) = doc.page_count {
                println!("Pages:     {}", pages);
            }
            println!("Uploaded:  {}", doc.uploaded_at.format("%Y-%m-%d %H:%M"));
            if let Some(url) = &doc.file_url {
                println!("File:      {}", url);
            }
            if let Some(description) = &doc.description {
                println!("\n{}", description);
            }
        }
        Command::Upload { path, title } => {
            require_login(store)?;
            let file = read_pdf(&path)?;
            let doc = store.upload_document(Some(file), title.as_deref()).await?;
            println!("Uploaded '{}' as document {}", doc.title, doc.id);
        }
        Command::Update {
            id,
            title,
            language,
            description,
        } => {
            require_login(store)?;
            let patch = DocumentPatch {
                title,
                language,
                description,
            };
            if patch.is_empty() {
                return Err(PortError::Validation("Nothing to update".to_string()).into());
            }
            let doc = store.update_document(id, &patch).await?;
            println!("Updated '{}' (id {})", doc.title, doc.id);
        }
        Command::Delete { id } => {
            require_login(store)?;
            store.delete_document(id).await?;
            println!("Deleted document {}", id);
        }
        Command::Text { id, highlights } => {
            require_login(store)?;
            let mode = if highlights {
                ViewerMode::Enhanced
            } else {
                ViewerMode::Basic
            };
            let viewer = Viewer::open(store, id, mode).await?;
            let rendered: String = viewer
                .segments(store)
                .iter()
                .map(|s| match s.annotation_id {
                    Some(_) => format!("[{}]", s.text),
                    None => s.text.to_string(),
                })
                .collect();
            println!("{}", rendered);
        }
        Command::Voices { language } => {
            require_login(store)?;
            let catalog = store.services().speech.available_voices().await;
            let catalog = store.check_auth(catalog)?;
            if catalog.is_empty() {
                println!("No voices available.");
            }
            let default_id = catalog.default_voice(&language).map(|v| v.id.clone());
            for (engine, voices) in [("windows_sapi", &catalog.windows_sapi), ("pyttsx3", &catalog.pyttsx3)] {
                if voices.is_empty() {
                    continue;
                }
                println!("{}:", engine);
                for voice in voices {
                    let marker = if Some(&voice.id) == default_id.as_ref() { "*" } else { " " };
                    println!(" {} {}  ({})  {}", marker, voice.name, voice.language, voice.id);
                }
            }
        }
        Command::Speak(args) => {
            require_login(store)?;
            speak(store, args).await?;
        }
        Command::Annotation(command) => {
            require_login(store)?;
            annotation(store, command).await?;
        }
        Command::Summarize { id } => {
            require_login(store)?;
            let mut viewer = Viewer::open(store, id, ViewerMode::Smart).await?;
            let summary = viewer.summarize(store).await?;
            println!("{}", summary.summary);
            if !summary.key_points.is_empty() {
                println!("\nKey points:");
                for point in &summary.key_points {
                    println!("  - {}", point);
                }
            }
            if summary.cached {
                info!("Summary served from the server cache");
            }
        }
        Command::Ask { id, question } => {
            require_login(store)?;
            let mut viewer = Viewer::open(store, id, ViewerMode::Smart).await?;
            let answer = viewer.ask(store, &question).await?;
            println!("Q: {}\nA: {}", answer.question, answer.answer);
        }
        Command::Tags { id } => {
            require_login(store)?;
            let mut viewer = Viewer::open(store, id, ViewerMode::Smart).await?;
            for tag in viewer.suggest_tags(store).await? {
                let status = if tag.created { "new" } else { "existing" };
                println!("{:<24} {:>5.2}  {}", tag.tag, tag.confidence, status);
            }
        }
    }
    Ok(())
}

async fn speak(store: &mut AppStore, args: SpeakArgs) -> Result<(), ReaderError> {
    let mut viewer = Viewer::open(store, args.id, args.mode).await?;
    viewer.set_rate(args.rate);
    viewer.set_prefer_offline(!args.online);
    if let Some(language) = &args.language {
        viewer.set_language(store, language).await?;
    }
    match args.voice {
        Some(voice) => viewer.set_voice(Some(voice)),
        None => {
            if let Err(e) = viewer.load_voices(store).await {
                warn!("Could not load voices, using the server default: {}", e);
            }
        }
    }

    let reading = viewer.read_aloud(store, args.selection.as_deref()).await?;
    let out = if args.out.extension().is_some() {
        args.out.clone()
    } else {
        args.out.with_extension(reading.audio.extension())
    };
    tokio::fs::write(&out, &reading.audio.bytes).await?;
    println!(
        "Wrote {} bytes of audio to {}{}",
        reading.audio.bytes.len(),
        out.display(),
        if reading.from_cache { " (cached)" } else { "" }
    );

    if args.follow {
        let stop = viewer.stop_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.cancel();
            }
        });
        let mut highlights = Box::pin(reading.highlights());
        let mut current_sentence = None;
        let mut stdout = io::stdout();
        while let Some(event) = highlights.next().await {
            match event {
                HighlightEvent::Word {
                    sentence_index,
                    text,
                    ..
                } => {
                    if current_sentence.is_some() && current_sentence != Some(sentence_index) {
                        writeln!(stdout)?;
                    }
                    current_sentence = Some(sentence_index);
                    write!(stdout, "{} ", text)?;
                    stdout.flush()?;
                }
                HighlightEvent::Stopped => {
                    writeln!(stdout, "\n(stopped)")?;
                }
                HighlightEvent::Finished => {
                    writeln!(stdout)?;
                }
            }
        }
    }
    Ok(())
}

async fn annotation(store: &mut AppStore, command: AnnotationCommand) -> Result<(), ReaderError> {
    match command {
        AnnotationCommand::List { document } => {
            let annotations = store.fetch_annotations(document).await?;
            if annotations.is_empty() {
                println!("No annotations.");
            }
            for a in annotations {
                println!(
                    "{:>5}  {}..{}  {:<8} \"{}\"",
                    a.id, a.start_offset, a.end_offset, a.highlight_color, a.selected_text
                );
                if let Some(note) = &a.note {
                    println!("       {}", note);
                }
            }
        }
        AnnotationCommand::Add {
            document,
            selection,
            note,
            color,
            page,
            container_text,
            container_offset,
        } => {
            let mut viewer = Viewer::open(store, document, ViewerMode::Enhanced).await?;
            let mut selection = Selection::new(selection);
            if let (Some(text), Some(offset)) = (container_text, container_offset) {
                selection = selection.with_container(text, offset);
            }
            let draft = AnnotationDraft {
                note,
                highlight_color: color,
                page_number: page,
            };
            match viewer.annotate(store, &selection, draft).await? {
                Some(a) => println!(
                    "Created annotation {} at {}..{}",
                    a.id, a.start_offset, a.end_offset
                ),
                None => println!("The selection could not be found in the document text."),
            }
        }
        AnnotationCommand::Edit {
            document,
            id,
            note,
            color,
        } => {
            store.fetch_annotations(document).await?;
            let a = store.edit_annotation(id, note, color).await?;
            println!("Updated annotation {}", a.id);
        }
        AnnotationCommand::Remove { id } => {
            store.delete_annotation(id).await?;
            println!("Deleted annotation {}", id);
        }
    }
    Ok(())
}
