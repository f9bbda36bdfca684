//! Command implementations.

use chrono::Utc;
use std::path::Path;
use tempo_core::Storage;
use tempo_sync::{merge_report, BackendRegistry, SyncEngine};

type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Starts tracking a project.
pub fn start(storage: &Storage, project: String, tags: Vec<String>) -> CommandResult {
    let mut state = storage.load_session()?;
    let session = state.start(project, tags)?;
    println!(
        "Starting project {} at {}",
        session.project,
        session.start.format("%H:%M")
    );
    storage.save_session(&mut state)?;
    Ok(())
}

/// Stops the running project and records a frame.
pub fn stop(storage: &Storage) -> CommandResult {
    let mut state = storage.load_session()?;
    let mut frames = storage.load_frames()?;

    let frame = state.stop()?;
    println!(
        "Stopping project {}, started at {} (id: {})",
        frame.project,
        frame.start.format("%H:%M"),
        frame.id
    );
    frames.insert(frame);

    storage.save_frames(&mut frames)?;
    storage.save_session(&mut state)?;
    Ok(())
}

/// Discards the running project.
pub fn cancel(storage: &Storage) -> CommandResult {
    let mut state = storage.load_session()?;
    let session = state.cancel()?;
    println!("Canceling project {}", session.project);
    storage.save_session(&mut state)?;
    Ok(())
}

/// Shows what is currently being tracked.
pub fn status(storage: &Storage) -> CommandResult {
    let state = storage.load_session()?;
    match state.current() {
        Some(session) => println!(
            "Project {} started at {}",
            session.project,
            session.start.format("%Y-%m-%d %H:%M")
        ),
        None => println!("No project started."),
    }
    Ok(())
}

/// Lists all recorded projects.
pub fn projects(storage: &Storage) -> CommandResult {
    let frames = storage.load_frames()?;
    for project in frames.projects() {
        println!("{project}");
    }
    Ok(())
}

/// Lists all recorded tags.
pub fn tags(storage: &Storage) -> CommandResult {
    let frames = storage.load_frames()?;
    for tag in frames.tags() {
        println!("{tag}");
    }
    Ok(())
}

/// Runs one full sync cycle: pull, push, then advance the cursor.
pub fn sync(storage: &Storage) -> CommandResult {
    let settings = storage.load_settings()?;
    let mut frames = storage.load_frames()?;
    let last_sync = storage.load_last_sync()?;

    let registry = BackendRegistry::with_defaults();
    let backend = registry.create(&settings)?;
    let mut engine = SyncEngine::new(backend, last_sync);

    let pulled = engine.pull(&mut frames)?;
    let last_pull = Utc::now();
    let pushed = engine.push(&frames, last_pull)?;

    // Both directions succeeded: move the cursor and persist.
    engine.advance_cursor(last_pull);
    storage.save_frames(&mut frames)?;
    storage.save_last_sync(engine.cursor())?;

    println!("Received {} frames from the server", pulled.len());
    println!("Pushed {} frames to the server", pushed.len());
    Ok(())
}

/// Compares a recovered frame file against the local store, merges
/// what is safe and reports the rest.
pub fn merge(storage: &Storage, file: &Path) -> CommandResult {
    let mut frames = storage.load_frames()?;
    let conflict_set = Storage::load_frames_from(file)?;

    let report = merge_report(&frames, &conflict_set);
    for frame in &report.conflicting {
        println!(
            "conflict: frame {} ({}) diverges from the local copy",
            frame.id, frame.project
        );
    }

    let merged = report.merging.len();
    for frame in report.merging {
        frames.insert(frame);
    }
    storage.save_frames(&mut frames)?;

    println!(
        "{} frames merged, {} conflicts left unresolved",
        merged,
        report.conflicting.len()
    );
    Ok(())
}
