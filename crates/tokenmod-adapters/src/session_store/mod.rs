//! Session store adapters.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

/// File names of the artifacts persisted for one session.
pub fn artifact_names(session_id: &str) -> (String, String, String) {
    (
        format!("{session_id}.json"),
        format!("{session_id}-summary.md"),
        format!("revert-{session_id}.sh"),
    )
}
