pub mod resume;

pub use resume::{DocumentError, Entry, EntryKind, EntryPatch, PersonalField, ResumeDocument};
