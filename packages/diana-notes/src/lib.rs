pub mod change_set;
pub mod note;
pub mod outline;
pub mod session;
pub mod tags;
pub mod thought;
pub mod value;

mod error;

pub use change_set::{TodoAction, TodoChangeSet, TodoOp};
pub use error::{Error, Result};
pub use note::{
	Appointment, FreeNote, MemoSummary, NoteKind, StructuredNote, Thought, TodoItem,
	summary_to_notes,
};
pub use session::{AspectSelection, Session, SessionSettings};
pub use tags::{
	LocalizedLabel, NotesTagCatalog, NotesTagDefinition, TagMappingContext, TagMigrationResult,
	resolve_tag_data,
};
pub use thought::{ThoughtDocument, ThoughtOutline, ThoughtOutlineSection};
pub use value::DocumentData;
