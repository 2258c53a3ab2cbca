mod cache;
mod entry;
mod fetcher;
mod stack;

pub use cache::{CachedDocument, ScriptCache};
pub use entry::{display_name, DocumentKey, EntryKind, NavigationEntry};
pub use fetcher::{EmptyScriptFetcher, FetchedScript, MemoryScriptFetcher, ScriptFetcher};
pub use stack::NavigationStack;
