/*!
 * Language capabilities used by redistribution: word splitting, compound
 * marking, boundary rules and the caches in front of them.
 */

pub mod boundaries;
pub mod cache;
pub mod compounds;
pub mod services;
pub mod tokenizer;

pub use boundaries::BoundaryRules;
pub use compounds::{CompoundLexicon, PhraseLexicon};
pub use services::LanguageServices;
pub use tokenizer::{UnicodeWordSplitter, WordSplitter};
