pub mod catfr;
pub mod config;
pub mod error;
pub mod fr;
pub mod list_types;
pub mod pairs;
pub mod pal;
pub mod test_utils;
pub mod types;
pub mod uniqueness;
pub mod vocabulary;

// Re-export commonly used types
pub use catfr::{CatFrGenerator, CategorizedVocabulary, CategorizedWord};
pub use error::{ListgenError, Result};
pub use fr::FrGenerator;
pub use list_types::{
    assign_balanced_list_types, assign_list_types, assign_shuffled_list_types, ListTypeCounts,
};
pub use pairs::{partition_pairs, RotatingSequence};
pub use pal::{assign_cues, generate_n_session_pairs, PalConfig, PalGenerator};
pub use types::{
    CatFrSessionPool, CatWordRow, CuePosition, FrSessionPool, ListType, Pair, PairRow, Pool,
    PoolRow, SessionPool, WordRow,
};
pub use uniqueness::{check_sessions, ensure_unique, equal_pairs, Collision, UniquenessReport};
pub use vocabulary::{Language, Vocabulary};
