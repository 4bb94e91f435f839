//! Corpus preprocessing for the IPL 2022 batting table.
//!
//! Rows of the season statistics table are validated into [`PlayerRecord`]s,
//! rendered through a fixed five-sentence template, and joined into a single
//! [`CorpusDocument`] with one blank line between paragraphs. The document is
//! what the index builder chunks and embeds.
//!
//! ```
//! use corpus::{preprocess, PlayerRecord, RawPlayerRow};
//!
//! let row: RawPlayerRow = [
//!     ("Player", "Jos Buttler"), ("IPl_team", "RR"), ("year", "2022"),
//!     ("Role", "WK-Batsman"), ("Matches", "17"), ("Innings", "17"),
//!     ("Not_out", "1"), ("Runs", "863"), ("Highest_Score", "116"),
//!     ("Average", "53.9"), ("Balls_faced", "545"), ("Strike_rate", "157.8"),
//!     ("4's", "83"), ("6's", "45"), ("Centuries", "4"), ("Half_centuaries", "3"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let record = PlayerRecord::try_from(row).unwrap();
//! let doc = preprocess(&[record]);
//! assert!(doc.text.contains("scored a total of 863 runs"));
//! ```

mod document;
mod error;
mod reader;
mod record;
mod summary;

pub use crate::document::{
    preprocess, read_corpus, write_corpus, CorpusDocument, PARAGRAPH_SEPARATOR,
};
pub use crate::error::CorpusError;
pub use crate::reader::{read_player_records, read_player_rows};
pub use crate::record::{PlayerRecord, RawPlayerRow, COLUMNS};
pub use crate::summary::render_summary;
