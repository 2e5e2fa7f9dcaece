//! Gallery storage boundary.
//!
//! The app only talks to a [`GalleryStore`]; [`MemoryGallery`] is the
//! in-process implementation used when no backend is configured.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::DrawingDocument;
use crate::error::GalleryError;
use crate::scoring::ScoreReport;
use crate::util::time;

/// Items scoring above this count as a match.
pub const MATCH_THRESHOLD: f32 = 0.5;
/// Items scoring at least this are shown under [`FilterOption::HighScore`].
pub const HIGH_SCORE_THRESHOLD: f32 = 0.7;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GalleryId(String);

impl GalleryId {
    /// A fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GalleryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GalleryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for GalleryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for GalleryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A visible gallery entry as returned by [`GalleryStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryItem {
    pub id: GalleryId,
    pub upvotes: u32,
    pub downvotes: u32,
    pub vote_score: i64,
    pub ai_score: Option<f32>,
    pub ai_confidence: Option<f32>,
    /// Seconds since the UNIX epoch
    pub created_at: u64,
    /// Seconds spent drawing
    pub drawing_duration: f64,
    pub image_png: Arc<[u8]>,
    pub document: Arc<DrawingDocument>,
}

impl GalleryItem {
    pub fn is_match(&self) -> bool {
        self.ai_score.is_some_and(|score| score > MATCH_THRESHOLD)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Recent,
    /// Highest vote score first
    Popular,
    /// Newest first, ties broken by votes
    Hot,
    /// Shuffled order where the store supports it, otherwise recent
    Random,
}

impl SortOption {
    pub const ALL: [Self; 4] = [Self::Recent, Self::Popular, Self::Hot, Self::Random];

    pub fn label(self) -> &'static str {
        match self {
            Self::Recent => "Recent",
            Self::Popular => "Popular",
            Self::Hot => "Hot",
            Self::Random => "Random",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOption {
    #[default]
    All,
    MatchesOnly,
    HighScore,
}

impl FilterOption {
    pub const ALL: [Self; 3] = [Self::All, Self::MatchesOnly, Self::HighScore];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::MatchesOnly => "Matches only",
            Self::HighScore => "High score",
        }
    }

    pub fn accepts(self, ai_score: Option<f32>) -> bool {
        match self {
            Self::All => true,
            Self::MatchesOnly => ai_score.is_some_and(|score| score > MATCH_THRESHOLD),
            Self::HighScore => ai_score.is_some_and(|score| score >= HIGH_SCORE_THRESHOLD),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub sort: SortOption,
    pub filter: FilterOption,
    pub offset: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort: SortOption::Recent,
            filter: FilterOption::All,
            offset: 0,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

/// Everything a store needs to publish one drawing.
#[derive(Debug, Clone)]
pub struct Submission {
    pub image_png: Vec<u8>,
    pub document: DrawingDocument,
    pub score: Option<ScoreReport>,
}

/// Remote or local persistence for submitted drawings.
pub trait GalleryStore {
    fn submit(
        &self,
        submission: Submission,
    ) -> impl Future<Output = Result<GalleryId, GalleryError>> + Send;

    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<Vec<GalleryItem>, GalleryError>> + Send;

    fn vote(
        &self,
        id: &GalleryId,
        direction: VoteDirection,
    ) -> impl Future<Output = Result<(), GalleryError>> + Send;

    /// Hide an item from listings. Hidden items keep their data.
    fn delete(&self, id: &GalleryId) -> impl Future<Output = Result<(), GalleryError>> + Send;
}

#[derive(Debug, Clone)]
struct Record {
    item: GalleryItem,
    /// Insertion order, for stable ordering within one second
    sequence: u64,
    visible: bool,
}

/// In-process gallery. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryGallery {
    records: Mutex<Vec<Record>>,
}

impl MemoryGallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible items.
    pub fn len(&self) -> usize {
        self.records.lock().iter().filter(|record| record.visible).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, submission: Submission, created_at: u64) -> Result<GalleryId, GalleryError> {
        if submission.image_png.is_empty() {
            return Err(GalleryError::Rejected("image is empty".to_owned()));
        }
        if submission.document.is_empty() {
            return Err(GalleryError::Rejected("drawing has no strokes".to_owned()));
        }

        let id = GalleryId::generate();
        let mut records = self.records.lock();
        let sequence = records.len() as u64;
        let item = GalleryItem {
            id: id.clone(),
            upvotes: 0,
            downvotes: 0,
            vote_score: 0,
            ai_score: submission.score.map(|report| report.score),
            ai_confidence: submission.score.map(|report| report.confidence),
            created_at,
            drawing_duration: submission.document.total_duration_seconds,
            image_png: submission.image_png.into(),
            document: Arc::new(submission.document),
        };
        records.push(Record {
            item,
            sequence,
            visible: true,
        });
        log::info!("Stored drawing {id}");
        Ok(id)
    }

    fn query(&self, query: ListQuery) -> Vec<GalleryItem> {
        let records = self.records.lock();
        let mut matching: Vec<&Record> = records
            .iter()
            .filter(|record| record.visible && query.filter.accepts(record.item.ai_score))
            .collect();

        let newest_first = |a: &&Record, b: &&Record| {
            (b.item.created_at, b.sequence).cmp(&(a.item.created_at, a.sequence))
        };
        match query.sort {
            SortOption::Recent | SortOption::Random => matching.sort_by(newest_first),
            SortOption::Popular => matching.sort_by(|a, b| {
                b.item
                    .vote_score
                    .cmp(&a.item.vote_score)
                    .then_with(|| newest_first(a, b))
            }),
            SortOption::Hot => matching.sort_by(|a, b| {
                b.item
                    .created_at
                    .cmp(&a.item.created_at)
                    .then_with(|| b.item.vote_score.cmp(&a.item.vote_score))
                    .then_with(|| b.sequence.cmp(&a.sequence))
            }),
        }

        matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|record| record.item.clone())
            .collect()
    }

    fn with_visible<T>(
        &self,
        id: &GalleryId,
        f: impl FnOnce(&mut Record) -> T,
    ) -> Result<T, GalleryError> {
        let mut records = self.records.lock();
        records
            .iter_mut()
            .find(|record| record.visible && record.item.id == *id)
            .map(f)
            .ok_or_else(|| GalleryError::NotFound(id.clone()))
    }
}

impl GalleryStore for MemoryGallery {
    fn submit(
        &self,
        submission: Submission,
    ) -> impl Future<Output = Result<GalleryId, GalleryError>> + Send {
        let result = self.insert(submission, time::timestamp_secs());
        async move { result }
    }

    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<Vec<GalleryItem>, GalleryError>> + Send {
        let items = self.query(query);
        async move { Ok(items) }
    }

    fn vote(
        &self,
        id: &GalleryId,
        direction: VoteDirection,
    ) -> impl Future<Output = Result<(), GalleryError>> + Send {
        let result = self.with_visible(id, |record| {
            let item = &mut record.item;
            match direction {
                VoteDirection::Up => item.upvotes += 1,
                VoteDirection::Down => item.downvotes += 1,
            }
            item.vote_score = i64::from(item.upvotes) - i64::from(item.downvotes);
        });
        async move { result }
    }

    fn delete(&self, id: &GalleryId) -> impl Future<Output = Result<(), GalleryError>> + Send {
        let result = self.with_visible(id, |record| record.visible = false);
        if result.is_ok() {
            log::info!("Hid drawing {id}");
        }
        async move { result }
    }
}
