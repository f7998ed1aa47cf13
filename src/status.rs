//! Post occupancy as an explicit, resettable resource.
//!
//! The run driver owns one `StatusMap` per experiment and calls
//! [`StatusMap::reset`] before each strategy so every strategy starts from
//! the same capacity.

use std::collections::HashMap;

use crate::model::{ChargingPost, PostId, PostStatus};

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMap {
    baseline: HashMap<PostId, PostStatus>,
    current: HashMap<PostId, PostStatus>,
}

impl StatusMap {
    /// Capture the inventory status of every post as the baseline.
    pub fn snapshot(posts: &[ChargingPost]) -> Self {
        let baseline: HashMap<PostId, PostStatus> =
            posts.iter().map(|post| (post.id, post.status)).collect();
        Self {
            current: baseline.clone(),
            baseline,
        }
    }

    /// Status as of now. Posts outside the snapshot read as out of order.
    pub fn current(&self, post: PostId) -> PostStatus {
        self.current
            .get(&post)
            .copied()
            .unwrap_or(PostStatus::OutOfOrder)
    }

    /// Status at the time the snapshot was taken.
    pub fn baseline(&self, post: PostId) -> PostStatus {
        self.baseline
            .get(&post)
            .copied()
            .unwrap_or(PostStatus::OutOfOrder)
    }

    pub fn is_available(&self, post: PostId) -> bool {
        self.current(post) == PostStatus::Available
    }

    /// Mark `post` as taken.
    ///
    /// # Panics
    ///
    /// Panics if the post is not currently available; committing twice is a
    /// double booking.
    pub fn commit(&mut self, post: PostId) {
        let previous = self.current(post);
        assert_eq!(
            previous,
            PostStatus::Available,
            "{} committed while {:?}",
            post,
            previous
        );
        self.current.insert(post, PostStatus::Unavailable);
    }

    /// Restore every post to its baseline status.
    pub fn reset(&mut self) {
        self.current.clone_from(&self.baseline);
    }

    /// Posts that were available at the baseline and have since been taken.
    pub fn occupied(&self) -> Vec<PostId> {
        let mut taken: Vec<PostId> = self
            .current
            .iter()
            .filter(|(id, status)| {
                **status == PostStatus::Unavailable && self.baseline(**id) == PostStatus::Available
            })
            .map(|(id, _)| *id)
            .collect();
        taken.sort();
        taken
    }

    pub fn available_count(&self) -> usize {
        self.current
            .values()
            .filter(|status| **status == PostStatus::Available)
            .count()
    }

    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }
}
