// Social domain module
// Posts, collections, comments and engagement (likes and saves)

pub mod collection;
pub mod comment;
pub mod engagement;
pub mod post;

pub use collection::{Collection, CollectionDraft, CollectionView};
pub use comment::{Comment, CommentDraft, CommentView};
pub use engagement::{Engagement, EngagementTarget};
pub use post::{extract_hashtags, normalize_hashtag, Post, PostDraft, PostView};
