//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the marketplace tables read by reporting.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod agent_option;
pub mod artist;
pub mod artist_review;
pub mod artwork;
pub mod artwork_like;
pub mod artwork_view;
pub mod cart;
pub mod member;
pub mod member_activity;
pub mod search_log;
pub mod social_share;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use agent_option::{
    Column as AgentOptionColumn, Entity as AgentOption, Model as AgentOptionModel,
};
pub use artist::{Column as ArtistColumn, Entity as Artist, Model as ArtistModel};
pub use artist_review::{
    Column as ArtistReviewColumn, Entity as ArtistReview, Model as ArtistReviewModel,
};
pub use artwork::{Column as ArtworkColumn, Entity as Artwork, Model as ArtworkModel};
pub use artwork_like::{
    Column as ArtworkLikeColumn, Entity as ArtworkLike, Model as ArtworkLikeModel,
};
pub use artwork_view::{
    Column as ArtworkViewColumn, Entity as ArtworkView, Model as ArtworkViewModel,
};
pub use cart::{Column as CartColumn, Entity as Cart, Model as CartModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use member_activity::{
    Column as MemberActivityColumn, Entity as MemberActivity, Model as MemberActivityModel,
};
pub use search_log::{
    Column as SearchLogColumn, Entity as SearchLog, Model as SearchLogModel,
};
pub use social_share::{
    Column as SocialShareColumn, Entity as SocialShare, Model as SocialShareModel,
};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
