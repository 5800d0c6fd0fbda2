//! # Derived-Field Aggregation
//!
//! Read-time fields computed from an offer's related comments. Nothing here
//! is stored: the recomputed aggregate is the sole source of truth, so
//! rating and comment count can never drift from the comment set.

use super::comment::Comment;
use super::offer::OfferView;

/// Fields computed from the related-comment set at every read
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedFields {
    pub rating: f64,
    pub comments_count: usize,
}

impl DerivedFields {
    /// Average rating and count. The denominator is floored at 1 so an
    /// empty set yields a defined rating of 0 rather than NaN.
    pub fn from_comments(comments: &[Comment]) -> Self {
        let count = comments.len();
        let sum: u32 = comments.iter().map(|comment| u32::from(comment.rating)).sum();
        let denominator = count.max(1) as f64;
        Self {
            rating: f64::from(sum) / denominator,
            comments_count: count,
        }
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Creation time descending
    #[default]
    Newest,
    /// Related-comment count descending
    Popular,
}

impl SortBy {
    pub fn from_query(raw: &str) -> Option<Self> {
        match raw {
            "new" => Some(Self::Newest),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }
}

/// Order and cap a fully aggregated listing. Must run after aggregation:
/// the popular order sorts on a computed field.
pub fn sort_and_truncate(views: &mut Vec<OfferView>, sort: SortBy, limit: usize) {
    match sort {
        SortBy::Newest => {
            views.sort_by(|a, b| b.offer.created_at.cmp(&a.offer.created_at));
        }
        SortBy::Popular => {
            views.sort_by(|a, b| {
                b.derived
                    .comments_count
                    .cmp(&a.derived.comments_count)
                    .then_with(|| b.offer.created_at.cmp(&a.offer.created_at))
            });
        }
    }
    views.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::comment::CreateComment;
    use crate::domain::offer::{City, Convenience, Coordinates, CreateOffer, Offer, PlaceType};
    use uuid::Uuid;

    fn comment_with_rating(offer_id: Uuid, rating: u8) -> Comment {
        Comment::new(
            CreateComment {
                text: "decent stay".to_string(),
                rating,
                offer_id,
            },
            Uuid::new_v4(),
        )
    }

    fn view_with_comments(count: usize) -> OfferView {
        let offer = Offer::from_create(CreateOffer {
            name: "Roomy house by the park".to_string(),
            description: "Plenty of space, close to everything".to_string(),
            city: City::Hamburg,
            preview_image: "p.png".to_string(),
            place_images: vec!["i.png".to_string(); 6],
            is_premium: false,
            place_type: PlaceType::House,
            rooms: 4,
            guests: 6,
            price: 900,
            conveniences: vec![Convenience::Fridge],
            author_id: Uuid::new_v4(),
            location: Coordinates {
                latitude: 53.55,
                longitude: 9.99,
            },
        });
        let comments: Vec<Comment> = (0..count)
            .map(|_| comment_with_rating(offer.id, 4))
            .collect();
        OfferView {
            derived: DerivedFields::from_comments(&comments),
            offer,
            author: None,
            is_favorite: false,
        }
    }

    #[test]
    fn test_empty_comment_set_yields_zero_rating() {
        let derived = DerivedFields::from_comments(&[]);
        assert_eq!(derived.rating, 0.0);
        assert_eq!(derived.comments_count, 0);
    }

    #[test]
    fn test_rating_is_the_exact_mean() {
        let offer_id = Uuid::new_v4();
        let comments = vec![
            comment_with_rating(offer_id, 1),
            comment_with_rating(offer_id, 4),
            comment_with_rating(offer_id, 5),
        ];
        let derived = DerivedFields::from_comments(&comments);
        assert!((derived.rating - 10.0 / 3.0).abs() < 1e-12);
        assert_eq!(derived.comments_count, 3);
    }

    #[test]
    fn test_popular_sort_applies_before_truncation() {
        // The busiest view must survive a cut to one entry even when it is
        // listed last, which only holds if sorting happens first.
        let mut views = vec![view_with_comments(0), view_with_comments(1), view_with_comments(5)];
        sort_and_truncate(&mut views, SortBy::Popular, 1);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].derived.comments_count, 5);
    }

    #[test]
    fn test_newest_sort_is_creation_time_descending() {
        let older = view_with_comments(0);
        let mut newer = view_with_comments(0);
        newer.offer.created_at = older.offer.created_at + chrono::Duration::seconds(10);
        let newer_id = newer.offer.id;

        let mut views = vec![older, newer];
        sort_and_truncate(&mut views, SortBy::Newest, 10);
        assert_eq!(views[0].offer.id, newer_id);
    }
}
