//! # Offer Entity
//!
//! Rental listings: the stored entity, creation/update DTOs, and the public
//! projection assembled from a read-time view (entity + author + derived
//! fields + per-viewer favourite flag).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::DerivedFields;
use super::user::{User, UserProjection};

/// Listing cap applied when a request does not name one
pub const DEFAULT_OFFER_COUNT: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum City {
    Paris,
    Cologne,
    Brussels,
    Amsterdam,
    Hamburg,
    Dusseldorf,
}

impl City {
    pub const NAMES: &'static [&'static str] = &[
        "Paris",
        "Cologne",
        "Brussels",
        "Amsterdam",
        "Hamburg",
        "Dusseldorf",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    Apartment,
    House,
    Room,
    Hotel,
}

impl PlaceType {
    pub const NAMES: &'static [&'static str] = &["apartment", "house", "room", "hotel"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Convenience {
    Breakfast,
    #[serde(rename = "Air conditioning")]
    AirConditioning,
    #[serde(rename = "Laptop friendly workspace")]
    LaptopFriendlyWorkspace,
    #[serde(rename = "Baby seat")]
    BabySeat,
    Washer,
    Towels,
    Fridge,
}

impl Convenience {
    pub const NAMES: &'static [&'static str] = &[
        "Breakfast",
        "Air conditioning",
        "Laptop friendly workspace",
        "Baby seat",
        "Washer",
        "Towels",
        "Fridge",
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Stored listing record. The author is a weak reference: an id resolved
/// by lookup at read time, never an ownership link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    pub place_images: Vec<String>,
    pub is_premium: bool,
    pub place_type: PlaceType,
    pub rooms: u8,
    pub guests: u8,
    pub price: u32,
    pub conveniences: Vec<Convenience>,
    pub author_id: Uuid,
    pub location: Coordinates,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn from_create(dto: CreateOffer) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: dto.name,
            description: dto.description,
            city: dto.city,
            preview_image: dto.preview_image,
            place_images: dto.place_images,
            is_premium: dto.is_premium,
            place_type: dto.place_type,
            rooms: dto.rooms,
            guests: dto.guests,
            price: dto.price,
            conveniences: dto.conveniences,
            author_id: dto.author_id,
            location: dto.location,
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, patch: &OfferPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(preview_image) = &patch.preview_image {
            self.preview_image = preview_image.clone();
        }
        if let Some(place_images) = &patch.place_images {
            self.place_images = place_images.clone();
        }
        if let Some(is_premium) = patch.is_premium {
            self.is_premium = is_premium;
        }
        if let Some(place_type) = patch.place_type {
            self.place_type = place_type;
        }
        if let Some(rooms) = patch.rooms {
            self.rooms = rooms;
        }
        if let Some(guests) = patch.guests {
            self.guests = guests;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(conveniences) = &patch.conveniences {
            self.conveniences = conveniences.clone();
        }
        if let Some(author_id) = patch.author_id {
            self.author_id = author_id;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
    }
}

/// Creation body, decoded after schema validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOffer {
    pub name: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    pub place_images: Vec<String>,
    pub is_premium: bool,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    #[serde(rename = "roomsAmount")]
    pub rooms: u8,
    #[serde(rename = "guestsAmount")]
    pub guests: u8,
    pub price: u32,
    pub conveniences: Vec<Convenience>,
    pub author_id: Uuid,
    pub location: Coordinates,
}

/// Partial update body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub city: Option<City>,
    pub preview_image: Option<String>,
    pub place_images: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    #[serde(rename = "type")]
    pub place_type: Option<PlaceType>,
    #[serde(rename = "roomsAmount")]
    pub rooms: Option<u8>,
    #[serde(rename = "guestsAmount")]
    pub guests: Option<u8>,
    pub price: Option<u32>,
    pub conveniences: Option<Vec<Convenience>>,
    pub author_id: Option<Uuid>,
    pub location: Option<Coordinates>,
}

/// Read-time assembly of one listing: entity plus everything the public
/// projection needs. Pure data, recomputed at every read.
#[derive(Debug, Clone)]
pub struct OfferView {
    pub offer: Offer,
    pub author: Option<User>,
    pub derived: DerivedFields,
    pub is_favorite: bool,
}

/// Public listing view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferProjection {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub city: City,
    pub preview_image: String,
    pub place_images: Vec<String>,
    pub is_premium: bool,
    pub is_favorite: bool,
    pub rating: f64,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    pub rooms_amount: u8,
    pub guests_amount: u8,
    pub price: u32,
    pub conveniences: Vec<Convenience>,
    pub author: Option<UserProjection>,
    pub comments_count: usize,
    pub location: Coordinates,
    pub created_at: DateTime<Utc>,
}

impl OfferProjection {
    pub fn new(view: &OfferView) -> Self {
        Self {
            id: view.offer.id,
            name: view.offer.name.clone(),
            description: view.offer.description.clone(),
            city: view.offer.city,
            preview_image: view.offer.preview_image.clone(),
            place_images: view.offer.place_images.clone(),
            is_premium: view.offer.is_premium,
            is_favorite: view.is_favorite,
            rating: view.derived.rating,
            place_type: view.offer.place_type,
            rooms_amount: view.offer.rooms,
            guests_amount: view.offer.guests,
            price: view.offer.price,
            conveniences: view.offer.conveniences.clone(),
            author: view.author.as_ref().map(UserProjection::from),
            comments_count: view.derived.comments_count,
            location: view.offer.location,
            created_at: view.offer.created_at,
        }
    }
}
