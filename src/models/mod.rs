mod gallery;
mod id;
mod menu;
mod news;
mod nullable;
mod reservation;
mod review;
mod settings;

pub use gallery::{GalleryImage, GalleryImageUpdate, NewGalleryImage};
pub use id::ExternalId;
pub use menu::{
    Menu, MenuCategory, MenuItem, MenuItemUpdate, MenuSnapshot, NewMenuItem, SyncItem,
};
pub use news::{NewNewsArticle, NewsArticle, NewsArticleUpdate};
pub use reservation::{NewReservation, Reservation, ReservationStatus, ReservationStatusUpdate};
pub use review::{sanitize, NewReview, Review, ReviewUpdate, ANONYMOUS_REVIEWER};
pub use settings::{
    AboutSection, FounderProfile, OpeningHours, RestaurantInfo, SettingsUpdate, SiteSettings,
    StoredSettings, TimelineEntry, DEFAULT_ADMIN_CODE,
};
