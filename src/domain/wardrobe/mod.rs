// Wardrobe domain module
// Items, outfits, taxonomy lookups and outfit suggestion

pub mod item;
pub mod outfit;
pub mod taxonomy;

pub use item::{Item, ItemDraft, ItemFilter};
pub use outfit::{suggest_outfit, Outfit, OutfitDraft, SuggestionRequest};
pub use taxonomy::{Season, TaxonomyEntry, TaxonomyKind};
