//! Compiled-in table of well-known subscription services.

/// A well-known service with its usual monthly price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub name: &'static str,
    pub price: f64,
    pub description: &'static str,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Netflix",
        price: 599.0,
        description: "Films and series",
    },
    CatalogEntry {
        name: "Spotify",
        price: 169.0,
        description: "Music streaming",
    },
    CatalogEntry {
        name: "YouTube Premium",
        price: 299.0,
        description: "YouTube without ads, background play",
    },
    CatalogEntry {
        name: "Yandex Plus",
        price: 299.0,
        description: "Music, films, and cashback",
    },
    CatalogEntry {
        name: "Kinopoisk",
        price: 269.0,
        description: "Online cinema",
    },
    CatalogEntry {
        name: "Apple Music",
        price: 169.0,
        description: "Music streaming",
    },
    CatalogEntry {
        name: "iCloud+",
        price: 149.0,
        description: "Cloud storage",
    },
    CatalogEntry {
        name: "Telegram Premium",
        price: 299.0,
        description: "Extended Telegram features",
    },
    CatalogEntry {
        name: "ChatGPT Plus",
        price: 1990.0,
        description: "AI assistant",
    },
    CatalogEntry {
        name: "Amazon Prime",
        price: 899.0,
        description: "Delivery and Prime Video",
    },
    CatalogEntry {
        name: "Disney+",
        price: 799.0,
        description: "Disney, Marvel, and Star Wars",
    },
    CatalogEntry {
        name: "Xbox Game Pass",
        price: 1099.0,
        description: "Game library",
    },
];

/// All catalog entries in display order.
pub fn entries() -> &'static [CatalogEntry] {
    CATALOG
}

/// Find a catalog entry by service name (case-insensitive, surrounding whitespace ignored).
pub fn lookup(name: &str) -> Option<&'static CatalogEntry> {
    let name = name.trim();
    CATALOG.iter().find(|e| e.name.eq_ignore_ascii_case(name))
}
