use serde::{Deserialize, Serialize};

/// One catalogue entry.
/// - `pid`: opaque unique key; sample data looks numeric but it is never parsed
/// - `name`: display name, immutable once created (no edit operation exists)
/// - `image`: filename inside the uploads directory, `null` on the wire when unset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub pid: String,
    pub name: String,
    pub image: Option<String>,
}

impl Product {
    pub fn new(pid: impl Into<String>, name: impl Into<String>) -> Self {
        Self { pid: pid.into(), name: name.into(), image: None }
    }
}

/// The fixed catalogue a fresh deployment starts with. Written to the
/// catalogue file on first run; after that the file is the source of truth.
pub fn default_catalogue() -> Vec<Product> {
    vec![
        Product::new("491772", "Big Cap"),
        Product::new("444799", "Long Bottle"),
        Product::new("783984", "Oil"),
        Product::new("594032", "Nuts"),
        Product::new("364839", "Ghee"),
        Product::new("494034", "Brown Sugar"),
        Product::new("784839", "Sun Lotion"),
        Product::new("483805", "Gentle Wash"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_has_eight_unique_products_without_images() {
        let seed = default_catalogue();
        assert_eq!(seed.len(), 8);
        for p in &seed {
            assert!(p.image.is_none());
        }
        let mut pids: Vec<&str> = seed.iter().map(|p| p.pid.as_str()).collect();
        pids.sort();
        pids.dedup();
        assert_eq!(pids.len(), 8);
    }

    #[test]
    fn unset_image_serializes_as_null() {
        let p = Product::new("491772", "Big Cap");
        let json = serde_json::to_value(&p).expect("serialize");
        assert_eq!(json["pid"], "491772");
        assert_eq!(json["name"], "Big Cap");
        assert!(json["image"].is_null());
    }
}
