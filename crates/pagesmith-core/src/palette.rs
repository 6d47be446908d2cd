//! The block palette: what can be dragged onto a page.

use crate::node::BlockKind;
use serde::{Deserialize, Serialize};

/// Palette grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Basic,
    Layout,
    Media,
    Ecommerce,
    Forms,
    Content,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Basic,
        Category::Layout,
        Category::Media,
        Category::Ecommerce,
        Category::Forms,
        Category::Content,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Basic => "Basic",
            Category::Layout => "Layout",
            Category::Media => "Media",
            Category::Ecommerce => "Ecommerce",
            Category::Forms => "Forms",
            Category::Content => "Content",
        }
    }
}

/// One draggable palette item.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub kind: BlockKind,
    pub label: &'static str,
    pub category: Category,
}

impl PaletteEntry {
    fn new(kind: BlockKind, label: &'static str, category: Category) -> Self {
        Self { kind, label, category }
    }

    /// Case-insensitive match against the label and the type tag.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.label.to_lowercase().contains(&query)
            || self.kind.as_str().contains(&query)
    }
}

/// Every palette entry, in display order.
pub fn entries() -> Vec<PaletteEntry> {
    use BlockKind::*;
    use Category::*;
    vec![
        PaletteEntry::new(Heading, "Heading", Basic),
        PaletteEntry::new(Text, "Text", Basic),
        PaletteEntry::new(Button, "Button", Basic),
        PaletteEntry::new(Image, "Image", Basic),
        PaletteEntry::new(Section, "Section", Layout),
        PaletteEntry::new(Container, "Container", Layout),
        PaletteEntry::new(Spacer, "Spacer", Layout),
        PaletteEntry::new(Divider, "Divider", Layout),
        PaletteEntry::new(Card, "Card", Layout),
        PaletteEntry::new(Grid, "Grid", Layout),
        PaletteEntry::new(Column, "Columns", Layout),
        PaletteEntry::new(Video, "Video", Media),
        PaletteEntry::new(Slider, "Slider", Media),
        PaletteEntry::new(Banner, "Banner", Media),
        PaletteEntry::new(ProductsGrid, "Products Grid", Ecommerce),
        PaletteEntry::new(FeaturedProducts, "Featured Products", Ecommerce),
        PaletteEntry::new(ProductSearch, "Product Search", Ecommerce),
        PaletteEntry::new(ContactForm, "Contact Form", Forms),
        PaletteEntry::new(Newsletter, "Newsletter", Forms),
        PaletteEntry::new(Testimonials, "Testimonials", Content),
        PaletteEntry::new(Faq, "FAQ", Content),
        PaletteEntry::new(CodeBlock, "Code Block", Content),
        PaletteEntry::new(Alert, "Alert", Content),
        PaletteEntry::new(SocialIcons, "Social Icons", Content),
    ]
}

/// Filter the palette by search text and optional category.
pub fn search(query: &str, category: Option<Category>) -> Vec<PaletteEntry> {
    entries()
        .into_iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| e.matches(query))
        .collect()
}

/// Categories that have at least one entry.
pub fn categories() -> Vec<Category> {
    let all = entries();
    Category::ALL
        .into_iter()
        .filter(|c| all.iter().any(|e| e.category == *c))
        .collect()
}
