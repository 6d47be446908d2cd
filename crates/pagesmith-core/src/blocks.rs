//! Default configuration for newly created blocks.

use crate::node::{BlockKind, Node, props};
use serde_json::json;

/// Number of columns a fresh column block starts with.
pub const DEFAULT_COLUMN_COUNT: u32 = 2;

/// Materialise a new block of `kind` with a fresh id and default props.
///
/// Composite kinds come with their default children (column slots, slider
/// slides); every child gets its own fresh id.
pub fn default_node(kind: BlockKind) -> Node {
    let node = Node::new(kind.clone());
    match kind {
        BlockKind::Heading => node
            .with_props(props(json!({
                "text": "Heading Text",
                "level": "h1",
                "align": "left",
                "color": "#000000",
                "fontSize": "2.5rem",
                "background": "#ffffff",
            })))
            .with_content("Heading Text"),
        BlockKind::Text => {
            let body = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";
            node.with_props(props(json!({ "text": body, "align": "left", "color": "#333333" })))
                .with_content(body)
        }
        BlockKind::Button => node
            .with_props(props(json!({
                "text": "Click Me",
                "link": "#",
                "variant": "primary",
                "size": "md",
                "align": "left",
            })))
            .with_content("Click Me"),
        BlockKind::Image => node.with_props(props(json!({
            "src": "",
            "alt": "Image",
            "width": "100%",
            "height": "auto",
        }))),
        BlockKind::Section => node.with_props(props(json!({
            "padding": "40px",
            "background": "#ffffff",
            "align": "center",
        }))),
        BlockKind::Container => node.with_props(props(json!({
            "columns": 2,
            "gap": "20px",
            "padding": "20px",
        }))),
        BlockKind::Spacer => node.with_props(props(json!({ "height": "40px" }))),
        BlockKind::Divider => node.with_props(props(json!({
            "color": "#e5e7eb",
            "thickness": "1px",
            "style": "solid",
        }))),
        BlockKind::Card => node.with_props(props(json!({
            "title": "Card Title",
            "content": "Card content goes here",
            "padding": "20px",
        }))),
        BlockKind::Grid => node.with_props(props(json!({
            "columns": 3,
            "rows": 3,
            "gap": "20px",
            "template": "custom",
        }))),
        BlockKind::Column => {
            let slots = (0..DEFAULT_COLUMN_COUNT).map(|_| column_slot()).collect();
            node.with_props(props(json!({
                "columns": DEFAULT_COLUMN_COUNT,
                "columnSizes": ["1fr", "1fr"],
                "gap": "20px",
                "align": "stretch",
            })))
            .with_children(slots)
        }
        BlockKind::Video => node.with_props(props(json!({
            "src": "",
            "width": "100%",
            "height": "400px",
            "autoplay": false,
        }))),
        BlockKind::Form => node.with_props(props(json!({ "fields": [] }))),
        BlockKind::ProductsGrid => node.with_props(product_listing(12, 4)),
        BlockKind::FeaturedProducts => node.with_props(product_listing(6, 3)),
        BlockKind::ProductSearch => {
            node.with_props(props(json!({ "placeholder": "Search products..." })))
        }
        BlockKind::ContactForm => node.with_props(props(json!({
            "title": "Contact Us",
            "fields": ["name", "email", "message"],
        }))),
        BlockKind::Newsletter => node.with_props(props(json!({
            "title": "Subscribe to Newsletter",
            "placeholder": "Enter your email",
        }))),
        BlockKind::Dropdown => node.with_props(props(json!({
            "label": "Select Option",
            "placeholder": "Choose an option",
            "options": ["Option 1", "Option 2", "Option 3"],
            "value": "",
            "required": false,
        }))),
        BlockKind::Select => node.with_props(props(json!({
            "name": "select",
            "id": "select",
            "label": "Select",
            "options": ["Option 1", "Option 2", "Option 3"],
            "value": "",
            "required": false,
            "multiple": false,
        }))),
        BlockKind::Slider => node
            .with_props(props(json!({
                "autoplay": true,
                "speed": 5000,
                "showArrows": true,
                "showDots": true,
            })))
            .with_children(vec![
                slide("Welcome to Our Store", "Discover amazing products at unbeatable prices", "gradient-orange"),
                slide("New Collection", "Shop the latest trends and styles", "gradient-primary"),
                slide("Special Offers", "Limited time deals you don't want to miss", "gradient-warm"),
            ]),
        BlockKind::Banner => node.with_props(props(json!({
            "title": "Banner Title",
            "subtitle": "Banner subtitle",
            "image": "",
            "height": "400px",
        }))),
        BlockKind::Testimonials | BlockKind::Faq => node.with_props(props(json!({ "items": [] }))),
        BlockKind::CodeBlock => {
            node.with_props(props(json!({ "code": "", "language": "javascript" })))
        }
        BlockKind::Alert => node.with_props(props(json!({
            "text": "Alert message",
            "type": "info",
            "dismissible": true,
        }))),
        BlockKind::SocialIcons => node.with_props(props(json!({
            "platforms": ["facebook", "twitter", "instagram"],
            "size": "md",
        }))),
        BlockKind::Custom(_) => node,
    }
}

/// Default child of a column block: one column's content area.
pub fn column_slot() -> Node {
    Node::new(BlockKind::Section).with_props(props(json!({
        "padding": "20px",
        "background": "#ffffff",
    })))
}

fn slide(title: &str, subtitle: &str, gradient: &str) -> Node {
    Node::new(BlockKind::Banner).with_props(props(json!({
        "title": title,
        "subtitle": subtitle,
        "height": "500px",
        "gradient": gradient,
    })))
}

fn product_listing(limit: u32, columns: u32) -> crate::node::Props {
    props(json!({
        "limit": limit,
        "columns": columns,
        "showCategory": true,
        "showWishlist": true,
        "showCartButton": true,
        "showViewDetails": false,
        "hideStockOut": false,
    }))
}
