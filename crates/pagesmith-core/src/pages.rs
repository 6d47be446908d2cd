//! Starter content for the shop's built-in pages.

use crate::node::{BlockKind, Node, NodeRef, props};
use serde_json::json;
use std::sync::Arc;

/// Pages that ship with starter content.
pub const BUILTIN_PAGES: [&str; 4] = ["home", "cart", "checkout", "product"];

/// Starter blocks for `page_id`, with fresh ids on every call. Unknown pages
/// start empty.
pub fn default_components(page_id: &str) -> Vec<NodeRef> {
    let nodes = match page_id {
        "home" => home(),
        "cart" => titled("Shopping Cart", "Your cart items will appear here"),
        "checkout" => titled("Checkout", "Complete your order"),
        "product" => titled("Product Details", "Product information will appear here"),
        _ => Vec::new(),
    };
    nodes.into_iter().map(Arc::new).collect()
}

fn heading(text: &str, level: &str) -> Node {
    Node::new(BlockKind::Heading)
        .with_props(props(json!({
            "text": text,
            "level": level,
            "align": "center",
            "fontSize": "2.5rem",
        })))
        .with_content(text)
}

fn text(body: &str) -> Node {
    Node::new(BlockKind::Text)
        .with_props(props(json!({ "text": body, "align": "center" })))
        .with_content(body)
}

fn titled(title: &str, body: &str) -> Vec<Node> {
    vec![
        Node::new(BlockKind::Section)
            .with_props(props(json!({ "padding": "40px 0", "background": "#ffffff" })))
            .with_children(vec![heading(title, "h1"), text(body)]),
    ]
}

fn feature_card(title: &str, body: &str) -> Node {
    Node::new(BlockKind::Card).with_props(props(json!({
        "title": title,
        "content": body,
        "align": "center",
        "radius": "12px",
        "shadow": "md",
    })))
}

fn home() -> Vec<Node> {
    let mut featured = heading("Featured Products", "h2");
    featured.set_prop("fontWeight", json!("bold"));

    vec![
        Node::new(BlockKind::Banner).with_props(props(json!({
            "title": "50% OFF",
            "subtitle": "Spring / Summer Season - STARTING AT ৳1,999",
            "height": "400px",
            "gradient": "gradient-dark",
        }))),
        Node::new(BlockKind::Section)
            .with_props(props(json!({
                "padding": "64px 0",
                "background": "#f5f5f5",
                "align": "left",
            })))
            .with_children(vec![
                featured,
                Node::new(BlockKind::ProductsGrid)
                    .with_props(props(json!({ "limit": 12, "columns": 4 }))),
            ]),
        Node::new(BlockKind::Section)
            .with_props(props(json!({
                "padding": "64px 0",
                "background": "#ffffff",
                "align": "center",
            })))
            .with_children(vec![
                Node::new(BlockKind::Grid)
                    .with_props(props(json!({
                        "columns": 4,
                        "gap": "32px",
                        "template": "custom",
                    })))
                    .with_children(vec![
                        feature_card("FREE SHIPPING", "Orders Over ৳2,000"),
                        feature_card("24/7 SUPPORT", "We're here to help"),
                        feature_card("SECURED PAYMENT", "Safe & Fast"),
                        feature_card("FREE RETURNS", "Easy & Free"),
                    ]),
            ]),
    ]
}
